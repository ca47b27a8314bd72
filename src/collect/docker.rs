use std::time::Duration;

use super::{copy_by_prefix, CollectCtx};
use crate::classify::Family;
use crate::error::FatalError;
use crate::report::StepResult;

/// Wall-clock budget for each inventory sub-query. A wedged daemon answers
/// none of them; the budget keeps one stuck query from stalling the bundle.
const SUBQUERY_BUDGET: Duration = Duration::from_secs(75);

/// Inventory sub-queries, in collection order.
const SUBQUERIES: [(&str, &[&str]); 4] = [
    ("docker-info.txt", &["info"]),
    ("containers.txt", &["ps", "--all", "--no-trunc"]),
    ("images.txt", &["images"]),
    ("version.txt", &["version"]),
];

/// Daemon inventory. The one adapter allowed to be fatal: without a running
/// daemon the runtime-side half of the bundle is meaningless.
pub fn inventory(ctx: &CollectCtx) -> StepResult {
    if !daemon_running(ctx) {
        return StepResult::Fatal(FatalError::DaemonNotRunning.to_string());
    }

    let mut skipped = Vec::new();
    for (file, args) in SUBQUERIES {
        match ctx.runner.run_with_limit("docker", args, SUBQUERY_BUDGET) {
            Ok(Some(out)) if out.success() => {
                if let Err(e) = ctx.tree.write("docker", file, out.stdout.as_bytes()) {
                    skipped.push(format!("writing docker/{}: {}", file, e));
                }
            }
            Ok(Some(_)) => skipped.push(format!("docker {} failed", args.join(" "))),
            Ok(None) => skipped.push(format!(
                "docker {} did not answer within {}s",
                args.join(" "),
                SUBQUERY_BUDGET.as_secs()
            )),
            Err(_) => skipped.push("docker client is not available".into()),
        }
    }

    super::result_from(skipped)
}

/// One inspect dump per currently running container, named by container id.
pub fn inspect_containers(ctx: &CollectCtx) -> StepResult {
    let ids = match ctx.runner.run("docker", &["ps", "-q"]) {
        Ok(out) if out.success() => out.stdout,
        _ => return StepResult::warning("could not enumerate running containers"),
    };

    let mut misses = Vec::new();
    for id in ids.lines().map(str::trim).filter(|id| !id.is_empty()) {
        match ctx.runner.run("docker", &["inspect", id]) {
            Ok(out) if out.success() => {
                let file = format!("{}.txt", id);
                if let Err(e) = ctx.tree.write("containers", &file, out.stdout.as_bytes()) {
                    misses.push(format!("writing containers/{}: {}", file, e));
                }
            }
            _ => misses.push(format!("inspect of {} failed", id)),
        }
    }

    super::result_from(misses)
}

/// Daemon logs: a 3-day journal window when the journal reader exists,
/// otherwise the family-specific raw log files.
pub fn logs(ctx: &CollectCtx) -> StepResult {
    if ctx.runner.which("journalctl").is_some() {
        return match journal_window(ctx, "docker", "docker_log", "docker") {
            Ok(()) => StepResult::Ok,
            Err(reason) => StepResult::Warning(reason),
        };
    }

    let copied = match ctx.os.family {
        Family::Amazon => copy_by_prefix(ctx, &ctx.host_path("/var/log"), &["docker"], "docker_log"),
        Family::Ubuntu14 => copy_by_prefix(
            ctx,
            &ctx.host_path("/var/log/upstart"),
            &["docker"],
            "docker_log",
        ),
        Family::RedHat | Family::Debian => {
            return StepResult::warning("no journal reader and no known log location")
        }
    };

    match copied {
        Ok(0) => StepResult::warning("no docker log files found"),
        Ok(_) => StepResult::Ok,
        Err(reason) => StepResult::Warning(reason),
    }
}

/// Scoped journal dump shared with the cluster-agent adapter.
pub(crate) fn journal_window(
    ctx: &CollectCtx,
    unit: &str,
    subdir: &str,
    file: &str,
) -> Result<(), String> {
    let out = ctx
        .runner
        .run(
            "journalctl",
            &["-u", unit, "--since", "3 days ago", "--no-pager"],
        )
        .map_err(|_| "journalctl is not available".to_string())?;
    if !out.success() {
        return Err(format!("journalctl query for {} failed", unit));
    }
    ctx.tree
        .write(subdir, file, out.stdout.as_bytes())
        .map_err(|e| format!("writing {}/{}: {}", subdir, file, e))?;
    Ok(())
}

/// Process-table scan for the daemon. Lines mentioning grep are excluded so
/// a concurrent `ps aux | grep docker` never counts as the daemon itself.
pub fn daemon_running(ctx: &CollectCtx) -> bool {
    let Ok(out) = ctx.runner.run("ps", &["aux"]) else {
        return false;
    };
    out.stdout
        .lines()
        .filter(|line| !line.contains("grep"))
        .any(|line| line.contains("dockerd") || line.contains("docker daemon"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::testutil::{amazon, ctx, ubuntu14};
    use crate::runner::fake::FakeRunner;

    const PS_WITH_DAEMON: &str =
        "root 900 0.1 1.2 /usr/bin/dockerd --default-ulimit nofile=1024\nroot 1 0.0 0.1 /sbin/init\n";
    const PS_WITHOUT_DAEMON: &str =
        "root 1 0.0 0.1 /sbin/init\nroot 77 0.0 0.0 grep dockerd\n";

    fn inventory_runner() -> FakeRunner {
        FakeRunner::new()
            .with_output("ps aux", PS_WITH_DAEMON)
            .with_output("docker info", "Server Version: 1.12.6\n")
            .with_output("docker ps --all --no-trunc", "CONTAINER ID IMAGE\n")
            .with_output("docker images", "REPOSITORY TAG\n")
            .with_output("docker version", "Client:\n Version: 1.12.6\n")
    }

    #[test]
    fn grep_line_does_not_count_as_daemon() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().with_output("ps aux", PS_WITHOUT_DAEMON);
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));
        assert!(!daemon_running(&ctx));
    }

    #[test]
    fn absent_daemon_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new().with_output("ps aux", PS_WITHOUT_DAEMON);
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert!(inventory(&ctx).is_fatal());
        assert!(!ctx.tree.root().exists());
    }

    #[test]
    fn inventory_writes_all_subqueries() {
        let dir = tempfile::tempdir().unwrap();
        let runner = inventory_runner();
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert_eq!(inventory(&ctx), StepResult::Ok);
        for file in ["docker-info.txt", "containers.txt", "images.txt", "version.txt"] {
            assert!(ctx.tree.root().join("docker").join(file).is_file());
        }
    }

    #[test]
    fn elapsed_budget_skips_one_subquery_only() {
        let dir = tempfile::tempdir().unwrap();
        let runner = inventory_runner().with_over_budget("docker info");
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        match inventory(&ctx) {
            StepResult::Warning(reason) => assert!(reason.contains("docker info")),
            other => panic!("expected a warning, got {:?}", other),
        }
        assert!(!ctx.tree.root().join("docker/docker-info.txt").exists());
        assert!(ctx.tree.root().join("docker/images.txt").is_file());
    }

    #[test]
    fn one_inspect_file_per_running_container() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new()
            .with_output("docker ps -q", "abc123\ndef456\n")
            .with_output("docker inspect abc123", "[{\"Id\": \"abc123\"}]\n")
            .with_output("docker inspect def456", "[{\"Id\": \"def456\"}]\n");
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert_eq!(inspect_containers(&ctx), StepResult::Ok);
        assert!(ctx.tree.root().join("containers/abc123.txt").is_file());
        assert!(ctx.tree.root().join("containers/def456.txt").is_file());
    }

    #[test]
    fn journal_preferred_when_reader_exists() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new()
            .with_tool("journalctl")
            .with_output(
                "journalctl -u docker --since 3 days ago --no-pager",
                "-- Logs begin --\ndockerd[900]: starting\n",
            );
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert_eq!(logs(&ctx), StepResult::Ok);
        let log = std::fs::read_to_string(ctx.tree.root().join("docker_log/docker")).unwrap();
        assert!(log.contains("dockerd[900]"));
    }

    #[test]
    fn upstart_family_copies_rotated_files() {
        let dir = tempfile::tempdir().unwrap();
        let upstart = dir.path().join("var/log/upstart");
        std::fs::create_dir_all(&upstart).unwrap();
        std::fs::write(upstart.join("docker.log"), "log").unwrap();
        std::fs::write(upstart.join("docker.log.1.gz"), "old").unwrap();

        let runner = FakeRunner::new();
        let ctx = ctx(&runner, ubuntu14(), dir.path(), &dir.path().join("collect"));

        assert_eq!(logs(&ctx), StepResult::Ok);
        assert!(ctx.tree.root().join("docker_log/docker.log").is_file());
        assert!(ctx.tree.root().join("docker_log/docker.log.1.gz").is_file());
    }
}
