use super::{capture, CollectCtx};
use crate::classify::Family;
use crate::report::StepResult;

/// Service inventory plus the always-collected process and socket snapshots.
pub fn run(ctx: &CollectCtx) -> StepResult {
    let mut misses = Vec::new();

    match ctx.os.family {
        Family::Amazon | Family::RedHat | Family::Debian => {
            if let Err(reason) = capture(
                ctx,
                "systemctl",
                &["list-units"],
                "system",
                "services.txt",
            ) {
                misses.push(reason);
            }
        }
        Family::Ubuntu14 => {
            if let Err(reason) = upstart_jobs(ctx) {
                misses.push(reason);
            }
        }
    }

    // Point-in-time snapshots, collected regardless of family.
    for (program, args, file) in [
        ("top", &["-b", "-n", "1"] as &[&str], "top.txt"),
        ("ps", &["fauxwww"], "ps.txt"),
        ("netstat", &["-plant"], "netstat.txt"),
    ] {
        if let Err(reason) = capture(ctx, program, args, "system", file) {
            misses.push(reason);
        }
    }

    super::result_from(misses)
}

/// Upstart has no single unit dump: list the jobs, then ask for each one's
/// status, then append the legacy sysvinit view.
fn upstart_jobs(ctx: &CollectCtx) -> Result<(), String> {
    let listing = ctx
        .runner
        .run("initctl", &["list"])
        .map_err(|_| "initctl is not available".to_string())?;
    if !listing.success() {
        return Err("initctl list failed".into());
    }

    let mut dump = String::new();
    for line in listing.stdout.lines() {
        let Some(job) = line.split_whitespace().next() else {
            continue;
        };
        dump.push_str(line);
        dump.push('\n');
        if let Ok(detail) = ctx.runner.run("initctl", &["status", job]) {
            dump.push_str(&detail.stdout);
        }
    }

    if let Ok(legacy) = ctx.runner.run("service", &["--status-all"]) {
        dump.push('\n');
        dump.push_str(&legacy.stdout);
        dump.push_str(&legacy.stderr);
    }

    ctx.tree
        .write("system", "services.txt", dump.as_bytes())
        .map_err(|e| format!("writing system/services.txt: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::testutil::{amazon, ctx, ubuntu14};
    use crate::runner::fake::FakeRunner;

    fn snapshots(runner: FakeRunner) -> FakeRunner {
        runner
            .with_output("top -b -n 1", "top - 10:00:00\n")
            .with_output("ps fauxwww", "root 1 init\n")
            .with_output("netstat -plant", "tcp 0 0 0.0.0.0:22 LISTEN\n")
    }

    #[test]
    fn systemd_family_dumps_units() {
        let dir = tempfile::tempdir().unwrap();
        let runner = snapshots(
            FakeRunner::new().with_output("systemctl list-units", "docker.service loaded\n"),
        );
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert_eq!(run(&ctx), StepResult::Ok);
        let services =
            std::fs::read_to_string(ctx.tree.root().join("system/services.txt")).unwrap();
        assert!(services.contains("docker.service"));
        assert!(ctx.tree.root().join("system/ps.txt").is_file());
        assert!(ctx.tree.root().join("system/netstat.txt").is_file());
    }

    #[test]
    fn upstart_family_lists_then_details() {
        let dir = tempfile::tempdir().unwrap();
        let runner = snapshots(
            FakeRunner::new()
                .with_output("initctl list", "docker start/running, process 901\nssh start/running, process 455\n")
                .with_output("initctl status docker", "docker start/running, process 901\n")
                .with_output("initctl status ssh", "ssh start/running, process 455\n")
                .with_output("service --status-all", " [ + ]  docker\n"),
        );
        let ctx = ctx(&runner, ubuntu14(), dir.path(), &dir.path().join("collect"));

        assert_eq!(run(&ctx), StepResult::Ok);
        let services =
            std::fs::read_to_string(ctx.tree.root().join("system/services.txt")).unwrap();
        assert!(services.contains("process 901"));
        assert!(services.contains("[ + ]  docker"));
        assert_eq!(runner.calls_matching("initctl status"), 2);
    }

    #[test]
    fn snapshots_still_collected_when_unit_dump_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner = snapshots(FakeRunner::new());
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert!(matches!(run(&ctx), StepResult::Warning(_)));
        assert!(ctx.tree.root().join("system/top.txt").is_file());
    }
}
