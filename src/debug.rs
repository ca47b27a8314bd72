use std::path::Path;

use crate::classify::{Family, OsClassification};
use crate::report::StepResult;
use crate::runner::CommandRunner;

/// Daemon options file carrying the debug flag.
const OPTIONS_FILE: &str = "etc/sysconfig/docker";
const DEBUG_FLAG: &str = "-D";

/// Enable verbose daemon logging and bounce the service.
///
/// Idempotent: an options file already carrying the flag is left untouched
/// and the daemon is not restarted.
pub fn enable(
    runner: &dyn CommandRunner,
    os: &OsClassification,
    host_root: &Path,
) -> StepResult {
    if os.family != Family::Amazon {
        return StepResult::warning("debug logging can only be toggled on amazon hosts");
    }

    let path = host_root.join(OPTIONS_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => {
            return StepResult::warning(format!("/{} not found", OPTIONS_FILE));
        }
    };

    if already_enabled(&content) {
        return StepResult::warning("debug logging is already enabled");
    }

    let mut updated = content;
    if !updated.ends_with('\n') && !updated.is_empty() {
        updated.push('\n');
    }
    updated.push_str(&format!("OPTIONS=\"${{OPTIONS}} {}\"\n", DEBUG_FLAG));

    if let Err(e) = std::fs::write(&path, updated) {
        return StepResult::Warning(format!("updating /{}: {}", OPTIONS_FILE, e));
    }

    match runner.run("service", &["docker", "restart"]) {
        Ok(out) if out.success() => StepResult::Ok,
        _ => StepResult::warning("debug flag written but the docker restart failed"),
    }
}

fn already_enabled(options: &str) -> bool {
    options
        .lines()
        .filter(|line| line.trim_start().starts_with("OPTIONS"))
        .any(|line| {
            line.split_whitespace()
                .any(|word| word.trim_matches('"') == DEBUG_FLAG)
        })
}
