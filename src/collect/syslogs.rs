use super::{capture, copy_by_prefix, CollectCtx};
use crate::report::StepResult;

/// Rotated general-purpose OS logs worth shipping with every bundle.
const LOG_PREFIXES: [&str; 3] = ["messages", "syslog", "cloud-init"];

/// Copy the common OS logs (rotations included) into `var_log/`.
pub fn var_log(ctx: &CollectCtx) -> StepResult {
    let src = ctx.host_path("/var/log");
    match copy_by_prefix(ctx, &src, &LOG_PREFIXES, "var_log") {
        Ok(0) => StepResult::warning("no matching files under /var/log"),
        Ok(_) => StepResult::Ok,
        Err(reason) => StepResult::Warning(reason),
    }
}

/// Kernel ring buffer snapshot.
pub fn kernel(ctx: &CollectCtx) -> StepResult {
    match capture(ctx, "dmesg", &[], "kernel", "dmesg.txt") {
        Ok(()) => StepResult::Ok,
        Err(reason) => StepResult::Warning(reason),
    }
}
