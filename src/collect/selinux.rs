use super::CollectCtx;
use crate::classify::PackageType;
use crate::report::StepResult;

/// Enforcement mode, rpm platforms only. When the query tool is missing or
/// silent, nothing is written.
pub fn run(ctx: &CollectCtx) -> StepResult {
    if ctx.os.package_type != PackageType::Rpm {
        return StepResult::warning("selinux is only collected on rpm platforms");
    }

    if ctx.runner.which("getenforce").is_none() {
        return StepResult::warning("selinux not installed");
    }

    let mode = match ctx.runner.run("getenforce", &[]) {
        Ok(out) if out.success() && !out.stdout.trim().is_empty() => out.stdout,
        _ => return StepResult::warning("selinux not installed"),
    };

    match ctx.tree.write("system", "selinux.txt", mode.as_bytes()) {
        Ok(_) => StepResult::Ok,
        Err(e) => StepResult::Warning(format!("writing system/selinux.txt: {}", e)),
    }
}
