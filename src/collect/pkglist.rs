use super::{capture, CollectCtx};
use crate::classify::PackageType;
use crate::report::StepResult;

/// Installed-package inventory, one line per package.
pub fn run(ctx: &CollectCtx) -> StepResult {
    let outcome = match ctx.os.package_type {
        PackageType::Rpm => capture(ctx, "rpm", &["-qa"], "system", "pkglist.txt"),
        PackageType::Deb => capture(ctx, "dpkg", &["--list"], "system", "pkglist.txt"),
    };

    match outcome {
        Ok(()) => StepResult::Ok,
        Err(reason) => StepResult::Warning(reason),
    }
}
