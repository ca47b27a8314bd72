use super::{capture, CollectCtx};
use crate::report::StepResult;

/// Used-capacity percentage above which a filesystem is called out before the
/// copy-heavy steps run.
const USAGE_WARN_PERCENT: u8 = 70;

/// Pre-flight disk-space check. Informational only; never blocks collection.
pub fn check_space(ctx: &CollectCtx) -> StepResult {
    let output = match ctx.runner.run("df", &["-k"]) {
        Ok(out) if out.success() => out,
        _ => return StepResult::warning("df is not available"),
    };

    let crowded = filesystems_over(&output.stdout, USAGE_WARN_PERCENT);
    if crowded.is_empty() {
        StepResult::Ok
    } else {
        StepResult::Warning(format!(
            "low disk space on {}",
            crowded.join(", ")
        ))
    }
}

/// Mount table, human-readable usage, and the lvm listings when the lvm
/// tooling is installed.
pub fn run(ctx: &CollectCtx) -> StepResult {
    let mut misses = Vec::new();

    if let Err(reason) = capture(ctx, "mount", &[], "system", "mounts.txt") {
        misses.push(reason);
    }
    if let Err(reason) = capture(ctx, "df", &["-h"], "system", "df.txt") {
        misses.push(reason);
    }

    if ctx.runner.which("lvdisplay").is_some() {
        for (program, file) in [
            ("lvdisplay", "lvm-lvdisplay.txt"),
            ("pvdisplay", "lvm-pvdisplay.txt"),
            ("vgdisplay", "lvm-vgdisplay.txt"),
        ] {
            if let Err(reason) = capture(ctx, program, &[], "system", file) {
                misses.push(reason);
            }
        }
    }

    super::result_from(misses)
}

/// Mounted filesystems strictly above `threshold` percent used, by device
/// name, in `df -k` order.
fn filesystems_over(df_output: &str, threshold: u8) -> Vec<String> {
    let mut over = Vec::new();
    for line in df_output.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 6 {
            continue;
        }
        let Some(pct) = parts[4].strip_suffix('%').and_then(|p| p.parse::<u8>().ok()) else {
            continue;
        };
        if pct > threshold {
            over.push(parts[0].to_string());
        }
    }
    over
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::testutil::{amazon, ctx};
    use crate::runner::fake::FakeRunner;

    fn df_line(device: &str, pct: u8) -> String {
        format!("{} 10000 5000 5000 {}% /mnt/{}\n", device, pct, device)
    }

    #[test]
    fn threshold_is_strictly_above_seventy() {
        let header = "Filesystem 1K-blocks Used Available Use% Mounted on\n";
        let at_69 = format!("{}{}", header, df_line("/dev/xvda1", 69));
        let at_70 = format!("{}{}", header, df_line("/dev/xvda1", 70));
        let at_71 = format!("{}{}", header, df_line("/dev/xvda1", 71));

        assert!(filesystems_over(&at_69, USAGE_WARN_PERCENT).is_empty());
        assert!(filesystems_over(&at_70, USAGE_WARN_PERCENT).is_empty());
        assert_eq!(
            filesystems_over(&at_71, USAGE_WARN_PERCENT),
            vec!["/dev/xvda1".to_string()]
        );
    }

    #[test]
    fn warning_names_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let df = format!(
            "Filesystem 1K-blocks Used Available Use% Mounted on\n{}",
            df_line("/dev/xvdb", 91)
        );
        let runner = FakeRunner::new().with_output("df -k", &df);
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        match check_space(&ctx) {
            StepResult::Warning(reason) => assert!(reason.contains("/dev/xvdb")),
            other => panic!("expected a warning, got {:?}", other),
        }
    }

    #[test]
    fn lvm_listings_only_when_tool_present() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new()
            .with_output("mount", "/dev/xvda1 on / type ext4\n")
            .with_output("df -h", "Filesystem Size Used Avail Use% Mounted on\n");
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert_eq!(run(&ctx), StepResult::Ok);
        assert!(ctx.tree.root().join("system/mounts.txt").is_file());
        assert!(!ctx.tree.root().join("system/lvm-lvdisplay.txt").exists());
    }

    #[test]
    fn lvm_listings_when_tool_present() {
        let dir = tempfile::tempdir().unwrap();
        let runner = FakeRunner::new()
            .with_output("mount", "/dev/xvda1 on / type ext4\n")
            .with_output("df -h", "Filesystem Size Used Avail Use% Mounted on\n")
            .with_tool("lvdisplay")
            .with_output("lvdisplay", "--- Logical volume ---\n")
            .with_output("pvdisplay", "--- Physical volume ---\n")
            .with_output("vgdisplay", "--- Volume group ---\n");
        let ctx = ctx(&runner, amazon(), dir.path(), &dir.path().join("collect"));

        assert_eq!(run(&ctx), StepResult::Ok);
        assert!(ctx.tree.root().join("system/lvm-lvdisplay.txt").is_file());
        assert!(ctx.tree.root().join("system/lvm-vgdisplay.txt").is_file());
    }
}
