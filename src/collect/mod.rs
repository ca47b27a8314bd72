//! Capability adapters — one module per external data source.
//!
//! Every adapter is `fn run(&CollectCtx) -> StepResult`, is safe to rerun,
//! creates its output subdirectory lazily, and degrades to a warning when a
//! tool is missing or the OS family does not apply. The collected data is
//! written verbatim; nothing here interprets it.

pub mod agent;
pub mod disks;
pub mod docker;
pub mod firewall;
pub mod pkglist;
pub mod selinux;
pub mod services;
pub mod syslogs;

use std::path::{Path, PathBuf};

use crate::bundle::OutputTree;
use crate::classify::OsClassification;
use crate::report::StepResult;
use crate::runner::CommandRunner;

/// Everything a collection step is allowed to see.
pub struct CollectCtx<'a> {
    pub runner: &'a dyn CommandRunner,
    pub os: OsClassification,
    /// Host filesystem root; `/` in production, a tempdir in tests.
    pub host_root: PathBuf,
    pub tree: OutputTree,
}

impl CollectCtx<'_> {
    /// Resolve an absolute host path against the injected root.
    pub fn host_path(&self, rel: &str) -> PathBuf {
        self.host_root.join(rel.trim_start_matches('/'))
    }
}

/// Run a tool and write its stdout under `subdir/file`. Any expected miss
/// (tool absent, non-zero exit) comes back as a warning reason.
pub(crate) fn capture(
    ctx: &CollectCtx,
    program: &str,
    args: &[&str],
    subdir: &str,
    file: &str,
) -> Result<(), String> {
    let output = ctx
        .runner
        .run(program, args)
        .map_err(|_| format!("{} is not available", program))?;

    if !output.success() {
        return Err(format!(
            "{} exited with status {}",
            program,
            output
                .status
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".into())
        ));
    }

    ctx.tree
        .write(subdir, file, output.stdout.as_bytes())
        .map_err(|e| format!("writing {}/{}: {}", subdir, file, e))?;
    Ok(())
}

/// Copy every file in `src_dir` whose name starts with one of `prefixes`
/// into `subdir/` of the tree. Returns how many files were copied.
pub(crate) fn copy_by_prefix(
    ctx: &CollectCtx,
    src_dir: &Path,
    prefixes: &[&str],
    subdir: &str,
) -> Result<usize, String> {
    let entries = match std::fs::read_dir(src_dir) {
        Ok(entries) => entries,
        Err(_) => return Err(format!("cannot read {}", src_dir.display())),
    };

    let mut copied = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if prefixes.iter().any(|p| name.starts_with(p)) {
            ctx.tree
                .copy_in(subdir, &path)
                .map_err(|e| format!("copying {}: {}", path.display(), e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Fold a list of per-item failure reasons into one step result.
pub(crate) fn result_from(misses: Vec<String>) -> StepResult {
    if misses.is_empty() {
        StepResult::Ok
    } else {
        StepResult::Warning(misses.join("; "))
    }
}
