mod archive;
mod bundle;
mod classify;
mod collect;
mod debug;
mod error;
mod identity;
mod orchestrator;
mod report;
mod runner;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::bundle::OutputTree;
use crate::classify::OsClassification;
use crate::collect::CollectCtx;
use crate::error::FatalError;
use crate::report::{RunReport, StepResult};
use crate::runner::{CommandRunner, SystemRunner};

const BUNDLE_DIR: &str = "collect";
const ARCHIVE_FILE: &str = "collect.tgz";

#[derive(Parser)]
#[command(
    name = "nodebrief",
    version,
    about = "Collect a diagnostic bundle from a container runtime host"
)]
struct Cli {
    /// brief: collect and archive; debug: collect, enable daemon debug
    /// logging, archive; debug-only: toggle debug logging and stop
    #[arg(long, value_enum, default_value = "brief")]
    mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Brief,
    Debug,
    DebugOnly,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            e.print().ok();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let euid = unsafe { libc::geteuid() };
    if let Err(err) = run(cli.mode, euid, Path::new(".")) {
        eprintln!("{} {:#}", "xx".red().bold(), err);
        std::process::exit(1);
    }
}

fn run(mode: Mode, euid: libc::uid_t, out_dir: &Path) -> Result<()> {
    // Precondition gate: nothing is written before this check passes.
    if euid != 0 {
        bail!(FatalError::NotRoot);
    }

    let runner = SystemRunner;
    let os = classify::classify(&runner, Path::new("/"))?;
    info!(family = %os.family, arch = %os.arch, "host classified");
    println!(
        "{} host classified as {} ({})",
        "::".blue().bold(),
        os.family,
        os.arch
    );

    match mode {
        Mode::DebugOnly => {
            let mut report = RunReport::new();
            report.record("debug toggle", debug::enable(&runner, &os, Path::new("/")));
            report.render_summary();
            Ok(())
        }
        Mode::Brief | Mode::Debug => {
            collect_and_archive(&runner, os, mode == Mode::Debug, out_dir)
        }
    }
}

fn collect_and_archive(
    runner: &dyn CommandRunner,
    os: OsClassification,
    toggle_debug: bool,
    out_dir: &Path,
) -> Result<()> {
    let bundle_dir = out_dir.join(BUNDLE_DIR);
    let archive_path = out_dir.join(ARCHIVE_FILE);
    bundle::reset(&bundle_dir, &archive_path)?;

    let mut report = RunReport::new();

    // Best-effort identity tag; a miss only costs the namespaced directory.
    let tree = match identity::resolve(identity::RESOLVE_TIMEOUT) {
        Some(id) => {
            report.record("host identity", StepResult::Ok);
            let tree = OutputTree::new(bundle_dir.join(&id));
            tree.write("system", "instance-id.txt", id.as_bytes())?;
            tree
        }
        None => {
            report.record(
                "host identity",
                StepResult::warning("instance metadata unavailable, bundle is not namespaced"),
            );
            OutputTree::new(&bundle_dir)
        }
    };

    let ctx = CollectCtx {
        runner,
        os,
        host_root: PathBuf::from("/"),
        tree,
    };

    let pipeline = orchestrator::run_pipeline(&ctx, &orchestrator::brief_steps(), &mut report);

    if toggle_debug && pipeline.is_ok() {
        report.record("debug toggle", debug::enable(runner, &os, Path::new("/")));
    }

    persist_report(&ctx.tree, &report)?;

    match pipeline {
        Ok(()) => {
            archive::pack(&bundle_dir, &archive_path)?;
            report.render_summary();
            println!(
                "{} bundle written to {}",
                "ok".green().bold(),
                archive_path.display()
            );
            Ok(())
        }
        Err(err) => {
            // No archive after a fatal; the partial tree stays on disk for
            // manual inspection.
            report.render_summary();
            println!(
                "{} partial bundle left at {}",
                "!!".yellow().bold(),
                bundle_dir.display()
            );
            Err(err)
        }
    }
}

/// Write the machine-readable step log into the bundle. A serialization
/// failure costs only the report file and is narrated, never swallowed.
fn persist_report(tree: &OutputTree, report: &RunReport) -> Result<()> {
    match report.to_json() {
        Ok(json) => {
            tree.write_root("run-report.json", json.as_bytes())?;
        }
        Err(e) => {
            println!(
                "{} run report could not be serialized: {}",
                "!!".yellow().bold(),
                e
            );
        }
    }
    Ok(())
}
