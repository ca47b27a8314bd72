use anyhow::{bail, Result};

use crate::collect::{self, CollectCtx};
use crate::report::{RunReport, StepResult};

/// One named collection step. Steps never see each other's output; the only
/// shared input is the classification inside the context.
pub struct CollectionStep {
    pub name: &'static str,
    pub run: fn(&CollectCtx) -> StepResult,
}

/// The fixed `brief` pipeline. Ordering is deliberate: the disk-space check
/// runs before anything copies data, the package list before the service
/// dump, and the runtime inventory before anything touches the daemon's own
/// logs.
pub fn brief_steps() -> Vec<CollectionStep> {
    vec![
        CollectionStep { name: "disk space check", run: collect::disks::check_space },
        CollectionStep { name: "os logs", run: collect::syslogs::var_log },
        CollectionStep { name: "kernel log", run: collect::syslogs::kernel },
        CollectionStep { name: "mounts and volumes", run: collect::disks::run },
        CollectionStep { name: "selinux status", run: collect::selinux::run },
        CollectionStep { name: "firewall rules", run: collect::firewall::run },
        CollectionStep { name: "package list", run: collect::pkglist::run },
        CollectionStep { name: "service list", run: collect::services::run },
        CollectionStep { name: "docker inventory", run: collect::docker::inventory },
        CollectionStep { name: "cluster-agent artifacts", run: collect::agent::run },
        CollectionStep { name: "container inspect", run: collect::docker::inspect_containers },
        CollectionStep { name: "docker logs", run: collect::docker::logs },
    ]
}

/// Run every step exactly once, in order, recording each result. A warning
/// never halts the pipeline; the first fatal aborts it.
pub fn run_pipeline(
    ctx: &CollectCtx,
    steps: &[CollectionStep],
    report: &mut RunReport,
) -> Result<()> {
    for step in steps {
        let result = (step.run)(ctx);
        let fatal = result.is_fatal();
        report.record(step.name, result);
        if fatal {
            bail!("collection aborted during step '{}'", step.name);
        }
    }
    Ok(())
}
