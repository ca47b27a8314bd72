use super::{docker::journal_window, CollectCtx};
use crate::classify::Family;
use crate::report::StepResult;

/// Cluster-agent unit definitions and kubeconfig, copied verbatim.
const AGENT_FILES: [&str; 3] = [
    "etc/systemd/system/kubelet.service",
    "etc/systemd/system/kube-proxy.service",
    "var/lib/kubelet/kubeconfig",
];

const AGENT_UNITS: [&str; 2] = ["kubelet", "kube-proxy"];

/// Cluster-agent logs and config. Amazon hosts only; everywhere else the
/// agent is not managed by this collector.
pub fn run(ctx: &CollectCtx) -> StepResult {
    if ctx.os.family != Family::Amazon {
        return StepResult::warning("cluster-agent artifacts are only collected on amazon hosts");
    }

    let mut misses = Vec::new();

    for rel in AGENT_FILES {
        let source = ctx.host_root.join(rel);
        if !source.is_file() {
            misses.push(format!("/{} not found", rel));
            continue;
        }
        if let Err(e) = ctx.tree.copy_in("eks", &source) {
            misses.push(format!("copying /{}: {}", rel, e));
        }
    }

    if ctx.runner.which("journalctl").is_some() {
        for unit in AGENT_UNITS {
            if let Err(reason) = journal_window(ctx, unit, "eks", &format!("{}.log", unit)) {
                misses.push(reason);
            }
        }
    }

    super::result_from(misses)
}
