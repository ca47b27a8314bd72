use super::{capture, CollectCtx};
use crate::report::StepResult;

/// Filter and nat table dumps with packet/byte counters, numeric addressing.
pub fn run(ctx: &CollectCtx) -> StepResult {
    let mut misses = Vec::new();

    for (table, file) in [("filter", "iptables-filter.txt"), ("nat", "iptables-nat.txt")] {
        if let Err(reason) = capture(ctx, "iptables", &["-nvL", "-t", table], "system", file) {
            misses.push(reason);
        }
    }

    super::result_from(misses)
}
