//! The cleanup pipeline: runs the dead-logic sweep, carry-chain analysis,
//! and (when enabled) reset elision over a [`Netlist`] in the fixed order
//! `spec.md` §5 requires, and returns a [`CleanupReport`] instead of
//! writing to process-wide counters.

use crate::arena::NodeId;
use crate::carry_chain::{calculate_addsub_statistics, CarryChainStats};
use crate::config::CleanupConfig;
use crate::detach::remove_unused_nodes;
use crate::errors::NetlistError;
use crate::netlist::Netlist;
use crate::reset::filter::exclude_inputs_driving_outputs;
use crate::reset::rewrite::rewrite_structural;
use crate::reset::simulate::{cross_check_reset, NodeEvaluator};
use crate::reset::{check_reset_per_latch, RejectionReason};
use crate::sweep::{identify_unused_nodes, mark_output_dependencies};

/// Everything the pipeline learned about one run, returned to the caller
/// rather than left in global counters (`spec.md` §9).
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// How many nodes the dead-logic sweep (§4.B/C) detached.
    pub removed_count: usize,
    pub carry_chain_stats: CarryChainStats,
    /// How many primary inputs are still classified `Candidate` after
    /// §4.E–F. Zero whenever `reset_elision` is disabled or no candidate
    /// survived.
    pub reset_candidate_count: u32,
    /// The input the structural rewrite (§4.G) applied, if exactly one
    /// candidate survived.
    pub accepted_reset: Option<NodeId>,
    pub rejections: Vec<(NodeId, RejectionReason)>,
    /// The simulator cross-check's polarity verdict (§4.H), if it ran.
    pub simulator_polarity: Option<bool>,
}

/// Runs the cleanup pipeline: §4.B (backward mark) → §4.B (forward sweep)
/// → §4.C (detach) → §4.D (carry chains) → — if `config.reset_elision` —
/// §4.E (candidate detection) → §4.F (output-cone filter) → §4.G
/// (structural rewrite) if exactly one candidate remains.
///
/// The optional `evaluator` is the simulator cross-check's (§4.H) opaque
/// per-node value computation; it only runs when both `evaluator` is
/// supplied and `config.simulator_crosscheck` is set. The textual rewrite
/// mode (§4.G) is not run here — it needs an externally supplied input
/// line stream, so callers invoke [`crate::reset::rewrite::rewrite_textual_file`]
/// themselves using `report.accepted_reset`.
pub fn run_cleanup(
    netlist: &mut Netlist,
    config: &CleanupConfig,
    evaluator: Option<&dyn NodeEvaluator>,
) -> Result<CleanupReport, NetlistError> {
    mark_output_dependencies(netlist);
    let sweep = identify_unused_nodes(netlist);
    remove_unused_nodes(netlist, &sweep.removal_list);
    let carry_chain_stats = calculate_addsub_statistics(netlist, &sweep.chain_heads);

    let mut report = CleanupReport {
        removed_count: sweep.removal_list.len(),
        carry_chain_stats,
        ..Default::default()
    };

    if !config.reset_elision {
        return Ok(report);
    }

    let mut registry = check_reset_per_latch(netlist, config.case2_variant);
    if registry.count() > 0 {
        exclude_inputs_driving_outputs(netlist, &mut registry);
    }
    report.reset_candidate_count = registry.count();
    report.rejections = registry.rejections().to_vec();

    if registry.count() == 1 {
        let candidate = registry.latest().expect("count == 1 implies a recorded candidate");
        report.accepted_reset = Some(candidate);

        if config.simulator_crosscheck {
            if let Some(evaluator) = evaluator {
                report.simulator_polarity = cross_check_reset(netlist, candidate, evaluator);
            }
        }

        rewrite_structural(netlist, candidate);
        tracing::info!(input = %netlist.node(candidate).name, "reset elision applied");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Case2Variant;
    use crate::netlist::builder::NetlistBuilder;
    use crate::netlist::node::BitValue::*;

    #[test]
    fn full_pipeline_removes_dead_logic_and_elides_reset() {
        let mut b = NetlistBuilder::new();
        let a = b.input("a");
        let bb = b.input("b");
        let g = b.generic("g_dead", &[bb], vec![vec![One]], true); // dead, no fanout
        let rst = b.input("rst");
        let d = b.input("d");
        let lut =
            b.generic("lut", &[rst, d], vec![vec![One, DontCare], vec![One, DontCare]], true);
        let ff = b.ff("q_ff", lut);
        let y = b.output("y");
        b.wire(ff, 0, y, 0);
        let _ = a;
        let mut nl = b.finish(vec![y]);

        let config = CleanupConfig {
            reset_elision: true,
            case2_variant: Case2Variant::IndependentFlags,
            ..Default::default()
        };

        let report = run_cleanup(&mut nl, &config, None).unwrap();

        assert_eq!(report.removed_count, 1); // g_dead
        assert!(nl.node(g).is_tagged(crate::netlist::VisitTag::Removed));
        assert_eq!(report.accepted_reset, Some(rst));
        assert!(report.rejections.is_empty());

        // the LUT's former rst pin now reads a constant, not `rst`.
        let lut_rst_pin = nl.node(lut).input_pins[0];
        let net_id = nl.pin(lut_rst_pin).net.unwrap();
        let driver_pin = nl.net(net_id).driver.unwrap();
        assert_ne!(nl.pin(driver_pin).node, rst);
    }
}
