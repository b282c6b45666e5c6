//! Reset filter — output-cone exclusion (component F, `spec.md` §4.F).
//!
//! Transliterates `netlist_reset_elision.c`'s output-to-input descent:
//! inputs whose combinational fanout reaches a primary output directly
//! cannot be a pure reset signal, since removing them would change the
//! netlist's visible behavior on those outputs.

use crate::arena::NodeId;
use crate::netlist::{Netlist, ResetCandidateState, VisitTag};

use super::{CandidateRegistry, RejectionReason};

/// From each top-level output, descends via input-driver edges, rejecting
/// any candidate `INPUT` reached. Descent stops at flip-flops and
/// memories — they are the only legitimate boundary between a reset
/// input's combinational cone and the rest of the netlist. Must run after
/// [`super::check_reset_per_latch`] and before the rewriter (component G).
pub fn exclude_inputs_driving_outputs(netlist: &mut Netlist, registry: &mut CandidateRegistry) {
    let outputs = netlist.top_outputs.clone();
    for output in outputs {
        traverse_from_outputs(netlist, registry, output);
    }
}

fn traverse_from_outputs(netlist: &mut Netlist, registry: &mut CandidateRegistry, node_id: NodeId) {
    if netlist.node(node_id).is_tagged(VisitTag::OutToIn) {
        return;
    }
    netlist.node(node_id).tag(VisitTag::OutToIn);

    if netlist.node(node_id).kind.is_input() {
        let is_candidate = netlist.node(node_id).kind.as_input().unwrap().reset_candidate
            == ResetCandidateState::Candidate;
        if is_candidate {
            registry.reject(netlist, node_id, RejectionReason::ReachesOutput);
        }
        return;
    }

    if netlist.node(node_id).kind.is_ff() || netlist.node(node_id).kind.is_memory() {
        return;
    }

    let num_inputs = netlist.node(node_id).input_pins.len();
    for i in 0..num_inputs {
        if let Some(driver) = netlist.input_driver_node(node_id, i) {
            traverse_from_outputs(netlist, registry, driver);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Case2Variant;
    use crate::netlist::builder::NetlistBuilder;
    use crate::netlist::node::BitValue::*;
    use crate::reset::check_reset_per_latch;

    /// S6: `rst` drives an FF's reset-candidate position *and* fans out
    /// combinationally straight to a second output.
    #[test]
    fn s6_input_reaching_output_directly_is_rejected() {
        let mut b = NetlistBuilder::new();
        let rst = b.input("rst");
        let d = b.input("d");
        let lut = b.generic("lut", &[rst, d], vec![vec![One, DontCare], vec![One, DontCare]], true);
        let ff = b.ff("q_ff", lut);
        let y1 = b.output("y1");
        b.wire(ff, 0, y1, 0);

        let buf = b.generic("buf", &[rst], vec![vec![One]], true);
        let y2 = b.output("y2");
        b.wire(buf, 0, y2, 0);

        let mut nl = b.finish(vec![y1, y2]);

        let mut registry = check_reset_per_latch(&mut nl, Case2Variant::IndependentFlags);
        assert_eq!(registry.count(), 1);

        exclude_inputs_driving_outputs(&mut nl, &mut registry);

        assert_eq!(registry.count(), 0);
        assert_eq!(
            nl.node(rst).kind.as_input().unwrap().reset_candidate,
            ResetCandidateState::Rejected
        );
        assert!(registry
            .rejections()
            .iter()
            .any(|(n, r)| *n == rst && *r == RejectionReason::ReachesOutput));
    }

    #[test]
    fn descent_stops_at_flip_flop() {
        let mut b = NetlistBuilder::new();
        let rst = b.input("rst");
        let d = b.input("d");
        let lut = b.generic("lut", &[rst, d], vec![vec![One, DontCare], vec![One, DontCare]], true);
        let ff = b.ff("q_ff", lut);
        let y = b.output("y");
        b.wire(ff, 0, y, 0);
        let mut nl = b.finish(vec![y]);

        let mut registry = check_reset_per_latch(&mut nl, Case2Variant::IndependentFlags);
        exclude_inputs_driving_outputs(&mut nl, &mut registry);

        assert_eq!(registry.count(), 1);
        assert_eq!(
            nl.node(rst).kind.as_input().unwrap().reset_candidate,
            ResetCandidateState::Candidate
        );
    }
}
