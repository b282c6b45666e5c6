//! Reset simulator cross-check (component H, `spec.md` §4.H).
//!
//! A cooperative event-driven simulator, gated independently of the
//! structural reset-elision pipeline (§9: "the two methods disagree on
//! corner cases; they should not share candidate state"). The per-node
//! value computation itself is an opaque collaborator — this module only
//! owns the FIFO scheduling, the per-node-per-cycle history, and the
//! four-combination pattern match.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::arena::NodeId;
use crate::netlist::Netlist;

/// Computes a node's value at a given cycle. Left abstract: real Boolean
/// evaluation of gates belongs to the netlist's own simulator, not this
/// crate (`spec.md` §4.H calls this "opaque, provided by the
/// collaborator").
pub trait NodeEvaluator {
    fn compute(&self, netlist: &Netlist, node_id: NodeId, cycle: u32, history: &PinHistory) -> Option<bool>;
}

/// Per-node, per-cycle value history. `None` is the simulator's `-1`
/// (undefined) value.
#[derive(Debug, Clone, Default)]
pub struct PinHistory {
    values: HashMap<(NodeId, u32), Option<bool>>,
}

impl PinHistory {
    pub fn get(&self, node_id: NodeId, cycle: u32) -> Option<bool> {
        self.values.get(&(node_id, cycle)).copied().flatten()
    }

    fn set(&mut self, node_id: NodeId, cycle: u32, value: Option<bool>) {
        self.values.insert((node_id, cycle), value);
    }

    /// `reinitialize_simulation`: clears every recorded value so an
    /// unrelated run can reuse the same history object.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Runs one cycle of the cooperative simulation: seeds every primary
/// input (the candidate gets `rst_value`, everything else stays
/// undefined), enqueues the three constants, then drains the FIFO,
/// letting `evaluator` compute each non-input node's value and
/// propagating through fanout (`spec.md` §4.H steps 1-3).
pub fn run_cycle(
    netlist: &Netlist,
    candidate: NodeId,
    rst_value: bool,
    cycle: u32,
    history: &mut PinHistory,
    evaluator: &dyn NodeEvaluator,
) {
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    let mut in_queue: HashSet<NodeId> = HashSet::new();
    let mut completed: HashSet<NodeId> = HashSet::new();

    for &input in &netlist.top_inputs {
        let value = if input == candidate { Some(rst_value) } else { None };
        history.set(input, cycle, value);
        queue.push_back(input);
        in_queue.insert(input);
    }
    for &constant in &[netlist.gnd, netlist.vcc, netlist.pad] {
        if in_queue.insert(constant) {
            queue.push_back(constant);
        }
    }

    while let Some(node_id) = queue.pop_front() {
        in_queue.remove(&node_id);
        if completed.insert(node_id) && !netlist.top_inputs.contains(&node_id) {
            let value = evaluator.compute(netlist, node_id, cycle, history);
            history.set(node_id, cycle, value);
        }

        for child in netlist.fanout_children(node_id) {
            if !in_queue.contains(&child) && !completed.contains(&child) {
                in_queue.insert(child);
                queue.push_back(child);
            }
        }
    }
}

/// Whether every flip-flop's output at `cycle` is defined, undefined, or a
/// mix of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfObservation {
    AllDefined,
    AllUndefined,
    Mixed,
}

pub fn observe_ffs(netlist: &Netlist, history: &PinHistory, cycle: u32) -> FfObservation {
    let mut any_defined = false;
    let mut any_undefined = false;
    for &ff in &netlist.top_ffs {
        match history.get(ff, cycle) {
            Some(_) => any_defined = true,
            None => any_undefined = true,
        }
    }
    match (any_defined, any_undefined) {
        (true, true) => FfObservation::Mixed,
        (true, false) => FfObservation::AllDefined,
        _ => FfObservation::AllUndefined,
    }
}

/// Runs both cycles for one fixed `rst_value`, sharing one [`PinHistory`]
/// across them (cycle 1 needs cycle 0's values), and returns
/// `(cycle_zero_observation, cycle_one_observation)`.
fn run_both_cycles(
    netlist: &Netlist,
    candidate: NodeId,
    rst_value: bool,
    evaluator: &dyn NodeEvaluator,
) -> (FfObservation, FfObservation) {
    let mut history = PinHistory::default();
    run_cycle(netlist, candidate, rst_value, 0, &mut history, evaluator);
    let cycle_zero = observe_ffs(netlist, &history, 0);
    run_cycle(netlist, candidate, rst_value, 1, &mut history, evaluator);
    let cycle_one = observe_ffs(netlist, &history, 1);
    (cycle_zero, cycle_one)
}

/// Runs the four `(cycle, rst_value)` combinations and matches the
/// resulting `(up_zero, up_one, down_zero, down_one)` pattern against the
/// two recognized reset signatures, where `up`/`down` select `rst_value`
/// (up = 1, down = 0) and `_zero`/`_one` select the cycle (zero = cycle 0,
/// one = cycle 1) — `up_zero = simulate(cycle=0, rst_value=1)`, `down_one
/// = simulate(cycle=1, rst_value=0)`, matching `netlist_cleanup.c`'s
/// `convert_reset_to_init`. `Some(true)` is a positive-polarity reset,
/// `Some(false)` a negative-polarity one, `None` inconclusive.
pub fn cross_check_reset(
    netlist: &Netlist,
    candidate: NodeId,
    evaluator: &dyn NodeEvaluator,
) -> Option<bool> {
    use FfObservation::{AllDefined as D, AllUndefined as U};

    let (up_zero, up_one) = run_both_cycles(netlist, candidate, true, evaluator);
    let (down_zero, down_one) = run_both_cycles(netlist, candidate, false, evaluator);

    match (up_zero, up_one, down_zero, down_one) {
        (D, D, D, U) => Some(true),
        (U, D, D, D) => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::builder::NetlistBuilder;
    use crate::netlist::node::BitValue::*;
    use crate::netlist::NodeKind;

    /// A test-only evaluator: constants take their fixed value, `Output`
    /// and single-input `Generic` nodes pass their input through
    /// unchanged within the cycle, and a flip-flop's value is its D
    /// input's value one cycle earlier (undefined at cycle 0, since
    /// there is no cycle -1 history to latch).
    struct PassthroughEvaluator;

    impl NodeEvaluator for PassthroughEvaluator {
        fn compute(&self, netlist: &Netlist, node_id: NodeId, cycle: u32, history: &PinHistory) -> Option<bool> {
            match &netlist.node(node_id).kind {
                NodeKind::Gnd => Some(false),
                NodeKind::Vcc => Some(true),
                NodeKind::Pad | NodeKind::Clock => None,
                NodeKind::Ff(_) => {
                    if cycle == 0 {
                        None
                    } else {
                        netlist
                            .input_driver_node(node_id, 0)
                            .and_then(|d| history.get(d, cycle - 1))
                    }
                },
                NodeKind::Output | NodeKind::Generic(_) => {
                    netlist.input_driver_node(node_id, 0).and_then(|d| history.get(d, cycle))
                },
                _ => None,
            }
        }
    }

    #[test]
    fn ff_stays_undefined_at_cycle_zero_and_latches_at_cycle_one() {
        let mut b = NetlistBuilder::new();
        let rst = b.input("rst");
        let buf = b.generic("buf", &[rst], vec![vec![One]], true);
        let ff = b.ff("q", buf);
        let y = b.output("y");
        b.wire(ff, 0, y, 0);
        let nl = b.finish(vec![y]);

        let mut history = PinHistory::default();
        let evaluator = PassthroughEvaluator;
        run_cycle(&nl, rst, true, 0, &mut history, &evaluator);
        assert_eq!(history.get(ff, 0), None);
        assert_eq!(observe_ffs(&nl, &history, 0), FfObservation::AllUndefined);

        run_cycle(&nl, rst, true, 1, &mut history, &evaluator);
        assert_eq!(history.get(ff, 1), Some(true));
        assert_eq!(observe_ffs(&nl, &history, 1), FfObservation::AllDefined);
    }

    #[test]
    fn clearing_history_drops_prior_cycles() {
        let mut b = NetlistBuilder::new();
        let rst = b.input("rst");
        let buf = b.generic("buf", &[rst], vec![vec![One]], true);
        let ff = b.ff("q", buf);
        let y = b.output("y");
        b.wire(ff, 0, y, 0);
        let nl = b.finish(vec![y]);

        let mut history = PinHistory::default();
        let evaluator = PassthroughEvaluator;
        run_cycle(&nl, rst, true, 0, &mut history, &evaluator);
        run_cycle(&nl, rst, true, 1, &mut history, &evaluator);
        assert!(history.get(ff, 1).is_some());

        history.clear();
        assert_eq!(history.get(ff, 1), None);
    }

    /// A flip-flop that is always undefined at cycle 0 regardless of
    /// `rst_value` does not match either recognized reset signature.
    #[test]
    fn non_matching_pattern_is_inconclusive() {
        let mut b = NetlistBuilder::new();
        let rst = b.input("rst");
        let buf = b.generic("buf", &[rst], vec![vec![One]], true);
        let ff = b.ff("q", buf);
        let y = b.output("y");
        b.wire(ff, 0, y, 0);
        let nl = b.finish(vec![y]);

        let evaluator = PassthroughEvaluator;
        assert_eq!(cross_check_reset(&nl, rst, &evaluator), None);
    }
}
