//! Reset-candidate detector (component E, `spec.md` §4.E) and its
//! supporting candidate bookkeeping.
//!
//! Transliterates
//! `examples/original_source/ODIN_II/SRC/netlist_reset_elision.c`'s
//! `check_reset_per_latch`/`traverse_check_reset_per_latch`/
//! `check_latch_driver`/`mark_input_as_reset`, reshaped into a
//! [`CandidateRegistry`] value instead of the original's process-wide
//! globals (`reset_candidate_count`, `reset_candidate_node`), per
//! `spec.md` §9.

pub mod filter;
pub mod rewrite;
pub mod simulate;

use crate::arena::NodeId;
use crate::config::Case2Variant;
use crate::netlist::node::{BitMapRow, BitValue, GenericData};
use crate::netlist::{Netlist, NodeKind, ResetCandidateState, VisitTag};

/// Why an input was permanently ruled out as a reset candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Two flip-flops demanded this input be tied to different inactive
    /// values.
    ValueCollision,
    /// The Case-2 bitmap pattern match was ambiguous (neither or both
    /// sub-tests passed).
    AmbiguousCase2,
    /// The input's fanout reaches a primary output through pure
    /// combinational logic (component F).
    ReachesOutput,
}

/// Per-run candidate bookkeeping: the global candidate count and the
/// single most-recently-marked candidate, as a value instead of the
/// original's `reset_candidate_count`/`reset_candidate_node` statics.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    count: u32,
    latest: Option<NodeId>,
    rejections: Vec<(NodeId, RejectionReason)>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of primary inputs currently classified as
    /// [`ResetCandidateState::Candidate`] (testable property 5).
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn latest(&self) -> Option<NodeId> {
        self.latest
    }

    pub fn rejections(&self) -> &[(NodeId, RejectionReason)] {
        &self.rejections
    }

    /// Promotes an `Unknown` input to `Candidate`, incrementing the count.
    /// A no-op if the input is already `Candidate` or `Rejected`.
    fn promote_to_candidate(&mut self, netlist: &mut Netlist, input_id: NodeId) {
        let data = netlist
            .node_mut(input_id)
            .kind
            .as_input_mut()
            .expect("promote_to_candidate called on a non-INPUT node");
        if data.reset_candidate == ResetCandidateState::Unknown {
            data.reset_candidate = ResetCandidateState::Candidate;
            self.count += 1;
        }
    }

    /// Records that `input_id` must be tied to its inactive value implied by
    /// `is_positive_reset` (`true` → tie to 0, `false` → tie to 1). Detects
    /// a collision against a previously recorded tie-value and rejects the
    /// input permanently if so, per `spec.md` §4.E/§7.2.
    fn mark_input_as_reset(&mut self, netlist: &mut Netlist, input_id: NodeId, is_positive_reset: bool) {
        let data = netlist
            .node_mut(input_id)
            .kind
            .as_input_mut()
            .expect("mark_input_as_reset called on a non-INPUT node");

        let collides = match (is_positive_reset, data.potential_reset_value) {
            (true, Some(true)) => true,
            (false, Some(false)) => true,
            _ => false,
        };

        if collides {
            if data.reset_candidate == ResetCandidateState::Candidate {
                self.count -= 1;
            }
            data.reset_candidate = ResetCandidateState::Rejected;
            self.rejections.push((input_id, RejectionReason::ValueCollision));
            tracing::info!(input = %netlist.node(input_id).name, "reset candidate rejected: tie-value collision");
        }

        let data = netlist.node_mut(input_id).kind.as_input_mut().unwrap();
        data.potential_reset_value = Some(!is_positive_reset);
        self.latest = Some(input_id);
    }

    /// Permanently rejects `input_id` (ambiguous Case-2 match, or —
    /// via component F — direct output reach).
    pub(crate) fn reject(&mut self, netlist: &mut Netlist, input_id: NodeId, reason: RejectionReason) {
        let data = netlist
            .node_mut(input_id)
            .kind
            .as_input_mut()
            .expect("reject called on a non-INPUT node");
        if data.reset_candidate == ResetCandidateState::Candidate {
            self.count -= 1;
        }
        data.reset_candidate = ResetCandidateState::Rejected;
        self.rejections.push((input_id, reason));
        tracing::info!(input = %netlist.node(input_id).name, ?reason, "reset candidate rejected");
    }
}

fn set_ff_derived_initial_value(netlist: &mut Netlist, ff_id: NodeId, value: bool) {
    if let Some(ff) = netlist.node_mut(ff_id).kind.as_ff_mut() {
        ff.derived_initial_value = value;
    }
}

/// Visits every output, and for each flip-flop reached, pattern-matches its
/// driver's bitmap against the reset input(s) it depends on (`spec.md`
/// §4.E). Populates and returns the resulting [`CandidateRegistry`].
pub fn check_reset_per_latch(netlist: &mut Netlist, variant: Case2Variant) -> CandidateRegistry {
    let mut registry = CandidateRegistry::new();
    let outputs = netlist.top_outputs.clone();
    for output in outputs {
        traverse_check_reset_per_latch(netlist, &mut registry, variant, output);
    }
    registry
}

fn traverse_check_reset_per_latch(
    netlist: &mut Netlist,
    registry: &mut CandidateRegistry,
    variant: Case2Variant,
    node_id: NodeId,
) {
    if netlist.node(node_id).is_tagged(VisitTag::CheckLatches) {
        return;
    }
    netlist.node(node_id).tag(VisitTag::CheckLatches);

    if netlist.node(node_id).kind.is_ff() {
        if let Some(driver) = netlist.input_driver_node(node_id, 0) {
            check_latch_driver(netlist, registry, variant, driver, node_id);
        }
    }

    let num_inputs = netlist.node(node_id).input_pins.len();
    for i in 0..num_inputs {
        if let Some(driver) = netlist.input_driver_node(node_id, i) {
            traverse_check_reset_per_latch(netlist, registry, variant, driver);
        }
    }
}

/// The two-case bitmap pattern match against `l_node`'s combinational
/// truth table, for every input pin driven directly by a non-rejected
/// primary `INPUT` (`spec.md` §4.E).
fn check_latch_driver(
    netlist: &mut Netlist,
    registry: &mut CandidateRegistry,
    variant: Case2Variant,
    l_node: NodeId,
    latch_node: NodeId,
) {
    let generic = match &netlist.node(l_node).kind {
        NodeKind::Generic(g) => g.clone(),
        _ => return,
    };
    let rows = generic.bit_map_line_count();
    if rows == 0 {
        return;
    }
    let num_inputs = netlist.node(l_node).input_pins.len();

    for i in 0..num_inputs {
        let Some(driver_id) = netlist.input_driver_node(l_node, i) else { continue };
        if !netlist.node(driver_id).kind.is_input() {
            continue;
        }
        if netlist.node(driver_id).kind.as_input().unwrap().reset_candidate
            == ResetCandidateState::Rejected
        {
            continue;
        }

        let mut is_0 = 0usize;
        let mut is_1 = 0usize;
        let mut last0 = None;
        let mut last1 = None;
        for (j, row) in generic.bit_map.iter().enumerate() {
            match row[i] {
                BitValue::Zero => {
                    is_0 += 1;
                    last0 = Some(j);
                },
                BitValue::One => {
                    is_1 += 1;
                    last1 = Some(j);
                },
                BitValue::DontCare => {},
            }
        }

        // CASE 1: the column is uniform across every row.
        if is_0 == rows || is_1 == rows {
            registry.promote_to_candidate(netlist, driver_id);
            let positive_reset = generic.bit_map[0][i] == BitValue::One;
            registry.mark_input_as_reset(netlist, driver_id, positive_reset);
            let derived = !generic.is_on_gate;
            set_ff_derived_initial_value(netlist, latch_node, derived);
            tracing::info!(
                input = %netlist.node(driver_id).name,
                latch = %netlist.node(latch_node).name,
                "reset candidate accepted (uniform column)"
            );
            return; // stop iterating this L's pins entirely, per spec.md §4.E.2
        }

        // CASE 2: an isolating singleton row.
        let outcome = match variant {
            Case2Variant::IndependentFlags => {
                case2_independent_flags(&generic, i, is_0, is_1, last0, last1)
            },
            Case2Variant::MergedTristate => {
                case2_merged_tristate(&generic, i, is_0, is_1, last0, last1, num_inputs)
            },
        };

        match outcome {
            Some(positive_reset) => {
                registry.promote_to_candidate(netlist, driver_id);
                registry.mark_input_as_reset(netlist, driver_id, positive_reset);
                let derived = generic.is_on_gate;
                set_ff_derived_initial_value(netlist, latch_node, derived);
                tracing::info!(
                    input = %netlist.node(driver_id).name,
                    latch = %netlist.node(latch_node).name,
                    "reset candidate accepted (isolating singleton)"
                );
            },
            None => {
                registry.reject(netlist, driver_id, RejectionReason::AmbiguousCase2);
            },
        }
    }
}

fn row_other_columns_all_dash(row: &BitMapRow, skip_col: usize) -> bool {
    row.iter().enumerate().all(|(j, v)| j == skip_col || *v == BitValue::DontCare)
}

/// The independent-flags Case-2 variant `spec.md` §4.E adopts as its clear,
/// primary rule: two independent sub-tests, accept iff exactly one passes.
fn case2_independent_flags(
    generic: &GenericData,
    col: usize,
    is_0: usize,
    is_1: usize,
    last0: Option<usize>,
    last1: Option<usize>,
) -> Option<bool> {
    let test0 =
        is_0 == 1 && last0.is_some_and(|row| row_other_columns_all_dash(&generic.bit_map[row], col));
    let test1 =
        is_1 == 1 && last1.is_some_and(|row| row_other_columns_all_dash(&generic.bit_map[row], col));

    match (test0, test1) {
        (true, false) => Some(false),
        (false, true) => Some(true),
        _ => None, // neither or both: reject (ambiguous)
    }
}

/// The upstream implementation's merged tri-state `case2reset` variant,
/// kept for bit-exact parity (`spec.md` §9). `case2reset` is 0 (fail), 1
/// (passed the zero-test, not yet finalized), or 2 (finalized positive
/// marker) exactly as in the source's literal algorithm.
///
/// The source's second dash-check loop bounds `j` by the row count
/// (`bit_map_line_count`) rather than the column count; that is followed
/// here only up to `num_input_pins` to avoid indexing past a row's actual
/// width, since the source assumes (without enforcing) that there are at
/// least as many rows as columns.
fn case2_merged_tristate(
    generic: &GenericData,
    col: usize,
    is_0: usize,
    is_1: usize,
    last0: Option<usize>,
    last1: Option<usize>,
    num_input_pins: usize,
) -> Option<bool> {
    let rows = generic.bit_map_line_count();
    let mut case2reset: i8 = 1;

    if is_0 == 1 && is_1 == rows.saturating_sub(1) {
        let row = last0.expect("is_0 == 1 implies last0 is set");
        for (j, v) in generic.bit_map[row].iter().enumerate() {
            if j != col && *v != BitValue::DontCare {
                case2reset = 0;
                break;
            }
        }
    }

    if rows == 2 {
        if case2reset == 0 {
            case2reset = 2;
        }
    } else if case2reset == 1 {
        case2reset = 2;
    }

    if case2reset != 0 && is_1 == 1 && is_0 == rows.saturating_sub(1) {
        let row = last1.expect("is_1 == 1 implies last1 is set");
        for j in 0..num_input_pins.min(generic.bit_map[row].len()) {
            if j != col && generic.bit_map[row][j] != BitValue::DontCare {
                case2reset = 0;
                break;
            }
        }
    }

    if case2reset == 0 { None } else { Some(case2reset == 2) }
}
