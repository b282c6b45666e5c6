//! Reachability sweeper (component B, `spec.md` §4.B).
//!
//! Transliterates `examples/original_source/ODIN_II/SRC/netlist_cleanup.c`'s
//! `traverse_backward`/`traverse_forward` into safe, arena-indexed
//! recursion: tag-before-recurse breaks cycles through flip-flops exactly as
//! the original does, just without raw pointers.

use crate::arena::NodeId;
use crate::netlist::{Netlist, VisitTag};

/// The outcome of one reachability sweep: which nodes are dead, and which
/// `ADD`/`MINUS` nodes are carry-chain heads.
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    /// Nodes with no path to any primary output — safe to detach.
    pub removal_list: Vec<NodeId>,
    /// `ADD`/`MINUS` nodes whose carry-in is driven by `PAD` (chain heads
    /// for component D).
    pub chain_heads: Vec<NodeId>,
}

/// Backward sweep: tags every node reachable from a primary output with
/// [`VisitTag::Backward`] (`spec.md` §4.B).
pub fn mark_output_dependencies(netlist: &Netlist) {
    for &out in &netlist.top_outputs {
        traverse_backward(netlist, out);
    }
}

fn traverse_backward(netlist: &Netlist, node_id: NodeId) {
    let node = netlist.node(node_id);
    if node.is_tagged(VisitTag::Backward) {
        return;
    }
    node.tag(VisitTag::Backward);

    for i in 0..node.input_pins.len() {
        if let Some(driver) = netlist.input_driver_node(node_id, i) {
            traverse_backward(netlist, driver);
        }
    }
}

/// Forward sweep: starting from the constants and every top-level input,
/// tags the whole forward cone with [`VisitTag::Forward`], building the
/// removal list and the carry-chain head list (`spec.md` §4.B). Must run
/// after [`mark_output_dependencies`].
pub fn identify_unused_nodes(netlist: &Netlist) -> SweepResult {
    let mut result = SweepResult::default();

    traverse_forward(netlist, netlist.gnd, true, false, &mut result);
    traverse_forward(netlist, netlist.vcc, true, false, &mut result);
    traverse_forward(netlist, netlist.pad, true, false, &mut result);
    for &input in &netlist.top_inputs {
        traverse_forward(netlist, input, true, false, &mut result);
    }

    result
}

fn traverse_forward(
    netlist: &Netlist,
    node_id: NodeId,
    is_toplevel: bool,
    remove_me: bool,
    result: &mut SweepResult,
) {
    let node = netlist.node(node_id);
    if node.is_tagged(VisitTag::Forward) {
        return;
    }

    // Sticky: a non-source node never reached on the backward sweep is
    // dead, and so is everything downstream of it.
    let remove_me = remove_me || (!node.is_tagged(VisitTag::Backward) && !is_toplevel);

    node.tag(VisitTag::Forward);

    if remove_me {
        result.removal_list.push(node_id);
        tracing::debug!(node = %node.name, "marking node for removal");
    }

    if node.kind.is_add_or_minus() {
        let carry_in_index = node.input_pins.len().saturating_sub(1);
        if let Some(driver) = netlist.input_driver_node(node_id, carry_in_index) {
            if matches!(netlist.node(driver).kind, crate::netlist::NodeKind::Pad) {
                result.chain_heads.push(node_id);
                tracing::debug!(node = %node.name, "found carry-chain head");
            }
        }
    }

    for child in netlist.fanout_children(node_id) {
        if !netlist.node(child).is_tagged(VisitTag::Forward) {
            traverse_forward(netlist, child, false, remove_me, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::builder::NetlistBuilder;
    use crate::netlist::BitValue;

    /// S1: a dead cone (`h`) coexists with a live one (`g`); only `h` is
    /// marked for removal.
    #[test]
    fn s1_dead_cone_is_isolated_from_live_cone() {
        let mut b = NetlistBuilder::new();
        let a = b.input("a");
        let bb = b.input("b");
        let g = b.generic("g", &[a], vec![vec![BitValue::One]], true);
        let y = b.output("y");
        b.wire(g, 0, y, 0);
        let h = b.generic("h", &[bb], vec![vec![BitValue::One]], true);
        let nl = b.finish(vec![y]);

        mark_output_dependencies(&nl);
        let result = identify_unused_nodes(&nl);

        assert!(result.removal_list.contains(&h));
        assert!(!result.removal_list.contains(&g));
        assert!(!result.removal_list.contains(&a));
        assert!(!nl.node(h).is_tagged(VisitTag::Removed)); // detach hasn't run yet
        assert!(nl.node(g).is_tagged(VisitTag::Forward));
    }

    /// S2: a 3-deep PAD-initiated adder chain is detected with depth-walk
    /// material for component D (detected here as a single chain head).
    #[test]
    fn s2_pad_initiated_chain_head_is_detected() {
        let mut b = NetlistBuilder::new();
        let pad = b.pad();
        let add1 = b.adder("add1", pad);
        let add2 = b.adder("add2", add1);
        let add3 = b.adder("add3", add2);
        let y = b.output("y");
        b.wire(add3, 0, y, 0);
        let nl = b.finish(vec![y]);

        mark_output_dependencies(&nl);
        let result = identify_unused_nodes(&nl);

        assert_eq!(result.chain_heads, vec![add1]);
        assert!(result.removal_list.is_empty());
    }

    #[test]
    fn reachability_marks_only_nodes_with_a_path_to_an_output() {
        let mut b = NetlistBuilder::new();
        let a = b.input("a");
        let g = b.generic("g", &[a], vec![vec![BitValue::One]], true);
        let y = b.output("y");
        b.wire(g, 0, y, 0);
        let nl = b.finish(vec![y]);

        mark_output_dependencies(&nl);
        assert!(nl.node(y).is_tagged(VisitTag::Backward));
        assert!(nl.node(g).is_tagged(VisitTag::Backward));
        assert!(nl.node(a).is_tagged(VisitTag::Backward));
    }
}
