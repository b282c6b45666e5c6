//! Detacher (component C, `spec.md` §4.C).
//!
//! Transliterates `netlist_cleanup.c::remove_unused_nodes`: nulls each
//! removed node's fanin slot on its driving net, then tags the node
//! `REMOVED`. Nodes and pins are never freed — `REMOVED` is later used by
//! the carry-chain analyzer (component D) as a walk terminator.

use crate::arena::NodeId;
use crate::netlist::{Netlist, VisitTag};

/// Detaches every node in `removal_list` from its upstream nets and tags it
/// [`VisitTag::Removed`]. Must run after the forward sweep (component B)
/// and before the carry-chain analyzer (component D).
pub fn remove_unused_nodes(netlist: &mut Netlist, removal_list: &[NodeId]) {
    for &node_id in removal_list {
        let input_pins = netlist.node(node_id).input_pins.clone();
        for pin_id in input_pins {
            let pin = netlist.pin(pin_id);
            let (net_id, idx) = match (pin.net, pin.pin_net_idx) {
                (Some(net_id), Some(idx)) => (net_id, idx),
                _ => continue, // undriven pin: nothing to detach
            };
            let net = netlist.net_mut(net_id);
            if idx < net.fanout.len() {
                net.fanout[idx] = None;
            }
        }
        netlist.node(node_id).tag(VisitTag::Removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::builder::NetlistBuilder;
    use crate::netlist::BitValue;
    use crate::sweep::{identify_unused_nodes, mark_output_dependencies};

    #[test]
    fn detach_nulls_fanout_slot_and_tags_removed() {
        let mut b = NetlistBuilder::new();
        let bb = b.input("b");
        let h = b.generic("h", &[bb], vec![vec![BitValue::One]], true);
        let y = b.output("y"); // unrelated live output so h really is dead
        let a = b.input("a");
        let g = b.generic("g", &[a], vec![vec![BitValue::One]], true);
        b.wire(g, 0, y, 0);
        let mut nl = b.finish(vec![y]);

        mark_output_dependencies(&nl);
        let result = identify_unused_nodes(&nl);
        assert!(result.removal_list.contains(&h));

        remove_unused_nodes(&mut nl, &result.removal_list);

        assert!(nl.node(h).is_tagged(crate::netlist::VisitTag::Removed));
        // h's input pin's driving net no longer lists h's pin in its fanout.
        let h_input_pin = nl.node(h).input_pins[0];
        let net_id = nl.pin(h_input_pin).net.unwrap();
        let idx = nl.pin(h_input_pin).pin_net_idx.unwrap();
        assert!(nl.net(net_id).fanout[idx].is_none());
    }
}
