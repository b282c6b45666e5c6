//! The graph model: [`Netlist`] owns every [`Node`], [`Net`], and [`Pin`] in
//! dense arenas and hands out typed ids rather than references, per
//! `spec.md` §9's arena-ownership recommendation.

pub mod node;

#[cfg(any(test, feature = "testing"))]
pub mod builder;

use crate::arena::{IndexVec, NetId, NodeId, PinId};
pub use node::{
    BitMapRow, BitValue, FfData, GenericData, InputData, Net, Node, NodeKind, Pin, PinRole,
    ResetCandidateState, VisitTag,
};

/// The owning root of a gate-level netlist (`spec.md` §3).
///
/// Constructed by an upstream elaborator (out of scope for this crate) and
/// handed to the cleanup/reset-elision pipeline, which mutates it in place
/// and never frees nodes.
#[derive(Debug, Clone)]
pub struct Netlist {
    nodes: IndexVec<NodeId, Node>,
    nets: IndexVec<NetId, Net>,
    pins: IndexVec<PinId, Pin>,
    pub top_inputs: Vec<NodeId>,
    pub top_outputs: Vec<NodeId>,
    pub top_ffs: Vec<NodeId>,
    pub gnd: NodeId,
    pub vcc: NodeId,
    pub pad: NodeId,
}

impl Netlist {
    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(id).expect("NodeId must be valid for its owning Netlist")
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id).expect("NodeId must be valid for its owning Netlist")
    }

    pub fn net(&self, id: NetId) -> &Net {
        self.nets.get(id).expect("NetId must be valid for its owning Netlist")
    }

    pub fn net_mut(&mut self, id: NetId) -> &mut Net {
        self.nets.get_mut(id).expect("NetId must be valid for its owning Netlist")
    }

    pub fn pin(&self, id: PinId) -> &Pin {
        self.pins.get(id).expect("PinId must be valid for its owning Netlist")
    }

    pub fn pin_mut(&mut self, id: PinId) -> &mut Pin {
        self.pins.get_mut(id).expect("PinId must be valid for its owning Netlist")
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.ids()
    }

    /// The `i`-th input pin's driving node, or `None` if that pin is
    /// undriven (structural anomaly, tolerated per `spec.md` §7.1).
    pub fn input_driver_node(&self, node_id: NodeId, input_index: usize) -> Option<NodeId> {
        let pin_id = *self.node(node_id).input_pins.get(input_index)?;
        self.driver_of_input_pin(pin_id)
    }

    /// The node driving the net connected to `pin_id`, assuming `pin_id` is
    /// an input pin.
    pub fn driver_of_input_pin(&self, pin_id: PinId) -> Option<NodeId> {
        let net_id = self.pin(pin_id).net?;
        let driver_pin = self.net(net_id).driver?;
        Some(self.pin(driver_pin).node)
    }

    /// All non-null fanout children reached through `node_id`'s output
    /// pins, in pin/fanout order.
    pub fn fanout_children(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        for &out_pin in &self.node(node_id).output_pins {
            let Some(net_id) = self.pin(out_pin).net else { continue };
            for fanout_pin in &self.net(net_id).fanout {
                if let Some(pin_id) = fanout_pin {
                    children.push(self.pin(*pin_id).node);
                }
            }
        }
        children
    }

    /// The carry-out net of an `ADD`/`MINUS` node (its output pin 0).
    pub fn carry_out_net(&self, node_id: NodeId) -> Option<NetId> {
        let out0 = *self.node(node_id).output_pins.first()?;
        self.pin(out0).net
    }

    /// Clears every node's visit tag, implementing the `RESET` sentinel of
    /// `spec.md` §4.A so an unrelated pass can reuse the same tag values.
    pub fn reset_visit_tags(&mut self) {
        for (_, node) in self.nodes.iter() {
            node.clear_tag();
        }
    }

    /// The net driven by `node_id`'s output pin 0, creating an empty one if
    /// that pin has never been wired (used by the rewriter, component G, to
    /// reach a constant node that may not yet drive anything).
    pub fn ensure_output_net(&mut self, node_id: NodeId, output_index: usize) -> NetId {
        let out_pin = self.node(node_id).output_pins[output_index];
        if let Some(net_id) = self.pin(out_pin).net {
            return net_id;
        }
        let net_id = self.nets.push(Net { driver: Some(out_pin), fanout: Vec::new() });
        self.pin_mut(out_pin).net = Some(net_id);
        net_id
    }

    /// Moves `pin_id` from whatever net currently drives it to `new_net`,
    /// nulling its old fanout slot and appending a fresh one (component
    /// G's pin-remap step).
    pub fn remap_pin_driver(&mut self, pin_id: PinId, new_net: NetId) {
        if let Some(old_net) = self.pin(pin_id).net {
            if let Some(old_idx) = self.pin(pin_id).pin_net_idx {
                if let Some(slot) = self.net_mut(old_net).fanout.get_mut(old_idx) {
                    *slot = None;
                }
            }
        }
        let new_idx = self.net(new_net).fanout.len();
        self.net_mut(new_net).fanout.push(Some(pin_id));
        let pin = self.pin_mut(pin_id);
        pin.net = Some(new_net);
        pin.pin_net_idx = Some(new_idx);
    }
}

#[cfg(test)]
mod tests {
    use super::builder::NetlistBuilder;
    use super::*;

    #[test]
    fn driver_of_input_pin_follows_net_to_driver_node() {
        let mut b = NetlistBuilder::new();
        let a = b.input("a");
        let g = b.generic("g", &[a], vec![vec![BitValue::One]], true);
        let nl = b.finish(vec![g]);

        let driven = nl.input_driver_node(g, 0);
        assert_eq!(driven, Some(a));
    }

    #[test]
    fn undriven_input_pin_is_none() {
        let mut b = NetlistBuilder::new();
        let out = b.output("y");
        // `y`'s input pin is never wired to anything.
        let nl = b.finish(vec![out]);
        assert_eq!(nl.input_driver_node(out, 0), None);
    }
}
