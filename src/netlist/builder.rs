//! An in-memory netlist builder.
//!
//! Netlist parsing and construction from source HDL is an external
//! collaborator's job (`spec.md` §1) — this builder exists only so this
//! crate's own test suite can construct small graphs without a parser,
//! following the teacher's `BasicBlockNodeBuilder`/`DynNodeBuilder` pattern
//! (`core/src/mast/node/*_node.rs`) of a small builder type that wires up an
//! arena-owned graph step by step.

use super::node::{BitMapRow, FfData, GenericData, InputData, Net, Node, NodeKind, Pin, PinRole};
use super::Netlist;
use crate::arena::{IndexVec, NetId, NodeId, PinId};

pub struct NetlistBuilder {
    nodes: IndexVec<NodeId, Node>,
    nets: IndexVec<NetId, Net>,
    pins: IndexVec<PinId, Pin>,
    inputs: Vec<NodeId>,
    ffs: Vec<NodeId>,
    gnd: NodeId,
    vcc: NodeId,
    pad: NodeId,
}

impl NetlistBuilder {
    pub fn new() -> Self {
        let mut nodes = IndexVec::new();
        let mut pins = IndexVec::new();
        let gnd = Self::raw_new_node(&mut nodes, &mut pins, "gnd", NodeKind::Gnd, 0, 1);
        let vcc = Self::raw_new_node(&mut nodes, &mut pins, "vcc", NodeKind::Vcc, 0, 1);
        let pad = Self::raw_new_node(&mut nodes, &mut pins, "pad", NodeKind::Pad, 0, 1);
        Self {
            nodes,
            nets: IndexVec::new(),
            pins,
            inputs: Vec::new(),
            ffs: Vec::new(),
            gnd,
            vcc,
            pad,
        }
    }

    fn raw_new_node(
        nodes: &mut IndexVec<NodeId, Node>,
        pins: &mut IndexVec<PinId, Pin>,
        name: &str,
        kind: NodeKind,
        num_inputs: usize,
        num_outputs: usize,
    ) -> NodeId {
        let node_id = nodes.push(Node::new(NodeId::from(0), name, kind));
        // Node::new takes its own id up front; patch it now that we know it.
        nodes.get_mut(node_id).unwrap().id = node_id;

        for _ in 0..num_inputs {
            let pin_id = pins.push(Pin {
                id: PinId::from(0),
                node: node_id,
                role: PinRole::Input,
                net: None,
                pin_net_idx: None,
            });
            pins.get_mut(pin_id).unwrap().id = pin_id;
            nodes.get_mut(node_id).unwrap().input_pins.push(pin_id);
        }
        for _ in 0..num_outputs {
            let pin_id = pins.push(Pin {
                id: PinId::from(0),
                node: node_id,
                role: PinRole::Output,
                net: None,
                pin_net_idx: None,
            });
            pins.get_mut(pin_id).unwrap().id = pin_id;
            nodes.get_mut(node_id).unwrap().output_pins.push(pin_id);
        }
        node_id
    }

    fn new_node(
        &mut self,
        name: &str,
        kind: NodeKind,
        num_inputs: usize,
        num_outputs: usize,
    ) -> NodeId {
        Self::raw_new_node(&mut self.nodes, &mut self.pins, name, kind, num_inputs, num_outputs)
    }

    pub fn gnd(&self) -> NodeId {
        self.gnd
    }

    pub fn vcc(&self) -> NodeId {
        self.vcc
    }

    pub fn pad(&self) -> NodeId {
        self.pad
    }

    pub fn input(&mut self, name: &str) -> NodeId {
        let id = self.new_node(name, NodeKind::Input(InputData::default()), 0, 1);
        self.inputs.push(id);
        id
    }

    pub fn clock(&mut self, name: &str) -> NodeId {
        self.new_node(name, NodeKind::Clock, 0, 1)
    }

    pub fn output(&mut self, name: &str) -> NodeId {
        self.new_node(name, NodeKind::Output, 1, 0)
    }

    /// A flip-flop whose D input is driven by `d_driver`'s output pin 0.
    pub fn ff(&mut self, name: &str, d_driver: NodeId) -> NodeId {
        let id = self.new_node(name, NodeKind::Ff(FfData::default()), 1, 1);
        self.wire(d_driver, 0, id, 0);
        self.ffs.push(id);
        id
    }

    /// A single-carry-input `ADD`/`MINUS` node: input pin 0 is the carry-in
    /// (satisfying "input pin index n-1 is the carry-in" with n=1), output
    /// pin 0 is the carry-out.
    fn addsub(&mut self, name: &str, is_add: bool, carry_in: NodeId) -> NodeId {
        let kind = if is_add { NodeKind::Add } else { NodeKind::Minus };
        let id = self.new_node(name, kind, 1, 1);
        self.wire(carry_in, 0, id, 0);
        id
    }

    pub fn adder(&mut self, name: &str, carry_in: NodeId) -> NodeId {
        self.addsub(name, true, carry_in)
    }

    pub fn subtractor(&mut self, name: &str, carry_in: NodeId) -> NodeId {
        self.addsub(name, false, carry_in)
    }

    /// A combinational node driven by `inputs[i]`'s output pin 0 on its
    /// input pin `i`, described by `bit_map`.
    pub fn generic(
        &mut self,
        name: &str,
        inputs: &[NodeId],
        bit_map: Vec<BitMapRow>,
        is_on_gate: bool,
    ) -> NodeId {
        let id = self.new_node(
            name,
            NodeKind::Generic(GenericData { bit_map, is_on_gate }),
            inputs.len(),
            1,
        );
        for (i, &driver) in inputs.iter().enumerate() {
            self.wire(driver, 0, id, i);
        }
        id
    }

    /// Connects `driver`'s output pin `out_idx` to `consumer`'s input pin
    /// `in_idx`, creating the net on first use of the driver pin.
    pub fn wire(&mut self, driver: NodeId, out_idx: usize, consumer: NodeId, in_idx: usize) {
        let driver_pin = self.nodes[driver].output_pins[out_idx];
        let net_id = match self.pins[driver_pin].net {
            Some(net_id) => net_id,
            None => {
                let net_id = self.nets.push(Net { driver: Some(driver_pin), fanout: Vec::new() });
                self.pins.get_mut(driver_pin).unwrap().net = Some(net_id);
                net_id
            },
        };

        let consumer_pin = self.nodes[consumer].input_pins[in_idx];
        let fanout_idx = self.nets[net_id].fanout.len();
        self.nets.get_mut(net_id).unwrap().fanout.push(Some(consumer_pin));
        let pin = self.pins.get_mut(consumer_pin).unwrap();
        pin.net = Some(net_id);
        pin.pin_net_idx = Some(fanout_idx);
    }

    /// Finalizes the graph, registering `top_outputs` as the netlist's
    /// primary outputs.
    pub fn finish(self, top_outputs: Vec<NodeId>) -> Netlist {
        Netlist {
            nodes: self.nodes,
            nets: self.nets,
            pins: self.pins,
            top_inputs: self.inputs,
            top_outputs,
            top_ffs: self.ffs,
            gnd: self.gnd,
            vcc: self.vcc,
            pad: self.pad,
        }
    }
}

impl Default for NetlistBuilder {
    fn default() -> Self {
        Self::new()
    }
}
