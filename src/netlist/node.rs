//! The node, pin, and net types that make up a [`super::Netlist`].

use std::cell::Cell;

use crate::arena::{NetId, NodeId, PinId};

/// A reset-candidate input's classification, maintained by the reset
/// detector (component E) and the filter (component F).
///
/// Mirrors `nnode_t.reset_candidate` from the upstream implementation's
/// `0`/`1`/`-1` convention, spelled out as a proper enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResetCandidateState {
    /// Not yet classified.
    #[default]
    Unknown,
    /// Currently believed to be a synchronous reset for every flip-flop it
    /// reaches.
    Candidate,
    /// Permanently ruled out (value collision, ambiguous bitmap, or reaches
    /// a primary output combinationally).
    Rejected,
}

/// Per-`INPUT`-node reset-elision bookkeeping (component E/F).
#[derive(Debug, Clone, Default)]
pub struct InputData {
    pub reset_candidate: ResetCandidateState,
    /// The value this input must be tied to once elided (its *inactive*
    /// value). `None` until a latch driver first marks this input.
    pub potential_reset_value: Option<bool>,
}

/// Per-`FF`-node reset-elision bookkeeping (component E/G).
#[derive(Debug, Clone, Default)]
pub struct FfData {
    pub has_initial_value: bool,
    pub initial_value: bool,
    pub derived_initial_value: bool,
}

/// A row of a combinational node's sum-of-products bitmap.
///
/// Each entry is `'0'`, `'1'`, or `'-'` (don't-care), one per input pin, in
/// pin order.
pub type BitMapRow = Vec<BitValue>;

/// One cell of a [`BitMapRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitValue {
    Zero,
    One,
    DontCare,
}

impl BitValue {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(BitValue::Zero),
            '1' => Some(BitValue::One),
            '-' => Some(BitValue::DontCare),
            _ => None,
        }
    }
}

/// A `GENERIC` combinational node's truth table, as a sum-of-products
/// bitmap (component E's pattern-match target).
#[derive(Debug, Clone, Default)]
pub struct GenericData {
    /// One row per product term; `bit_map[row][pin]`.
    pub bit_map: Vec<BitMapRow>,
    /// Whether `bit_map` enumerates ON-set minterms (`true`) or OFF-set
    /// minterms (`false`).
    pub is_on_gate: bool,
}

impl GenericData {
    pub fn bit_map_line_count(&self) -> usize {
        self.bit_map.len()
    }
}

/// The twelve node variants of the netlist data model (`spec.md` §3).
#[derive(Debug, Clone)]
pub enum NodeKind {
    Input(InputData),
    Output,
    Clock,
    Gnd,
    Vcc,
    Pad,
    Ff(FfData),
    Add,
    Minus,
    Memory,
    Generic(GenericData),
}

impl NodeKind {
    pub fn is_ff(&self) -> bool {
        matches!(self, NodeKind::Ff(_))
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, NodeKind::Memory)
    }

    pub fn is_input(&self) -> bool {
        matches!(self, NodeKind::Input(_))
    }

    pub fn is_clock(&self) -> bool {
        matches!(self, NodeKind::Clock)
    }

    pub fn is_add_or_minus(&self) -> bool {
        matches!(self, NodeKind::Add | NodeKind::Minus)
    }

    pub fn as_input(&self) -> Option<&InputData> {
        match self {
            NodeKind::Input(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_input_mut(&mut self) -> Option<&mut InputData> {
        match self {
            NodeKind::Input(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_ff(&self) -> Option<&FfData> {
        match self {
            NodeKind::Ff(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_ff_mut(&mut self) -> Option<&mut FfData> {
        match self {
            NodeKind::Ff(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_generic(&self) -> Option<&GenericData> {
        match self {
            NodeKind::Generic(d) => Some(d),
            _ => None,
        }
    }
}

/// The per-pass visit mark (`spec.md` §4.A). A node is tagged with at most
/// one value per pass; each pass uses its own sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitTag {
    Forward,
    Backward,
    Removed,
    OutToIn,
    CheckLatches,
}

/// One node of the netlist graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub input_pins: Vec<PinId>,
    pub output_pins: Vec<PinId>,
    visit: Cell<Option<VisitTag>>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            input_pins: Vec::new(),
            output_pins: Vec::new(),
            visit: Cell::new(None),
        }
    }

    /// Returns `true` if this node already carries `tag` for the current
    /// pass.
    pub fn is_tagged(&self, tag: VisitTag) -> bool {
        self.visit.get() == Some(tag)
    }

    pub fn visit_tag(&self) -> Option<VisitTag> {
        self.visit.get()
    }

    /// Tags this node for the current pass. Idempotent: re-tagging with the
    /// same tag is a no-op other than the write itself.
    pub fn tag(&self, tag: VisitTag) {
        self.visit.set(Some(tag));
    }

    /// Clears the visit mark, so the node can be revisited in an unrelated
    /// pass (the `RESET` sentinel of `spec.md` §4.A).
    pub fn clear_tag(&self) {
        self.visit.set(None);
    }
}

/// A pin's role on its owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    Input,
    Output,
}

/// One end of a connection (`spec.md` §3).
#[derive(Debug, Clone)]
pub struct Pin {
    pub id: PinId,
    pub node: NodeId,
    pub role: PinRole,
    /// The net this pin is connected to. For an input pin this is the net
    /// that drives it; for an output pin, the net it drives (if any).
    pub net: Option<NetId>,
    /// For input pins only: this pin's own index in `net`'s fanout array.
    pub pin_net_idx: Option<usize>,
}

/// A directed hyperwire: at most one driver pin, an ordered array of fanout
/// pins (`spec.md` §3). Entries may become `None` after [`crate::detach`]
/// nulls a removed node's fanin.
#[derive(Debug, Clone, Default)]
pub struct Net {
    pub driver: Option<PinId>,
    pub fanout: Vec<Option<PinId>>,
}
