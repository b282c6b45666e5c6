//! Carry-chain analyzer (component D, `spec.md` §4.D).
//!
//! Transliterates `netlist_cleanup.c::calculate_addsub_statistics`'s exact
//! accumulation algorithm, returning a [`CarryChainStats`] value instead of
//! writing to global counters, per `spec.md` §9 and the teacher's
//! stats-accumulator-returned-to-caller idiom (`miden-vm/src/tools/mod.rs`'s
//! `Analyze`/`ExecutionDetails`/`AsmOpStats`).

use crate::arena::NodeId;
use crate::netlist::{Netlist, NodeKind, VisitTag};

/// Carry-chain statistics for one cleanup run (`spec.md` §6's
/// `adder_chain_count` et al., as a returned value rather than globals).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CarryChainStats {
    pub adder_chain_count: u32,
    pub longest_adder_chain: u32,
    pub total_adders: u32,
    pub subtractor_chain_count: u32,
    pub longest_subtractor_chain: u32,
    pub total_subtractors: u32,
    /// `exp(mean(ln(depth_i)))` over every counted chain; `0.0` if no chain
    /// had depth > 0.
    pub geomean_addsub_length: f64,
}

/// Walks each chain head's carry-out/fanout-0 path, accumulating
/// [`CarryChainStats`]. Must run after the detacher (component C), which
/// establishes the `REMOVED` tag used here as a walk terminator.
pub fn calculate_addsub_statistics(netlist: &Netlist, chain_heads: &[NodeId]) -> CarryChainStats {
    let mut stats = CarryChainStats::default();
    let mut sum_of_logs = 0.0_f64;
    let mut total_chain_count: u32 = 0;

    for &head in chain_heads {
        let (tail, depth) = walk_chain(netlist, head);

        if depth > 0 {
            match netlist.node(tail).kind {
                NodeKind::Add => {
                    stats.adder_chain_count += 1;
                    stats.total_adders += depth;
                    stats.longest_adder_chain = stats.longest_adder_chain.max(depth);
                },
                NodeKind::Minus => {
                    stats.subtractor_chain_count += 1;
                    stats.total_subtractors += depth;
                    stats.longest_subtractor_chain = stats.longest_subtractor_chain.max(depth);
                },
                _ => {},
            }

            sum_of_logs += (depth as f64).ln();
            total_chain_count += 1;
        }
    }

    stats.geomean_addsub_length =
        if total_chain_count == 0 { 0.0 } else { (sum_of_logs / total_chain_count as f64).exp() };

    tracing::info!(
        adders = stats.adder_chain_count,
        subtractors = stats.subtractor_chain_count,
        geomean = stats.geomean_addsub_length,
        "carry-chain statistics"
    );

    stats
}

/// Walks forward from `head` via carry-out/fanout-0, stopping at a removed
/// node, a null carry-out net, or a null first fanout slot. Returns the
/// last node visited and the number of hops taken.
fn walk_chain(netlist: &Netlist, head: NodeId) -> (NodeId, u32) {
    let mut node = head;
    let mut depth = 0_u32;

    loop {
        if netlist.node(node).is_tagged(VisitTag::Removed) {
            break;
        }
        depth += 1;

        let Some(carry_out_net) = netlist.carry_out_net(node) else { break };
        let Some(next_pin) = netlist.net(carry_out_net).fanout.first().copied().flatten() else {
            break;
        };
        node = netlist.pin(next_pin).node;
    }

    (node, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detach::remove_unused_nodes;
    use crate::netlist::builder::NetlistBuilder;
    use crate::sweep::{identify_unused_nodes, mark_output_dependencies};

    /// S2: PAD -> ADD1 -> ADD2 -> ADD3 -> OUT, a chain of depth 3.
    #[test]
    fn s2_adder_chain_of_three() {
        let mut b = NetlistBuilder::new();
        let pad = b.pad();
        let add1 = b.adder("add1", pad);
        let add2 = b.adder("add2", add1);
        let add3 = b.adder("add3", add2);
        let y = b.output("y");
        b.wire(add3, 0, y, 0);
        let mut nl = b.finish(vec![y]);

        mark_output_dependencies(&nl);
        let result = identify_unused_nodes(&nl);
        remove_unused_nodes(&mut nl, &result.removal_list);
        let stats = calculate_addsub_statistics(&nl, &result.chain_heads);

        assert_eq!(stats.adder_chain_count, 1);
        assert_eq!(stats.longest_adder_chain, 3);
        assert_eq!(stats.total_adders, 3);
        assert_eq!(stats.geomean_addsub_length, 3.0);
        assert_eq!(stats.subtractor_chain_count, 0);
    }

    #[test]
    fn no_chains_has_zero_geomean() {
        let nl = NetlistBuilder::new().finish(vec![]);
        let stats = calculate_addsub_statistics(&nl, &[]);
        assert_eq!(stats.geomean_addsub_length, 0.0);
        assert_eq!(stats.adder_chain_count, 0);
    }
}
