//! Property-based checks for the universal invariants of `spec.md` §8,
//! run over small randomly generated graphs rather than hand-picked
//! scenarios (the teacher's randomized-test idiom, e.g.
//! `crates/lib/core/tests/math/u64_mod.rs`'s `proptest! { ... }` blocks).

use proptest::prelude::*;

use crate::carry_chain::calculate_addsub_statistics;
use crate::detach::remove_unused_nodes;
use crate::netlist::builder::NetlistBuilder;
use crate::sweep::{identify_unused_nodes, mark_output_dependencies};

proptest! {
    /// Invariant 2 (conservative removal): every member of a live,
    /// PAD-rooted adder chain survives the sweep.
    #[test]
    fn live_adder_chain_is_never_marked_for_removal(n in 1usize..12) {
        let mut b = NetlistBuilder::new();
        let mut prev = b.pad();
        let mut nodes = Vec::new();
        for i in 0..n {
            prev = b.adder(&format!("add{i}"), prev);
            nodes.push(prev);
        }
        let y = b.output("y");
        b.wire(prev, 0, y, 0);
        let nl = b.finish(vec![y]);

        mark_output_dependencies(&nl);
        let result = identify_unused_nodes(&nl);

        for node in nodes {
            prop_assert!(!result.removal_list.contains(&node));
        }
    }

    /// Invariant 4 (chain monotone termination): a carry-chain walk never
    /// reports more hops than the chain actually has.
    #[test]
    fn carry_chain_depth_is_bounded_by_actual_length(n in 1usize..20) {
        let mut b = NetlistBuilder::new();
        let mut prev = b.pad();
        let head = b.adder("head", prev);
        prev = head;
        for i in 1..n {
            prev = b.adder(&format!("add{i}"), prev);
        }
        let y = b.output("y");
        b.wire(prev, 0, y, 0);
        let mut nl = b.finish(vec![y]);

        mark_output_dependencies(&nl);
        let result = identify_unused_nodes(&nl);
        remove_unused_nodes(&mut nl, &result.removal_list);
        let stats = calculate_addsub_statistics(&nl, &[head]);

        prop_assert!(stats.total_adders <= n as u32);
        prop_assert_eq!(stats.subtractor_chain_count, 0);
    }

    /// Invariant 8 (geomean correctness) over an arbitrary set of chain
    /// depths.
    #[test]
    fn geomean_matches_exp_mean_ln(depths in proptest::collection::vec(1u32..50, 1..10)) {
        let mut b = NetlistBuilder::new();
        let mut chain_heads = Vec::new();
        let mut outputs = Vec::new();
        for (i, &depth) in depths.iter().enumerate() {
            let mut prev = b.pad();
            let mut head = None;
            for j in 0..depth {
                prev = b.adder(&format!("c{i}_{j}"), prev);
                if j == 0 {
                    head = Some(prev);
                }
            }
            chain_heads.push(head.unwrap());
            let y = b.output(&format!("y{i}"));
            b.wire(prev, 0, y, 0);
            outputs.push(y);
        }
        let mut nl = b.finish(outputs);

        mark_output_dependencies(&nl);
        let result = identify_unused_nodes(&nl);
        remove_unused_nodes(&mut nl, &result.removal_list);

        let stats = calculate_addsub_statistics(&nl, &chain_heads);

        let sum_of_logs: f64 = depths.iter().map(|&d| (d as f64).ln()).sum();
        let expected = (sum_of_logs / depths.len() as f64).exp();
        prop_assert!((stats.geomean_addsub_length - expected).abs() < 1e-9);
    }
}
