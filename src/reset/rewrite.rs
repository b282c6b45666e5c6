//! Netlist rewriter (component G, `spec.md` §4.G).
//!
//! Runs only once a single reset candidate has survived components E and F.
//! Two independent modes: a structural rewrite that mutates the live graph,
//! and an optional textual rewrite that edits a BLIF-like line stream.
//!
//! A tie-value of 1 means the candidate is held at logic 1, so it is
//! replaced by `vcc`; a tie-value of 0 is replaced by `gnd`. (The upstream
//! implementation's surviving fragments state the structural and textual
//! cases in what reads as opposite polarity; `vcc` drives 1 and `gnd`
//! drives 0 unconditionally in this graph model, so both rewrite modes use
//! this one mapping — see `DESIGN.md`.)

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use crate::arena::NodeId;
use crate::errors::NetlistError;
use crate::netlist::Netlist;

/// Rewrites the live graph: remaps every child's candidate-driven input
/// pin to the chosen constant, and stamps `has_initial_value`/
/// `initial_value` on every flip-flop the candidate reaches through one
/// level of combinational logic (`spec.md` §4.G).
pub fn rewrite_structural(netlist: &mut Netlist, candidate: NodeId) {
    let potential_reset_value = netlist
        .node(candidate)
        .kind
        .as_input()
        .and_then(|d| d.potential_reset_value)
        .expect("structural rewrite requires a candidate with a resolved potential_reset_value");

    let constant =
        if potential_reset_value { netlist.vcc } else { netlist.gnd };

    // a candidate can fan out to the same child node through more than one
    // pin; dedup so the stamp/remap passes below each visit it once.
    let children: Vec<NodeId> = netlist.fanout_children(candidate).into_iter().unique().collect();

    for &child in &children {
        for grandchild in netlist.fanout_children(child) {
            if !netlist.node(grandchild).kind.is_ff() {
                continue;
            }
            let derived = netlist.node(grandchild).kind.as_ff().unwrap().derived_initial_value;
            let ff = netlist.node_mut(grandchild).kind.as_ff_mut().unwrap();
            ff.has_initial_value = true;
            ff.initial_value = derived;
        }
    }

    let constant_net = netlist.ensure_output_net(constant, 0);

    for &child in &children {
        let input_pins = netlist.node(child).input_pins.clone();
        for pin_id in input_pins {
            let Some(net_id) = netlist.pin(pin_id).net else { continue };
            let Some(driver_pin) = netlist.net(net_id).driver else { continue };
            if netlist.pin(driver_pin).node == candidate {
                netlist.remap_pin_driver(pin_id, constant_net);
            }
        }
    }
}

fn grandchild_ff_derived_values(netlist: &Netlist, candidate: NodeId) -> HashMap<String, bool> {
    let mut derived = HashMap::new();
    for child in netlist.fanout_children(candidate) {
        for grandchild in netlist.fanout_children(child) {
            if let Some(ff) = netlist.node(grandchild).kind.as_ff() {
                derived.insert(netlist.node(grandchild).name.clone(), ff.derived_initial_value);
            }
        }
    }
    derived
}

fn is_initial_value_token(c: char) -> bool {
    matches!(c, '0' | '1' | '2' | '3')
}

fn replace_last_char(line: &str, new_char: char) -> String {
    let mut chars: Vec<char> = line.chars().collect();
    if let Some(last) = chars.last_mut() {
        *last = new_char;
    }
    chars.into_iter().collect()
}

/// Edits a BLIF-like line stream in place, given an already-open reader
/// and writer. Exposed separately from [`rewrite_textual_file`] so it can
/// be exercised without real file handles.
pub fn rewrite_textual_stream<R: BufRead, W: Write>(
    netlist: &Netlist,
    candidate: NodeId,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    let potential_reset_value = netlist
        .node(candidate)
        .kind
        .as_input()
        .and_then(|d| d.potential_reset_value)
        .expect("textual rewrite requires a candidate with a resolved potential_reset_value");
    let candidate_name = netlist.node(candidate).name.clone();

    let (constant_name, preamble): (&str, &str) = if potential_reset_value {
        ("vcc_odin_reset_elision", ".names vcc_odin_reset_elision\n 1\n\n")
    } else {
        ("gnd_odin_reset_elision", ".names gnd_odin_reset_elision\n\n")
    };

    let derived_by_name = grandchild_ff_derived_values(netlist, candidate);
    let grandchild_names: HashSet<&str> = derived_by_name.keys().map(String::as_str).collect();

    writeln!(output, "#Odin Reset Elision")?;

    let mut preamble_emitted = false;
    let mut line = String::new();
    loop {
        line.clear();
        let read = input.read_line(&mut line)?;
        if read == 0 {
            break;
        }

        let end = line.trim_end_matches(['\n', '\r']);

        if end.starts_with(".names") && end.contains(candidate_name.as_str()) {
            if !preamble_emitted {
                output.write_all(preamble.as_bytes())?;
                preamble_emitted = true;
            }
            let rewritten = end.replace(candidate_name.as_str(), constant_name);
            output.write_all(rewritten.as_bytes())?;
            output.write_all(line[end.len()..].as_bytes())?;
            continue;
        }

        if end.starts_with(".latch") {
            if let Some(q_name) = end.split_whitespace().nth(1) {
                if grandchild_names.contains(q_name) && end.chars().last().is_some_and(is_initial_value_token)
                {
                    let derived = derived_by_name[q_name];
                    let new_token = if derived { '1' } else { '0' };
                    let rewritten = replace_last_char(end, new_token);
                    output.write_all(rewritten.as_bytes())?;
                    output.write_all(line[end.len()..].as_bytes())?;
                    continue;
                }
            }
        }

        output.write_all(line.as_bytes())?;
    }

    Ok(())
}

/// Opens `input_path`/`output_path` and runs [`rewrite_textual_stream`]
/// over them. A file-open failure is the one fatal error condition this
/// crate surfaces (`spec.md` §6/§7.3).
pub fn rewrite_textual_file(
    netlist: &Netlist,
    candidate: NodeId,
    input_path: &Path,
    output_path: &Path,
) -> Result<(), NetlistError> {
    let input_file = File::open(input_path)
        .map_err(|source| NetlistError::Io { path: input_path.to_path_buf(), source })?;
    let output_file = File::create(output_path)
        .map_err(|source| NetlistError::Io { path: output_path.to_path_buf(), source })?;

    rewrite_textual_stream(
        netlist,
        candidate,
        BufReader::new(input_file),
        BufWriter::new(output_file),
    )
    .map_err(|source| NetlistError::Io { path: output_path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::builder::NetlistBuilder;
    use crate::netlist::node::BitValue::*;
    use crate::netlist::ResetCandidateState;

    /// Rewrite completeness (invariant 6) and initial-value stamping
    /// (invariant 7): after a structural rewrite, the candidate no longer
    /// drives anything, and the downstream FF carries its derived value.
    #[test]
    fn structural_rewrite_remaps_driver_and_stamps_ff() {
        let mut b = NetlistBuilder::new();
        let rst = b.input("rst");
        let d = b.input("d");
        let lut = b.generic("lut", &[rst, d], vec![vec![One, DontCare], vec![One, DontCare]], true);
        let ff = b.ff("q_ff", lut);
        let y = b.output("y");
        b.wire(ff, 0, y, 0);
        let mut nl = b.finish(vec![y]);

        {
            let data = nl.node_mut(rst).kind.as_input_mut().unwrap();
            data.reset_candidate = ResetCandidateState::Candidate;
            data.potential_reset_value = Some(false); // tied to 0 -> gnd
        }
        nl.node_mut(ff).kind.as_ff_mut().unwrap().derived_initial_value = false;

        rewrite_structural(&mut nl, rst);

        // invariant 6: no input pin anywhere is still driven by `rst`.
        for node_id in nl.node_ids() {
            for &pin_id in &nl.node(node_id).input_pins {
                if let Some(net_id) = nl.pin(pin_id).net {
                    if let Some(driver_pin) = nl.net(net_id).driver {
                        assert_ne!(nl.pin(driver_pin).node, rst);
                    }
                }
            }
        }

        // invariant 7
        let ff_data = nl.node(ff).kind.as_ff().unwrap();
        assert!(ff_data.has_initial_value);
        assert_eq!(ff_data.initial_value, false);

        // the LUT's former rst pin now reads from gnd.
        let lut_rst_pin = nl.node(lut).input_pins[0];
        let net_id = nl.pin(lut_rst_pin).net.unwrap();
        let driver_pin = nl.net(net_id).driver.unwrap();
        assert_eq!(nl.pin(driver_pin).node, nl.gnd);
    }

    /// S7: textual rewrite of a simple `.names`/`.latch` pair.
    #[test]
    fn s7_textual_rewrite_inserts_preamble_and_rewrites_lines() {
        let mut b = NetlistBuilder::new();
        let rst = b.input("rst");
        let d = b.input("d");
        let lut = b.generic("lut", &[rst, d], vec![vec![One, DontCare], vec![One, DontCare]], true);
        let ff = b.ff("q", lut); // FF node named "q", matching the .latch line's Q field
        let y = b.output("y");
        b.wire(ff, 0, y, 0);
        let mut nl = b.finish(vec![y]);

        {
            let data = nl.node_mut(rst).kind.as_input_mut().unwrap();
            data.reset_candidate = ResetCandidateState::Candidate;
            data.potential_reset_value = Some(true); // tied to 1 -> vcc
        }
        nl.node_mut(ff).kind.as_ff_mut().unwrap().derived_initial_value = true;

        let input = b".names rst lut_out\n-1 1\n0- 1\n\n.latch lut_out q re clk 3\n";
        let mut out = Vec::new();
        rewrite_textual_stream(&nl, rst, &input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(".names vcc_odin_reset_elision\n 1\n\n"));
        assert!(text.contains(".names vcc_odin_reset_elision lut_out"));
        assert!(text.contains(".latch lut_out q re clk 1"));
    }
}
