//! The pipeline's configuration object (`spec.md` §6's "global
//! configuration object").
//!
//! Grounded on `miden-vm`'s `executable`/`internal` Cargo features, which
//! use `serde`/`serde_json` to load config-shaped data for the CLI binary;
//! here the equivalent is made `serde`-deserializable behind the optional
//! `serde` feature so a host build tool can load it from a config file,
//! while `netlist-core` itself never reads one.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which Case-2 latch-driver heuristic (`spec.md` §4.E) to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Case2Variant {
    /// The clearer, independent-flags variant `spec.md` §4.E adopts as its
    /// primary rule.
    #[default]
    IndependentFlags,
    /// The upstream implementation's merged tri-state `case2reset` variant
    /// (0/1/2), kept for bit-exact parity per `spec.md` §9.
    MergedTristate,
}

/// The cleanup pipeline's configuration (`spec.md` §6).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CleanupConfig {
    /// When `false`, the reset-elision phases (§4.E–G) are skipped entirely;
    /// the dead-logic sweep and carry-chain analysis (§4.B–D) always run.
    pub reset_elision: bool,
    /// Gates the simulation-based cross-check (§4.H) independently of
    /// `reset_elision`, per §9's "keep behind a flag distinct from
    /// structural reset elision".
    pub simulator_crosscheck: bool,
    /// Which Case-2 bitmap heuristic the reset-candidate detector applies.
    pub case2_variant: Case2Variant,
    /// When set and reset elision accepts exactly one candidate, the
    /// textual rewrite (§4.G) reads `output_file`'s *input* companion
    /// stream (provided by the caller) and writes the rewritten netlist
    /// here.
    pub output_file: Option<PathBuf>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            reset_elision: false,
            simulator_crosscheck: false,
            case2_variant: Case2Variant::IndependentFlags,
            output_file: None,
        }
    }
}
