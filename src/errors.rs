//! Crate error type.
//!
//! Only fatal I/O (`spec.md` §7.3) is represented as an `Err`. Structural
//! anomalies and heuristic rejections (§7.1, §7.2) are tolerated in place —
//! see [`crate::reset::CandidateRegistry`] and [`crate::reset::RejectionReason`]
//! for how rejections are recorded as data instead.

use std::io;
use std::path::PathBuf;

/// Errors that can escape the cleanup pipeline.
///
/// Modeled on the teacher's boundary-wrapping pattern
/// (`core/src/errors.rs`, `processor/src/errors.rs`): a lower-level error is
/// wrapped with the context available at the point it's handled, here the
/// output path of a failed textual rewrite.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// The textual rewrite (`spec.md` §4.G) could not open its output file.
    #[error("failed to open netlist output file '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
