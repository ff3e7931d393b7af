//! Error types for compressor-tree generation
//!
//! Generation is a one-shot transform: none of these conditions are
//! retryable, the caller is expected to fix the configuration and re-invoke.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ComptreeError>;

#[derive(Debug, Error)]
pub enum ComptreeError {
    /// An approximation transform does not apply to the given signature kind
    #[error("approximation {approx} is incompatible with this signature: {reason}")]
    IncompatibleApproximation { approx: String, reason: String },

    /// The terminal row count must leave room for at least one bit per column
    #[error("height goal must be at least 1, got {0}")]
    InvalidHeightGoal(u32),

    /// The flat signal handle list does not match the signature
    #[error("signature totals {expected} bits but {found} signal handles were supplied")]
    BitCountMismatch { expected: usize, found: usize },

    /// Scheduling exhaustion: the catalog cannot reduce an over-goal column.
    /// There is no recovery, the greedy scheduler does not backtrack.
    #[error("no counter in library `{library}` fits column {column} (height {height})")]
    NoFittingCounter {
        column: usize,
        height: usize,
        library: String,
    },

    /// Post-stage bit accounting does not close; indicates a catalog bug
    #[error("bit conservation mismatch after stage {stage}: expected {expected} bits, found {found}")]
    ConservationMismatch {
        stage: usize,
        expected: usize,
        found: usize,
    },

    /// A counter realization returned the wrong number of output bits
    #[error("counter `{counter}` produced {found} output bits, expected {expected}")]
    RealizationMismatch {
        counter: String,
        expected: usize,
        found: usize,
    },

    /// A counter descriptor fails catalog validation
    #[error("invalid counter `{name}`: {reason}")]
    InvalidCounter { name: String, reason: String },

    #[error("failed to parse counter catalog: {0}")]
    Catalog(#[from] toml::de::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
