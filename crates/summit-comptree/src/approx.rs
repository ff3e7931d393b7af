//! Approximation transforms
//!
//! Named transforms that trade numeric exactness for reduced hardware.
//! Column truncation, OR-compression and row truncation act while the
//! initial matrix is built; miscounting bounds where approximate counters
//! may be placed during scheduling. The generator applies the transforms
//! but does not model their statistical error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ComptreeError, Result};
use crate::signature::Signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approximation {
    /// Skip the `width` least-significant columns entirely
    ColumnTruncation { width: usize },
    /// Collapse each column below `width` (and above any truncated range)
    /// into the logical OR of its bits
    OrCompression { width: usize },
    /// Keep only the first `rows` partial-product rows of a multiplier
    /// signature
    RowTruncation { rows: usize },
    /// Allow approximate counters, but only where every column they touch
    /// lies below `width`
    Miscounting { width: usize },
}

impl Approximation {
    /// Short name used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Approximation::ColumnTruncation { .. } => "column_truncation",
            Approximation::OrCompression { .. } => "or_compression",
            Approximation::RowTruncation { .. } => "row_truncation",
            Approximation::Miscounting { .. } => "miscounting",
        }
    }

    /// Check compatibility with a signature kind. Reported before any
    /// scheduling starts, never silently ignored.
    pub fn validate(&self, signature: &Signature) -> Result<()> {
        match self {
            Approximation::RowTruncation { .. } if !signature.is_multiplier() => {
                Err(ComptreeError::IncompatibleApproximation {
                    approx: self.label().to_string(),
                    reason: "signature is not derived from a multiplication".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Approximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approximation::ColumnTruncation { width } => write!(f, "column_truncation({width})"),
            Approximation::OrCompression { width } => write!(f, "or_compression({width})"),
            Approximation::RowTruncation { rows } => write!(f, "row_truncation({rows})"),
            Approximation::Miscounting { width } => write!(f, "miscounting({width})"),
        }
    }
}

/// Width of the truncated column range (0 when inactive)
pub(crate) fn truncation_width(approximations: &[Approximation]) -> usize {
    approximations
        .iter()
        .find_map(|a| match a {
            Approximation::ColumnTruncation { width } => Some(*width),
            _ => None,
        })
        .unwrap_or(0)
}

/// Upper bound of the OR-compressed column range (0 when inactive)
pub(crate) fn or_compression_width(approximations: &[Approximation]) -> usize {
    approximations
        .iter()
        .find_map(|a| match a {
            Approximation::OrCompression { width } => Some(*width),
            _ => None,
        })
        .unwrap_or(0)
}

/// Retained row count for multiplier signatures, if row truncation is active
pub(crate) fn row_limit(approximations: &[Approximation]) -> Option<usize> {
    approximations.iter().find_map(|a| match a {
        Approximation::RowTruncation { rows } => Some(*rows),
        _ => None,
    })
}

/// Column bound for approximate counters, if miscounting is active
pub(crate) fn miscounting_width(approximations: &[Approximation]) -> Option<usize> {
    approximations.iter().find_map(|a| match a {
        Approximation::Miscounting { width } => Some(*width),
        _ => None,
    })
}
