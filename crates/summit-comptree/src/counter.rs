//! Counter descriptors and realization traits
//!
//! A counter is described purely by its input and output signatures
//! (column-offset bit counts, column 0 = least significant), a cost, and
//! an exactness flag. How a counter is physically realized is a backend
//! concern: each concrete cell implements [`Compressor`] (or
//! [`VarLenCompressor`] for length-parameterized chains) once, and the
//! scheduler never matches on the concrete kind.

use std::fmt;

use serde::{Deserialize, Serialize};
use summit_netlist::{NetId, Netlist};

use crate::context::Metric;
use crate::error::{ComptreeError, Result};

/// Immutable descriptor of a counting/compressing component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    /// Catalog name, e.g. "fa" or "lut6_63"
    pub name: String,
    /// Bits consumed per column offset
    pub input_sig: Vec<u32>,
    /// Bits produced per column offset
    pub output_sig: Vec<u32>,
    /// Relative cost; `None` ranks last under the efficiency metric
    pub cost: Option<f64>,
    /// Whether the counter preserves the counted value exactly
    pub exact: bool,
}

impl Counter {
    /// Create a descriptor, trimming trailing zero columns
    pub fn new(
        name: &str,
        input_sig: Vec<u32>,
        output_sig: Vec<u32>,
        cost: Option<f64>,
        exact: bool,
    ) -> Self {
        let mut counter = Self {
            name: name.to_string(),
            input_sig,
            output_sig,
            cost,
            exact,
        };
        while counter.input_sig.last() == Some(&0) {
            counter.input_sig.pop();
        }
        while counter.output_sig.last() == Some(&0) {
            counter.output_sig.pop();
        }
        counter
    }

    /// Total bits consumed
    pub fn input_bits(&self) -> u32 {
        self.input_sig.iter().sum()
    }

    /// Total bits produced
    pub fn output_bits(&self) -> u32 {
        self.output_sig.iter().sum()
    }

    /// Compression ratio: input bits per output bit
    pub fn strength(&self) -> f64 {
        self.input_bits() as f64 / self.output_bits() as f64
    }

    /// Bits eliminated per unit cost; negative infinity when the cost is
    /// unknown so that costless entries sort last
    pub fn efficiency(&self) -> f64 {
        match self.cost {
            Some(cost) => (self.input_bits() as f64 - self.output_bits() as f64) / cost,
            None => f64::NEG_INFINITY,
        }
    }

    /// The selected fitness metric
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Strength => self.strength(),
            Metric::Efficiency => self.efficiency(),
        }
    }

    /// Structural half adder: the entire input signature is two bits in
    /// column 0
    pub fn is_half_adder(&self) -> bool {
        self.input_sig == [2]
    }

    /// Number of columns touched by inputs or outputs
    pub fn columns_spanned(&self) -> usize {
        self.input_sig.len().max(self.output_sig.len())
    }

    /// Largest value representable by the output signature
    fn output_capacity(&self) -> u128 {
        self.output_sig
            .iter()
            .enumerate()
            .map(|(k, &c)| (c as u128) << k)
            .sum()
    }

    /// Largest value the input signature can count
    fn input_reach(&self) -> u128 {
        self.input_sig
            .iter()
            .enumerate()
            .map(|(k, &c)| (c as u128) << k)
            .sum()
    }

    /// Catalog validation.
    ///
    /// Every counter must strictly reduce its base column
    /// (`input_sig[0] > output_sig[0]`), which is the termination
    /// invariant of the scheduling loop, and must never grow the total
    /// bit count. Exact counters must additionally be able to represent
    /// every countable input value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(ComptreeError::InvalidCounter {
                name: self.name.clone(),
                reason: reason.to_string(),
            })
        };
        if self.input_sig.is_empty() || self.input_sig[0] == 0 {
            return invalid("input signature must consume bits at column 0");
        }
        if self.output_bits() == 0 {
            return invalid("output signature is empty");
        }
        if self.input_bits() < self.output_bits() {
            return invalid("counter grows the total bit count");
        }
        if self.input_sig[0] <= self.output_sig.first().copied().unwrap_or(0) {
            return invalid("counter does not reduce its base column");
        }
        if self.exact && self.input_reach() > self.output_capacity() {
            return invalid("output signature cannot represent every exact count");
        }
        Ok(())
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}->{:?}", self.name, self.input_sig, self.output_sig)
    }
}

/// A concrete counter cell with a fixed signature
pub trait Compressor: fmt::Debug + Send + Sync {
    /// The descriptor the scheduler plans with
    fn counter(&self) -> &Counter;

    /// Emit the cell.
    ///
    /// `inputs` are ordered column-major per the input signature; the
    /// returned bits are column-major per the output signature. Treated
    /// as an opaque pure function by the scheduler.
    fn realize(&self, netlist: &mut Netlist, inputs: &[NetId]) -> Vec<NetId>;
}

/// A counter cell whose chain length is chosen at placement time
pub trait VarLenCompressor: fmt::Debug + Send + Sync {
    /// Catalog name of the chain kind
    fn name(&self) -> &str;

    /// Whether every instantiation is exact
    fn exact(&self) -> bool;

    /// The descriptor of a chain of length `len`
    fn counter_at(&self, len: usize) -> Counter;

    /// Emit a chain of length `len`; input/output ordering as in
    /// [`Compressor::realize`]
    fn realize(&self, netlist: &mut Netlist, len: usize, inputs: &[NetId]) -> Vec<NetId>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fa() -> Counter {
        Counter::new("fa", vec![3], vec![1, 1], Some(2.0), true)
    }

    #[test]
    fn test_metrics() {
        let fa = fa();
        assert_eq!(fa.input_bits(), 3);
        assert_eq!(fa.output_bits(), 2);
        assert!((fa.strength() - 1.5).abs() < 1e-9);
        assert!((fa.efficiency() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_cost_ranks_last() {
        let free = Counter::new("x", vec![3], vec![1, 1], None, true);
        assert_eq!(free.efficiency(), f64::NEG_INFINITY);
        assert!(fa().efficiency() > free.efficiency());
    }

    #[test]
    fn test_half_adder_detection() {
        let ha = Counter::new("ha", vec![2], vec![1, 1], Some(1.0), true);
        assert!(ha.is_half_adder());
        assert!(!fa().is_half_adder());
        let two_col = Counter::new("x", vec![2, 1], vec![1, 1], Some(1.0), true);
        assert!(!two_col.is_half_adder());
        // trailing zeros are trimmed at construction
        let trimmed = Counter::new("ha2", vec![2, 0], vec![1, 1], Some(1.0), true);
        assert!(trimmed.is_half_adder());
    }

    #[test]
    fn test_validation() {
        assert!(fa().validate().is_ok());
        let ha = Counter::new("ha", vec![2], vec![1, 1], Some(1.0), true);
        assert!(ha.validate().is_ok());

        let growing = Counter::new("bad", vec![2], vec![1, 1, 1], Some(1.0), false);
        assert!(growing.validate().is_err());

        let no_reduction = Counter::new("id", vec![1], vec![1], Some(1.0), true);
        assert!(no_reduction.validate().is_err());

        // an exact 4:2 with capacity 3 cannot count to 4
        let lossy = Counter::new("bad42", vec![4], vec![1, 1], Some(1.0), true);
        assert!(lossy.validate().is_err());
        // the same shape is fine when declared approximate
        let approx = Counter::new("approx42", vec![4], vec![1, 1], Some(1.0), false);
        assert!(approx.validate().is_ok());
    }

    #[test]
    fn test_columns_spanned() {
        assert_eq!(fa().columns_spanned(), 2);
        let c42 = Counter::new("c42", vec![5], vec![1, 2], Some(3.0), true);
        assert_eq!(c42.columns_spanned(), 2);
    }
}
