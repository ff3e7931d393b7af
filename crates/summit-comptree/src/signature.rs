//! Signatures - per-bit-weight counts of a weighted bit collection
//!
//! A signature describes the shape of the summation problem: index = bit
//! weight (power of two), value = number of bits at that weight. Plain
//! signatures carry arbitrary counts; multiplier signatures are derived
//! analytically from the operand widths and signedness, including the
//! constant-one insertions of the modified Baugh-Wooley recoding.

use serde::{Deserialize, Serialize};

use crate::error::{ComptreeError, Result};

/// Shape of a multiplication underlying a signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulShape {
    /// Width of the multiplicand `a`
    pub width_a: usize,
    /// Width of the multiplier `b` (one partial-product row per bit)
    pub width_b: usize,
    /// Two's-complement operands (modified Baugh-Wooley recoding)
    pub signed: bool,
    /// Number of partial-product rows retained (`width_b` when untruncated)
    pub rows: usize,
}

/// Origin of one bit of a multiplier signature column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrigin {
    /// Partial product `a[col - row] & b[row]`, possibly complemented
    Row { row: usize, complement: bool },
    /// Constant-one correction bit of the Baugh-Wooley recoding
    ConstantOne,
}

/// Per-bit-weight count description of a collection of bits to be summed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    counts: Vec<u32>,
    shape: Option<MulShape>,
}

impl Signature {
    /// A plain signature from explicit per-weight counts
    pub fn new(counts: Vec<u32>) -> Self {
        Self { counts, shape: None }
    }

    /// The signature of a `width_a` x `width_b` multiplication
    pub fn multiplier(width_a: usize, width_b: usize, signed: bool) -> Self {
        assert!(width_a > 0 && width_b > 0, "operand widths must be nonzero");
        let shape = MulShape {
            width_a,
            width_b,
            signed,
            rows: width_b,
        };
        Self::from_shape(shape)
    }

    fn from_shape(shape: MulShape) -> Self {
        let width = shape.width_a + shape.width_b;
        let mut counts = vec![0u32; width];
        for (column, count) in counts.iter_mut().enumerate() {
            *count = column_origins(&shape, column).len() as u32;
        }
        while counts.last() == Some(&0) {
            counts.pop();
        }
        Self {
            counts,
            shape: Some(shape),
        }
    }

    /// Recompute a multiplier signature as if only `rows` partial-product
    /// rows existed. Fails on plain signatures.
    pub fn with_rows(&self, rows: usize) -> Result<Self> {
        match self.shape {
            Some(shape) => Ok(Self::from_shape(MulShape {
                rows: rows.min(shape.width_b),
                ..shape
            })),
            None => Err(ComptreeError::IncompatibleApproximation {
                approx: "row_truncation".to_string(),
                reason: "signature is not derived from a multiplication".to_string(),
            }),
        }
    }

    /// Per-weight bit counts
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Number of columns (index of the highest weight plus one)
    pub fn column_count(&self) -> usize {
        self.counts.len()
    }

    /// Bit count at one weight
    pub fn count(&self, column: usize) -> u32 {
        self.counts.get(column).copied().unwrap_or(0)
    }

    /// Total number of bits
    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    /// Maximum possible weighted sum
    pub fn max_sum(&self) -> u128 {
        self.counts
            .iter()
            .enumerate()
            .map(|(w, &c)| (c as u128) << w)
            .sum()
    }

    /// Smallest width that can hold every possible weighted sum
    pub fn output_width(&self) -> usize {
        let max = self.max_sum();
        (128 - max.leading_zeros()) as usize
    }

    /// Whether this signature is derived from a multiplication
    pub fn is_multiplier(&self) -> bool {
        self.shape.is_some()
    }

    /// The multiplication shape, if any
    pub fn shape(&self) -> Option<&MulShape> {
        self.shape.as_ref()
    }

    /// Origins of the bits in one column, in insertion order.
    /// Empty for plain signatures.
    pub fn column_origins(&self, column: usize) -> Vec<BitOrigin> {
        match &self.shape {
            Some(shape) => column_origins(shape, column),
            None => Vec::new(),
        }
    }
}

/// Enumerate the bits of one column of a multiplication.
///
/// Unsigned operands contribute one AND term per `(i, j)` with
/// `i + j = column`. Signed operands follow the modified Baugh-Wooley
/// recoding: terms involving exactly one MSB are complemented, and
/// constant ones are inserted at columns `wa + wb - 1`, `wa - 1` and
/// `wb - 1` (the recoding constant `2^(wa+wb-1) + 2^(wa-1) + 2^(wb-1)`
/// taken modulo `2^(wa+wb)`).
fn column_origins(shape: &MulShape, column: usize) -> Vec<BitOrigin> {
    let MulShape {
        width_a,
        width_b,
        signed,
        rows,
    } = *shape;
    let mut origins = Vec::new();
    let lo = column.saturating_sub(width_a - 1);
    for row in lo..rows.min(width_b).min(column + 1) {
        let i = column - row;
        let complement = signed && ((i == width_a - 1) ^ (row == width_b - 1));
        origins.push(BitOrigin::Row { row, complement });
    }
    if signed {
        let constants = [width_a + width_b - 1, width_a - 1, width_b - 1];
        for c in constants {
            if c == column {
                origins.push(BitOrigin::ConstantOne);
            }
        }
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_totals() {
        let sig = Signature::new(vec![3, 0, 2]);
        assert_eq!(sig.total(), 5);
        assert_eq!(sig.max_sum(), 3 + 8);
        assert_eq!(sig.output_width(), 4);
        assert!(!sig.is_multiplier());
        assert!(sig.column_origins(0).is_empty());
    }

    #[test]
    fn test_output_width_empty() {
        assert_eq!(Signature::new(vec![]).output_width(), 0);
        assert_eq!(Signature::new(vec![1]).output_width(), 1);
        assert_eq!(Signature::new(vec![2]).output_width(), 2);
        assert_eq!(Signature::new(vec![3]).output_width(), 2);
        assert_eq!(Signature::new(vec![4]).output_width(), 3);
    }

    #[test]
    fn test_unsigned_multiplier_counts() {
        // 4x4: the classic 1,2,3,4,3,2,1 diamond
        let sig = Signature::multiplier(4, 4, false);
        assert_eq!(sig.counts(), &[1, 2, 3, 4, 3, 2, 1]);
        assert_eq!(sig.total(), 16);
        assert_eq!(sig.max_sum(), 15 * 15);
        assert_eq!(sig.output_width(), 8);
    }

    #[test]
    fn test_signed_multiplier_constants() {
        let sig = Signature::multiplier(4, 4, true);
        // 16 AND/NAND terms plus constants at columns 7, 3, 3
        assert_eq!(sig.total(), 16 + 3);
        assert_eq!(sig.count(3), 4 + 2);
        assert_eq!(sig.count(7), 1);
    }

    #[test]
    fn test_signed_complement_pattern() {
        let sig = Signature::multiplier(2, 2, true);
        // column 1 holds a0*b1 and a1*b0, both complemented
        let origins = sig.column_origins(1);
        let complemented = origins
            .iter()
            .filter(|o| matches!(o, BitOrigin::Row { complement: true, .. }))
            .count();
        assert_eq!(complemented, 2);
        // column 2 holds the positive MSB x MSB term
        assert!(sig
            .column_origins(2)
            .contains(&BitOrigin::Row { row: 1, complement: false }));
    }

    #[test]
    fn test_row_truncation() {
        let sig = Signature::multiplier(4, 3, false);
        let truncated = sig.with_rows(2).unwrap();
        // rows 0 and 1 only: column w holds min coverage of two rows
        assert_eq!(truncated.counts(), &[1, 2, 2, 2, 1]);
        assert_eq!(truncated.total(), 8);
    }

    #[test]
    fn test_row_truncation_plain_rejected() {
        let sig = Signature::new(vec![4]);
        assert!(sig.with_rows(1).is_err());
    }
}
