//! Bit matrix - per-column stacks of unconsumed signal handles
//!
//! One matrix instance lives per compression stage: the scheduler pops
//! counter inputs from the stage's input matrix and pushes the produced
//! bits into the stage's output matrix. Conservation of handles is the
//! scheduler's responsibility, the structure only moves bits.

use summit_netlist::{NetId, Netlist};

use crate::approx::{
    or_compression_width, row_limit, truncation_width, Approximation,
};
use crate::error::{ComptreeError, Result};
use crate::signature::{BitOrigin, Signature};

/// A mutable matrix of single-bit signal handles, one LIFO stack per column
#[derive(Debug, Clone, Default)]
pub struct BitMatrix {
    columns: Vec<Vec<NetId>>,
}

impl BitMatrix {
    /// An empty matrix with `width` columns
    pub fn new(width: usize) -> Self {
        Self {
            columns: vec![Vec::new(); width],
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Height of one column (0 beyond the current width)
    pub fn height(&self, column: usize) -> usize {
        self.columns.get(column).map_or(0, Vec::len)
    }

    /// All column heights
    pub fn heights(&self) -> Vec<u32> {
        self.columns.iter().map(|c| c.len() as u32).collect()
    }

    /// Total number of bits across all columns
    pub fn total(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Push a bit onto a column, growing the matrix as needed
    pub fn insert(&mut self, column: usize, net: NetId) {
        if column >= self.columns.len() {
            self.columns.resize_with(column + 1, Vec::new);
        }
        self.columns[column].push(net);
    }

    /// Pop the most recently inserted bit of a column
    pub fn pop(&mut self, column: usize) -> Option<NetId> {
        self.columns.get_mut(column).and_then(Vec::pop)
    }

    /// The bits of one column, bottom of the stack first
    pub fn column(&self, column: usize) -> &[NetId] {
        self.columns.get(column).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether every column height is within the goal
    pub fn meets_goal(&self, goal: u32) -> bool {
        self.columns.iter().all(|c| c.len() <= goal as usize)
    }

    /// Least-significant column whose height exceeds the goal
    pub fn first_over(&self, goal: u32) -> Option<usize> {
        self.columns.iter().position(|c| c.len() > goal as usize)
    }

    /// Move every remaining bit into `other`, preserving per-column order
    pub fn drain_into(&mut self, other: &mut BitMatrix) {
        for (column, stack) in self.columns.iter_mut().enumerate() {
            for net in stack.drain(..) {
                other.insert(column, net);
            }
        }
    }
}

/// Build the initial matrix from a signature and its flat handle list.
///
/// Handles are column-major, least-significant column first, and within a
/// column in row order (later bits end up nearer the top of the stack).
/// Approximation preprocessing applies here: row truncation filters bits
/// by their row of origin, column truncation drops whole columns, and
/// OR-compression folds a column into a single synthetic bit.
pub fn build_initial_matrix(
    netlist: &mut Netlist,
    signature: &Signature,
    bits: &[NetId],
    approximations: &[Approximation],
) -> Result<BitMatrix> {
    if bits.len() != signature.total() {
        return Err(ComptreeError::BitCountMismatch {
            expected: signature.total(),
            found: bits.len(),
        });
    }

    let truncated = truncation_width(approximations);
    let or_width = or_compression_width(approximations);
    let rows = row_limit(approximations);

    let mut matrix = BitMatrix::new(signature.column_count());
    let mut next = 0usize;
    for column in 0..signature.column_count() {
        let count = signature.count(column) as usize;
        let handles = &bits[next..next + count];
        next += count;

        let kept: Vec<NetId> = match rows {
            Some(limit) => {
                let origins = signature.column_origins(column);
                handles
                    .iter()
                    .zip(&origins)
                    .filter(|(_, origin)| match origin {
                        BitOrigin::Row { row, .. } => *row < limit,
                        BitOrigin::ConstantOne => true,
                    })
                    .map(|(&net, _)| net)
                    .collect()
            }
            None => handles.to_vec(),
        };

        if column < truncated {
            continue;
        }
        if column < or_width {
            if !kept.is_empty() {
                let folded = netlist.or_all(&kept);
                matrix.insert(column, folded);
            }
            continue;
        }
        for net in kept {
            matrix.insert(column, net);
        }
    }
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(netlist: &mut Netlist, count: usize) -> Vec<NetId> {
        netlist.inputs(count)
    }

    #[test]
    fn test_stack_order() {
        let mut matrix = BitMatrix::new(1);
        matrix.insert(0, NetId(5));
        matrix.insert(0, NetId(6));
        assert_eq!(matrix.pop(0), Some(NetId(6)));
        assert_eq!(matrix.pop(0), Some(NetId(5)));
        assert_eq!(matrix.pop(0), None);
    }

    #[test]
    fn test_growth_and_goal() {
        let mut matrix = BitMatrix::new(2);
        matrix.insert(4, NetId(2));
        assert_eq!(matrix.width(), 5);
        assert_eq!(matrix.height(3), 0);
        assert!(matrix.meets_goal(1));
        matrix.insert(4, NetId(3));
        assert_eq!(matrix.first_over(1), Some(4));
        assert!(matrix.meets_goal(2));
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut a = BitMatrix::new(1);
        a.insert(0, NetId(2));
        a.insert(0, NetId(3));
        let mut b = BitMatrix::new(1);
        b.insert(0, NetId(9));
        a.drain_into(&mut b);
        assert_eq!(b.column(0), &[NetId(9), NetId(2), NetId(3)]);
        assert_eq!(a.total(), 0);
    }

    #[test]
    fn test_build_plain() {
        let mut netlist = Netlist::new("t");
        let sig = Signature::new(vec![2, 1]);
        let bits = handles(&mut netlist, 3);
        let matrix = build_initial_matrix(&mut netlist, &sig, &bits, &[]).unwrap();
        assert_eq!(matrix.heights(), vec![2, 1]);
        assert_eq!(matrix.column(0), &[bits[0], bits[1]]);
        assert_eq!(matrix.column(1), &[bits[2]]);
    }

    #[test]
    fn test_build_count_mismatch() {
        let mut netlist = Netlist::new("t");
        let sig = Signature::new(vec![2, 1]);
        let bits = handles(&mut netlist, 2);
        let err = build_initial_matrix(&mut netlist, &sig, &bits, &[]);
        assert!(matches!(
            err,
            Err(ComptreeError::BitCountMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_column_truncation() {
        let mut netlist = Netlist::new("t");
        let sig = Signature::new(vec![3, 2]);
        let bits = handles(&mut netlist, 5);
        let approx = [Approximation::ColumnTruncation { width: 1 }];
        let matrix = build_initial_matrix(&mut netlist, &sig, &bits, &approx).unwrap();
        assert_eq!(matrix.heights(), vec![0, 2]);
    }

    #[test]
    fn test_or_compression() {
        let mut netlist = Netlist::new("t");
        let sig = Signature::new(vec![4, 2, 2]);
        let bits = handles(&mut netlist, 8);
        let approx = [Approximation::OrCompression { width: 2 }];
        let matrix = build_initial_matrix(&mut netlist, &sig, &bits, &approx).unwrap();
        // columns 0 and 1 fold to one synthetic bit each, column 2 untouched
        assert_eq!(matrix.heights(), vec![1, 1, 2]);
    }

    #[test]
    fn test_truncation_before_or_compression() {
        let mut netlist = Netlist::new("t");
        let sig = Signature::new(vec![4, 2, 2]);
        let bits = handles(&mut netlist, 8);
        let approx = [
            Approximation::OrCompression { width: 2 },
            Approximation::ColumnTruncation { width: 1 },
        ];
        let matrix = build_initial_matrix(&mut netlist, &sig, &bits, &approx).unwrap();
        assert_eq!(matrix.heights(), vec![0, 1, 2]);
    }

    #[test]
    fn test_row_truncation_filtering() {
        let mut netlist = Netlist::new("t");
        let sig = Signature::multiplier(2, 2, false);
        // counts are [1, 2, 1]
        let bits = handles(&mut netlist, 4);
        let approx = [Approximation::RowTruncation { rows: 1 }];
        let matrix = build_initial_matrix(&mut netlist, &sig, &bits, &approx).unwrap();
        // only row 0 survives: one bit at column 0, one at column 1
        assert_eq!(matrix.heights(), vec![1, 1, 0]);
    }
}
