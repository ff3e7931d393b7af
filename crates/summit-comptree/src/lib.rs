//! SUMMIT comptree - Compressor-tree generation
//!
//! Generates multi-operand addition hardware by greedy scheduling of
//! counter cells over a per-column bit matrix. The entry points are
//! [`compress`] for an arbitrary weighted bit collection described by a
//! [`Signature`], and [`multiply`] for partial-product matrices built
//! from operand words.
//!
//! The flow per stage: rank the device's counter catalog by the selected
//! [`Metric`], walk the matrix from the least-significant over-goal
//! column, place the best fitting counter, and repeat until every column
//! height meets the goal. A carry-save final adder then reduces the
//! remaining rows to the binary sum. Approximate variants (column and
//! row truncation, OR-compression, miscounting cells) are opt-in per
//! generation request.

pub mod approx;
pub mod context;
pub mod counter;
pub mod error;
pub mod library;
pub mod matrix;
pub mod multiplier;
pub mod schedule;
pub mod signature;

pub use approx::Approximation;
pub use context::{Context, GenerationState, Metric, StageStats};
pub use counter::{Compressor, Counter, VarLenCompressor};
pub use error::{ComptreeError, Result};
pub use library::{Device, Library};
pub use matrix::BitMatrix;
pub use multiplier::multiply;
pub use schedule::{compress, CompressedSum};
pub use signature::{BitOrigin, MulShape, Signature};
