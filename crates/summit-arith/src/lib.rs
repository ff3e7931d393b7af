//! SUMMIT arith - Adder generators
//!
//! Structural generators for binary addition:
//! - Ripple-carry and 4-bit-group carry-lookahead two-operand adders
//! - Carry-save 3:2 reduction
//! - Multi-operand summation (carry-save tree followed by a final adder)
//!
//! All generators emit gates into a [`summit_netlist::Netlist`] and return
//! the result as little-endian bit vectors.

mod adder;
mod sum;

pub use adder::{carry_lookahead_add, full_adder, half_adder, ripple_carry_add, AdderKind};
pub use sum::{carry_save_add, multi_operand_sum, resize};
