//! Multiplier generation via partial-product compression
//!
//! Builds the partial-product matrix of `a * b` directly from the
//! analytic signature, compresses it, and truncates the sum to the
//! product width. Signed operands use the modified Baugh-Wooley
//! recoding, so the same compression path handles both signednesses and
//! the result is exact modulo `2^(wa + wb)`.

use summit_netlist::{NetId, Netlist};

use crate::context::Context;
use crate::error::Result;
use crate::schedule::{compress, CompressedSum};
use crate::signature::{BitOrigin, Signature};

/// Generate a `a.len() x b.len()` multiplier.
///
/// The returned sum is `a.len() + b.len()` bits wide. Operand widths
/// must be nonzero. Approximations configured in the context apply to
/// the partial-product matrix; in particular row truncation drops the
/// partial products of the most-significant multiplier bits.
pub fn multiply(
    netlist: &mut Netlist,
    a: &[NetId],
    b: &[NetId],
    signed: bool,
    ctx: &Context,
) -> Result<CompressedSum> {
    let signature = Signature::multiplier(a.len(), b.len(), signed);
    let mut bits = Vec::with_capacity(signature.total());
    for column in 0..signature.column_count() {
        for origin in signature.column_origins(column) {
            let net = match origin {
                BitOrigin::Row { row, complement } => {
                    let term = netlist.and(a[column - row], b[row]);
                    if complement {
                        netlist.not(term)
                    } else {
                        term
                    }
                }
                BitOrigin::ConstantOne => netlist.one(),
            };
            bits.push(net);
        }
    }
    let result = compress(netlist, &signature, &bits, ctx)?;
    let width = a.len() + b.len();
    Ok(result.resized(netlist, width))
}
