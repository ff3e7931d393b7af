//! Carry-save reduction and multi-operand summation

use summit_netlist::{NetId, Netlist};

use crate::adder::{full_adder, ripple_carry_add};

/// 3:2 carry-save stage: reduces three operands to a sum word and a carry
/// word. The carry word is returned unshifted; it weighs one bit position
/// higher than the sum word.
pub fn carry_save_add(
    netlist: &mut Netlist,
    a: &[NetId],
    b: &[NetId],
    c: &[NetId],
) -> (Vec<NetId>, Vec<NetId>) {
    let width = a.len().max(b.len()).max(c.len());
    let mut sums = Vec::with_capacity(width);
    let mut carries = Vec::with_capacity(width);
    for i in 0..width {
        let x = a.get(i).copied().unwrap_or_else(|| netlist.zero());
        let y = b.get(i).copied().unwrap_or_else(|| netlist.zero());
        let z = c.get(i).copied().unwrap_or_else(|| netlist.zero());
        let (s, cy) = full_adder(netlist, x, y, z);
        sums.push(s);
        carries.push(cy);
    }
    (sums, carries)
}

/// Truncate or zero-extend a word to `width` bits
pub fn resize(netlist: &Netlist, mut word: Vec<NetId>, width: usize) -> Vec<NetId> {
    word.truncate(width);
    while word.len() < width {
        word.push(netlist.zero());
    }
    word
}

/// Sum an arbitrary number of operands into a `width`-bit result
///
/// Groups of three operands are fused through carry-save stages until two
/// remain, then a ripple-carry adder finishes the reduction. This is the
/// ternary-adder fusion device backends rely on; it never changes the
/// summed value.
pub fn multi_operand_sum(netlist: &mut Netlist, operands: &[Vec<NetId>], width: usize) -> Vec<NetId> {
    let mut pending: Vec<Vec<NetId>> = operands.to_vec();
    while pending.len() > 2 {
        let a = pending.remove(0);
        let b = pending.remove(0);
        let c = pending.remove(0);
        let (sums, carries) = carry_save_add(netlist, &a, &b, &c);
        let mut shifted = vec![netlist.zero()];
        shifted.extend(carries);
        pending.push(sums);
        pending.push(shifted);
    }
    let total = match pending.len() {
        0 => Vec::new(),
        1 => pending.remove(0),
        _ => {
            let b = pending.remove(1);
            let a = pending.remove(0);
            ripple_carry_add(netlist, &a, &b, None)
        }
    };
    resize(netlist, total, width)
}
