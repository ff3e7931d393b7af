//! Two-operand adder generators
//!
//! Both architectures produce the same function; they differ in gate depth
//! and count. Operands are little-endian and may have different widths, the
//! shorter one is treated as zero-extended. The result carries one extra
//! bit for the carry out.

use summit_netlist::{NetId, Netlist};

/// Two-operand adder architectures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdderKind {
    /// Chain of full adders - O(n) delay, smallest area
    RippleCarry,
    /// 4-bit group carry lookahead - flattened in-group carries
    CarryLookahead,
}

impl AdderKind {
    /// Generate an adder of this architecture
    pub fn generate(
        &self,
        netlist: &mut Netlist,
        a: &[NetId],
        b: &[NetId],
        carry_in: Option<NetId>,
    ) -> Vec<NetId> {
        match self {
            AdderKind::RippleCarry => ripple_carry_add(netlist, a, b, carry_in),
            AdderKind::CarryLookahead => carry_lookahead_add(netlist, a, b, carry_in),
        }
    }

    /// Rough delay estimate in gate levels
    pub fn estimate_delay(&self, width: usize) -> usize {
        match self {
            AdderKind::RippleCarry => 2 * width,
            AdderKind::CarryLookahead => 4 + 2 * width.div_ceil(4),
        }
    }

    /// Rough area estimate in equivalent two-input gates
    pub fn estimate_area(&self, width: usize) -> usize {
        match self {
            AdderKind::RippleCarry => 5 * width,
            AdderKind::CarryLookahead => 9 * width,
        }
    }

    /// Architecture name
    pub fn name(&self) -> &'static str {
        match self {
            AdderKind::RippleCarry => "ripple_carry",
            AdderKind::CarryLookahead => "carry_lookahead",
        }
    }
}

/// Half adder: returns `(sum, carry)`
pub fn half_adder(netlist: &mut Netlist, a: NetId, b: NetId) -> (NetId, NetId) {
    (netlist.xor(a, b), netlist.and(a, b))
}

/// Full adder: returns `(sum, carry)`
pub fn full_adder(netlist: &mut Netlist, a: NetId, b: NetId, c: NetId) -> (NetId, NetId) {
    let axb = netlist.xor(a, b);
    let sum = netlist.xor(axb, c);
    let ab = netlist.and(a, b);
    let cx = netlist.and(c, axb);
    (sum, netlist.or(ab, cx))
}

fn operand_bit(netlist: &Netlist, operand: &[NetId], index: usize) -> NetId {
    operand.get(index).copied().unwrap_or_else(|| netlist.zero())
}

/// Ripple-carry adder; result has `max(a, b) + 1` bits
pub fn ripple_carry_add(
    netlist: &mut Netlist,
    a: &[NetId],
    b: &[NetId],
    carry_in: Option<NetId>,
) -> Vec<NetId> {
    let width = a.len().max(b.len());
    let mut carry = carry_in.unwrap_or_else(|| netlist.zero());
    let mut sum = Vec::with_capacity(width + 1);
    for i in 0..width {
        let x = operand_bit(netlist, a, i);
        let y = operand_bit(netlist, b, i);
        let (s, c) = full_adder(netlist, x, y, carry);
        sum.push(s);
        carry = c;
    }
    sum.push(carry);
    sum
}

/// Carry into bit `end` of a group whose base carry is `base`, flattened
/// to two logic levels over the group's generate/propagate nets.
fn lookahead_carry(
    netlist: &mut Netlist,
    base: NetId,
    gen: &[NetId],
    prop: &[NetId],
    start: usize,
    end: usize,
) -> NetId {
    // p[start..end] * base
    let mut acc = base;
    for k in start..end {
        acc = netlist.and(acc, prop[k]);
    }
    // g[j] * p[j+1..end]
    for j in start..end {
        let mut term = gen[j];
        for k in j + 1..end {
            term = netlist.and(term, prop[k]);
        }
        acc = netlist.or(acc, term);
    }
    acc
}

/// 4-bit-group carry-lookahead adder; result has `max(a, b) + 1` bits
pub fn carry_lookahead_add(
    netlist: &mut Netlist,
    a: &[NetId],
    b: &[NetId],
    carry_in: Option<NetId>,
) -> Vec<NetId> {
    let width = a.len().max(b.len());
    let mut gen = Vec::with_capacity(width);
    let mut prop = Vec::with_capacity(width);
    for i in 0..width {
        let x = operand_bit(netlist, a, i);
        let y = operand_bit(netlist, b, i);
        gen.push(netlist.and(x, y));
        prop.push(netlist.xor(x, y));
    }

    let mut carry = carry_in.unwrap_or_else(|| netlist.zero());
    let mut sum = Vec::with_capacity(width + 1);
    for start in (0..width).step_by(4) {
        let end = (start + 4).min(width);
        for i in start..end {
            let c = lookahead_carry(netlist, carry, &gen, &prop, start, i);
            sum.push(netlist.xor(prop[i], c));
        }
        carry = lookahead_carry(netlist, carry, &gen, &prop, start, end);
    }
    sum.push(carry);
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_adder(kind: AdderKind, width: usize) {
        let mut netlist = Netlist::new("adder");
        let a = netlist.inputs(width);
        let b = netlist.inputs(width);
        let sum = kind.generate(&mut netlist, &a, &b, None);
        assert_eq!(sum.len(), width + 1);

        for va in 0..(1u64 << width) {
            for vb in 0..(1u64 << width) {
                let mut inputs = Vec::new();
                for i in 0..width {
                    inputs.push((va >> i) & 1 != 0);
                }
                for i in 0..width {
                    inputs.push((vb >> i) & 1 != 0);
                }
                assert_eq!(netlist.eval_word(&inputs, &sum), va + vb);
            }
        }
    }

    #[test]
    fn test_ripple_carry_exhaustive() {
        for width in 1..=4 {
            check_adder(AdderKind::RippleCarry, width);
        }
    }

    #[test]
    fn test_carry_lookahead_exhaustive() {
        for width in 1..=5 {
            check_adder(AdderKind::CarryLookahead, width);
        }
    }

    #[test]
    fn test_carry_in() {
        let mut netlist = Netlist::new("adder");
        let a = netlist.inputs(3);
        let b = netlist.inputs(3);
        let cin = netlist.one();
        let sum = ripple_carry_add(&mut netlist, &a, &b, Some(cin));
        let inputs = vec![true, false, false, true, true, false]; // a = 1, b = 3
        assert_eq!(netlist.eval_word(&inputs, &sum), 1 + 3 + 1);
    }

    #[test]
    fn test_mixed_widths() {
        let mut netlist = Netlist::new("adder");
        let a = netlist.inputs(4);
        let b = netlist.inputs(2);
        let sum = carry_lookahead_add(&mut netlist, &a, &b, None);
        let inputs = vec![true, false, false, true, true, true]; // a = 9, b = 3
        assert_eq!(netlist.eval_word(&inputs, &sum), 12);
    }

    #[test]
    fn test_estimates_monotonic() {
        for kind in [AdderKind::RippleCarry, AdderKind::CarryLookahead] {
            assert!(kind.estimate_delay(32) > kind.estimate_delay(8));
            assert!(kind.estimate_area(32) > kind.estimate_area(8));
        }
    }
}
