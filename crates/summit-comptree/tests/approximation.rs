//! Value-level semantics of the approximation transforms

use summit_comptree::{
    compress, multiply, Approximation, ComptreeError, Context, Device, Signature,
};
use summit_netlist::Netlist;

fn assignments(total: usize) -> impl Iterator<Item = Vec<bool>> {
    (0..(1u32 << total)).map(move |a| (0..total).map(|i| (a >> i) & 1 != 0).collect())
}

fn column_count(signature: &Signature, values: &[bool], column: usize) -> u64 {
    let offset: usize = signature.counts()[..column]
        .iter()
        .map(|&c| c as usize)
        .sum();
    (0..signature.counts()[column] as usize)
        .filter(|&i| values[offset + i])
        .count() as u64
}

#[test]
fn column_truncation_zeroes_low_columns() {
    let signature = Signature::new(vec![2, 2, 2]);
    let ctx = Context::for_device(Device::Generic)
        .with_approximation(Approximation::ColumnTruncation { width: 1 });
    let mut netlist = Netlist::new("sum");
    let bits = netlist.inputs(signature.total());
    let result = compress(&mut netlist, &signature, &bits, &ctx).unwrap();
    for values in assignments(signature.total()) {
        let expected =
            2 * column_count(&signature, &values, 1) + 4 * column_count(&signature, &values, 2);
        assert_eq!(netlist.eval_word(&values, result.bits()), expected);
    }
}

#[test]
fn or_compression_folds_columns() {
    let signature = Signature::new(vec![4, 2]);
    let ctx = Context::for_device(Device::Generic)
        .with_approximation(Approximation::OrCompression { width: 1 });
    let mut netlist = Netlist::new("sum");
    let bits = netlist.inputs(signature.total());
    let result = compress(&mut netlist, &signature, &bits, &ctx).unwrap();
    for values in assignments(signature.total()) {
        let folded = u64::from(column_count(&signature, &values, 0) > 0);
        let expected = folded + 2 * column_count(&signature, &values, 1);
        assert_eq!(netlist.eval_word(&values, result.bits()), expected);
    }
}

#[test]
fn transform_order_does_not_matter() {
    let signature = Signature::new(vec![3, 3, 2]);
    let forward = Context::for_device(Device::Generic)
        .with_approximation(Approximation::ColumnTruncation { width: 1 })
        .with_approximation(Approximation::OrCompression { width: 2 });
    let backward = Context::for_device(Device::Generic)
        .with_approximation(Approximation::OrCompression { width: 2 })
        .with_approximation(Approximation::ColumnTruncation { width: 1 });

    let mut nl_a = Netlist::new("a");
    let bits_a = nl_a.inputs(signature.total());
    let res_a = compress(&mut nl_a, &signature, &bits_a, &forward).unwrap();
    let mut nl_b = Netlist::new("b");
    let bits_b = nl_b.inputs(signature.total());
    let res_b = compress(&mut nl_b, &signature, &bits_b, &backward).unwrap();

    for values in assignments(signature.total()) {
        assert_eq!(
            nl_a.eval_word(&values, res_a.bits()),
            nl_b.eval_word(&values, res_b.bits())
        );
    }
}

#[test]
fn row_truncation_masks_multiplier_rows() {
    // keeping two rows of a 4x3 multiplier equals multiplying by the two
    // low bits of b
    let ctx = Context::for_device(Device::Generic)
        .with_approximation(Approximation::RowTruncation { rows: 2 });
    let mut netlist = Netlist::new("mul");
    let a = netlist.inputs(4);
    let b = netlist.inputs(3);
    let result = multiply(&mut netlist, &a, &b, false, &ctx).unwrap();
    for va in 0..16u64 {
        for vb in 0..8u64 {
            let mut values: Vec<bool> = (0..4).map(|i| (va >> i) & 1 != 0).collect();
            values.extend((0..3).map(|i| (vb >> i) & 1 != 0));
            let expected = va * (vb & 3);
            assert_eq!(netlist.eval_word(&values, result.bits()), expected);
        }
    }
}

#[test]
fn row_truncation_rejected_on_plain_signature() {
    let signature = Signature::new(vec![4, 4]);
    let ctx = Context::for_device(Device::Generic)
        .with_approximation(Approximation::RowTruncation { rows: 2 });
    let mut netlist = Netlist::new("sum");
    let bits = netlist.inputs(signature.total());
    let err = compress(&mut netlist, &signature, &bits, &ctx);
    assert!(matches!(
        err,
        Err(ComptreeError::IncompatibleApproximation { .. })
    ));
}

#[test]
fn miscounting_error_is_bounded() {
    // generic catalog, approximate cells admitted in column 0 only: the
    // OR cell undercounts a full column by at most three
    let signature = Signature::new(vec![4, 4]);
    let ctx = Context::for_device(Device::Generic)
        .with_height_goal(2)
        .with_approximation(Approximation::Miscounting { width: 1 });
    let mut netlist = Netlist::new("sum");
    let bits = netlist.inputs(signature.total());
    let result = compress(&mut netlist, &signature, &bits, &ctx).unwrap();
    for values in assignments(signature.total()) {
        let count0 = column_count(&signature, &values, 0);
        let expected = count0 + 2 * column_count(&signature, &values, 1);
        let actual = netlist.eval_word(&values, result.bits());
        assert!(actual <= expected);
        assert!(expected - actual <= 3);
        if count0 <= 1 {
            assert_eq!(actual, expected);
        }
    }
}
