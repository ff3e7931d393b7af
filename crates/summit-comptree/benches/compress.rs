//! Generation performance benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use summit_comptree::{compress, multiply, Context, Device, Signature};
use summit_netlist::Netlist;

fn benchmark_multiplier(c: &mut Criterion) {
    let mut group = c.benchmark_group("multiplier");

    for width in [8usize, 16, 32] {
        for device in [Device::Generic, Device::Asic, Device::SevenSeries] {
            let id = format!("{}x{}_{}", width, width, device.name());
            group.bench_with_input(BenchmarkId::from_parameter(id), &width, |b, &width| {
                let ctx = Context::for_device(device);
                b.iter(|| {
                    let mut netlist = Netlist::new("mul");
                    let a = netlist.inputs(width);
                    let bb = netlist.inputs(width);
                    let result = multiply(&mut netlist, &a, &bb, true, &ctx).unwrap();
                    black_box(result.bits().len())
                });
            });
        }
    }
    group.finish();
}

fn benchmark_tall_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("tall_signature");

    for height in [32u32, 128] {
        let signature = Signature::new(vec![height; 16]);
        let id = format!("16x{height}");
        group.bench_with_input(BenchmarkId::from_parameter(id), &signature, |b, signature| {
            let ctx = Context::for_device(Device::Versal);
            b.iter(|| {
                let mut netlist = Netlist::new("sum");
                let bits = netlist.inputs(signature.total());
                let result = compress(&mut netlist, signature, &bits, &ctx).unwrap();
                black_box(result.state().stage_count())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_multiplier, benchmark_tall_signature);
criterion_main!(benches);
