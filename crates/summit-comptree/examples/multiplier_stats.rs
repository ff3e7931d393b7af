//! Generate a signed multiplier and print the per-stage schedule

use summit_comptree::{multiply, Context, Device};
use summit_netlist::Netlist;

fn main() {
    tracing_subscriber::fmt::init();

    let ctx = Context::for_device(Device::SevenSeries);
    let mut netlist = Netlist::new("mul16x16");
    let a = netlist.inputs(16);
    let b = netlist.inputs(16);
    let result = multiply(&mut netlist, &a, &b, true, &ctx).expect("generation failed");
    for (k, &bit) in result.bits().iter().enumerate() {
        netlist.add_output(&format!("p{k}"), bit);
    }

    println!(
        "16x16 signed multiplier on {}: {} gates, {} outputs, {} stages",
        ctx.library.name(),
        netlist.node_count(),
        netlist.outputs().len(),
        result.state().stage_count()
    );
    for (index, stage) in result.state().stages().iter().enumerate() {
        println!(
            "  stage {}: {} -> {} bits",
            index + 1,
            stage.bits_in,
            stage.bits_out
        );
        for (name, count) in &stage.placements {
            println!("    {count:>4} x {name}");
        }
    }
    println!("  final heights: {:?}", result.state().final_heights());
}
