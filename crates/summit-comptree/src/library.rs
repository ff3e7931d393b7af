//! Device counter libraries
//!
//! Each target device exposes the same contract: a set of exact counter
//! cells, a set of approximate ones, and optional variable-length chains.
//! The scheduler only ever sees descriptors and the two realization
//! traits; which gates implement a cell is decided here, once per kind.
//!
//! Custom catalogs can also be loaded from TOML, the generic realization
//! then counts the inputs with a small adder reduction. TOML counters are
//! restricted to binary output columns (at most one bit per output
//! column) because that is the only shape the generic realization can
//! express.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use summit_arith::{full_adder, half_adder};
use summit_netlist::{NetId, Netlist};

use crate::counter::{Compressor, Counter, VarLenCompressor};
use crate::error::{ComptreeError, Result};

// ============================================================================
// Devices
// ============================================================================

/// Supported target device families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Technology-independent gate costs
    Generic,
    /// Standard-cell flow
    Asic,
    /// Xilinx 7-series LUT6 + CARRY4 fabric
    SevenSeries,
    /// AMD Versal with 8-input lookahead logic
    Versal,
    /// Intel ALM fabric
    Intel,
}

impl Device {
    /// Terminal row count the device's final adder prefers
    pub fn default_height_goal(self) -> u32 {
        match self {
            // two-operand carry-lookahead finish
            Device::Asic => 2,
            // FPGA fabrics fuse ternary adders
            Device::Generic | Device::SevenSeries | Device::Versal | Device::Intel => 3,
        }
    }

    /// Device name used in library identifiers
    pub fn name(self) -> &'static str {
        match self {
            Device::Generic => "generic",
            Device::Asic => "asic",
            Device::SevenSeries => "seven_series",
            Device::Versal => "versal",
            Device::Intel => "intel",
        }
    }
}

// ============================================================================
// Concrete cells
// ============================================================================

/// 2:2 half adder
#[derive(Debug)]
pub struct HalfAdder {
    counter: Counter,
}

impl HalfAdder {
    pub fn new(cost: f64) -> Self {
        Self {
            counter: Counter::new("ha", vec![2], vec![1, 1], Some(cost), true),
        }
    }
}

impl Compressor for HalfAdder {
    fn counter(&self) -> &Counter {
        &self.counter
    }

    fn realize(&self, netlist: &mut Netlist, inputs: &[NetId]) -> Vec<NetId> {
        let (sum, carry) = half_adder(netlist, inputs[0], inputs[1]);
        vec![sum, carry]
    }
}

/// 3:2 full adder
#[derive(Debug)]
pub struct FullAdder {
    counter: Counter,
}

impl FullAdder {
    pub fn new(cost: f64) -> Self {
        Self {
            counter: Counter::new("fa", vec![3], vec![1, 1], Some(cost), true),
        }
    }
}

impl Compressor for FullAdder {
    fn counter(&self) -> &Counter {
        &self.counter
    }

    fn realize(&self, netlist: &mut Netlist, inputs: &[NetId]) -> Vec<NetId> {
        let (sum, carry) = full_adder(netlist, inputs[0], inputs[1], inputs[2]);
        vec![sum, carry]
    }
}

/// Classic 4:2 compressor: four bits plus carry-in, one sum and two
/// weight-1 carries, built from two chained full adders
#[derive(Debug)]
pub struct Compressor42 {
    counter: Counter,
}

impl Compressor42 {
    pub fn new(cost: f64) -> Self {
        Self {
            counter: Counter::new("c42", vec![5], vec![1, 2], Some(cost), true),
        }
    }
}

impl Compressor for Compressor42 {
    fn counter(&self) -> &Counter {
        &self.counter
    }

    fn realize(&self, netlist: &mut Netlist, inputs: &[NetId]) -> Vec<NetId> {
        let (s1, c1) = full_adder(netlist, inputs[0], inputs[1], inputs[2]);
        let (sum, c2) = full_adder(netlist, s1, inputs[3], inputs[4]);
        vec![sum, c1, c2]
    }
}

/// Generic single-output-per-column counter, realized by an internal
/// full/half adder reduction of the weighted input count
#[derive(Debug)]
pub struct GenericCounter {
    counter: Counter,
}

impl GenericCounter {
    /// Wrap a descriptor; fails when an output column carries more than
    /// one bit, which the generic reduction cannot express
    pub fn new(counter: Counter) -> Result<Self> {
        counter.validate()?;
        if counter.output_sig.iter().any(|&c| c != 1) {
            return Err(ComptreeError::InvalidCounter {
                name: counter.name.clone(),
                reason: "generic realization requires exactly one bit per output column"
                    .to_string(),
            });
        }
        Ok(Self { counter })
    }

    /// An exact `inputs`-to-`outputs` single-column counter, e.g. 6:3
    pub fn popcount(name: &str, inputs: u32, outputs: u32, cost: f64) -> Self {
        let counter = Counter::new(name, vec![inputs], vec![1; outputs as usize], Some(cost), true);
        Self { counter }
    }

    /// A truncating single-column counter that drops count bits above
    /// `outputs`, e.g. the approximate 8:3
    pub fn truncating(name: &str, inputs: u32, outputs: u32, cost: f64) -> Self {
        let counter =
            Counter::new(name, vec![inputs], vec![1; outputs as usize], Some(cost), false);
        Self { counter }
    }
}

/// Reduce per-column bit stacks to at most one bit per column
fn weighted_sum(netlist: &mut Netlist, mut columns: Vec<Vec<NetId>>) -> Vec<NetId> {
    let mut w = 0;
    while w < columns.len() {
        while columns[w].len() > 1 {
            if columns[w].len() >= 3 {
                let a = columns[w].pop().expect("column has three bits");
                let b = columns[w].pop().expect("column has three bits");
                let c = columns[w].pop().expect("column has three bits");
                let (s, carry) = full_adder(netlist, a, b, c);
                columns[w].push(s);
                if w + 1 == columns.len() {
                    columns.push(Vec::new());
                }
                columns[w + 1].push(carry);
            } else {
                let a = columns[w].pop().expect("column has two bits");
                let b = columns[w].pop().expect("column has two bits");
                let (s, carry) = half_adder(netlist, a, b);
                columns[w].push(s);
                if w + 1 == columns.len() {
                    columns.push(Vec::new());
                }
                columns[w + 1].push(carry);
            }
        }
        w += 1;
    }
    let zero = netlist.zero();
    columns
        .into_iter()
        .map(|mut column| column.pop().unwrap_or(zero))
        .collect()
}

impl Compressor for GenericCounter {
    fn counter(&self) -> &Counter {
        &self.counter
    }

    fn realize(&self, netlist: &mut Netlist, inputs: &[NetId]) -> Vec<NetId> {
        let mut columns = Vec::with_capacity(self.counter.input_sig.len());
        let mut next = 0usize;
        for &count in &self.counter.input_sig {
            let column = inputs[next..next + count as usize].to_vec();
            next += count as usize;
            columns.push(column);
        }
        let sum = weighted_sum(netlist, columns);
        let zero = netlist.zero();
        // count bits beyond the declared output width are dropped; the
        // exactness validation guarantees this only happens for
        // truncating counters
        (0..self.counter.output_sig.len())
            .map(|k| sum.get(k).copied().unwrap_or(zero))
            .collect()
    }
}

/// Approximate 4:1 counter: the logical OR of four bits
#[derive(Debug)]
pub struct OrCounter {
    counter: Counter,
}

impl OrCounter {
    pub fn new(name: &str, inputs: u32, cost: f64) -> Self {
        Self {
            counter: Counter::new(name, vec![inputs], vec![1], Some(cost), false),
        }
    }
}

impl Compressor for OrCounter {
    fn counter(&self) -> &Counter {
        &self.counter
    }

    fn realize(&self, netlist: &mut Netlist, inputs: &[NetId]) -> Vec<NetId> {
        vec![netlist.or_all(inputs)]
    }
}

/// Approximate 4:2 compressor without carry chaining: pairwise XOR sum
/// and a lossy OR-of-ANDs carry
#[derive(Debug)]
pub struct ApproxCompressor42 {
    counter: Counter,
}

impl ApproxCompressor42 {
    pub fn new(cost: f64) -> Self {
        Self {
            counter: Counter::new("approx42", vec![4], vec![1, 1], Some(cost), false),
        }
    }
}

impl Compressor for ApproxCompressor42 {
    fn counter(&self) -> &Counter {
        &self.counter
    }

    fn realize(&self, netlist: &mut Netlist, inputs: &[NetId]) -> Vec<NetId> {
        let ab = netlist.xor(inputs[0], inputs[1]);
        let cd = netlist.xor(inputs[2], inputs[3]);
        let sum = netlist.xor(ab, cd);
        let and_ab = netlist.and(inputs[0], inputs[1]);
        let and_cd = netlist.and(inputs[2], inputs[3]);
        let carry = netlist.or(and_ab, and_cd);
        vec![sum, carry]
    }
}

/// Variable-length ripple chain: a full adder at the base column followed
/// by `len - 1` full-adder stages consuming two bits per column, the way
/// FPGA carry chains are packed
#[derive(Debug)]
pub struct CarryChain {
    name: String,
    stage_cost: f64,
}

impl CarryChain {
    pub fn new(name: &str, stage_cost: f64) -> Self {
        Self {
            name: name.to_string(),
            stage_cost,
        }
    }
}

impl VarLenCompressor for CarryChain {
    fn name(&self) -> &str {
        &self.name
    }

    fn exact(&self) -> bool {
        true
    }

    fn counter_at(&self, len: usize) -> Counter {
        let mut input_sig = vec![2u32; len];
        input_sig[0] = 3;
        Counter::new(
            &self.name,
            input_sig,
            vec![1; len + 1],
            Some(self.stage_cost * len as f64),
            true,
        )
    }

    fn realize(&self, netlist: &mut Netlist, len: usize, inputs: &[NetId]) -> Vec<NetId> {
        let (s0, mut carry) = full_adder(netlist, inputs[0], inputs[1], inputs[2]);
        let mut outputs = vec![s0];
        for stage in 1..len {
            let a = inputs[3 + 2 * (stage - 1)];
            let b = inputs[3 + 2 * (stage - 1) + 1];
            let (s, c) = full_adder(netlist, a, b, carry);
            outputs.push(s);
            carry = c;
        }
        outputs.push(carry);
        outputs
    }
}

// ============================================================================
// Libraries
// ============================================================================

/// A named catalog of counter cells
#[derive(Debug, Clone)]
pub struct Library {
    name: String,
    counters: Vec<Arc<dyn Compressor>>,
    varlen: Vec<Arc<dyn VarLenCompressor>>,
}

impl Library {
    /// Build a custom library, validating every descriptor
    pub fn custom(
        name: &str,
        counters: Vec<Arc<dyn Compressor>>,
        varlen: Vec<Arc<dyn VarLenCompressor>>,
    ) -> Result<Self> {
        for compressor in &counters {
            compressor.counter().validate()?;
        }
        for chain in &varlen {
            // spot-check a few lengths; the signature shape is uniform
            for len in 2..=4 {
                chain.counter_at(len).validate()?;
            }
        }
        Ok(Self {
            name: name.to_string(),
            counters,
            varlen,
        })
    }

    /// The built-in library of a target device
    pub fn for_device(device: Device) -> Self {
        let counters: Vec<Arc<dyn Compressor>> = match device {
            Device::Generic => vec![
                Arc::new(HalfAdder::new(1.0)),
                Arc::new(FullAdder::new(2.0)),
                Arc::new(Compressor42::new(4.0)),
                Arc::new(GenericCounter::popcount("c63", 6, 3, 6.0)),
                Arc::new(GenericCounter::popcount("c73", 7, 3, 7.0)),
                Arc::new(OrCounter::new("or4", 4, 0.5)),
                Arc::new(ApproxCompressor42::new(1.5)),
                Arc::new(GenericCounter::truncating("c83", 8, 3, 6.0)),
            ],
            Device::Asic => vec![
                Arc::new(HalfAdder::new(0.8)),
                Arc::new(FullAdder::new(1.5)),
                Arc::new(Compressor42::new(2.5)),
                Arc::new(GenericCounter::popcount("c53", 5, 3, 3.5)),
                Arc::new(GenericCounter::popcount("c63", 6, 3, 4.5)),
                Arc::new(GenericCounter::popcount("c73", 7, 3, 5.5)),
                Arc::new(OrCounter::new("or4", 4, 0.4)),
                Arc::new(ApproxCompressor42::new(1.2)),
            ],
            Device::SevenSeries => vec![
                Arc::new(HalfAdder::new(0.5)),
                Arc::new(FullAdder::new(1.0)),
                Arc::new(Compressor42::new(1.5)),
                Arc::new(GenericCounter::popcount("lut6_63", 6, 3, 2.0)),
                Arc::new(OrCounter::new("or6", 6, 0.5)),
                Arc::new(GenericCounter::truncating("c83", 8, 3, 2.0)),
            ],
            Device::Versal => vec![
                Arc::new(HalfAdder::new(0.5)),
                Arc::new(FullAdder::new(1.0)),
                Arc::new(GenericCounter::popcount("la84", 8, 4, 1.0)),
                Arc::new(GenericCounter::popcount("c63", 6, 3, 1.5)),
                Arc::new(OrCounter::new("or4", 4, 0.25)),
            ],
            Device::Intel => vec![
                Arc::new(HalfAdder::new(0.5)),
                Arc::new(FullAdder::new(1.0)),
                Arc::new(Compressor42::new(1.25)),
                Arc::new(GenericCounter::popcount("alm_63", 6, 3, 2.5)),
                Arc::new(OrCounter::new("or4", 4, 0.3)),
            ],
        };
        let varlen: Vec<Arc<dyn VarLenCompressor>> = match device {
            Device::Generic => vec![Arc::new(CarryChain::new("rca_chain", 2.0))],
            Device::Asic => vec![Arc::new(CarryChain::new("rca_chain", 1.5))],
            Device::SevenSeries => vec![Arc::new(CarryChain::new("carry4", 0.25))],
            Device::Versal => vec![Arc::new(CarryChain::new("carry8", 0.2))],
            Device::Intel => vec![Arc::new(CarryChain::new("alm_chain", 0.3))],
        };
        Self {
            name: device.name().to_string(),
            counters,
            varlen,
        }
    }

    /// Load a custom library from a TOML catalog file
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load a custom library from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let catalog: CatalogFile = toml::from_str(text)?;
        let mut counters: Vec<Arc<dyn Compressor>> = Vec::with_capacity(catalog.counters.len());
        for spec in catalog.counters {
            let counter = Counter::new(&spec.name, spec.inputs, spec.outputs, spec.cost, spec.exact);
            counters.push(Arc::new(GenericCounter::new(counter)?));
        }
        Self::custom(&catalog.library.name, counters, Vec::new())
    }

    /// Library name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact fixed-signature counters
    pub fn exact_counters(&self) -> Vec<Arc<dyn Compressor>> {
        self.counters
            .iter()
            .filter(|c| c.counter().exact)
            .cloned()
            .collect()
    }

    /// Approximate fixed-signature counters
    pub fn approx_counters(&self) -> Vec<Arc<dyn Compressor>> {
        self.counters
            .iter()
            .filter(|c| !c.counter().exact)
            .cloned()
            .collect()
    }

    /// All fixed-signature counters
    pub fn counters(&self) -> &[Arc<dyn Compressor>] {
        &self.counters
    }

    /// Variable-length chains
    pub fn varlen_counters(&self) -> &[Arc<dyn VarLenCompressor>] {
        &self.varlen
    }
}

// ============================================================================
// TOML catalog format
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
struct CatalogFile {
    library: CatalogMeta,
    #[serde(default)]
    counters: Vec<CounterSpec>,
}

#[derive(Debug, Deserialize, Serialize)]
struct CatalogMeta {
    name: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct CounterSpec {
    name: String,
    inputs: Vec<u32>,
    outputs: Vec<u32>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default = "default_exact")]
    exact: bool,
}

fn default_exact() -> bool {
    true
}
