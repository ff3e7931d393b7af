//! Greedy stage-by-stage compressor scheduling
//!
//! Each stage walks the input matrix from the least-significant over-goal
//! column upward, placing the best-ranked counter that fits, until no
//! column exceeds the height goal. Produced bits land in a fresh output
//! matrix and only become visible to the next stage, so a stage never
//! feeds a counter its own outputs. When every column meets the goal the
//! remaining rows are fed to a carry-save final adder.

use std::sync::Arc;

use tracing::{debug, trace};

use summit_arith::{multi_operand_sum, resize};
use summit_netlist::{NetId, Netlist};

use crate::approx::miscounting_width;
use crate::context::{Context, GenerationState, StageStats};
use crate::counter::{Compressor, Counter, VarLenCompressor};
use crate::error::{ComptreeError, Result};
use crate::library::Library;
use crate::matrix::{build_initial_matrix, BitMatrix};
use crate::signature::Signature;

/// Chain length at which variable-length counters are ranked against
/// fixed ones
const CHAIN_RANKING_LEN: usize = 3;

/// Result of one compression run: the final sum bits (least-significant
/// first) and the per-stage bookkeeping
#[derive(Debug)]
pub struct CompressedSum {
    bits: Vec<NetId>,
    state: GenerationState,
}

impl CompressedSum {
    /// The sum bits, least-significant first
    pub fn bits(&self) -> &[NetId] {
        &self.bits
    }

    /// Consume the result, keeping only the sum bits
    pub fn into_bits(self) -> Vec<NetId> {
        self.bits
    }

    /// Per-stage scheduling bookkeeping
    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Truncate or zero-extend the sum to `width` bits
    pub fn resized(self, netlist: &Netlist, width: usize) -> CompressedSum {
        CompressedSum {
            bits: resize(netlist, self.bits, width),
            state: self.state,
        }
    }
}

// ============================================================================
// Candidate ranking
// ============================================================================

#[derive(Debug, Clone)]
enum CandidateKind {
    Fixed(Arc<dyn Compressor>),
    Chain(Arc<dyn VarLenCompressor>),
}

#[derive(Debug, Clone)]
struct Candidate {
    fitness: f64,
    name: String,
    kind: CandidateKind,
}

/// Rank the catalog once per run: descending fitness, names break ties so
/// that equal-fitness catalogs schedule deterministically
fn rank_candidates(library: &Library, ctx: &Context, allow_approx: bool) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for compressor in library.counters() {
        let counter = compressor.counter();
        if !counter.exact && !allow_approx {
            continue;
        }
        candidates.push(Candidate {
            fitness: counter.metric(ctx.metric),
            name: counter.name.clone(),
            kind: CandidateKind::Fixed(Arc::clone(compressor)),
        });
    }
    for chain in library.varlen_counters() {
        if !chain.exact() && !allow_approx {
            continue;
        }
        let reference = chain.counter_at(CHAIN_RANKING_LEN);
        candidates.push(Candidate {
            fitness: reference.metric(ctx.metric),
            name: chain.name().to_string(),
            kind: CandidateKind::Chain(Arc::clone(chain)),
        });
    }
    candidates.sort_by(|a, b| {
        b.fitness
            .total_cmp(&a.fitness)
            .then_with(|| a.name.cmp(&b.name))
    });
    candidates
}

// ============================================================================
// Fit checks
// ============================================================================

/// Whether a fixed counter can be placed with its base at `column`
fn fits_fixed(
    counter: &Counter,
    input: &BitMatrix,
    output: &BitMatrix,
    column: usize,
    goal: u32,
    miscount: Option<usize>,
) -> bool {
    if !counter.exact {
        match miscount {
            Some(width) if column + counter.columns_spanned() <= width => {}
            _ => return false,
        }
    }
    for (k, &need) in counter.input_sig.iter().enumerate() {
        if input.height(column + k) < need as usize {
            return false;
        }
    }
    // a lone half adder moves a bit up without reducing the stage's
    // output height; only place it where the column still lands within
    // the goal afterwards
    if counter.is_half_adder() {
        let landing = output.height(column) + input.height(column) - 2;
        if landing > goal as usize {
            return false;
        }
    }
    true
}

/// Whether a chain of length `len` fits with its base at `column`,
/// judged against the same per-length descriptor the placement consumes
fn chain_fits(chain: &dyn VarLenCompressor, input: &BitMatrix, column: usize, len: usize) -> bool {
    chain
        .counter_at(len)
        .input_sig
        .iter()
        .enumerate()
        .all(|(k, &need)| input.height(column + k) >= need as usize)
}

/// Longest chain placeable with its base at `column`. Feasibility is
/// monotone in the length for ripple-shaped chains, so double upward
/// then bisect; the returned length is always one that `chain_fits`
/// accepted.
fn max_chain_len(chain: &dyn VarLenCompressor, input: &BitMatrix, column: usize) -> usize {
    if !chain_fits(chain, input, column, 2) {
        return 0;
    }
    let cap = input.width().saturating_sub(column);
    let mut lo = 2;
    let mut hi = 4;
    while hi <= cap && chain_fits(chain, input, column, hi) {
        lo = hi;
        hi *= 2;
    }
    let mut hi = hi.min(cap + 1);
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if chain_fits(chain, input, column, mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

// ============================================================================
// Stage execution
// ============================================================================

struct Placement<'a> {
    kind: &'a CandidateKind,
    counter: Counter,
    len: usize,
}

fn choose_placement<'a>(
    candidates: &'a [Candidate],
    input: &BitMatrix,
    output: &BitMatrix,
    column: usize,
    goal: u32,
    miscount: Option<usize>,
) -> Option<Placement<'a>> {
    for candidate in candidates {
        match &candidate.kind {
            CandidateKind::Fixed(compressor) => {
                let counter = compressor.counter();
                if fits_fixed(counter, input, output, column, goal, miscount) {
                    return Some(Placement {
                        kind: &candidate.kind,
                        counter: counter.clone(),
                        len: 0,
                    });
                }
            }
            CandidateKind::Chain(chain) => {
                let mut len = max_chain_len(chain.as_ref(), input, column);
                if !chain.exact() {
                    // approximate chains obey the same placement window
                    // as fixed approximate counters
                    let limit = match miscount {
                        Some(width) => width.saturating_sub(column + 1),
                        None => 0,
                    };
                    len = len.min(limit);
                }
                if len >= 2 && chain_fits(chain.as_ref(), input, column, len) {
                    let counter = chain.counter_at(len);
                    let window_ok = chain.exact()
                        || matches!(miscount, Some(width) if column + counter.columns_spanned() <= width);
                    if window_ok {
                        return Some(Placement {
                            kind: &candidate.kind,
                            counter,
                            len,
                        });
                    }
                }
            }
        }
    }
    None
}

fn run_stage(
    netlist: &mut Netlist,
    mut input: BitMatrix,
    candidates: &[Candidate],
    ctx: &Context,
    stage: usize,
    state: &mut GenerationState,
) -> Result<BitMatrix> {
    let bits_in = input.total();
    let miscount = miscounting_width(&ctx.approximations);
    let mut output = BitMatrix::new(input.width());
    let mut stats = StageStats {
        bits_in,
        ..StageStats::default()
    };
    let mut consumed = 0usize;
    let mut produced = 0usize;

    while let Some(column) = input.first_over(ctx.height_goal) {
        let Some(placement) =
            choose_placement(candidates, &input, &output, column, ctx.height_goal, miscount)
        else {
            return Err(ComptreeError::NoFittingCounter {
                column,
                height: input.height(column),
                library: ctx.library.name().to_string(),
            });
        };

        let counter = &placement.counter;
        let mut inputs = Vec::with_capacity(counter.input_bits() as usize);
        for (k, &need) in counter.input_sig.iter().enumerate() {
            for _ in 0..need {
                let net = input
                    .pop(column + k)
                    .expect("fit check guarantees column depth");
                inputs.push(net);
            }
        }
        let outputs = match placement.kind {
            CandidateKind::Fixed(compressor) => compressor.realize(netlist, &inputs),
            CandidateKind::Chain(chain) => chain.realize(netlist, placement.len, &inputs),
        };
        if outputs.len() != counter.output_bits() as usize {
            return Err(ComptreeError::RealizationMismatch {
                counter: counter.name.clone(),
                expected: counter.output_bits() as usize,
                found: outputs.len(),
            });
        }
        let mut next = 0usize;
        for (k, &count) in counter.output_sig.iter().enumerate() {
            for _ in 0..count {
                output.insert(column + k, outputs[next]);
                next += 1;
            }
        }

        consumed += inputs.len();
        produced += outputs.len();
        stats.record(&counter.name);
        trace!(stage, column, counter = %counter, "placed counter");
    }

    input.drain_into(&mut output);
    let expected = bits_in - consumed + produced;
    let found = output.total();
    if found != expected {
        return Err(ComptreeError::ConservationMismatch {
            stage,
            expected,
            found,
        });
    }
    stats.bits_out = found;
    debug!(
        stage,
        bits_in,
        bits_out = found,
        placements = stats.total_placements(),
        "compression stage complete"
    );
    state.push_stage(stats);
    Ok(output)
}

// ============================================================================
// Final summation
// ============================================================================

fn final_summation(netlist: &mut Netlist, matrix: &BitMatrix, width: usize) -> Vec<NetId> {
    let rows = (0..matrix.width())
        .map(|c| matrix.height(c))
        .max()
        .unwrap_or(0);
    let zero = netlist.zero();
    let mut operands = Vec::with_capacity(rows);
    for row in 0..rows {
        let word: Vec<NetId> = (0..matrix.width())
            .map(|column| matrix.column(column).get(row).copied().unwrap_or(zero))
            .collect();
        operands.push(word);
    }
    multi_operand_sum(netlist, &operands, width)
}

// ============================================================================
// Entry point
// ============================================================================

/// Compress a weighted bit collection down to its binary sum.
///
/// `bits` are the signal handles described by `signature`, column-major
/// and least-significant column first. The returned bits are the sum,
/// `signature.output_width()` wide.
pub fn compress(
    netlist: &mut Netlist,
    signature: &Signature,
    bits: &[NetId],
    ctx: &Context,
) -> Result<CompressedSum> {
    ctx.validate(signature)?;
    let mut matrix = build_initial_matrix(netlist, signature, bits, &ctx.approximations)?;
    let allow_approx = miscounting_width(&ctx.approximations).is_some();
    let candidates = rank_candidates(&ctx.library, ctx, allow_approx);

    let mut state = GenerationState::new();
    let mut stage = 0usize;
    while !matrix.meets_goal(ctx.height_goal) {
        stage += 1;
        matrix = run_stage(netlist, matrix, &candidates, ctx, stage, &mut state)?;
    }
    state.set_final_heights(matrix.heights());
    debug!(
        stages = state.stage_count(),
        heights = ?state.final_heights(),
        "matrix converged"
    );

    let bits = final_summation(netlist, &matrix, signature.output_width());
    Ok(CompressedSum { bits, state })
}
