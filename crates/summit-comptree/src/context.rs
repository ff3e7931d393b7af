//! Generation context and bookkeeping state
//!
//! [`Context`] bundles the immutable parameters of one generation request:
//! height goal, fitness metric, active approximations and the counter
//! library. [`GenerationState`] is the mutable accumulator threaded
//! through the scheduler; physical-layout-aware backends consume it, the
//! algorithm itself never reads it back.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::approx::Approximation;
use crate::error::{ComptreeError, Result};
use crate::library::{Device, Library};
use crate::signature::Signature;

/// Fitness metric used to rank counters within a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Bits eliminated per unit cost
    Efficiency,
    /// Input bits per output bit
    Strength,
}

/// Immutable parameters of one generation request
#[derive(Debug, Clone)]
pub struct Context {
    /// Target maximum bits per column after compression
    pub height_goal: u32,
    /// Counter ranking metric
    pub metric: Metric,
    /// Active approximation transforms
    pub approximations: Vec<Approximation>,
    /// Counter catalog
    pub library: Library,
}

impl Context {
    /// A context with the device's library and default height goal
    pub fn for_device(device: Device) -> Self {
        Self {
            height_goal: device.default_height_goal(),
            metric: Metric::Efficiency,
            approximations: Vec::new(),
            library: Library::for_device(device),
        }
    }

    /// Override the height goal
    pub fn with_height_goal(mut self, goal: u32) -> Self {
        self.height_goal = goal;
        self
    }

    /// Override the fitness metric
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Add one approximation transform
    pub fn with_approximation(mut self, approximation: Approximation) -> Self {
        self.approximations.push(approximation);
        self
    }

    /// Replace the counter library
    pub fn with_library(mut self, library: Library) -> Self {
        self.library = library;
        self
    }

    /// Check the configuration against a signature before scheduling
    pub fn validate(&self, signature: &Signature) -> Result<()> {
        if self.height_goal == 0 {
            return Err(ComptreeError::InvalidHeightGoal(self.height_goal));
        }
        for approximation in &self.approximations {
            approximation.validate(signature)?;
        }
        Ok(())
    }
}

/// Placement tally of one compression stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    /// Placed counter kinds, in first-placement order
    pub placements: IndexMap<String, u32>,
    /// Bits in the stage's input matrix
    pub bits_in: usize,
    /// Bits in the stage's output matrix
    pub bits_out: usize,
}

impl StageStats {
    pub(crate) fn record(&mut self, name: &str) {
        *self.placements.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Total placements in this stage
    pub fn total_placements(&self) -> u32 {
        self.placements.values().sum()
    }
}

/// Bookkeeping accumulated across all stages of one generation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationState {
    stages: Vec<StageStats>,
    final_heights: Vec<u32>,
}

impl GenerationState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_stage(&mut self, stats: StageStats) {
        self.stages.push(stats);
    }

    pub(crate) fn set_final_heights(&mut self, heights: Vec<u32>) {
        self.final_heights = heights;
    }

    /// Per-stage placement tallies
    pub fn stages(&self) -> &[StageStats] {
        &self.stages
    }

    /// Number of compression stages that ran
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Column heights of the converged matrix
    pub fn final_heights(&self) -> &[u32] {
        &self.final_heights
    }

    /// Total placements of one counter kind across all stages
    pub fn placements_of(&self, name: &str) -> u32 {
        self.stages
            .iter()
            .filter_map(|s| s.placements.get(name))
            .sum()
    }
}
