//! Step accounting for a single invocation.
//!
//! Every metered operation charges `cost(step_type) * count` steps against a
//! fixed limit. Charges are never refunded: once applied they stay applied,
//! whether or not the invocation later succeeds.

use score_config::{StepCosts, StepType};
use score_core::{ScoreError, ScoreResult};
use std::cell::Cell;
use tracing::{debug, warn};

const TAG: &str = "StepCounter";

/// Step operations, as seen by contract code.
pub trait StepOperations {
    /// Charges `count` units of `step_type`.
    fn apply_step(&self, step_type: StepType, count: u64) -> ScoreResult<u64>;

    /// Charges a precomputed number of steps.
    fn consume_steps(&self, steps: u64) -> ScoreResult<u64>;

    /// Gets the steps consumed so far.
    fn step_used(&self) -> u64;

    /// Gets the step limit.
    fn step_limit(&self) -> u64;
}

/// Per-invocation step counter.
#[derive(Debug)]
pub struct StepCounter {
    costs: StepCosts,
    step_limit: u64,
    step_used: Cell<u64>,
}

impl StepCounter {
    /// Creates a new counter.
    pub fn new(costs: StepCosts, step_limit: u64) -> Self {
        Self {
            costs,
            step_limit,
            step_used: Cell::new(0),
        }
    }

    /// Gets the cost table.
    pub fn costs(&self) -> &StepCosts {
        &self.costs
    }

    /// Gets the remaining steps.
    pub fn remaining(&self) -> u64 {
        self.step_limit.saturating_sub(self.step_used.get())
    }

    fn charge(&self, steps: u64, what: &dyn std::fmt::Display) -> ScoreResult<u64> {
        let previous = self.step_used.get();
        let used = previous.saturating_add(steps);
        if used > self.step_limit {
            warn!(
                target: TAG,
                "Out of step: {} needs {} steps, {} of {} used",
                what,
                steps,
                previous,
                self.step_limit
            );
            // The whole budget is billed when it runs out.
            self.step_used.set(self.step_limit);
            return Err(ScoreError::OutOfStep(format!("Out of step: {}", what)));
        }

        self.step_used.set(used);
        debug!(target: TAG, "{}: +{} steps ({}/{})", what, steps, used, self.step_limit);
        Ok(used)
    }
}

impl StepOperations for StepCounter {
    fn apply_step(&self, step_type: StepType, count: u64) -> ScoreResult<u64> {
        let steps = self.costs.cost(step_type).saturating_mul(count);
        self.charge(steps, &step_type)
    }

    fn consume_steps(&self, steps: u64) -> ScoreResult<u64> {
        self.charge(steps, &"consume")
    }

    fn step_used(&self) -> u64 {
        self.step_used.get()
    }

    fn step_limit(&self) -> u64 {
        self.step_limit
    }
}
