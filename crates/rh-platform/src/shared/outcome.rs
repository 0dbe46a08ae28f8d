//! Compound operation outcomes
//!
//! Several operations issue more than one write without a surrounding
//! transaction (report resolution, settlement, offer acceptance, the
//! Fraud cascade). [`StepTracker`] records each write in order so that a
//! failure after the first write surfaces as
//! [`PlatformError::PartialFailure`] listing exactly what was applied.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use tracing::warn;

use super::error::{PlatformError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    Completed,
    Failed,
    Skipped,
}

/// Outcome of one write inside a compound operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub step: String,
    pub status: StepStatus,
    /// Documents matched / inserted / deleted by the step
    pub affected: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    pub fn completed(step: impl Into<String>, affected: u64) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Completed,
            affected,
            error: None,
        }
    }

    pub fn failed(step: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Failed,
            affected: 0,
            error: Some(error.into()),
        }
    }

    pub fn skipped(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            status: StepStatus::Skipped,
            affected: 0,
            error: None,
        }
    }
}

/// Records the ordered steps of a compound operation.
pub struct StepTracker {
    operation: &'static str,
    planned: &'static [&'static str],
    steps: Vec<StepReport>,
}

impl StepTracker {
    pub fn new(operation: &'static str, planned: &'static [&'static str]) -> Self {
        Self {
            operation,
            planned,
            steps: Vec::with_capacity(planned.len()),
        }
    }

    /// Record the result of the next step.
    ///
    /// A failure before anything was written is returned unchanged; a
    /// failure after at least one completed step becomes a partial failure.
    pub fn record(&mut self, result: Result<u64>) -> Result<u64> {
        match result {
            Ok(affected) => {
                let step = self.next_step_name();
                self.steps.push(StepReport::completed(step, affected));
                Ok(affected)
            }
            Err(err) if self.steps.is_empty() => Err(err),
            Err(err) => Err(self.fail(err.to_string())),
        }
    }

    /// Mark the next step failed for a reason that is not a store error.
    pub fn fail(&mut self, reason: impl Into<String>) -> PlatformError {
        let step = self.next_step_name();
        self.steps.push(StepReport::failed(step, reason));
        for remaining in self.planned.iter().skip(self.steps.len()) {
            self.steps.push(StepReport::skipped(*remaining));
        }

        warn!(operation = self.operation, steps = ?self.steps, "Compound operation left partially applied");
        metrics::counter!("platform.compound.partial_failures_total", "operation" => self.operation)
            .increment(1);

        PlatformError::partial(self.operation, std::mem::take(&mut self.steps))
    }

    pub fn finish(self) -> Vec<StepReport> {
        self.steps
    }

    fn next_step_name(&self) -> &'static str {
        self.planned.get(self.steps.len()).copied().unwrap_or("unplanned step")
    }
}
