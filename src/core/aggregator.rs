use crate::domain::model::{LeadError, LeadOutcome, LeadResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// At least one lead reached the CRM.
    Success,
    /// Every lead failed.
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub success: bool,
    pub source_run_id: Option<serde_json::Value>,
    pub generated_at: Option<serde_json::Value>,
    pub count: usize,
    pub records: Vec<LeadResult>,
    pub errors: Vec<LeadError>,
}

impl BatchReport {
    pub fn status(&self) -> BatchStatus {
        if self.success {
            BatchStatus::Success
        } else {
            BatchStatus::Failure
        }
    }
}

/// Collects per-lead outcomes in input order.
#[derive(Debug, Default)]
pub struct BatchAggregator {
    records: Vec<LeadResult>,
    errors: Vec<LeadError>,
}

impl BatchAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: LeadOutcome) {
        match outcome {
            LeadOutcome::Imported(result) => self.records.push(result),
            LeadOutcome::Failed(error) => self.errors.push(error),
        }
    }

    pub fn processed(&self) -> usize {
        self.records.len() + self.errors.len()
    }

    pub fn finish(
        self,
        source_run_id: Option<serde_json::Value>,
        generated_at: Option<serde_json::Value>,
    ) -> BatchReport {
        BatchReport {
            success: !self.records.is_empty(),
            source_run_id,
            generated_at,
            count: self.records.len(),
            records: self.records,
            errors: self.errors,
        }
    }
}

impl Extend<LeadOutcome> for BatchAggregator {
    fn extend<T: IntoIterator<Item = LeadOutcome>>(&mut self, iter: T) {
        for outcome in iter {
            self.push(outcome);
        }
    }
}
