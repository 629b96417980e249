use std::sync::Arc;

use crate::domain::assignment::AssignmentRecord;
use crate::domain::event::{EventFilter, FilterError};
use crate::domain::volunteer::VolunteerRecord;
use crate::infra::ledger::{AssignmentLedger, InsertOutcome, LedgerUnavailable};

#[derive(Clone)]
pub struct AssignmentService {
    ledger: Arc<dyn AssignmentLedger>,
}

/// Split of one assign call. A volunteer lands in `rejected` when the ledger
/// already holds a record for the (volunteer, event) pair, including a
/// second occurrence of the same volunteer within the call.
#[derive(Debug, Default)]
pub struct AssignmentOutcome {
    pub accepted: Vec<VolunteerRecord>,
    pub rejected: Vec<VolunteerRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum AssignError {
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),
    #[error(transparent)]
    LedgerUnavailable(#[from] LedgerUnavailable),
}

impl AssignmentService {
    pub fn new(ledger: Arc<dyn AssignmentLedger>) -> Self {
        Self { ledger }
    }

    /// Assigns each candidate to the event unless the ledger already holds
    /// the pair. The ledger applies the batch atomically, so a ledger outage
    /// commits nothing; a retry of an identical call rejects everyone just
    /// accepted.
    pub async fn assign(
        &self,
        candidates: Vec<VolunteerRecord>,
        event: &EventFilter,
    ) -> Result<AssignmentOutcome, AssignError> {
        event.validate()?;

        if candidates.is_empty() {
            return Ok(AssignmentOutcome::default());
        }

        let records: Vec<AssignmentRecord> = candidates
            .iter()
            .map(|volunteer| AssignmentRecord::new(volunteer, event))
            .collect();

        let outcomes = self.ledger.insert(&records).await?;

        let mut result = AssignmentOutcome::default();
        for (volunteer, outcome) in candidates.into_iter().zip(outcomes) {
            match outcome {
                InsertOutcome::Inserted => result.accepted.push(volunteer),
                InsertOutcome::AlreadyExists => result.rejected.push(volunteer),
            }
        }

        tracing::info!(
            accepted = result.accepted.len(),
            rejected = result.rejected.len(),
            skill = %event.skill,
            availability = %event.availability,
            "processed assignment batch"
        );

        Ok(result)
    }
}
