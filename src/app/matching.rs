use std::sync::Arc;

use crate::domain::event::{EventFilter, FilterError};
use crate::domain::volunteer::VolunteerRecord;
use crate::infra::directory::{DirectoryUnavailable, VolunteerDirectory};
use crate::infra::ledger::{AssignmentLedger, LedgerUnavailable};

#[derive(Clone)]
pub struct MatchService {
    directory: Arc<dyn VolunteerDirectory>,
    ledger: Arc<dyn AssignmentLedger>,
}

/// A volunteer the directory returned for a filter, annotated with whether
/// the ledger already holds an assignment for the pair.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub volunteer: VolunteerRecord,
    pub already_assigned: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),
    #[error(transparent)]
    DirectoryUnavailable(#[from] DirectoryUnavailable),
    #[error(transparent)]
    LedgerUnavailable(#[from] LedgerUnavailable),
}

impl MatchService {
    pub fn new(directory: Arc<dyn VolunteerDirectory>, ledger: Arc<dyn AssignmentLedger>) -> Self {
        Self { directory, ledger }
    }

    /// Pure read: queries the directory and annotates each candidate. Zero
    /// matches is an empty vec, never an error. The annotation is advisory;
    /// the assigner re-checks at commit time regardless.
    pub async fn find_candidates(&self, filter: &EventFilter) -> Result<Vec<Candidate>, MatchError> {
        filter.validate()?;

        let volunteers = self.directory.lookup(filter).await?;

        let mut candidates = Vec::with_capacity(volunteers.len());
        for volunteer in volunteers {
            let already_assigned = self.ledger.exists(volunteer.id, filter).await?;
            candidates.push(Candidate {
                volunteer,
                already_assigned,
            });
        }

        Ok(candidates)
    }
}
