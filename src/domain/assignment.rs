use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::event::EventFilter;
use crate::domain::volunteer::VolunteerRecord;

/// One volunteer assigned to one event. At most one record may exist per
/// (volunteer_id, event) pair; the ledger enforces this at insert time.
/// Records are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: Uuid,
    pub volunteer_id: Uuid,
    pub volunteer_name: String,
    pub event: EventFilter,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl AssignmentRecord {
    pub fn new(volunteer: &VolunteerRecord, event: &EventFilter) -> Self {
        Self {
            id: Uuid::new_v4(),
            volunteer_id: volunteer.id,
            volunteer_name: volunteer.full_name.clone(),
            event: event.clone(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}
