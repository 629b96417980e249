use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of a volunteer as returned by the directory. The directory owns
/// these records; nothing in this crate mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerRecord {
    pub id: Uuid,
    pub full_name: String,
    pub skills: Vec<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}
