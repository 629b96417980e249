use serde::{Deserialize, Serialize};

/// The attributes identifying an event for matching and assignment. Two
/// filters denote the same event iff all five fields are equal, exact string
/// comparison with no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventFilter {
    pub skill: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub availability: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

impl EventFilter {
    /// Rejects blank fields before any directory or ledger access.
    pub fn validate(&self) -> Result<(), FilterError> {
        let fields = [
            ("skill", &self.skill),
            ("city", &self.city),
            ("state", &self.state),
            ("zipcode", &self.zipcode),
            ("availability", &self.availability),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(FilterError::MissingField(name));
            }
        }
        Ok(())
    }
}
