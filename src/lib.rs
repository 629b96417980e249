use std::sync::Arc;

pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use crate::infra::directory::VolunteerDirectory;
use crate::infra::ledger::AssignmentLedger;
use crate::infra::notifications::NotificationStore;

/// Shared handles for request handlers. The stores are ports; `main` wires
/// the Postgres implementations, tests wire the in-memory ones.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<dyn VolunteerDirectory>,
    pub ledger: Arc<dyn AssignmentLedger>,
    pub notifications: Arc<dyn NotificationStore>,
    pub admin_token: Option<String>,
}
