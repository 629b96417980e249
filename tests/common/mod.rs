#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;
use uuid::Uuid;

use tidepool::domain::assignment::AssignmentRecord;
use tidepool::domain::event::EventFilter;
use tidepool::domain::notification::Notification;
use tidepool::domain::volunteer::VolunteerRecord;
use tidepool::infra::directory::InMemoryVolunteerDirectory;
use tidepool::infra::ledger::{AssignmentLedger, InMemoryAssignmentLedger, InsertOutcome, LedgerUnavailable};
use tidepool::infra::notifications::{InMemoryNotificationStore, NotificationStore, NotificationStoreUnavailable};
use tidepool::{http, AppState};

pub const ADMIN_TOKEN: &str = "test-admin-token-12345";

// ---------------------------------------------------------------------------
// TestApp — router over in-memory stores, one per test
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub directory: Arc<InMemoryVolunteerDirectory>,
    pub ledger: Arc<InMemoryAssignmentLedger>,
    pub notifications: Arc<InMemoryNotificationStore>,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["error"].as_str().unwrap_or("").to_string()
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(|state| state)
    }

    /// Build with the in-memory stores, letting the caller swap individual
    /// ports (e.g. for outage tests) before the router is constructed.
    pub fn build(customize: impl FnOnce(AppState) -> AppState) -> Self {
        let directory = Arc::new(InMemoryVolunteerDirectory::new());
        let ledger = Arc::new(InMemoryAssignmentLedger::new());
        let notifications = Arc::new(InMemoryNotificationStore::new());

        let state = customize(AppState {
            directory: directory.clone(),
            ledger: ledger.clone(),
            notifications: notifications.clone(),
            admin_token: Some(ADMIN_TOKEN.to_string()),
        });

        let router = http::router(state.clone());

        Self {
            router,
            directory,
            ledger,
            notifications,
            state,
        }
    }

    pub fn seed_volunteer(
        &self,
        name: &str,
        skills: &[&str],
        city: &str,
        state: &str,
        zipcode: &str,
    ) -> VolunteerRecord {
        let volunteer = VolunteerRecord {
            id: Uuid::new_v4(),
            full_name: name.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            city: city.to_string(),
            state: state.to_string(),
            zipcode: zipcode.to_string(),
        };
        self.directory.add(volunteer.clone());
        volunteer
    }

    pub async fn post_json(
        &self,
        path: &str,
        body: Value,
        admin_token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = admin_token {
            builder = builder.header("x-admin-token", token);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse { status, body_bytes }
    }
}

// ---------------------------------------------------------------------------
// JSON builders
// ---------------------------------------------------------------------------

pub fn event_json(skill: &str, city: &str, state: &str, zipcode: &str, availability: &str) -> Value {
    json!({
        "skill": skill,
        "city": city,
        "state": state,
        "zipcode": zipcode,
        "availability": availability,
    })
}

pub fn diving_event() -> Value {
    event_json("Diving Skills", "Tampa", "FL", "33602", "2024-06-01")
}

pub fn volunteer_json(volunteer: &VolunteerRecord) -> Value {
    serde_json::to_value(volunteer).unwrap()
}

pub fn assign_body(event: Value, volunteers: &[&VolunteerRecord]) -> Value {
    json!({
        "event_details": event,
        "volunteers": volunteers.iter().map(|v| volunteer_json(v)).collect::<Vec<_>>(),
    })
}

// ---------------------------------------------------------------------------
// Failing port doubles for outage tests
// ---------------------------------------------------------------------------

pub struct FailingLedger;

#[async_trait]
impl AssignmentLedger for FailingLedger {
    async fn exists(
        &self,
        _volunteer_id: Uuid,
        _event: &EventFilter,
    ) -> Result<bool, LedgerUnavailable> {
        Err(LedgerUnavailable(anyhow::anyhow!("ledger down")))
    }

    async fn insert(
        &self,
        _records: &[AssignmentRecord],
    ) -> Result<Vec<InsertOutcome>, LedgerUnavailable> {
        Err(LedgerUnavailable(anyhow::anyhow!("ledger down")))
    }
}

pub struct FailingNotificationStore;

#[async_trait]
impl NotificationStore for FailingNotificationStore {
    async fn append(&self, _notification: &Notification) -> Result<(), NotificationStoreUnavailable> {
        Err(NotificationStoreUnavailable(anyhow::anyhow!("store down")))
    }

    async fn list(
        &self,
        _volunteer_id: Uuid,
        _cursor: Option<(OffsetDateTime, Uuid)>,
        _limit: i64,
    ) -> Result<Vec<Notification>, NotificationStoreUnavailable> {
        Err(NotificationStoreUnavailable(anyhow::anyhow!("store down")))
    }

    async fn mark_read(
        &self,
        _notification_id: Uuid,
        _volunteer_id: Uuid,
    ) -> Result<bool, NotificationStoreUnavailable> {
        Err(NotificationStoreUnavailable(anyhow::anyhow!("store down")))
    }
}
