//! Assignment ledger port.
//!
//! The ledger is the source of truth for duplicate detection. The whole
//! insert batch is applied atomically: the Postgres implementation runs one
//! transaction, the in-memory one holds its lock for the whole batch, so a
//! failed call never commits a prefix.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::assignment::AssignmentRecord;
use crate::domain::event::EventFilter;
use crate::infra::db::Db;

#[derive(Debug, thiserror::Error)]
#[error("assignment ledger unavailable")]
pub struct LedgerUnavailable(#[source] pub anyhow::Error);

/// Per-record result of a compare-and-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

#[async_trait]
pub trait AssignmentLedger: Send + Sync {
    /// Whether an assignment already exists for this (volunteer, event) pair.
    async fn exists(
        &self,
        volunteer_id: Uuid,
        event: &EventFilter,
    ) -> Result<bool, LedgerUnavailable>;

    /// Compare-and-insert each record on its (volunteer_id, event) key,
    /// returning one outcome per input record in order. Implementations must
    /// apply the batch atomically: either every `Inserted` outcome is
    /// durable, or the call errors and nothing is.
    async fn insert(
        &self,
        records: &[AssignmentRecord],
    ) -> Result<Vec<InsertOutcome>, LedgerUnavailable>;
}

#[derive(Clone)]
pub struct PgAssignmentLedger {
    db: Db,
}

impl PgAssignmentLedger {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AssignmentLedger for PgAssignmentLedger {
    async fn exists(
        &self,
        volunteer_id: Uuid,
        event: &EventFilter,
    ) -> Result<bool, LedgerUnavailable> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
                SELECT 1 FROM assignments \
                WHERE volunteer_id = $1 \
                  AND skill = $2 \
                  AND city = $3 \
                  AND state = $4 \
                  AND zipcode = $5 \
                  AND availability = $6 \
             )",
        )
        .bind(volunteer_id)
        .bind(&event.skill)
        .bind(&event.city)
        .bind(&event.state)
        .bind(&event.zipcode)
        .bind(&event.availability)
        .fetch_one(self.db.pool())
        .await
        .map_err(|err| LedgerUnavailable(err.into()))?;

        Ok(exists)
    }

    async fn insert(
        &self,
        records: &[AssignmentRecord],
    ) -> Result<Vec<InsertOutcome>, LedgerUnavailable> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(|err| LedgerUnavailable(err.into()))?;

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            // The UNIQUE constraint on (volunteer_id, skill, city, state,
            // zipcode, availability) makes this a compare-and-insert; a
            // conflicting row leaves rows_affected at zero.
            let result = sqlx::query(
                "INSERT INTO assignments \
                    (id, volunteer_id, volunteer_name, skill, city, state, zipcode, availability, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                 ON CONFLICT (volunteer_id, skill, city, state, zipcode, availability) DO NOTHING",
            )
            .bind(record.id)
            .bind(record.volunteer_id)
            .bind(&record.volunteer_name)
            .bind(&record.event.skill)
            .bind(&record.event.city)
            .bind(&record.event.state)
            .bind(&record.event.zipcode)
            .bind(&record.event.availability)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|err| LedgerUnavailable(err.into()))?;

            outcomes.push(if result.rows_affected() > 0 {
                InsertOutcome::Inserted
            } else {
                InsertOutcome::AlreadyExists
            });
        }

        tx.commit()
            .await
            .map_err(|err| LedgerUnavailable(err.into()))?;

        Ok(outcomes)
    }
}

/// In-memory ledger keyed on (volunteer_id, EventFilter). One mutex guards
/// the whole map, so a batch insert is atomic and concurrent callers
/// serialize on the same key.
#[derive(Default)]
pub struct InMemoryAssignmentLedger {
    records: Mutex<HashMap<(Uuid, EventFilter), AssignmentRecord>>,
}

fn poisoned<T>(_: PoisonError<T>) -> LedgerUnavailable {
    LedgerUnavailable(anyhow::anyhow!("ledger lock poisoned"))
}

impl InMemoryAssignmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records currently in the ledger, for inspection in tests.
    pub fn records(&self) -> Vec<AssignmentRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AssignmentLedger for InMemoryAssignmentLedger {
    async fn exists(
        &self,
        volunteer_id: Uuid,
        event: &EventFilter,
    ) -> Result<bool, LedgerUnavailable> {
        let records = self.records.lock().map_err(poisoned)?;
        Ok(records.contains_key(&(volunteer_id, event.clone())))
    }

    async fn insert(
        &self,
        records: &[AssignmentRecord],
    ) -> Result<Vec<InsertOutcome>, LedgerUnavailable> {
        let mut map = self.records.lock().map_err(poisoned)?;
        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let key = (record.volunteer_id, record.event.clone());
            if map.contains_key(&key) {
                outcomes.push(InsertOutcome::AlreadyExists);
            } else {
                map.insert(key, record.clone());
                outcomes.push(InsertOutcome::Inserted);
            }
        }
        Ok(outcomes)
    }
}
