//! Volunteer directory port.
//!
//! The directory is owned elsewhere; this crate only reads from it. The
//! Postgres implementation is the production backend, the in-memory one
//! backs the integration tests and local development.

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use sqlx::Row;

use crate::domain::event::EventFilter;
use crate::domain::volunteer::VolunteerRecord;
use crate::infra::db::Db;

#[derive(Debug, thiserror::Error)]
#[error("volunteer directory unavailable")]
pub struct DirectoryUnavailable(#[source] pub anyhow::Error);

/// Read-only lookup of volunteers matching an event filter.
#[async_trait]
pub trait VolunteerDirectory: Send + Sync {
    /// Volunteers whose skill set contains the filter's skill and whose
    /// city, state and zipcode equal the filter's. Zero matches is an empty
    /// vec, not an error. Order is the directory's natural creation order.
    async fn lookup(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<VolunteerRecord>, DirectoryUnavailable>;
}

#[derive(Clone)]
pub struct PgVolunteerDirectory {
    db: Db,
}

impl PgVolunteerDirectory {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VolunteerDirectory for PgVolunteerDirectory {
    async fn lookup(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<VolunteerRecord>, DirectoryUnavailable> {
        let rows = sqlx::query(
            "SELECT id, full_name, skills, city, state, zipcode \
             FROM volunteers \
             WHERE $1 = ANY(skills) \
               AND city = $2 \
               AND state = $3 \
               AND zipcode = $4 \
             ORDER BY created_at, id",
        )
        .bind(&filter.skill)
        .bind(&filter.city)
        .bind(&filter.state)
        .bind(&filter.zipcode)
        .fetch_all(self.db.pool())
        .await
        .map_err(|err| DirectoryUnavailable(err.into()))?;

        let mut volunteers = Vec::with_capacity(rows.len());
        for row in rows {
            volunteers.push(VolunteerRecord {
                id: row.get("id"),
                full_name: row.get("full_name"),
                skills: row.get("skills"),
                city: row.get("city"),
                state: row.get("state"),
                zipcode: row.get("zipcode"),
            });
        }

        Ok(volunteers)
    }
}

/// In-memory directory for tests and local development. Lookup order is
/// insertion order, matching the "natural order" the Postgres variant gets
/// from `created_at`.
#[derive(Default)]
pub struct InMemoryVolunteerDirectory {
    volunteers: RwLock<Vec<VolunteerRecord>>,
}

fn poisoned<T>(_: PoisonError<T>) -> DirectoryUnavailable {
    DirectoryUnavailable(anyhow::anyhow!("directory lock poisoned"))
}

impl InMemoryVolunteerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, volunteer: VolunteerRecord) {
        self.volunteers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(volunteer);
    }
}

#[async_trait]
impl VolunteerDirectory for InMemoryVolunteerDirectory {
    async fn lookup(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<VolunteerRecord>, DirectoryUnavailable> {
        let volunteers = self.volunteers.read().map_err(poisoned)?;
        Ok(volunteers
            .iter()
            .filter(|v| {
                v.skills.contains(&filter.skill)
                    && v.city == filter.city
                    && v.state == filter.state
                    && v.zipcode == filter.zipcode
            })
            .cloned()
            .collect())
    }
}
