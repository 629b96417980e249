//! Notification store port.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::notification::Notification;
use crate::infra::db::Db;

#[derive(Debug, thiserror::Error)]
#[error("notification store unavailable")]
pub struct NotificationStoreUnavailable(#[source] pub anyhow::Error);

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn append(&self, notification: &Notification) -> Result<(), NotificationStoreUnavailable>;

    /// Notifications for one volunteer, newest first, keyset-paginated on
    /// (created_at, id).
    async fn list(
        &self,
        volunteer_id: Uuid,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<Vec<Notification>, NotificationStoreUnavailable>;

    /// Returns false if the notification does not exist, belongs to another
    /// volunteer, or is already read.
    async fn mark_read(
        &self,
        notification_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<bool, NotificationStoreUnavailable>;
}

#[derive(Clone)]
pub struct PgNotificationStore {
    db: Db,
}

impl PgNotificationStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn append(&self, notification: &Notification) -> Result<(), NotificationStoreUnavailable> {
        sqlx::query(
            "INSERT INTO notifications (id, volunteer_id, message, read_at, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(notification.id)
        .bind(notification.volunteer_id)
        .bind(&notification.message)
        .bind(notification.read_at)
        .bind(notification.created_at)
        .execute(self.db.pool())
        .await
        .map_err(|err| NotificationStoreUnavailable(err.into()))?;

        Ok(())
    }

    async fn list(
        &self,
        volunteer_id: Uuid,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<Vec<Notification>, NotificationStoreUnavailable> {
        let rows = match cursor {
            Some((created_at, notification_id)) => {
                sqlx::query(
                    "SELECT id, volunteer_id, message, read_at, created_at \
                     FROM notifications \
                     WHERE volunteer_id = $1 \
                       AND (created_at < $2 OR (created_at = $2 AND id < $3)) \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $4",
                )
                .bind(volunteer_id)
                .bind(created_at)
                .bind(notification_id)
                .bind(limit)
                .fetch_all(self.db.pool())
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, volunteer_id, message, read_at, created_at \
                     FROM notifications \
                     WHERE volunteer_id = $1 \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $2",
                )
                .bind(volunteer_id)
                .bind(limit)
                .fetch_all(self.db.pool())
                .await
            }
        }
        .map_err(|err| NotificationStoreUnavailable(err.into()))?;

        let mut notifications = Vec::with_capacity(rows.len());
        for row in rows {
            notifications.push(Notification {
                id: row.get("id"),
                volunteer_id: row.get("volunteer_id"),
                message: row.get("message"),
                read_at: row.get("read_at"),
                created_at: row.get("created_at"),
            });
        }

        Ok(notifications)
    }

    async fn mark_read(
        &self,
        notification_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<bool, NotificationStoreUnavailable> {
        let result = sqlx::query(
            "UPDATE notifications \
             SET read_at = now() \
             WHERE id = $1 AND volunteer_id = $2 AND read_at IS NULL",
        )
        .bind(notification_id)
        .bind(volunteer_id)
        .execute(self.db.pool())
        .await
        .map_err(|err| NotificationStoreUnavailable(err.into()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-memory store for tests and local development.
#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: Mutex<Vec<Notification>>,
}

fn poisoned<T>(_: PoisonError<T>) -> NotificationStoreUnavailable {
    NotificationStoreUnavailable(anyhow::anyhow!("notification store lock poisoned"))
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything in the store, for inspection in tests.
    pub fn all(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn append(&self, notification: &Notification) -> Result<(), NotificationStoreUnavailable> {
        let mut notifications = self.notifications.lock().map_err(poisoned)?;
        notifications.push(notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        volunteer_id: Uuid,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<Vec<Notification>, NotificationStoreUnavailable> {
        let notifications = self.notifications.lock().map_err(poisoned)?;
        let mut items: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.volunteer_id == volunteer_id)
            .filter(|n| match cursor {
                Some((created_at, id)) => {
                    n.created_at < created_at || (n.created_at == created_at && n.id < id)
                }
                None => true,
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn mark_read(
        &self,
        notification_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<bool, NotificationStoreUnavailable> {
        let mut notifications = self.notifications.lock().map_err(poisoned)?;
        for notification in notifications.iter_mut() {
            if notification.id == notification_id
                && notification.volunteer_id == volunteer_id
                && notification.read_at.is_none()
            {
                notification.read_at = Some(OffsetDateTime::now_utc());
                return Ok(true);
            }
        }
        Ok(false)
    }
}
