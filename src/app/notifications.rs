use std::sync::Arc;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::event::EventFilter;
use crate::domain::notification::Notification;
use crate::domain::volunteer::VolunteerRecord;
use crate::infra::notifications::{NotificationStore, NotificationStoreUnavailable};

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification delivery failed")]
    DeliveryFailed(#[from] NotificationStoreUnavailable),
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// One notification per accepted volunteer. Runs after the assigner's
    /// commit and never consults the ledger; a store outage leaves the
    /// assignments committed and this step retryable on its own.
    pub async fn notify(
        &self,
        accepted: &[VolunteerRecord],
        event: &EventFilter,
    ) -> Result<Vec<Notification>, NotifyError> {
        let mut notifications = Vec::with_capacity(accepted.len());
        for volunteer in accepted {
            let notification = Notification {
                id: Uuid::new_v4(),
                volunteer_id: volunteer.id,
                message: format!(
                    "You have been assigned to the {} event on {}.",
                    event.skill, event.availability
                ),
                read_at: None,
                created_at: OffsetDateTime::now_utc(),
            };
            self.store.append(&notification).await?;
            notifications.push(notification);
        }

        Ok(notifications)
    }

    pub async fn list(
        &self,
        volunteer_id: Uuid,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<Vec<Notification>, NotificationStoreUnavailable> {
        self.store.list(volunteer_id, cursor, limit).await
    }

    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        volunteer_id: Uuid,
    ) -> Result<bool, NotificationStoreUnavailable> {
        self.store.mark_read(notification_id, volunteer_id).await
    }
}
