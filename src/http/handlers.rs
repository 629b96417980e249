use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::assignments::{AssignError, AssignmentService};
use crate::app::matching::{Candidate, MatchError, MatchService};
use crate::app::notifications::{NotificationService, NotifyError};
use crate::domain::event::EventFilter;
use crate::domain::notification::Notification;
use crate::domain::volunteer::VolunteerRecord;
use crate::http::{AdminToken, AppError};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

fn parse_cursor(cursor: Option<String>) -> Result<Option<(OffsetDateTime, Uuid)>, AppError> {
    let Some(cursor) = cursor else {
        return Ok(None);
    };

    let mut parts = cursor.splitn(2, '/');
    let timestamp = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;
    let id = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;

    let timestamp = OffsetDateTime::parse(timestamp, &Rfc3339)
        .map_err(|_| AppError::bad_request("invalid cursor"))?;
    let id = Uuid::parse_str(id).map_err(|_| AppError::bad_request("invalid cursor"))?;

    Ok(Some((timestamp, id)))
}

fn encode_cursor(cursor: Option<(OffsetDateTime, Uuid)>) -> Option<String> {
    let (timestamp, id) = cursor?;
    let timestamp = timestamp.format(&Rfc3339).ok()?;
    Some(format!("{}/{}", timestamp, id))
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Deserialize)]
pub struct MatchRequest {
    pub skill: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub availability: String,
}

impl MatchRequest {
    fn into_filter(self) -> EventFilter {
        EventFilter {
            skill: self.skill,
            city: self.city,
            state: self.state,
            zipcode: self.zipcode,
            availability: self.availability,
        }
    }
}

#[derive(Serialize)]
pub struct MatchedVolunteer {
    pub id: Uuid,
    pub full_name: String,
    pub skills: Vec<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub already_assigned: bool,
}

impl From<Candidate> for MatchedVolunteer {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.volunteer.id,
            full_name: candidate.volunteer.full_name,
            skills: candidate.volunteer.skills,
            city: candidate.volunteer.city,
            state: candidate.volunteer.state,
            zipcode: candidate.volunteer.zipcode,
            already_assigned: candidate.already_assigned,
        }
    }
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub matches: Vec<MatchedVolunteer>,
}

pub async fn match_volunteers(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(payload): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let filter = payload.into_filter();

    let service = MatchService::new(state.directory.clone(), state.ledger.clone());
    let candidates = service.find_candidates(&filter).await.map_err(|err| match &err {
        MatchError::InvalidFilter(_) => AppError::bad_request(err.to_string()),
        MatchError::DirectoryUnavailable(source) => {
            tracing::error!(error = ?source, "volunteer directory lookup failed");
            AppError::unavailable("volunteer directory unavailable")
        }
        MatchError::LedgerUnavailable(source) => {
            tracing::error!(error = ?source, "assignment ledger lookup failed");
            AppError::unavailable("assignment ledger unavailable")
        }
    })?;

    Ok(Json(MatchResponse {
        matches: candidates.into_iter().map(MatchedVolunteer::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub event_details: EventFilter,
    pub volunteers: Vec<VolunteerRecord>,
}

#[derive(Serialize)]
pub struct AssignResponse {
    pub accepted: Vec<VolunteerRecord>,
    pub rejected: Vec<VolunteerRecord>,
    pub notifications: Vec<Notification>,
}

pub async fn assign_volunteers(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<AssignResponse>, AppError> {
    let service = AssignmentService::new(state.ledger.clone());
    let outcome = service
        .assign(payload.volunteers, &payload.event_details)
        .await
        .map_err(|err| match &err {
            AssignError::InvalidFilter(_) => AppError::bad_request(err.to_string()),
            AssignError::LedgerUnavailable(source) => {
                tracing::error!(error = ?source, "assignment batch failed");
                AppError::unavailable("assignment ledger unavailable")
            }
        })?;

    // The assignments above are committed; a notification outage must not
    // undo them. 502 tells the caller to retry /api/assignments/notify only.
    let notifier = NotificationService::new(state.notifications.clone());
    let notifications = notifier
        .notify(&outcome.accepted, &payload.event_details)
        .await
        .map_err(|err| {
            let NotifyError::DeliveryFailed(err) = &err;
            tracing::error!(error = ?err, accepted = outcome.accepted.len(), "notification delivery failed after assignment");
            AppError::bad_gateway("volunteers assigned but notification delivery failed")
        })?;

    Ok(Json(AssignResponse {
        accepted: outcome.accepted,
        rejected: outcome.rejected,
        notifications,
    }))
}

#[derive(Serialize)]
pub struct NotifyResponse {
    pub notifications: Vec<Notification>,
}

pub async fn notify_volunteers(
    _admin: AdminToken,
    State(state): State<AppState>,
    Json(payload): Json<AssignRequest>,
) -> Result<Json<NotifyResponse>, AppError> {
    let service = NotificationService::new(state.notifications.clone());
    let notifications = service
        .notify(&payload.volunteers, &payload.event_details)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "notification delivery failed");
            AppError::bad_gateway("notification delivery failed")
        })?;

    Ok(Json(NotifyResponse { notifications }))
}

#[derive(Deserialize)]
pub struct NotificationsQuery {
    pub volunteer_id: Uuid,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<ListResponse<Notification>>, AppError> {
    let limit = query.limit.unwrap_or(30);
    if !(1..=200).contains(&limit) {
        return Err(AppError::bad_request("limit must be between 1 and 200"));
    }
    let cursor = parse_cursor(query.cursor)?;

    let service = NotificationService::new(state.notifications.clone());
    let mut notifications = service
        .list(query.volunteer_id, cursor, limit + 1)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, volunteer_id = %query.volunteer_id, "failed to list notifications");
            AppError::unavailable("notification store unavailable")
        })?;

    // Cursor comes from the last item actually returned, so the next page
    // resumes at the first one held back.
    let next_cursor = if notifications.len() > limit as usize {
        notifications.truncate(limit as usize);
        notifications.last().map(|last| (last.created_at, last.id))
    } else {
        None
    };

    Ok(Json(ListResponse {
        items: notifications,
        next_cursor: encode_cursor(next_cursor),
    }))
}

#[derive(Deserialize)]
pub struct MarkReadRequest {
    pub volunteer_id: Uuid,
}

pub async fn mark_notification_read(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<StatusCode, AppError> {
    let service = NotificationService::new(state.notifications.clone());
    let updated = service
        .mark_read(id, payload.volunteer_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, notification_id = %id, "failed to mark notification read");
            AppError::unavailable("notification store unavailable")
        })?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("notification not found"))
    }
}
