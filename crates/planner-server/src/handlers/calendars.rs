//! Calendar endpoints.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::StatusCode;
use planner_bind::{Bind, Binder, RequestParts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::{self, Response};
use crate::store::{Calendar, NewCalendar, NewTimeSlot, TimeSlot};

/// Body of `POST /api/calendars`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateCalendarBody {
    /// Calendar title.
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional meeting location.
    pub location: Option<String>,
    /// RFC 3339 deadline for votes.
    #[validate(custom(function = "planner_bind::validate::rfc3339"))]
    pub accept_responses_until: Option<String>,
    /// Optional password.
    #[validate(length(min = 4))]
    pub password: Option<String>,
}

/// `{id}` path parameter of the calendar routes.
#[derive(Debug, Default, Bind, Validate)]
pub struct CalendarParams {
    /// Calendar id.
    #[validate(required, custom(function = "planner_bind::validate::uuid"))]
    pub id: Option<String>,
}

impl CalendarParams {
    fn calendar_id(&self) -> Result<Uuid, ApiError> {
        let raw = self.id.as_deref().unwrap_or_default();
        Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("invalid calendar id '{raw}'")))
    }
}

/// One slot in `POST /api/calendars/{id}/time-slots`.
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
#[validate(schema(function = "ends_after_start"))]
pub struct TimeSlotInput {
    /// RFC 3339 start.
    #[validate(custom(function = "planner_bind::validate::rfc3339"))]
    pub start_date: String,
    /// RFC 3339 end, later than the start.
    #[validate(custom(function = "planner_bind::validate::rfc3339"))]
    pub end_date: String,
}

/// Body of `POST /api/calendars/{id}/time-slots`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AddTimeSlotsBody {
    /// Slots to add.
    #[validate(length(min = 1), nested)]
    pub time_slots: Vec<TimeSlotInput>,
}

/// Body of `POST /api/calendars/{id}/votes`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VoteBody {
    /// Participant name.
    #[validate(length(min = 1, max = 100))]
    pub user: String,
    /// Ids of the slots the participant can attend.
    #[validate(length(min = 1), custom(function = "planner_bind::validate::uuids"))]
    pub available: Vec<String>,
}

fn ends_after_start(slot: &TimeSlotInput) -> Result<(), ValidationError> {
    match (parse_timestamp(&slot.start_date), parse_timestamp(&slot.end_date)) {
        (Some(start), Some(end)) if end <= start => {
            let mut error = ValidationError::new("ends_after_start");
            error.message = Some("end_date must be after start_date".into());
            Err(error)
        }
        _ => Ok(()),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    parse_timestamp(raw)
        .ok_or_else(|| ApiError::bad_request(format!("{field} does not match RFC3339 format")))
}

#[derive(Debug, Serialize)]
struct CalendarList {
    calendars: Vec<Calendar>,
}

#[derive(Debug, Serialize)]
struct Created {
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct CreatedSlots {
    time_slots: Vec<TimeSlot>,
}

/// `GET /api/calendars`
pub async fn list(state: Arc<AppState>, _parts: RequestParts) -> Result<Response, ApiError> {
    let calendars = state.store().list_calendars()?;
    Ok(response::json(StatusCode::OK, &CalendarList { calendars }))
}

/// `POST /api/calendars`
pub async fn create(state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let mut body = CreateCalendarBody::default();
    Binder::new(&parts).body(&mut body).bind()?;

    let accept_responses_until = body
        .accept_responses_until
        .as_deref()
        .map(|raw| timestamp("accept_responses_until", raw))
        .transpose()?;

    let calendar = state.store().create_calendar(NewCalendar {
        title: body.title,
        description: body.description,
        location: body.location,
        accept_responses_until,
        password: body.password,
    })?;

    tracing::info!(calendar_id = %calendar.id, "calendar created");
    Ok(response::json(StatusCode::CREATED, &Created { id: calendar.id }))
}

/// `GET /api/calendars/{id}`
pub async fn get(state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let mut params = CalendarParams::default();
    Binder::new(&parts).params(&mut params).bind()?;

    let details = state.store().get_calendar(params.calendar_id()?)?;
    Ok(response::json(StatusCode::OK, &details))
}

/// `POST /api/calendars/{id}/time-slots`
pub async fn add_time_slots(
    state: Arc<AppState>,
    parts: RequestParts,
) -> Result<Response, ApiError> {
    let mut body = AddTimeSlotsBody::default();
    let mut params = CalendarParams::default();
    Binder::new(&parts)
        .body(&mut body)
        .params(&mut params)
        .bind()?;

    let slots = body
        .time_slots
        .iter()
        .map(|slot| {
            Ok(NewTimeSlot {
                start_date: timestamp("start_date", &slot.start_date)?,
                end_date: timestamp("end_date", &slot.end_date)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let time_slots = state
        .store()
        .add_time_slots(params.calendar_id()?, slots)?;
    Ok(response::json(StatusCode::CREATED, &CreatedSlots { time_slots }))
}

/// `POST /api/calendars/{id}/votes`
pub async fn vote(state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let mut body = VoteBody::default();
    let mut params = CalendarParams::default();
    Binder::new(&parts)
        .body(&mut body)
        .params(&mut params)
        .bind()?;

    let available = body
        .available
        .iter()
        .map(|raw| {
            Uuid::parse_str(raw)
                .map_err(|_| ApiError::bad_request(format!("invalid time slot id '{raw}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let vote = state
        .store()
        .record_vote(params.calendar_id()?, &body.user, available)?;
    Ok(response::json(StatusCode::CREATED, &vote))
}
