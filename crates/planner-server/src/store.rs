//! Calendar storage.
//!
//! Handlers talk to a [`CalendarStore`]; the server ships with
//! [`InMemoryCalendarStore`], which keeps everything behind a single
//! `RwLock` and loses its contents on restart.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use http::StatusCode;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by a [`CalendarStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No calendar with this id.
    #[error("calendar {0} not found")]
    CalendarNotFound(Uuid),

    /// A vote named a slot that does not belong to the calendar.
    #[error("time slot {0} does not belong to this calendar")]
    UnknownTimeSlot(Uuid),

    /// A slot ends before it starts.
    #[error("time slot must end after it starts")]
    InvalidTimeRange,
}

impl StoreError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::CalendarNotFound(_) => StatusCode::NOT_FOUND,
            Self::UnknownTimeSlot(_) | Self::InvalidTimeRange => StatusCode::BAD_REQUEST,
        }
    }
}

/// A scheduling calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    /// Calendar id.
    pub id: Uuid,
    /// Title shown to participants.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Where the meeting takes place.
    pub location: Option<String>,
    /// Votes are expected until this instant.
    pub accept_responses_until: Option<DateTime<Utc>>,
    /// Whether a password was supplied at creation. The password itself is
    /// not kept.
    pub password_protected: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last time slots or votes changed.
    pub updated_at: DateTime<Utc>,
}

/// Input for [`CalendarStore::create_calendar`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCalendar {
    /// Title shown to participants.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Where the meeting takes place.
    pub location: Option<String>,
    /// Votes are expected until this instant.
    pub accept_responses_until: Option<DateTime<Utc>>,
    /// Optional access password.
    pub password: Option<String>,
}

/// A candidate meeting time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    /// Slot id.
    pub id: Uuid,
    /// Owning calendar.
    pub calendar_id: Uuid,
    /// Start of the slot.
    pub start_date: DateTime<Utc>,
    /// End of the slot.
    pub end_date: DateTime<Utc>,
}

/// Input for [`CalendarStore::add_time_slots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTimeSlot {
    /// Start of the slot.
    pub start_date: DateTime<Utc>,
    /// End of the slot.
    pub end_date: DateTime<Utc>,
}

/// One participant's availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vote {
    /// Vote id.
    pub id: Uuid,
    /// Calendar voted on.
    pub calendar_id: Uuid,
    /// Participant name.
    pub user: String,
    /// Slots the participant can attend.
    pub available: Vec<Uuid>,
    /// When the vote was cast.
    pub created_at: DateTime<Utc>,
}

/// A calendar together with its slots and votes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDetails {
    /// The calendar itself.
    #[serde(flatten)]
    pub calendar: Calendar,
    /// Slots in insertion order.
    pub time_slots: Vec<TimeSlot>,
    /// Votes, at most one per user.
    pub votes: Vec<Vote>,
}

/// Storage backend for calendars.
pub trait CalendarStore: Send + Sync + 'static {
    /// Creates a calendar and returns it.
    fn create_calendar(&self, input: NewCalendar) -> Result<Calendar, StoreError>;

    /// Lists calendars, oldest first.
    fn list_calendars(&self) -> Result<Vec<Calendar>, StoreError>;

    /// Fetches a calendar with its slots and votes.
    fn get_calendar(&self, id: Uuid) -> Result<CalendarDetails, StoreError>;

    /// Adds slots to a calendar. Either all slots are added or none.
    fn add_time_slots(
        &self,
        calendar_id: Uuid,
        slots: Vec<NewTimeSlot>,
    ) -> Result<Vec<TimeSlot>, StoreError>;

    /// Records a vote, replacing any earlier vote by the same user.
    fn record_vote(
        &self,
        calendar_id: Uuid,
        user: &str,
        available: Vec<Uuid>,
    ) -> Result<Vote, StoreError>;
}

#[derive(Debug)]
struct Entry {
    calendar: Calendar,
    time_slots: Vec<TimeSlot>,
    votes: Vec<Vote>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<Uuid, Entry>,
    order: Vec<Uuid>,
}

/// [`CalendarStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCalendarStore {
    inner: RwLock<Inner>,
}

impl InMemoryCalendarStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored calendars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Returns true if no calendar has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CalendarStore for InMemoryCalendarStore {
    fn create_calendar(&self, input: NewCalendar) -> Result<Calendar, StoreError> {
        let now = Utc::now();
        let calendar = Calendar {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            location: input.location,
            accept_responses_until: input.accept_responses_until,
            password_protected: input.password.is_some(),
            created_at: now,
            updated_at: now,
        };

        let mut inner = self.inner.write();
        inner.order.push(calendar.id);
        inner.entries.insert(
            calendar.id,
            Entry {
                calendar: calendar.clone(),
                time_slots: Vec::new(),
                votes: Vec::new(),
            },
        );

        tracing::debug!(calendar_id = %calendar.id, "calendar created");
        Ok(calendar)
    }

    fn list_calendars(&self) -> Result<Vec<Calendar>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id))
            .map(|entry| entry.calendar.clone())
            .collect())
    }

    fn get_calendar(&self, id: Uuid) -> Result<CalendarDetails, StoreError> {
        let inner = self.inner.read();
        let entry = inner.entries.get(&id).ok_or(StoreError::CalendarNotFound(id))?;
        Ok(CalendarDetails {
            calendar: entry.calendar.clone(),
            time_slots: entry.time_slots.clone(),
            votes: entry.votes.clone(),
        })
    }

    fn add_time_slots(
        &self,
        calendar_id: Uuid,
        slots: Vec<NewTimeSlot>,
    ) -> Result<Vec<TimeSlot>, StoreError> {
        if slots.iter().any(|slot| slot.end_date <= slot.start_date) {
            return Err(StoreError::InvalidTimeRange);
        }

        let mut inner = self.inner.write();
        let entry = inner
            .entries
            .get_mut(&calendar_id)
            .ok_or(StoreError::CalendarNotFound(calendar_id))?;

        let created: Vec<TimeSlot> = slots
            .into_iter()
            .map(|slot| TimeSlot {
                id: Uuid::new_v4(),
                calendar_id,
                start_date: slot.start_date,
                end_date: slot.end_date,
            })
            .collect();

        entry.time_slots.extend(created.iter().cloned());
        entry.calendar.updated_at = Utc::now();
        Ok(created)
    }

    fn record_vote(
        &self,
        calendar_id: Uuid,
        user: &str,
        available: Vec<Uuid>,
    ) -> Result<Vote, StoreError> {
        let mut inner = self.inner.write();
        let entry = inner
            .entries
            .get_mut(&calendar_id)
            .ok_or(StoreError::CalendarNotFound(calendar_id))?;

        if let Some(unknown) = available
            .iter()
            .find(|id| !entry.time_slots.iter().any(|slot| slot.id == **id))
        {
            return Err(StoreError::UnknownTimeSlot(*unknown));
        }

        let mut deduped = Vec::with_capacity(available.len());
        for id in available {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }

        let vote = Vote {
            id: Uuid::new_v4(),
            calendar_id,
            user: user.to_string(),
            available: deduped,
            created_at: Utc::now(),
        };

        entry.votes.retain(|existing| existing.user != user);
        entry.votes.push(vote.clone());
        entry.calendar.updated_at = vote.created_at;
        Ok(vote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 5, hour, 0, 0).unwrap()
    }

    fn calendar(store: &InMemoryCalendarStore, title: &str) -> Calendar {
        store
            .create_calendar(NewCalendar {
                title: title.to_string(),
                ..NewCalendar::default()
            })
            .unwrap()
    }

    #[test]
    fn test_create_and_list_in_order() {
        let store = InMemoryCalendarStore::new();
        let first = calendar(&store, "Team Sync");
        let second = calendar(&store, "Retro");

        let listed = store.list_calendars().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_get_unknown_calendar() {
        let store = InMemoryCalendarStore::new();
        let id = Uuid::new_v4();

        assert_eq!(store.get_calendar(id), Err(StoreError::CalendarNotFound(id)));
    }

    #[test]
    fn test_password_is_not_exposed() {
        let store = InMemoryCalendarStore::new();
        let created = store
            .create_calendar(NewCalendar {
                title: "Private".to_string(),
                password: Some("hunter2".to_string()),
                ..NewCalendar::default()
            })
            .unwrap();

        assert!(created.password_protected);
        let json = serde_json::to_string(&created).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_add_time_slots() {
        let store = InMemoryCalendarStore::new();
        let cal = calendar(&store, "Team Sync");

        let slots = store
            .add_time_slots(
                cal.id,
                vec![
                    NewTimeSlot { start_date: at(9), end_date: at(10) },
                    NewTimeSlot { start_date: at(14), end_date: at(15) },
                ],
            )
            .unwrap();

        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.calendar_id == cal.id));

        let details = store.get_calendar(cal.id).unwrap();
        assert_eq!(details.time_slots, slots);
        assert!(details.calendar.updated_at >= cal.updated_at);
    }

    #[test]
    fn test_add_time_slots_rejects_inverted_range() {
        let store = InMemoryCalendarStore::new();
        let cal = calendar(&store, "Team Sync");

        let err = store
            .add_time_slots(
                cal.id,
                vec![
                    NewTimeSlot { start_date: at(9), end_date: at(10) },
                    NewTimeSlot { start_date: at(11), end_date: at(11) },
                ],
            )
            .unwrap_err();

        assert_eq!(err, StoreError::InvalidTimeRange);
        assert!(store.get_calendar(cal.id).unwrap().time_slots.is_empty());
    }

    #[test]
    fn test_vote_replaces_previous_vote() {
        let store = InMemoryCalendarStore::new();
        let cal = calendar(&store, "Team Sync");
        let slots = store
            .add_time_slots(
                cal.id,
                vec![
                    NewTimeSlot { start_date: at(9), end_date: at(10) },
                    NewTimeSlot { start_date: at(14), end_date: at(15) },
                ],
            )
            .unwrap();

        store.record_vote(cal.id, "alice", vec![slots[0].id]).unwrap();
        store.record_vote(cal.id, "bob", vec![slots[1].id]).unwrap();
        let updated = store
            .record_vote(cal.id, "alice", vec![slots[1].id, slots[1].id])
            .unwrap();

        assert_eq!(updated.available, vec![slots[1].id]);

        let votes = store.get_calendar(cal.id).unwrap().votes;
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].user, "bob");
        assert_eq!(votes[1].user, "alice");
    }

    #[test]
    fn test_vote_unknown_slot() {
        let store = InMemoryCalendarStore::new();
        let cal = calendar(&store, "Team Sync");
        let other = calendar(&store, "Other");
        let foreign = store
            .add_time_slots(other.id, vec![NewTimeSlot { start_date: at(9), end_date: at(10) }])
            .unwrap();

        let err = store
            .record_vote(cal.id, "alice", vec![foreign[0].id])
            .unwrap_err();

        assert_eq!(err, StoreError::UnknownTimeSlot(foreign[0].id));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(store.get_calendar(cal.id).unwrap().votes.is_empty());
    }
}
