//! Endpoint handlers and the route table that wires them up.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/api/health` | [`health::health`] |
//! | POST | `/api/echo/{id}` | [`echo::echo`] |
//! | GET | `/api/calendars` | [`calendars::list`] |
//! | POST | `/api/calendars` | [`calendars::create`] |
//! | GET | `/api/calendars/{id}` | [`calendars::get`] |
//! | POST | `/api/calendars/{id}/time-slots` | [`calendars::add_time_slots`] |
//! | POST | `/api/calendars/{id}/votes` | [`calendars::vote`] |
//! | GET | `/api/polls` | [`polls::list`] |
//! | POST | `/api/polls` | [`polls::create`] |
//! | GET | `/api/polls/{id}` | [`polls::get`] |
//! | POST | `/api/polls/{id}/votes` | [`polls::vote`] |
//! | GET | `/api/weather` | [`weather::forecast`] |
//! | GET | `/api/weather/{location}` | [`weather::forecast_for_location`] |
//!
//! Polls and weather return canned data.

pub mod calendars;
pub mod echo;
pub mod health;
pub mod polls;
pub mod weather;

use crate::routes::Router;

/// Builds the router with every API endpoint.
#[must_use]
pub fn api_router() -> Router {
    let mut router = Router::new();
    router
        .get("/api/health", health::health)
        .post("/api/echo/{id}", echo::echo)
        .get("/api/calendars", calendars::list)
        .post("/api/calendars", calendars::create)
        .get("/api/calendars/{id}", calendars::get)
        .post("/api/calendars/{id}/time-slots", calendars::add_time_slots)
        .post("/api/calendars/{id}/votes", calendars::vote)
        .get("/api/polls", polls::list)
        .post("/api/polls", polls::create)
        .get("/api/polls/{id}", polls::get)
        .post("/api/polls/{id}/votes", polls::vote)
        .get("/api/weather", weather::forecast)
        .get("/api/weather/{location}", weather::forecast_for_location);
    router
}
