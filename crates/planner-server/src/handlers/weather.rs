//! Weather endpoints. Forecasts are canned.

use std::sync::Arc;

use http::StatusCode;
use planner_bind::{Bind, Binder, RequestParts};
use serde::Serialize;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::{self, Response};

const DEFAULT_LOCATION: &str = "san-francisco";
const DEFAULT_DAYS: usize = 2;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct Day {
    day: &'static str,
    condition: &'static str,
    high_c: i32,
    low_c: i32,
}

const fn day(day: &'static str, condition: &'static str, high_c: i32, low_c: i32) -> Day {
    Day {
        day,
        condition,
        high_c,
        low_c,
    }
}

const DEFAULT_WEEK: [Day; 7] = [
    day("today", "sunny", 21, 14),
    day("tomorrow", "partly-cloudy", 19, 12),
    day("day-3", "cloudy", 18, 12),
    day("day-4", "rain", 16, 11),
    day("day-5", "rain", 15, 10),
    day("day-6", "partly-cloudy", 18, 11),
    day("day-7", "sunny", 20, 13),
];

const LOCATION_WEEK: [Day; 7] = [
    day("today", "cloudy", 18, 11),
    day("tomorrow", "rain", 16, 10),
    day("day-3", "rain", 15, 9),
    day("day-4", "cloudy", 17, 10),
    day("day-5", "partly-cloudy", 19, 12),
    day("day-6", "sunny", 22, 14),
    day("day-7", "sunny", 23, 15),
];

/// Query of both weather routes.
#[derive(Debug, Default, Bind, Validate)]
pub struct ForecastQuery {
    /// Number of days, 1 to 7. Defaults to 2.
    #[validate(range(min = 1, max = 7))]
    pub days: Option<u8>,
}

impl ForecastQuery {
    fn days(&self) -> usize {
        self.days.map_or(DEFAULT_DAYS, usize::from)
    }
}

/// `{location}` path parameter.
#[derive(Debug, Default, Bind, Validate)]
pub struct LocationParams {
    /// Location slug.
    #[validate(required, length(min = 1, max = 100))]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultForecast {
    default_location: &'static str,
    forecast: Vec<Day>,
}

#[derive(Debug, Serialize)]
struct LocationForecast {
    location: String,
    forecast: Vec<Day>,
}

/// `GET /api/weather`
pub async fn forecast(_state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let mut query = ForecastQuery::default();
    Binder::new(&parts).query(&mut query).bind()?;

    Ok(response::json(
        StatusCode::OK,
        &DefaultForecast {
            default_location: DEFAULT_LOCATION,
            forecast: DEFAULT_WEEK[..query.days()].to_vec(),
        },
    ))
}

/// `GET /api/weather/{location}`
pub async fn forecast_for_location(
    _state: Arc<AppState>,
    parts: RequestParts,
) -> Result<Response, ApiError> {
    let mut params = LocationParams::default();
    let mut query = ForecastQuery::default();
    Binder::new(&parts)
        .params(&mut params)
        .query(&mut query)
        .bind()?;

    Ok(response::json(
        StatusCode::OK,
        &LocationForecast {
            location: params.location.unwrap_or_default(),
            forecast: LOCATION_WEEK[..query.days()].to_vec(),
        },
    ))
}
