//! Poll endpoints. Responses are canned; nothing is stored.

use std::sync::Arc;

use http::StatusCode;
use planner_bind::{Bind, Binder, RequestParts};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::response::{self, Response};

const SAMPLE_QUESTION: &str = "Where should we meet?";
const SAMPLE_OPTIONS: [&str; 3] = ["Cafe", "Office", "Park"];

/// Body of `POST /api/polls`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreatePollBody {
    /// The question asked.
    #[validate(length(min = 1))]
    pub question: String,
    /// Possible answers.
    #[validate(length(min = 2))]
    pub options: Vec<String>,
}

/// Body of `POST /api/polls/{id}/votes`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PollVoteBody {
    /// Participant name.
    #[validate(length(min = 1))]
    pub user: String,
    /// Chosen option.
    #[validate(length(min = 1))]
    pub choice: String,
}

/// `{id}` path parameter of the poll routes.
#[derive(Debug, Default, Bind, Validate)]
pub struct PollParams {
    /// Poll id.
    #[validate(required)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
struct Poll {
    id: String,
    question: String,
    options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    votes: Option<Vec<PollVote>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct PollVote {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    user: String,
    choice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct PollList {
    polls: Vec<Poll>,
}

fn sample_poll(id: &str) -> Poll {
    Poll {
        id: id.to_string(),
        question: SAMPLE_QUESTION.to_string(),
        options: SAMPLE_OPTIONS.iter().map(ToString::to_string).collect(),
        votes: None,
        message: None,
    }
}

fn sample_vote(user: &str, choice: &str) -> PollVote {
    PollVote {
        id: None,
        user: user.to_string(),
        choice: choice.to_string(),
        message: None,
    }
}

fn poll_id(parts: &RequestParts) -> Result<String, ApiError> {
    let mut params = PollParams::default();
    Binder::new(parts).params(&mut params).bind()?;
    Ok(params.id.unwrap_or_default())
}

/// `GET /api/polls`
pub async fn list(_state: Arc<AppState>, _parts: RequestParts) -> Result<Response, ApiError> {
    Ok(response::json(
        StatusCode::OK,
        &PollList {
            polls: vec![sample_poll("poll-42")],
        },
    ))
}

/// `POST /api/polls`
pub async fn create(_state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let mut body = CreatePollBody::default();
    Binder::new(&parts).body(&mut body).bind()?;

    Ok(response::json(
        StatusCode::CREATED,
        &Poll {
            id: "poll-new".to_string(),
            question: body.question,
            options: body.options,
            votes: None,
            message: Some("poll created (mocked)"),
        },
    ))
}

/// `GET /api/polls/{id}`
pub async fn get(_state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let id = poll_id(&parts)?;

    let mut poll = sample_poll(&id);
    poll.votes = Some(vec![
        sample_vote("alice", "Cafe"),
        sample_vote("bob", "Office"),
    ]);
    Ok(response::json(StatusCode::OK, &poll))
}

/// `POST /api/polls/{id}/votes`
pub async fn vote(_state: Arc<AppState>, parts: RequestParts) -> Result<Response, ApiError> {
    let mut body = PollVoteBody::default();
    let mut params = PollParams::default();
    Binder::new(&parts)
        .body(&mut body)
        .params(&mut params)
        .bind()?;

    Ok(response::json(
        StatusCode::CREATED,
        &PollVote {
            id: params.id,
            user: body.user,
            choice: body.choice,
            message: Some("vote recorded (mocked)"),
        },
    ))
}
