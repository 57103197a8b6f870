//! # Meeting Planner Server
//!
//! HTTP backend for the meeting planner: calendars with candidate time
//! slots and votes, plus canned poll and weather endpoints.
//!
//! Every handler binds its inputs with [`planner_bind::Binder`], so a bad
//! request always answers `400 {"error": "..."}` with a message naming the
//! source and field at fault.
//!
//! ## Request flow
//!
//! ```text
//! hyper connection
//!   -> App::handle      body limit (413), read timeout (408)
//!   -> recover          panic -> 500
//!   -> log_request      one info event per request
//!   -> Cors             OPTIONS -> 204, Access-Control-* headers
//!   -> Router           404 / 405
//!   -> handler          timeout -> 504, ApiError -> JSON error
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use planner_config::ConfigLoader;
//! use planner_server::{telemetry, App, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_env_prefix("PLANNER").load()?;
//!     telemetry::init_logging(&config.logging)?;
//!
//!     Server::new(&config, App::new(&config))?.run().await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/planner-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
mod server;
mod shutdown;
pub mod store;
pub mod telemetry;

pub use app::{App, AppState};
pub use error::{ApiError, ServerError};
pub use response::Response;
pub use routes::Router;
pub use server::Server;
pub use shutdown::{ConnectionGuard, ConnectionTracker, ShutdownSignal};
pub use store::{CalendarStore, InMemoryCalendarStore, StoreError};
