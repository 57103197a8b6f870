//! Typed configuration for the meeting planner backend.
//!
//! Configuration is layered: built-in defaults, then an optional TOML or JSON
//! file, then `PLANNER__SECTION__KEY` environment variables, then `PORT`.
//! Unknown fields in files are rejected.
//!
//! # Sections
//!
//! - [`ServerConfig`] - listen address, timeouts, body limit
//! - [`LoggingConfig`] - filter level and output format
//! - [`CorsConfig`] - cross-origin headers
//!
//! # Example
//!
//! ```no_run
//! use planner_config::ConfigLoader;
//!
//! # fn main() -> Result<(), planner_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_optional_file("planner.toml")?
//!     .with_env_prefix("PLANNER")
//!     .with_port_override()
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 10000
//! max_body_bytes = 1048576
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [cors]
//! allowed_origin = "*"
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::PlannerConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{CorsConfig, LogFormat, LoggingConfig, ServerConfig};
