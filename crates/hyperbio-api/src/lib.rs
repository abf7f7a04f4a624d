//! API server for hyperbio.
//!
//! Serves the job queue, worker tick, scheduler, site registry, and
//! vote/comment interaction endpoints.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use state::AppState;
