//! The gateway's axum HTTP server: router, auth middleware, Prometheus
//! metrics, and shared application state. Structured the way the voice
//! agent's `server` crate is structured — `lib.rs` re-exports the pieces
//! `main.rs` wires together at startup.

pub mod auth;
pub mod error;
pub mod http;
pub mod metrics;
pub mod state;

pub use error::ServerError;
pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;
