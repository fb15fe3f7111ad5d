//! HTTP boundary for the extraction service.
//!
//! One POST endpoint drives the whole pipeline; classified extraction
//! errors map onto HTTP statuses (validation failures are 400, everything
//! else 500). Admission control and rate limiting live outside this
//! process; the only in-process bound is the session manager's context
//! limit.

pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use handlers::{ExtractRequest, SingleExtractResponse};
pub use routes::create_router;
pub use server::{ApiConfig, ApiServer};
pub use state::ApiState;
