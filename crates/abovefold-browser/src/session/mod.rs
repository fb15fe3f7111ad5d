//! Rendering session lifecycle.

mod manager;
mod session;

pub use manager::SessionManager;
pub use session::RenderingSession;
