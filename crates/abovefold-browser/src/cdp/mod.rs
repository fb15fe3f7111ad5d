//! Chrome DevTools Protocol transport.
//!
//! A thin CDP client: WebSocket connection discovered via `/json/version`,
//! commands multiplexed by request id, per-target routing through flattened
//! session ids. Only the Target/Page/Runtime/Network/Emulation surface the
//! extraction pipeline needs is wrapped.

mod client;
mod error;
mod page;
mod protocol;

pub use client::CdpClient;
pub use error::CdpError;
pub use page::PageChannel;
pub use protocol::{BrowserVersion, CdpErrorBody, CdpMessage, CdpRequest};
