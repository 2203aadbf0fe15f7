//! Upstream Live Departure Boards integration.
//!
//! # Data Flow
//! ```text
//! UpstreamRequest (operation + parameters)
//!     → soap.rs (envelope with access token)
//!     → client.rs (HTTP POST with timeout)
//!     → soap.rs (XML → SourceNode, faults → UpstreamError)
//! ```
//!
//! # Security Constraints
//! - The access token is loaded once at startup and never logged
//! - Every call has a deadline; no retries are attempted

pub mod client;
pub mod soap;
pub mod types;

pub use client::SoapClient;
pub use types::{
    BoardFilter, BoardRequest, FilterDirection, LiveBoards, UpstreamError, UpstreamRequest,
    UpstreamResult,
};
