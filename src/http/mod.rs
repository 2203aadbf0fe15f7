//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route table, middleware)
//!     → request.rs (request ID)
//!     → dispatch.rs (upstream call, shape projection)
//!     → response.rs (JSON document or uniform 500)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{DispatchError, Dispatcher, BOARD_ROW_LIMIT};
pub use request::{MakeRequestUuid, RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
