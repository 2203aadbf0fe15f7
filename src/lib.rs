//! LDBWS REST proxy library.
//!
//! Translates REST requests into calls to the National Rail Live Departure
//! Boards SOAP service and projects the answers into compact JSON documents.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod projection;
pub mod shapes;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use shapes::Shapes;
pub use upstream::{LiveBoards, SoapClient};
