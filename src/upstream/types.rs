//! Upstream operations, parameters and errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::projection::SourceNode;

/// Direction of a board filter relative to the board's station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDirection {
    To,
    From,
}

impl FilterDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterDirection::To => "to",
            FilterDirection::From => "from",
        }
    }
}

/// Restricts a board to services calling at another station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardFilter {
    pub crs: String,
    pub direction: FilterDirection,
}

/// Parameters shared by the departure and arrival board operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardRequest {
    pub num_rows: u16,
    pub crs: String,
    pub filter: Option<BoardFilter>,
}

/// One call to the Live Departure Boards service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamRequest {
    DepartureBoard(BoardRequest),
    ArrivalBoard(BoardRequest),
    ServiceDetails { service_id: String },
}

impl UpstreamRequest {
    /// SOAP operation name.
    pub fn operation(&self) -> &'static str {
        match self {
            UpstreamRequest::DepartureBoard(_) => "GetDepartureBoard",
            UpstreamRequest::ArrivalBoard(_) => "GetArrivalBoard",
            UpstreamRequest::ServiceDetails { .. } => "GetServiceDetails",
        }
    }
}

/// Errors from the upstream call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a SOAP fault.
    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    /// Non-success HTTP status without a fault body.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected SOAP document.
    #[error("decode error: {0}")]
    Decode(String),
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// The Live Departure Boards service as seen by the dispatcher.
#[async_trait]
pub trait LiveBoards: Send + Sync {
    async fn call(&self, request: &UpstreamRequest) -> UpstreamResult<SourceNode>;
}
