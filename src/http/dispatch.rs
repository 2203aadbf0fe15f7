//! Request dispatch: path parameters in, projected JSON out.
//!
//! # Data Flow
//! ```text
//! path params → UpstreamRequest → LiveBoards::call → SourceNode
//!     → ObjectShape::project → OutputDocument → 200 JSON
//! ```
//! Any failure along the way is logged and answered with the uniform 500.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::http::request::RequestIdExt;
use crate::http::response;
use crate::observability::metrics;
use crate::projection::{ObjectShape, OutputDocument, ProjectionError};
use crate::shapes::Shapes;
use crate::upstream::{
    BoardFilter, BoardRequest, FilterDirection, LiveBoards, UpstreamError, UpstreamRequest,
};

/// Rows requested for every board.
pub const BOARD_ROW_LIMIT: u16 = 50;

/// Why a request could not be answered.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Calls the upstream service and projects its answer.
#[derive(Clone)]
pub struct Dispatcher {
    upstream: Arc<dyn LiveBoards>,
    shapes: Arc<Shapes>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(upstream: Arc<dyn LiveBoards>, shapes: Arc<Shapes>, timeout: Duration) -> Self {
        Self {
            upstream,
            shapes,
            timeout,
        }
    }

    fn shape_for(&self, request: &UpstreamRequest) -> &ObjectShape {
        match request {
            UpstreamRequest::DepartureBoard(_) | UpstreamRequest::ArrivalBoard(_) => {
                &self.shapes.station_board
            }
            UpstreamRequest::ServiceDetails { .. } => &self.shapes.service_details,
        }
    }

    /// Run one request to completion. Never returns a partial document.
    pub async fn dispatch(&self, request: &UpstreamRequest) -> Result<OutputDocument, DispatchError> {
        let node = tokio::time::timeout(self.timeout, self.upstream.call(request))
            .await
            .map_err(|_| DispatchError::Timeout(self.timeout))??;
        Ok(self.shape_for(request).project(&node)?)
    }

    /// Dispatch and render, logging failures against `request_id`.
    pub async fn respond(&self, request_id: &str, request: UpstreamRequest) -> Response {
        let start = Instant::now();
        let operation = request.operation();

        match self.dispatch(&request).await {
            Ok(doc) => {
                tracing::debug!(request_id, operation, fields = doc.len(), "Request served");
                metrics::record_request(operation, 200, start);
                response::document(doc)
            }
            Err(e) => {
                tracing::error!(
                    request_id,
                    operation,
                    params = ?request,
                    error = %e,
                    "Request failed"
                );
                metrics::record_request(operation, 500, start);
                response::internal_error()
            }
        }
    }
}

/// Departure board for `from`, optionally only services calling at `to`.
pub fn departure_request(from: String, to: Option<String>) -> UpstreamRequest {
    UpstreamRequest::DepartureBoard(board_request(from, to, FilterDirection::To))
}

/// Arrival board for `to`, optionally only services calling at `from`.
pub fn arrival_request(to: String, from: Option<String>) -> UpstreamRequest {
    UpstreamRequest::ArrivalBoard(board_request(to, from, FilterDirection::From))
}

fn board_request(crs: String, filter: Option<String>, direction: FilterDirection) -> BoardRequest {
    BoardRequest {
        num_rows: BOARD_ROW_LIMIT,
        crs,
        filter: filter.map(|crs| BoardFilter { crs, direction }),
    }
}

/// A path the `Path` extractor refused (e.g. invalid UTF-8) gets the same
/// opaque 500 as any other failure.
fn rejected(request_id: &str, operation: &'static str, rejection: PathRejection) -> Response {
    tracing::error!(request_id, operation, error = %rejection, "Rejected request path");
    metrics::record_request(operation, 500, Instant::now());
    response::internal_error()
}

pub(crate) async fn departure_board(
    State(dispatcher): State<Dispatcher>,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    match path {
        Ok(Path(from)) => {
            dispatcher
                .respond(headers.request_id(), departure_request(from, None))
                .await
        }
        Err(rejection) => rejected(headers.request_id(), "GetDepartureBoard", rejection),
    }
}

pub(crate) async fn departure_board_to(
    State(dispatcher): State<Dispatcher>,
    headers: HeaderMap,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Response {
    match path {
        Ok(Path((from, to))) => {
            dispatcher
                .respond(headers.request_id(), departure_request(from, Some(to)))
                .await
        }
        Err(rejection) => rejected(headers.request_id(), "GetDepartureBoard", rejection),
    }
}

pub(crate) async fn arrival_board(
    State(dispatcher): State<Dispatcher>,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    match path {
        Ok(Path(to)) => {
            dispatcher
                .respond(headers.request_id(), arrival_request(to, None))
                .await
        }
        Err(rejection) => rejected(headers.request_id(), "GetArrivalBoard", rejection),
    }
}

pub(crate) async fn arrival_board_from(
    State(dispatcher): State<Dispatcher>,
    headers: HeaderMap,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Response {
    match path {
        Ok(Path((to, from))) => {
            dispatcher
                .respond(headers.request_id(), arrival_request(to, Some(from)))
                .await
        }
        Err(rejection) => rejected(headers.request_id(), "GetArrivalBoard", rejection),
    }
}

pub(crate) async fn service_details(
    State(dispatcher): State<Dispatcher>,
    headers: HeaderMap,
    path: Result<Path<String>, PathRejection>,
) -> Response {
    match path {
        Ok(Path(service_id)) => {
            dispatcher
                .respond(headers.request_id(), UpstreamRequest::ServiceDetails { service_id })
                .await
        }
        Err(rejection) => rejected(headers.request_id(), "GetServiceDetails", rejection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{ProjectionErrorKind, SourceNode};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recorded {
        reply: serde_json::Value,
        seen: Mutex<Vec<UpstreamRequest>>,
    }

    #[async_trait]
    impl LiveBoards for Recorded {
        async fn call(&self, request: &UpstreamRequest) -> Result<SourceNode, UpstreamError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(SourceNode::from(self.reply.clone()))
        }
    }

    struct Slow;

    #[async_trait]
    impl LiveBoards for Slow {
        async fn call(&self, _request: &UpstreamRequest) -> Result<SourceNode, UpstreamError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(SourceNode::from(json!({})))
        }
    }

    fn dispatcher(upstream: Arc<dyn LiveBoards>) -> Dispatcher {
        Dispatcher::new(upstream, Arc::new(Shapes::new()), Duration::from_secs(5))
    }

    #[test]
    fn test_board_requests() {
        let departures = departure_request("LDS".into(), Some("YRK".into()));
        assert_eq!(
            departures,
            UpstreamRequest::DepartureBoard(BoardRequest {
                num_rows: 50,
                crs: "LDS".into(),
                filter: Some(BoardFilter {
                    crs: "YRK".into(),
                    direction: FilterDirection::To,
                }),
            })
        );

        match arrival_request("YRK".into(), Some("LDS".into())) {
            UpstreamRequest::ArrivalBoard(board) => {
                assert_eq!(board.num_rows, BOARD_ROW_LIMIT);
                assert_eq!(board.filter.unwrap().direction, FilterDirection::From);
            }
            other => panic!("unexpected request {other:?}"),
        }

        match arrival_request("YRK".into(), None) {
            UpstreamRequest::ArrivalBoard(board) => assert!(board.filter.is_none()),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_projects_board() {
        let upstream = Arc::new(Recorded {
            reply: json!({
                "locationName": "Leeds",
                "crs": "LDS",
                "unused": "dropped",
                "trainServices": [{"std": "10:05", "platform": "4"}]
            }),
            seen: Mutex::new(Vec::new()),
        });
        let request = departure_request("LDS".into(), None);

        let doc = dispatcher(upstream.clone()).dispatch(&request).await.unwrap();

        assert_eq!(doc.get("locationName").unwrap().as_str(), Some("Leeds"));
        assert!(doc.get("unused").is_none());
        assert_eq!(doc.get("trainServices").unwrap().as_list().unwrap().len(), 1);
        assert_eq!(upstream.seen.lock().unwrap().as_slice(), &[request]);
    }

    #[tokio::test]
    async fn test_dispatch_uses_details_shape() {
        let upstream = Arc::new(Recorded {
            reply: json!({"locationName": "York", "std": "11:00", "trainServices": []}),
            seen: Mutex::new(Vec::new()),
        });
        let doc = dispatcher(upstream)
            .dispatch(&UpstreamRequest::ServiceDetails {
                service_id: "abc/123==".into(),
            })
            .await
            .unwrap();

        assert_eq!(doc.get("std").unwrap().as_str(), Some("11:00"));
        assert!(doc.get("trainServices").is_none());
        assert!(doc.get("previousCallingPoints").is_some());
    }

    #[tokio::test]
    async fn test_projection_failure_surfaces() {
        let upstream = Arc::new(Recorded {
            reply: json!({"trainServices": "not a list"}),
            seen: Mutex::new(Vec::new()),
        });
        let err = dispatcher(upstream)
            .dispatch(&departure_request("LDS".into(), None))
            .await
            .unwrap_err();

        match err {
            DispatchError::Projection(e) => {
                assert!(matches!(e.kind, ProjectionErrorKind::MalformedCollection { .. }))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let dispatcher = Dispatcher::new(
            Arc::new(Slow),
            Arc::new(Shapes::new()),
            Duration::from_millis(50),
        );
        let err = dispatcher
            .dispatch(&departure_request("LDS".into(), None))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Timeout(_)));
    }
}
