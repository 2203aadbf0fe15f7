//! Response construction.
//!
//! # Responsibilities
//! - Serialize projected documents as JSON bodies
//! - Map every failure to the single opaque error response
//!
//! # Design Decisions
//! - Failure details go to the log, never to the client
//! - The error body is fixed so clients can match on it

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::projection::OutputDocument;

/// Message returned for any failed request.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// 200 with the document as JSON, keys in projection order.
pub fn document(doc: OutputDocument) -> Response {
    (StatusCode::OK, Json(doc)).into_response()
}

/// 500 with `{"error":"Internal error"}`.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: INTERNAL_ERROR_MESSAGE,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::OutputValue;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_internal_error_body() {
        let response = internal_error();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
        assert_eq!(body_string(response).await, r#"{"error":"Internal error"}"#);
    }

    #[tokio::test]
    async fn test_document_keeps_order() {
        let mut doc = OutputDocument::new();
        doc.push("sta", OutputValue::String("10:05".into()));
        doc.push("eta", OutputValue::String("On time".into()));

        let response = document(doc);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"sta":"10:05","eta":"On time"}"#);
    }
}
