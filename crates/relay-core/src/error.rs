use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Render a service error as `{"kind", "message"}` JSON with the given status.
///
/// `internal` carries the source chain of a 500; it is logged here and never
/// sent to the client. Tower-http `TraceLayer` already records method/uri/status
/// for every request, so 4xx are not logged again.
pub fn error_response(
    status: StatusCode,
    kind: &'static str,
    message: String,
    internal: Option<&anyhow::Error>,
) -> Response {
    if let Some(e) = internal {
        tracing::error!(error = ?e, kind, "internal error");
    }
    let body = serde_json::json!({
        "kind": kind,
        "message": message,
    });
    (status, axum::Json(body)).into_response()
}
