use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::app::AppState;
use crate::error::ErrorDetail;

/// Gives every error response the JSON error envelope.
///
/// Internal error detail is logged, and only echoed to clients outside production.
/// Plain-text rejections produced by the framework (unknown method, malformed path or query)
/// are rewritten into the same envelope.
pub async fn normalize_errors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let mut response = next.run(request).await;
    let status = response.status();

    if let Some(ErrorDetail(detail)) = response.extensions_mut().remove::<ErrorDetail>() {
        tracing::error!("{} {} failed: {}", method, uri, detail);

        if !state.config.is_production() {
            return error_envelope(status, &detail, "INTERNAL_SERVER_ERROR", response);
        }
        return response;
    }

    if (status.is_client_error() || status.is_server_error()) && !is_json(&response) {
        let reason = status.canonical_reason().unwrap_or("Error");
        let code = reason.to_uppercase().replace([' ', '-'], "_");
        return error_envelope(status, reason, &code, response);
    }

    response
}

/// Replace the body, keeping headers such as `Retry-After` or `Allow`
fn error_envelope(status: StatusCode, message: &str, code: &str, original: Response) -> Response {
    let (mut parts, _) = original.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);

    let body = (status, Json(json!({ "error": true, "message": message, "code": code }))).into_response();
    let (body_parts, body) = body.into_parts();
    parts.headers.extend(body_parts.headers);

    Response::from_parts(parts, body)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes().starts_with(b"application/json"))
}
