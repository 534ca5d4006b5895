use crate::errors::ServerError;
use crate::templates::components::error::error_page;
use astra::{Body, Response, ResponseBuilder};

/// Converts a ServerError into an HTML error page with the matching status.
pub fn error_response(err: ServerError) -> Response {
    let status = err.status_code();
    if status >= 500 {
        tracing::error!(error = %err, status, "request failed");
    } else {
        tracing::warn!(error = %err, status, "request rejected");
    }

    // Storage details stay in the log.
    let message = match &err {
        ServerError::DbError(_) | ServerError::Config(_) => "Internal Server Error".to_string(),
        other => other.to_string(),
    };

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(error_page(status, &message).into_string()))
        .unwrap_or_else(|_| Response::new(Body::from("Internal Server Error")))
}
