//! Error-body finalization.
//!
//! [`crate::error::ApiError`] serializes everything it knows into the
//! response and stashes the structured body as an extension; this
//! middleware is the one place that still has the request URI, so it
//! rewrites the body with `path` attached. Success responses pass
//! through untouched.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorBody;

pub async fn error_response_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    match response.extensions().get::<ErrorBody>() {
        Some(body) => {
            let mut body = body.clone();
            body.path = Some(path);
            (response.status(), Json(body)).into_response()
        }
        None => response,
    }
}
