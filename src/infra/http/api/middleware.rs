use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use super::state::ApiState;

/// Header carrying the shared-secret credential. Header name lookup is
/// case-insensitive per HTTP semantics.
pub const API_KEY_HEADER: &str = "x-api-key";

pub async fn api_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    // Missing and mismatched credentials get the same outcome; the handler
    // chain is never reached either way.
    let principal = match state.auth.authenticate(presented) {
        Ok(principal) => principal,
        Err(_) => return ApiError::unauthorized().into_response(),
    };

    request.extensions_mut().insert(principal);

    next.run(request).await
}
