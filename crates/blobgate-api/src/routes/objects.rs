//! Catch-all object route

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use blobgate_core::Envelope;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Non-standard spelling of the content type header, still read by older clients
const LEGACY_CONTENT_TYPE: HeaderName = HeaderName::from_static("contenttype");

/// Serve any path from the cache or the origin
pub async fn get_object(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    let object_path = uri.path();
    let request_uri = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(object_path);
    debug!("GET object: {}", request_uri);

    let envelope = state.gateway.fetch(request_uri, object_path).await?;

    Ok(object_response(&envelope))
}

fn object_response(envelope: &Envelope) -> Response {
    let mut response = (StatusCode::OK, envelope.body().clone()).into_response();
    let headers = response.headers_mut();

    match HeaderValue::from_str(envelope.content_type()) {
        Ok(value) => {
            headers.insert(LEGACY_CONTENT_TYPE, value.clone());
            headers.insert(header::CONTENT_TYPE, value);
        }
        Err(_) => {
            warn!("Dropping unrepresentable content type {:?}", envelope.content_type());
            headers.remove(header::CONTENT_TYPE);
        }
    }

    if let Some(etag) = envelope.etag() {
        match HeaderValue::from_str(etag) {
            Ok(value) => {
                headers.insert(header::ETAG, value);
            }
            Err(_) => warn!("Dropping unrepresentable etag {:?}", etag),
        }
    }

    response
}
