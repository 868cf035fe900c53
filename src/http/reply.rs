//! Terminal response builders for the dispatch wire format.
//!
//! Every response the gateway emits goes through one of these. Bodies are
//! newline-terminated, matching what line-oriented callers expect.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde_json::Value;

use crate::http::envelope::ErrorBody;

const TEXT_UTF8: &str = "text/plain; charset=utf-8";
const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Plain-text diagnostic with the given status.
pub(crate) fn text(status: StatusCode, message: impl AsRef<str>) -> Response<Full<Bytes>> {
    let mut body = message.as_ref().as_bytes().to_vec();
    body.push(b'\n');
    build(status, TEXT_UTF8, body)
}

/// The empty-success marker for calls that produce no value.
pub(crate) fn empty_success() -> Response<Full<Bytes>> {
    build(StatusCode::OK, TEXT_UTF8, b"{}\n".to_vec())
}

/// A function's returned value as the JSON response body.
pub(crate) fn json_value(value: &Value) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(mut body) => {
            body.push(b'\n');
            build(StatusCode::OK, JSON_UTF8, body)
        }
        Err(err) => text(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("cannot encode response data: {}", err),
        ),
    }
}

/// A function's own error as the error body. The status stays OK: the call
/// itself succeeded, the function reported a failure.
pub(crate) fn call_error(message: &str) -> Response<Full<Bytes>> {
    let body = ErrorBody {
        error: message.to_string(),
    };
    match serde_json::to_vec(&body) {
        Ok(mut bytes) => {
            bytes.push(b'\n');
            build(StatusCode::OK, JSON_UTF8, bytes)
        }
        Err(err) => text(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("cannot encode error response: {}", err),
        ),
    }
}

/// A value that could not be represented on the wire.
pub(crate) fn encode_failure(err: &serde_json::Error) -> Response<Full<Bytes>> {
    text(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("cannot encode response data: {}", err),
    )
}

fn build(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
