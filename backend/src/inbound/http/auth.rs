//! Authorization header plumbing.

use actix_web::HttpRequest;
use actix_web::http::header;

/// Read the raw `Authorization` header value, if present and valid UTF-8.
#[must_use]
pub fn bearer_header(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}
