//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{HeaderMap, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::{Error, routing::MAX_BODY_SIZE};

/// The number of characters of a body that are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// JSON fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "access_token"];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Passwords and access tokens in JSON bodies are redacted, and bodies that are not
/// text, such as spreadsheet uploads, are logged by size only.
///
/// Request bodies are buffered up to [MAX_BODY_SIZE] bytes, larger bodies are rejected with
/// `413 Payload Too Large` before reaching the router.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::debug!("Could not read request body: {error}");
            return Error::PayloadTooLarge(MAX_BODY_SIZE).into_response();
        }
    };

    log_request(&parts, &display_body(&parts.headers, &body_bytes));

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return Error::InvalidInput("could not read the response body".to_owned())
                .into_response();
        }
    };

    log_response(&parts, &display_body(&parts.headers, &body_bytes));

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Get a loggable version of a body.
fn display_body(headers: &HeaderMap, body: &Bytes) -> String {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with("application/json"));

    if is_json {
        if let Ok(mut json) = serde_json::from_slice::<Value>(body) {
            redact_fields(&mut json);
            return json.to_string();
        }
    }

    match std::str::from_utf8(body) {
        Ok(text) => text.to_owned(),
        Err(_) => format!("<{} bytes of binary data>", body.len()),
    }
}

fn redact_fields(json: &mut Value) {
    if let Value::Object(object) = json {
        for field_name in REDACTED_FIELDS {
            if let Some(value) = object.get_mut(field_name) {
                *value = Value::String("********".to_owned());
            }
        }
    }
}

/// Cut `body` down to at most [LOG_BODY_LENGTH_LIMIT] characters.
///
/// Returns `None` if the body is already short enough.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if let Some(truncated_body) = truncate(body) {
        tracing::info!("Received request: {headers:#?}\nbody: {truncated_body}...");
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if let Some(truncated_body) = truncate(body) {
        tracing::info!("Sending response: {headers:#?}\nbody: {truncated_body}...");
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        body::Bytes,
        http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::routing::MAX_BODY_SIZE;

    use super::{LOG_BODY_LENGTH_LIMIT, display_body, logging_middleware, truncate};

    fn json_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn redacts_password_and_token() {
        let body = Bytes::from(r#"{"username":"alice","password":"hunter2"}"#);

        let display = display_body(&json_headers(), &body);

        assert!(!display.contains("hunter2"), "password leaked: {display}");
        assert!(display.contains("alice"));

        let body = Bytes::from(r#"{"access_token":"abc.def.ghi","token_type":"bearer"}"#);

        let display = display_body(&json_headers(), &body);

        assert!(!display.contains("abc.def.ghi"), "token leaked: {display}");
    }

    #[test]
    fn binary_bodies_are_not_decoded() {
        let body = Bytes::from_static(&[0x50, 0x4b, 0x03, 0x04, 0xff, 0xfe]);

        let display = display_body(&HeaderMap::new(), &body);

        assert_eq!(display, "<6 bytes of binary data>");
    }

    #[test]
    fn truncates_by_characters() {
        let short = "é".repeat(LOG_BODY_LENGTH_LIMIT);
        let long = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        assert_eq!(truncate(&short), None);
        assert_eq!(truncate(&long), Some(short.as_str()));
    }

    #[tokio::test]
    async fn passes_bodies_through_unchanged() {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).unwrap();
        let body = json!({ "password": "hunter2", "note": "x".repeat(200) });

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), body);
    }

    #[tokio::test]
    async fn rejects_bodies_over_the_size_limit() {
        let app = Router::new()
            .route("/upload", post(|| async { "stored" }))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/upload")
            .bytes(vec![b'a'; MAX_BODY_SIZE + 1].into())
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert!(response.json::<Value>()["error"].is_string());
    }
}
