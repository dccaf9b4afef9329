//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::session::COOKIE_SESSION_ID;

/// The number of bytes of a body that is logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level.
///
/// The value of the session cookie is redacted from the logged headers.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    log_message(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &redact_session_cookie(&parts.headers),
        &String::from_utf8_lossy(&body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_message(
        &format!("Sending response: {}", parts.status),
        &redact_session_cookie(&parts.headers),
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, usize::MAX).await
}

fn log_message(summary: &str, headers: &HeaderMap, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        let truncated = truncate_to_char_boundary(body, LOG_BODY_LENGTH_LIMIT);
        tracing::info!("{summary}\nheaders: {headers:#?}\nbody: {truncated}...");
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{summary}\nheaders: {headers:#?}\nbody: {body:?}");
    }
}

fn truncate_to_char_boundary(text: &str, max_len: usize) -> &str {
    let mut end = max_len.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

/// Copy `headers`, replacing the session token in `Cookie` and `Set-Cookie`
/// headers with asterisks.
fn redact_session_cookie(headers: &HeaderMap) -> HeaderMap {
    let mut redacted = headers.clone();

    for name in [COOKIE, SET_COOKIE] {
        let values: Vec<HeaderValue> = redacted
            .get_all(&name)
            .iter()
            .map(|value| match value.to_str() {
                Ok(text) => HeaderValue::from_str(&redact_cookie_value(text, COOKIE_SESSION_ID))
                    .unwrap_or_else(|_| value.clone()),
                Err(_) => value.clone(),
            })
            .collect();

        redacted.remove(&name);
        for value in values {
            redacted.append(&name, value);
        }
    }

    redacted
}

fn redact_cookie_value(cookie_text: &str, cookie_name: &str) -> String {
    let prefix = format!("{cookie_name}=");

    cookie_text
        .split(';')
        .map(|pair| {
            if pair.trim_start().starts_with(&prefix) {
                let leading_whitespace = &pair[..pair.len() - pair.trim_start().len()];
                format!("{leading_whitespace}{prefix}********")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod logging_tests {
    use axum::{
        Router,
        http::{HeaderMap, HeaderValue, header::COOKIE},
        middleware,
        routing::post,
    };
    use axum_test::TestServer;

    use super::{
        logging_middleware, redact_cookie_value, redact_session_cookie, truncate_to_char_boundary,
    };

    #[test]
    fn redacts_session_cookie_only() {
        let got = redact_cookie_value("theme=dark; sessionId=abc-123; lang=en", "sessionId");

        assert_eq!(got, "theme=dark; sessionId=********; lang=en");
    }

    #[test]
    fn redacts_set_cookie_attributes_untouched() {
        let got = redact_cookie_value("sessionId=abc-123; Path=/; Max-Age=604800", "sessionId");

        assert_eq!(got, "sessionId=********; Path=/; Max-Age=604800");
    }

    #[test]
    fn leaves_other_cookies_alone() {
        let got = redact_cookie_value("session=abc", "sessionId");

        assert_eq!(got, "session=abc");
    }

    #[test]
    fn redacts_header_map() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("sessionId=secret"));

        let got = redact_session_cookie(&headers);

        assert_eq!(got.get(COOKIE).unwrap(), "sessionId=********");
        assert_eq!(headers.get(COOKIE).unwrap(), "sessionId=secret");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let text = "aé";

        assert_eq!(truncate_to_char_boundary(text, 2), "a");
        assert_eq!(truncate_to_char_boundary(text, 10), "aé");
    }

    #[tokio::test]
    async fn passes_body_through_unchanged() {
        async fn echo(body: String) -> String {
            body
        }

        let app = Router::new()
            .route("/echo", post(echo))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::new(app).expect("Could not create test server.");
        let body = "x".repeat(200);

        let response = server.post("/echo").text(body.clone()).await;

        response.assert_status_ok();
        response.assert_text(body);
    }
}
