//! HTTP basic-auth middleware for the dashboard routes.
//!
//! Every route except the health endpoint sits behind this check. The
//! credentials come from configuration (env-overridable); a failed check
//! answers 401 with a `WWW-Authenticate` challenge so browsers prompt.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::AppError;
use crate::state::AppState;

/// Middleware validating basic-auth credentials on every request.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let expected = (
        state.config.dashboard.username.as_str(),
        state.config.dashboard.password.as_str(),
    );

    match credentials_from_headers(req.headers()) {
        Some((username, password)) if (username.as_str(), password.as_str()) == expected => {
            next.run(req).await
        }
        _ => challenge_response(),
    }
}

/// Extract the username/password pair from an `Authorization: Basic` header.
fn credentials_from_headers(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn challenge_response() -> Response {
    let mut response =
        AppError::Unauthorized("missing or invalid credentials".to_string()).into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"paid-admin\", charset=\"UTF-8\""),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn parses_well_formed_basic_credentials() {
        let encoded = BASE64.encode("admin:s3cret");
        let headers = headers_with_auth(&format!("Basic {encoded}"));
        assert_eq!(
            credentials_from_headers(&headers),
            Some(("admin".to_string(), "s3cret".to_string()))
        );
    }

    #[test]
    fn password_may_contain_colons() {
        let encoded = BASE64.encode("admin:pa:ss:word");
        let headers = headers_with_auth(&format!("Basic {encoded}"));
        assert_eq!(
            credentials_from_headers(&headers),
            Some(("admin".to_string(), "pa:ss:word".to_string()))
        );
    }

    #[test]
    fn rejects_other_schemes_and_junk() {
        assert_eq!(credentials_from_headers(&HeaderMap::new()), None);
        assert_eq!(
            credentials_from_headers(&headers_with_auth("Bearer some-token")),
            None
        );
        assert_eq!(
            credentials_from_headers(&headers_with_auth("Basic not!base64!!")),
            None
        );

        let no_colon = BASE64.encode("just-a-user");
        assert_eq!(
            credentials_from_headers(&headers_with_auth(&format!("Basic {no_colon}"))),
            None
        );
    }
}
