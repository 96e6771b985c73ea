//! Bearer-token resolution of the acting identity.
//!
//! Tokens are stored as hex SHA-256 digests; the plaintext only ever exists
//! in the config file and the request header. A request without credentials
//! resolves to `Actor::Anonymous` rather than failing, so read routes stay
//! open; a token that matches no account is rejected outright.

use axum::Json;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::api::AppState;
use crate::model::Actor;

pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
}

fn invalid_token() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid token."})),
    )
        .into_response()
}

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Actor::Anonymous);
        };

        let Ok(value) = header.to_str() else {
            return Err(invalid_token());
        };

        // Schemes other than bearer/token belong to other authenticators.
        let Some(token) = bearer_token(value) else {
            return Ok(Actor::Anonymous);
        };

        match state.db.find_user_by_token_digest(&token_digest(token)).await {
            Ok(Some(user)) => Ok(Actor::User(user)),
            Ok(None) => Err(invalid_token()),
            Err(e) => {
                tracing::error!(error = %crate::unpack_error(e.as_ref()), "token lookup failed");
                Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "Internal server error."})),
                )
                    .into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        let digest = token_digest("secret");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, token_digest("secret"));
        assert_ne!(digest, token_digest("other"));
    }

    #[test]
    fn both_header_schemes_are_accepted() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Token abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
    }
}
