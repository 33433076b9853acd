use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// Claims carried by session tokens issued by the identity service.
#[derive(Debug, Deserialize, Serialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: Uuid,
}

/// Who is calling. Every service operation receives one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Authenticated(SessionUser),
}

impl Session {
    pub fn user(user_id: Uuid) -> Self {
        Session::Authenticated(SessionUser { user_id })
    }

    /// The caller's user id, or `Unauthorized` for anonymous callers.
    pub fn user_id(&self) -> AppResult<Uuid> {
        match self {
            Session::Authenticated(user) => Ok(user.user_id),
            Session::Anonymous => Err(AppError::Unauthorized),
        }
    }
}

/// Verifies HS256 bearer tokens against the secret shared with the identity service.
#[derive(Clone)]
pub struct SessionResolver {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionResolver {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }

    /// Missing, malformed, expired or forged credentials all resolve to `Anonymous`.
    pub fn resolve(&self, headers: &HeaderMap) -> Session {
        let Some(token) = bearer_token(headers) else {
            return Session::Anonymous;
        };

        let claims = match decode::<SessionClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims,
            Err(err) => {
                tracing::debug!(error = %err, "rejected session token");
                return Session::Anonymous;
            }
        };

        match Uuid::parse_str(&claims.sub) {
            Ok(user_id) => Session::user(user_id),
            Err(_) => {
                tracing::debug!(sub = %claims.sub, "session subject is not a user id");
                Session::Anonymous
            }
        }
    }

    /// Mint a token for local tooling (seeding, tests). Production tokens come
    /// from the identity service.
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> anyhow::Result<String> {
        let exp = (Utc::now() + ttl).timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            exp: usize::try_from(exp)?,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.sessions.resolve(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("header value"),
        );
        headers
    }

    #[test]
    fn valid_token_resolves_to_user() {
        let resolver = SessionResolver::new("test-secret");
        let user_id = Uuid::new_v4();
        let token = resolver.issue(user_id, Duration::minutes(5)).expect("token");

        let session = resolver.resolve(&headers_with(&format!("Bearer {token}")));
        assert_eq!(session, Session::user(user_id));
        assert_eq!(session.user_id().expect("user"), user_id);
    }

    #[test]
    fn missing_header_is_anonymous() {
        let resolver = SessionResolver::new("test-secret");
        assert_eq!(resolver.resolve(&HeaderMap::new()), Session::Anonymous);
    }

    #[test]
    fn wrong_scheme_is_anonymous() {
        let resolver = SessionResolver::new("test-secret");
        assert_eq!(
            resolver.resolve(&headers_with("Basic dXNlcjpwYXNz")),
            Session::Anonymous
        );
    }

    #[test]
    fn token_signed_with_other_secret_is_anonymous() {
        let issuer = SessionResolver::new("someone-else");
        let token = issuer
            .issue(Uuid::new_v4(), Duration::minutes(5))
            .expect("token");

        let resolver = SessionResolver::new("test-secret");
        assert_eq!(
            resolver.resolve(&headers_with(&format!("Bearer {token}"))),
            Session::Anonymous
        );
    }

    #[test]
    fn expired_token_is_anonymous() {
        let resolver = SessionResolver::new("test-secret");
        let token = resolver
            .issue(Uuid::new_v4(), Duration::hours(-2))
            .expect("token");
        assert_eq!(
            resolver.resolve(&headers_with(&format!("Bearer {token}"))),
            Session::Anonymous
        );
    }

    #[test]
    fn anonymous_session_is_unauthorized() {
        assert!(matches!(
            Session::Anonymous.user_id(),
            Err(AppError::Unauthorized)
        ));
    }
}
