use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{jwt::JwtKeys, repo_types::UserId};
use crate::error::AppError;

/// Authenticated caller, taken from a `Bearer` access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub username: String,
}

/// Caller that may be anonymous. A missing `Authorization` header yields
/// `None`; a header that is present but invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|u| u.id)
    }
}

fn authenticate(parts: &Parts, keys: &JwtKeys) -> Result<Option<AuthUser>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| AppError::InvalidToken("Authorization header is not valid ASCII".into()))?;

    // Expect "Bearer <token>"
    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidToken("invalid auth scheme".into()))?;

    let claims = keys.verify_access(token).map_err(|e| {
        warn!(error = %e, "rejected bearer token");
        AppError::InvalidToken(e.to_string())
    })?;

    Ok(Some(AuthUser {
        id: claims.user_id,
        username: claims.username,
    }))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        authenticate(parts, &keys)?.ok_or(AppError::AuthenticationRequired)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        Ok(MaybeAuthUser(authenticate(parts, &keys)?))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::config::JwtConfig;

    fn keys() -> JwtKeys {
        JwtKeys::from(&JwtConfig {
            secret: "s".into(),
            issuer: "i".into(),
            audience: "a".into(),
            ttl_minutes: 5,
            refresh_ttl_minutes: 60,
        })
    }

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/blogs/");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn missing_header_is_anonymous() {
        assert!(authenticate(&parts(None), &keys()).unwrap().is_none());
    }

    #[test]
    fn valid_access_token_authenticates() {
        let keys = keys();
        let token = keys.sign_access(5, "a@x.com").unwrap();
        let user = authenticate(&parts(Some(&format!("Bearer {token}"))), &keys)
            .unwrap()
            .expect("authenticated");
        assert_eq!(user.id, 5);
        assert_eq!(user.username, "a@x.com");
    }

    #[test]
    fn refresh_token_is_rejected() {
        let keys = keys();
        let token = keys.sign_refresh(5, "a@x.com").unwrap();
        let err = authenticate(&parts(Some(&format!("Bearer {token}"))), &keys).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken(..)));
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        let err = authenticate(&parts(Some("Basic dXNlcjpwYXNz")), &keys()).unwrap_err();
        assert!(matches!(err, AppError::InvalidToken(..)));
    }
}
