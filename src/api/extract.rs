//! Request extractors.
//!
//! - [`AuthenticatedUser`] resolves the `Authorization: Bearer <token>`
//!   header to a user, or rejects with `401 UNAUTHENTICATED`.
//! - [`ApiJson`], [`ApiPath`] and [`ApiQuery`] wrap the axum extractors so
//!   their rejections use the JSON error body.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiErrorResponse;
use crate::application::accounts;
use crate::domain::User;
use crate::infrastructure::AppDependencies;

/// JSON body extractor with API-style rejections.
#[derive(Debug, Clone, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiErrorResponse))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor with API-style rejections.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiErrorResponse))]
pub struct ApiPath<T>(pub T);

/// Query string extractor with API-style rejections.
#[derive(Debug, Clone, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiErrorResponse))]
pub struct ApiQuery<T>(pub T);

/// The user owning the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    /// Raw token, kept so logout can close this very session.
    pub token: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppDependencies> for AuthenticatedUser {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        dependencies: &AppDependencies,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(ApiErrorResponse::unauthenticated)?;

        let user = accounts::current_user(dependencies, token).await?;
        Ok(Self {
            user,
            token: token.to_string(),
        })
    }
}
