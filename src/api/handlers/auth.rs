//! Account handlers.
//!
//! - `POST /auth/register` - Create an account
//! - `POST /auth/login` - Open a session and receive a bearer token
//! - `POST /auth/logout` - Close the current session
//! - `GET /auth/me` - The authenticated user

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::api::error::ApiErrorResponse;
use crate::api::extract::{ApiJson, AuthenticatedUser};
use crate::application::accounts;
use crate::infrastructure::AppDependencies;

/// POST /auth/register
///
/// # Request Body
///
/// ```json
/// {
///     "email": "ana@example.com",
///     "password": "Secret123",
///     "password_confirmation": "Secret123"
/// }
/// ```
///
/// # Errors
///
/// - `400 VALIDATION_ERROR` - Invalid form
/// - `409 EMAIL_TAKEN` - E-mail already registered
pub async fn register(
    State(dependencies): State<AppDependencies>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiErrorResponse> {
    let user = accounts::register(
        &dependencies,
        &request.email,
        &request.password,
        &request.password_confirmation,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /auth/login
///
/// # Errors
///
/// - `400 VALIDATION_ERROR` - Missing e-mail or password
/// - `401 INVALID_CREDENTIALS` - Unknown e-mail or wrong password
pub async fn login(
    State(dependencies): State<AppDependencies>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiErrorResponse> {
    let outcome = accounts::login(
        &dependencies,
        &request.email,
        &request.password,
        request.remember_me,
    )
    .await?;
    Ok(Json(outcome.into()))
}

/// POST /auth/logout
///
/// # Errors
///
/// - `401 UNAUTHENTICATED` - Missing or invalid token
pub async fn logout(
    State(dependencies): State<AppDependencies>,
    authenticated: AuthenticatedUser,
) -> Result<StatusCode, ApiErrorResponse> {
    accounts::logout(&dependencies, &authenticated.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/me
#[allow(clippy::unused_async)]
pub async fn me(authenticated: AuthenticatedUser) -> Json<UserResponse> {
    Json(authenticated.user.into())
}
