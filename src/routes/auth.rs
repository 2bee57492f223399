use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{AuthenticatedUser, LoginRequest, RegisterRequest, TokenResponse, UserResponse},
    routes::AppState,
    services::auth,
};

/// Handler for account registration
pub async fn register(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    tracing::info!(request_id = %request_id, "Processing registration");
    let Json(request) = payload?;

    let user = auth::register(state.users.as_ref(), &state.auth, request).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// Handler for password login
pub async fn login(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    tracing::info!(request_id = %request_id, "Processing login");
    let Json(request) = payload?;

    let token = auth::login(state.users.as_ref(), &state.auth, request).await?;
    Ok(Json(token))
}

/// Tokens are stateless; the client discards its copy
pub async fn logout(Extension(user): Extension<AuthenticatedUser>) -> Json<Value> {
    tracing::info!(email = %user.email, "Logged out");
    Json(json!({ "message": "Successfully logged out" }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserResponse>> {
    let user = auth::current_user(state.users.as_ref(), &user.email).await?;
    Ok(Json(UserResponse::from(&user)))
}
