use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AppError, AppResult},
    models::AuthenticatedUser,
    routes::AppState,
    services::auth,
};

/// Requires a valid `Authorization: Bearer <token>` header and attaches the
/// caller as an `AuthenticatedUser` extension
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;

    let claims = auth::decode_token(token, &state.auth)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { email: claims.sub });

    Ok(next.run(request).await)
}
