use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::instrument;

use crate::{
    db::UserStore,
    error::{AppError, AppResult},
    models::{Claims, LoginRequest, NewUser, RegisterRequest, TokenResponse, User},
};

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_LOGIN: &str = "Incorrect email or password";

/// Token signing and password hashing parameters
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub bcrypt_cost: u32,
}

/// Hashes a password with bcrypt on the blocking pool
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

/// Signs an HS256 access token for `email`
pub fn issue_token(email: &str, settings: &AuthSettings) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp(),
        exp: (now + settings.access_token_ttl).timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

/// Verifies signature and expiry. Any failure is `Unauthorized`.
pub fn decode_token(token: &str, settings: &AuthSettings) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected access token");
        AppError::Unauthorized("Could not validate credentials".to_string())
    })
}

/// Trims and lowercases an email, rejecting anything not shaped like
/// `local@domain.tld`
fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(AppError::InvalidInput("Invalid email address".to_string()))
    }
}

/// Creates an account. The nickname defaults to the email's local part.
#[instrument(skip_all)]
pub async fn register(
    users: &dyn UserStore,
    settings: &AuthSettings,
    request: RegisterRequest,
) -> AppResult<User> {
    let email = normalize_email(&request.email)?;

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    if users.find_active_by_email(&email).await?.is_some() {
        return Err(AppError::InvalidInput(
            "Email already registered".to_string(),
        ));
    }

    let nickname = request
        .nickname
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let password_hash = hash_password(&request.password, settings.bcrypt_cost).await?;

    let user = users
        .create_user(NewUser {
            email,
            password_hash,
            nickname,
        })
        .await?;

    tracing::info!(user_id = user.id, "Registered user");
    Ok(user)
}

/// Checks credentials and issues an access token
#[instrument(skip_all)]
pub async fn login(
    users: &dyn UserStore,
    settings: &AuthSettings,
    request: LoginRequest,
) -> AppResult<TokenResponse> {
    let unauthorized = || AppError::Unauthorized(INVALID_LOGIN.to_string());

    let email = normalize_email(&request.email).map_err(|_| unauthorized())?;
    let user = users
        .find_active_by_email(&email)
        .await?
        .ok_or_else(unauthorized)?;

    if !verify_password(&request.password, &user.password).await? {
        tracing::info!(user_id = user.id, "Login rejected");
        return Err(unauthorized());
    }

    let token = issue_token(&user.email, settings)?;
    tracing::info!(user_id = user.id, "Login succeeded");
    Ok(TokenResponse::bearer(token))
}

/// Loads the live account behind an authenticated email
pub async fn current_user(users: &dyn UserStore, email: &str) -> AppResult<User> {
    users
        .find_active_by_email(email)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))
}
