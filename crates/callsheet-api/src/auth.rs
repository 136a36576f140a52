use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{extract::State, response::IntoResponse, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use tracing::info;

use callsheet_db::Database;
use callsheet_types::api::{
    Claims, LoginRequest, LoginResponse, PasswordResetRequest, StatusResponse,
};
use callsheet_types::validate::ValidationError;

use crate::error::ApiError;
use crate::mailer::{self, Mailer};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub mailer: Option<Arc<Mailer>>,
    /// Target for operational notifications (new contact, reset requests).
    pub admin_email: String,
}

/// Admin sessions last a day; the dashboard re-authenticates after that.
const TOKEN_TTL_HOURS: i64 = 24;

/// Ensure the admin account exists, hashing the configured password with
/// Argon2id. An existing row is left untouched so a stale env password never
/// silently overwrites a rotated one.
pub fn seed_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<()> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {}", e))?
        .to_string();

    if db.create_admin_if_missing(email, &password_hash)? {
        info!("Admin account seeded for {}", email);
    }
    Ok(())
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let email = req.email.trim().to_lowercase();
    let lookup = email.clone();

    let admin = tokio::task::spawn_blocking(move || db.db.get_admin(&lookup))
        .await??
        // Same failure for unknown email and wrong password, so responses
        // cannot be used to enumerate accounts.
        .ok_or(ApiError::IncorrectCredentials)?;

    let parsed_hash = PasswordHash::new(&admin.password)
        .map_err(|e| ApiError::Storage(anyhow::anyhow!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::IncorrectCredentials)?;

    let token = create_token(&state.jwt_secret, &email)?;

    Ok(Json(LoginResponse { email, token }))
}

/// No credential mutation happens here: the request just notifies the
/// administrator, who handles the reset manually.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_string();
    if email.is_empty() {
        return Err(ValidationError::InvalidInput.into());
    }

    mailer::send_best_effort(
        state.mailer.clone(),
        state.admin_email.clone(),
        "Password reset requested".to_string(),
        format!(
            "<p>A password reset was requested for <strong>{}</strong> on the \
             Dreamaker admin dashboard.</p>",
            email
        ),
    );

    Ok(Json(StatusResponse::success(
        "An email has been sent to the administrator to reset your access.",
    )))
}

pub fn create_token(secret: &str, email: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
