use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use callsheet_types::api::{ReplyRequest, StatusResponse};
use callsheet_types::models::ContactMessage;
use callsheet_types::validate;
use callsheet_types::validate::ValidationError;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::mailer;
use crate::middleware::AdminSession;
use crate::parse_timestamp;

/// POST /contacts — public intake. Validates, persists, then fires a
/// best-effort notification to the admin inbox.
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // A body the extractor cannot even parse fails the same way a bad
    // payload does, so every 400 carries the envelope.
    let Json(payload) = payload.map_err(|_| ValidationError::InvalidInput)?;
    let submission = validate::parse_contact(payload)?;

    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.create_contact(
            &submission.full_name,
            &submission.email,
            submission.phone.as_deref(),
            &submission.message,
        )
    })
    .await??;

    mailer::send_best_effort(
        state.mailer.clone(),
        state.admin_email.clone(),
        format!("New contact message from {}", row.full_name),
        format!(
            "<p><strong>{}</strong> &lt;{}&gt; wrote:</p><p>{}</p>",
            row.full_name, row.email, row.message
        ),
    );

    Ok(Json(StatusResponse::success("Message sent successfully")))
}

/// GET /contacts — admin. Non-archived messages, newest first.
pub async fn list_contacts(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_contacts()).await??;

    let contacts: Vec<ContactMessage> = rows
        .into_iter()
        .map(|row| ContactMessage {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            message: row.message,
            created_at: parse_timestamp(&row.created_at),
        })
        .collect();

    Ok(Json(contacts))
}

/// POST /contacts/{id}/archive — admin. Persisted soft-delete; the message
/// drops out of the list but stays in the table.
pub async fn archive_contact(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let archived = tokio::task::spawn_blocking(move || db.db.archive_contact(id)).await??;

    if !archived {
        return Err(ApiError::NotFound);
    }

    Ok(Json(StatusResponse::success("Message archived")))
}

/// POST /contacts/{id}/reply — admin. Sending the email is the whole point
/// here, so unlike intake notifications a failure is surfaced to the caller.
pub async fn reply_to_contact(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Path(id): Path<i64>,
    Json(req): Json<ReplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mailer = state.mailer.clone().ok_or(ApiError::MailerUnavailable)?;

    let db = state.clone();
    let contact = tokio::task::spawn_blocking(move || db.db.get_contact(id))
        .await??
        .ok_or(ApiError::NotFound)?;

    mailer
        .send(&contact.email, &req.subject, &req.message)
        .await
        .map_err(|e| {
            tracing::warn!("reply to contact {} failed: {:#}", id, e);
            ApiError::MailerFailed
        })?;

    Ok(Json(StatusResponse::success("Reply sent")))
}
