use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;

use callsheet_db::models::SubscriberRow;
use callsheet_db::queries::SubscriberInsert;
use callsheet_types::api::StatusResponse;
use callsheet_types::models::NewsletterSubscriber;
use callsheet_types::validate;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::mailer;
use crate::middleware::AdminSession;
use crate::parse_timestamp;

/// POST /subscribers — public. A duplicate email is an informational
/// outcome, not an error: the lookup catches the common case and the UNIQUE
/// constraint catches the check-then-insert race.
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|_| validate::ValidationError::InvalidEmail)?;
    let req = validate::parse_subscribe(payload)?;

    let db = state.clone();
    let email = req.email.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        if db.db.find_subscriber_by_email(&email)?.is_some() {
            return Ok(SubscriberInsert::AlreadySubscribed);
        }
        db.db.create_subscriber(&email)
    })
    .await??;

    match outcome {
        SubscriberInsert::Created(row) => {
            mailer::send_best_effort(
                state.mailer.clone(),
                row.email.clone(),
                "Welcome to the Dreamaker newsletter".to_string(),
                "<p>Thanks for subscribing! You will hear from us about \
                 upcoming productions and screenings.</p>"
                    .to_string(),
            );

            Ok(Json(StatusResponse::success(
                "You have been subscribed to the newsletter",
            )))
        }
        SubscriberInsert::AlreadySubscribed => Ok(Json(StatusResponse::info(
            "You are already subscribed to the newsletter",
        ))),
    }
}

/// GET /subscribers — admin. Newest first.
pub async fn list_subscribers(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_subscribers()).await??;

    let subscribers: Vec<NewsletterSubscriber> = rows
        .into_iter()
        .map(|row| NewsletterSubscriber {
            id: row.id,
            email: row.email,
            subscribed_at: parse_timestamp(&row.subscribed_at),
        })
        .collect();

    Ok(Json(subscribers))
}

/// DELETE /subscribers/{id} — admin.
pub async fn delete_subscriber(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let deleted = tokio::task::spawn_blocking(move || db.db.delete_subscriber(id)).await??;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    Ok(Json(StatusResponse::success("Subscriber deleted")))
}

/// GET /subscribers/export — admin. CSV attachment, newest first.
/// Zero subscribers is a header-only document, not an error.
pub async fn export_subscribers(
    State(state): State<AppState>,
    AdminSession(_claims): AdminSession,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_subscribers()).await??;

    let csv = build_subscribers_csv(&rows);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=newsletter-subscribers.csv",
            ),
        ],
        csv,
    ))
}

/// The dashboard's import tooling expects exactly this shape: a bare
/// `id,email,subscribedAt` header, then one line per subscriber with the
/// email and RFC 3339 timestamp quoted and the id bare.
fn build_subscribers_csv(rows: &[SubscriberRow]) -> String {
    let mut out = String::from("id,email,subscribedAt\n");
    for row in rows {
        out.push_str(&format!(
            "{},\"{}\",\"{}\"\n",
            row.id,
            escape_csv(&row.email),
            escape_csv(&row.subscribed_at),
        ));
    }
    out
}

fn escape_csv(field: &str) -> String {
    field.replace('"', "\"\"")
}
