use std::time::Duration;

use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::AppState;
use crate::{analytics, auth, contacts, newsletter};

/// The full HTTP surface. Admin handlers gate themselves with the
/// [`crate::middleware::AdminSession`] extractor; the public intake and auth
/// endpoints take no session.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/contacts", post(contacts::submit_contact).get(contacts::list_contacts))
        .route("/contacts/{id}/archive", post(contacts::archive_contact))
        .route("/contacts/{id}/reply", post(contacts::reply_to_contact))
        .route("/subscribers", post(newsletter::subscribe).get(newsletter::list_subscribers))
        .route("/subscribers/{id}", delete(newsletter::delete_subscriber))
        .route("/subscribers/export", get(newsletter::export_subscribers))
        .route("/analytics", get(analytics::get_analytics))
        .route("/auth/login", post(auth::login))
        .route("/auth/password-reset", post(auth::request_password_reset))
        .layer(cors_layer())
        .with_state(state)
}

/// Browser clients call this API cross-origin from the marketing site and
/// the dashboard, so the layer echoes the request origin (credentials rule
/// out a literal wildcard) and answers preflight for a day.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400))
}
