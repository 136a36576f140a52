use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// JWT claims issued on admin login and checked by the REST middleware.
/// Canonical definition lives here in callsheet-types so the api and server
/// crates agree on the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

// -- Response envelope --

/// The uniform `{status, message}` body every non-list endpoint returns,
/// success and failure alike, so the dashboard can branch on one shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".into(),
            message: message.into(),
        }
    }

    /// Informational outcome: the request was fine but nothing changed
    /// (currently only "already subscribed").
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            status: "info".into(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".into(),
            message: message.into(),
        }
    }
}

// -- Intake --

/// A validated contact-form submission. Produced only by
/// [`crate::validate::parse_contact`]; handlers never see raw payloads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    #[serde(default)]
    pub email: String,
}

// -- Admin actions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyRequest {
    pub subject: String,
    pub message: String,
}

// -- Analytics --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub page_views: u64,
    pub unique_visitors: u64,
    pub bounce_rate: String,
    pub avg_session_duration: String,
    pub top_pages: Vec<PageViews>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageViews {
    pub page: String,
    pub views: u64,
}
