use axum::response::IntoResponse;
use axum::Json;

use callsheet_types::api::{AnalyticsData, PageViews};

use crate::middleware::AdminSession;

/// GET /analytics — admin. Static placeholder numbers; real traffic
/// analytics are deliberately out of scope and the dashboard renders these
/// as-is.
pub async fn get_analytics(AdminSession(_claims): AdminSession) -> impl IntoResponse {
    Json(AnalyticsData {
        page_views: 12845,
        unique_visitors: 5732,
        bounce_rate: "42.3%".to_string(),
        avg_session_duration: "3m 24s".to_string(),
        top_pages: vec![
            PageViews { page: "/home".to_string(), views: 4532 },
            PageViews { page: "/films".to_string(), views: 3211 },
            PageViews { page: "/about".to_string(), views: 1876 },
            PageViews { page: "/contact".to_string(), views: 1226 },
        ],
    })
}
