use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use callsheet_api::auth::{self, AppState, AppStateInner};
use callsheet_api::mailer::Mailer;
use callsheet_api::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "callsheet=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("CALLSHEET_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("CALLSHEET_DB_PATH").unwrap_or_else(|_| "callsheet.db".into());
    let host = std::env::var("CALLSHEET_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CALLSHEET_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@dreammaker.fr".into());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        warn!("ADMIN_PASSWORD not set, using the dev default");
        "admin123".into()
    });

    // Init database and ensure the admin account exists
    let db = callsheet_db::Database::open(&PathBuf::from(&db_path))?;
    auth::seed_admin(&db, &admin_email, &admin_password)?;

    // Outbound email is optional; without BREVO_API_KEY every notification
    // becomes a logged no-op
    let mailer = Mailer::from_env().map(Arc::new);
    if mailer.is_none() {
        warn!("BREVO_API_KEY not set, outbound email disabled");
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        mailer,
        admin_email,
    });

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Callsheet admin backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
