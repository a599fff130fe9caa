use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use noticeboard::{
    api,
    auth::AuthService,
    config::Settings,
    repository::{SqliteNoticeRepository, SqliteUserRepository},
    service::ServiceContext,
    storage::LocalFileStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "noticeboard=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting notice board server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize services
    let auth_service = Arc::new(AuthService::new(
        &settings.auth.jwt_secret,
        settings.auth.token_duration_hours,
    ));

    let notice_repo = Arc::new(SqliteNoticeRepository::new(db_pool.clone()));
    let user_repo = Arc::new(SqliteUserRepository::new(db_pool.clone()));
    let file_store = Arc::new(LocalFileStore::new(settings.uploads.dir.clone()));

    let service_context = Arc::new(ServiceContext::new(
        notice_repo,
        user_repo,
        file_store,
        auth_service,
        db_pool.clone(),
    ));

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
