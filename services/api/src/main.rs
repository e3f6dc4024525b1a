use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{AppState, routes};
use auth::{JwtConfig, JwtService};
use common::{
    database::{self, DatabaseConfig},
    seed,
    settings::ServiceSettings,
};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = ServiceSettings::load("API", 3001)?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&settings.log_level))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    // Initialize database connection pool and schema
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::connect(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let seeded = seed::seed_all_users(&pool).await?;
    info!("Default category backfill created {} rows", seeded);

    let jwt_service = JwtService::new(JwtConfig::from_env()?);

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(AppState::new(pool, jwt_service));

    let addr = settings.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
