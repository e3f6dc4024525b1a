use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use auth::{AppState, JwtConfig, JwtService, UserRepository, bootstrap, routes};
use common::{
    database::{self, DatabaseConfig},
    settings::ServiceSettings,
};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = ServiceSettings::load("AUTH", 3000)?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&settings.log_level))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    // Initialize database connection pool and schema
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::connect(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize JWT service
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(jwt_config);

    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    bootstrap::ensure_admin(&UserRepository::new(pool.clone()), &admin_password).await?;

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(AppState::new(pool, jwt_service));

    let addr = settings.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Authentication service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
