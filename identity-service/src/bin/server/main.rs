use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth::PasswordHasher;
use auth::SigningKey;
use auth::TokenCodec;
use identity_service::config::Config;
use identity_service::config::DatabaseConfig;
use identity_service::domain::user::ports::AuthServicePort;
use identity_service::domain::user::service::AuthService;
use identity_service::inbound::http::router::create_router;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        address = %config.server.address(),
        request_timeout_secs = config.server.request_timeout_secs,
        persistent_store = config.database.url.is_some(),
        token_ttl_hours = config.jwt.expiration_hours,
        "Configuration loaded"
    );

    let signing_key = SigningKey::from_config(config.jwt.secret.as_deref())?;
    if signing_key.is_generated() {
        tracing::warn!("No signing secret configured; generated a random one, sessions will not survive a restart");
    } else {
        tracing::info!("Using configured signing secret");
    }

    let password_hasher = PasswordHasher::with_params(config.password.into())?;
    let token_codec = TokenCodec::new(&signing_key, config.jwt.token_ttl()?);
    let authenticator = Arc::new(Authenticator::new(password_hasher, token_codec)?);

    let auth_service = build_auth_service(&config.database, Arc::clone(&authenticator)).await?;

    let http_address = config.server.address();
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        auth_service,
        authenticator,
        config.server.request_timeout(),
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn build_auth_service(
    database: &DatabaseConfig,
    authenticator: Arc<Authenticator>,
) -> Result<Arc<dyn AuthServicePort>, anyhow::Error> {
    let Some(url) = database.url.as_deref() else {
        tracing::warn!(store = "memory", "No database configured; users are kept in memory");
        let repository = Arc::new(InMemoryUserRepository::new());
        let service: Arc<dyn AuthServicePort> = Arc::new(AuthService::new(repository, authenticator));
        return Ok(service);
    };

    let pg_pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(Duration::from_secs(database.acquire_timeout_secs))
        .connect(url)
        .await?;
    tracing::info!(
        max_connections = database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let service: Arc<dyn AuthServicePort> = Arc::new(AuthService::new(repository, authenticator));
    Ok(service)
}
