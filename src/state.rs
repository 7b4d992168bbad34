use std::sync::Arc;

use gatehouse_auth::{CookieTransport, SharedTokenCodec};
use gatehouse_config::{CookieConfig, CorsConfig, JwtConfig, PasswordConfig, ServerConfig};
use gatehouse_core::PasswordHasher;
use gatehouse_db::{InMemoryUserRepository, PgUserRepository, UserRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use crate::modules::auth::SessionService;

/// Everything read from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub password: PasswordConfig,
    pub cors: CorsConfig,
    pub server: ServerConfig,
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            cookie: CookieConfig::from_env(),
            password: PasswordConfig::from_env(),
            cors: CorsConfig::from_env(),
            server: ServerConfig::from_env(),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub tokens: SharedTokenCodec,
    pub cookies: CookieTransport,
    pub sessions: SessionService,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserRepository>, config: &AppConfig) -> Self {
        let tokens = SharedTokenCodec::from_config(&config.jwt);
        let passwords = PasswordHasher::new(config.password.bcrypt_cost);
        let sessions = SessionService::new(users.clone(), tokens.clone(), passwords);

        Self {
            users,
            tokens,
            cookies: CookieTransport::new(&config.cookie, &config.jwt),
            sessions,
            cors_config: config.cors.clone(),
            server_config: config.server.clone(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Builds state on Postgres when `DATABASE_URL` is set, otherwise on the
/// in-memory store.
pub async fn init_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let users: Arc<dyn UserRepository> = match &config.database_url {
        Some(url) => {
            let pool = gatehouse_db::init_db_pool(url).await?;
            gatehouse_db::run_migrations(&pool).await?;
            info!("Connected to PostgreSQL and applied migrations");
            Arc::new(PgUserRepository::new(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; users are kept in memory and lost on restart");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    Ok(AppState::new(users, config))
}
