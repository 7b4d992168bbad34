//! Process signals: graceful shutdown and signing-secret reload.

use std::collections::HashMap;

use gatehouse_auth::SharedTokenCodec;
use gatehouse_config::JwtConfig;
use tracing::{info, warn};

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Reads the nearest `.env` into a map. A missing file yields an empty map;
/// malformed lines are skipped.
pub fn read_dotenv() -> HashMap<String, String> {
    match dotenvy::dotenv_iter() {
        Ok(iter) => iter.filter_map(Result::ok).collect(),
        Err(e) if e.not_found() => HashMap::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read .env");
            HashMap::new()
        }
    }
}

/// JWT config where `.env` entries take precedence over the process
/// environment. The environment itself is left untouched.
pub fn jwt_config_with_overrides(overrides: &HashMap<String, String>) -> JwtConfig {
    JwtConfig::from_vars(|key| {
        overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
    })
}

/// Reloads `.env` and rotates the signing secret on every SIGHUP. Tokens
/// signed before the reload stop verifying.
#[cfg(unix)]
pub fn spawn_secret_reload(tokens: SharedTokenCodec) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGHUP; secret reload disabled");
                return;
            }
        };

        while hangup.recv().await.is_some() {
            tokens.rotate(&jwt_config_with_overrides(&read_dotenv()));
            info!("Reloaded signing secret after SIGHUP");
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_secret_reload(_tokens: SharedTokenCodec) {
    info!("Secret reload on SIGHUP is only available on Unix");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let overrides = HashMap::from([
            ("JWT_SECRET".to_string(), "rotated-secret".to_string()),
            ("JWT_ACCESS_EXPIRY".to_string(), "600".to_string()),
        ]);

        let config = jwt_config_with_overrides(&overrides);

        assert_eq!(config.secret, "rotated-secret");
        assert!(!config.insecure_default);
        assert_eq!(config.access_token_expiry, 600);
    }

    #[test]
    fn test_reload_rotates_shared_codec() {
        let tokens = SharedTokenCodec::from_config(&JwtConfig::new("before"));
        let before = tokens.current();
        let overrides = HashMap::from([("JWT_SECRET".to_string(), "after".to_string())]);

        tokens.rotate(&jwt_config_with_overrides(&overrides));

        assert!(!std::sync::Arc::ptr_eq(&before, &tokens.current()));
    }
}
