use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::vars;

    #[test]
    fn test_default_origins() {
        let config = CorsConfig::from_vars(vars(&[]));
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_origins_are_trimmed_and_filtered() {
        let config = CorsConfig::from_vars(vars(&[(
            "ALLOWED_ORIGINS",
            " https://app.example.com , ,https://admin.example.com",
        )]));
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example.com", "https://admin.example.com"]
        );
    }
}
