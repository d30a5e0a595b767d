use crate::application::{SlugFallback, DEFAULT_LEADERBOARD_TTL};
use dublaunch_errors::AppError;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_EMAIL_DOMAIN: &str = "uw.edu";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Storage {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for Storage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub allowed_domain: String,
}

/// Server settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub storage: Storage,
    pub database_url: Option<String>,
    pub leaderboard_ttl: Duration,
    pub slug_fallback: SlugFallback,
    /// `None` when sign-in is not configured; everything read-only still works.
    pub google: Option<GoogleConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: Storage::Memory,
            database_url: None,
            leaderboard_ttl: DEFAULT_LEADERBOARD_TTL,
            slug_fallback: SlugFallback::default(),
            google: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let storage = match var("STORAGE") {
            Some(s) => s.parse::<Storage>().map_err(|e| config_error("STORAGE", e))?,
            None => Storage::default(),
        };

        let database_url = var("DATABASE_URL");
        if storage == Storage::Postgres && database_url.is_none() {
            return Err(config_error(
                "DATABASE_URL",
                "must be set unless STORAGE=memory",
            ));
        }

        let leaderboard_ttl = match var("LEADERBOARD_REVALIDATE_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .map_err(|e| config_error("LEADERBOARD_REVALIDATE_SECS", e))?,
            ),
            None => DEFAULT_LEADERBOARD_TTL,
        };

        let slug_fallback = match var("SLUG_FALLBACK") {
            Some(s) => s.parse::<SlugFallback>().map_err(|e| config_error("SLUG_FALLBACK", e))?,
            None => SlugFallback::default(),
        };

        let google = match var("GOOGLE_CLIENT_ID") {
            Some(client_id) => Some(GoogleConfig {
                client_id,
                client_secret: var("GOOGLE_CLIENT_SECRET")
                    .ok_or_else(|| config_error("GOOGLE_CLIENT_SECRET", "missing"))?,
                redirect_uri: var("GOOGLE_REDIRECT_URI")
                    .ok_or_else(|| config_error("GOOGLE_REDIRECT_URI", "missing"))?,
                allowed_domain: var("ALLOWED_EMAIL_DOMAIN")
                    .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string()),
            }),
            None => None,
        };

        Ok(Self {
            storage,
            database_url,
            leaderboard_ttl,
            slug_fallback,
            google,
        })
    }
}

fn config_error(key: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::invalid(format!("{}: {}", key, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_postgres_needs_database_url() {
        assert!(load(&[]).is_err());

        let config = load(&[("DATABASE_URL", "postgres://localhost/dublaunch")]).unwrap();
        assert_eq!(config.storage, Storage::Postgres);
        assert_eq!(config.leaderboard_ttl, Duration::from_secs(3600));
        assert_eq!(config.slug_fallback, SlugFallback::RandomToken);
        assert!(config.google.is_none());
    }

    #[test]
    fn test_memory_storage_and_overrides() {
        let config = load(&[
            ("STORAGE", "memory"),
            ("LEADERBOARD_REVALIDATE_SECS", "60"),
            ("SLUG_FALLBACK", "reject"),
        ])
        .unwrap();

        assert_eq!(config.storage, Storage::Memory);
        assert_eq!(config.leaderboard_ttl, Duration::from_secs(60));
        assert_eq!(config.slug_fallback, SlugFallback::Reject);
    }

    #[test]
    fn test_bad_values_are_reported_by_key() {
        let err = load(&[("STORAGE", "memory"), ("LEADERBOARD_REVALIDATE_SECS", "soon")])
            .unwrap_err();
        assert!(err.to_string().contains("LEADERBOARD_REVALIDATE_SECS"));

        assert!(load(&[("STORAGE", "redis")]).is_err());
    }

    #[test]
    fn test_google_settings_come_together() {
        let partial = load(&[("STORAGE", "memory"), ("GOOGLE_CLIENT_ID", "abc")]);
        assert!(partial.is_err());

        let config = load(&[
            ("STORAGE", "memory"),
            ("GOOGLE_CLIENT_ID", "abc"),
            ("GOOGLE_CLIENT_SECRET", "shh"),
            ("GOOGLE_REDIRECT_URI", "http://localhost:3000/auth/callback"),
        ])
        .unwrap();
        let google = config.google.unwrap();
        assert_eq!(google.allowed_domain, "uw.edu");
    }
}
