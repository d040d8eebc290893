use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

/// Runtime configuration. Every knob has a default so the server can start
/// bare; values load from `RIDGELINE_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_secs: i64,
    /// Hard cap the HTTP layer applies to a request's page size. The plan
    /// translator itself never caps.
    pub max_page_size: u64,
    /// Directory of `tours.json` / `users.json` / `reviews.json` loaded at
    /// startup when present.
    pub seed_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            jwt_secret: "ridgeline-dev-secret".to_string(),
            jwt_ttl_secs: 90 * 24 * 60 * 60,
            max_page_size: 500,
            seed_dir: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let defaults = Self::default();
        let jwt_secret = match env::var("RIDGELINE_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("RIDGELINE_JWT_SECRET not set, using the development secret");
                defaults.jwt_secret
            }
        };
        Self {
            port: load_or("RIDGELINE_PORT", defaults.port),
            jwt_secret,
            jwt_ttl_secs: load_or("RIDGELINE_JWT_TTL_SECS", defaults.jwt_ttl_secs),
            max_page_size: load_or("RIDGELINE_MAX_PAGE_SIZE", defaults.max_page_size),
            seed_dir: env::var("RIDGELINE_SEED_DIR").ok().map(PathBuf::from),
        }
    }
}

fn load_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                warn!("invalid {key} value ({e}), using default: {default}");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn defaults_are_usable() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_page_size, 500);
        assert!(config.seed_dir.is_none());
        assert!(config.jwt_ttl_secs > 0);
    }
}
