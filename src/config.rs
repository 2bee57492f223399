use serde::Deserialize;

use crate::services::auth::AuthSettings;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL. When unset the server runs against the
    /// in-memory store seeded with the reference tag vocabulary only; that
    /// catalog has no destinations, so every survey returns an empty list.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HMAC secret used to sign access tokens
    pub jwt_secret: String,

    /// Access token lifetime
    #[serde(default = "default_token_expire_minutes")]
    pub access_token_expire_minutes: i64,

    /// bcrypt work factor for stored passwords
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Number of recommendations returned when the caller does not ask
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
}

fn default_max_connections() -> u32 {
    5
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_token_expire_minutes() -> i64 {
    30
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_top_n() -> usize {
    crate::services::DEFAULT_TOP_N
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            access_token_ttl: chrono::Duration::minutes(self.access_token_expire_minutes),
            bcrypt_cost: self.bcrypt_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(vars(&[("JWT_SECRET", "s3cret")])).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.default_top_n, 3);
    }

    #[test]
    fn test_overrides_read_from_environment() {
        let config: Config = envy::from_iter(vars(&[
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://localhost/wayfinder"),
            ("PORT", "8080"),
            ("DEFAULT_TOP_N", "5"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "90"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/wayfinder")
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.default_top_n, 5);

        let auth = config.auth_settings();
        assert_eq!(auth.access_token_ttl, chrono::Duration::minutes(90));
        assert_eq!(auth.jwt_secret, "s3cret");
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error() {
        let result = envy::from_iter::<_, Config>(vars(&[("PORT", "8080")]));
        assert!(result.is_err());
    }
}
