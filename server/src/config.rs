use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STATIC_DIR: &str = "web/dist";

#[derive(Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the built web client, served with SPA fallback.
    pub static_dir: String,
    /// Players needed in a waiting room before a paragraph is handed out.
    pub min_players: usize,
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3000))),
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            min_players: 1,
            database_url: None,
        }
    }
}

impl ServerConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("RACE_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("RACE_BIND_ADDR is not a socket address: {}", addr))?;
        }
        if let Some(dir) = lookup("RACE_STATIC_DIR") {
            config.static_dir = dir;
        }
        if let Some(min) = lookup("RACE_MIN_PLAYERS") {
            let min: usize = min
                .parse()
                .map_err(|_| anyhow!("RACE_MIN_PLAYERS must be a positive integer, got {}", min))?;
            config.min_players = min.max(1);
        }
        config.database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(env(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.min_players, 1);
        assert_eq!(config.database_url, None);
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(env(&[
            ("RACE_BIND_ADDR", "127.0.0.1:4100"),
            ("RACE_STATIC_DIR", "/srv/race"),
            ("RACE_MIN_PLAYERS", "2"),
            ("DATABASE_URL", "postgres://localhost/race"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:4100".parse().unwrap());
        assert_eq!(config.static_dir, "/srv/race");
        assert_eq!(config.min_players, 2);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/race"));
    }

    #[test]
    fn zero_min_players_is_clamped() {
        let config = ServerConfig::from_lookup(env(&[("RACE_MIN_PLAYERS", "0")])).unwrap();
        assert_eq!(config.min_players, 1);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(ServerConfig::from_lookup(env(&[("RACE_BIND_ADDR", "nowhere")])).is_err());
        assert!(ServerConfig::from_lookup(env(&[("RACE_MIN_PLAYERS", "-3")])).is_err());
    }

    #[test]
    fn empty_database_url_means_none() {
        let config = ServerConfig::from_lookup(env(&[("DATABASE_URL", "")])).unwrap();
        assert_eq!(config.database_url, None);
    }
}
