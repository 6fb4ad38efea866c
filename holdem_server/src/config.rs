//! Server configuration.
//!
//! Consolidates all environment variable reads and provides validated
//! configuration.

use std::net::SocketAddr;
use std::str::FromStr;

use holdem_core::game::table::Chips;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server bind address.
    pub bind: SocketAddr,
    /// Seconds a player has to act before the room folds for them.
    pub turn_timeout_secs: u64,
    /// Stack handed to each player on seating.
    pub default_chips: Chips,
    /// Blind defaults for rooms that do not specify their own.
    pub default_small_blind: Chips,
    pub default_big_blind: Chips,
    /// Upper bound on concurrently open rooms.
    pub max_rooms: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ServerConfig {
    /// Load configuration from environment variables, with CLI overrides
    /// taking precedence.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:8080"
                    .parse()
                    .expect("default bind address is valid")
            });

        Ok(Self {
            bind,
            turn_timeout_secs: parse_env_or("TURN_TIMEOUT_SECS", 30),
            default_chips: parse_env_or("DEFAULT_CHIPS", 1000),
            default_small_blind: parse_env_or("DEFAULT_SMALL_BLIND", 10),
            default_big_blind: parse_env_or("DEFAULT_BIG_BLIND", 20),
            max_rooms: parse_env_or("MAX_ROOMS", 100),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.turn_timeout_secs < 5 {
            return Err(ConfigError::Invalid {
                var: "TURN_TIMEOUT_SECS".to_string(),
                reason: "must be at least 5 seconds".to_string(),
            });
        }
        if self.default_small_blind == 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_SMALL_BLIND".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.default_big_blind < self.default_small_blind * 2 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_BIG_BLIND".to_string(),
                reason: "must be at least twice the small blind".to_string(),
            });
        }
        if self.default_chips < self.default_big_blind {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_CHIPS".to_string(),
                reason: "must cover at least one big blind".to_string(),
            });
        }
        if self.max_rooms == 0 {
            return Err(ConfigError::Invalid {
                var: "MAX_ROOMS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_env_or<T: FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            turn_timeout_secs: 30,
            default_chips: 1000,
            default_small_blind: 10,
            default_big_blind: 20,
            max_rooms: 100,
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_blinds() {
        let config = ServerConfig {
            default_big_blind: 15,
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_hair_trigger_timeout() {
        let config = ServerConfig {
            turn_timeout_secs: 1,
            ..base()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_buy_in_below_big_blind() {
        let config = ServerConfig {
            default_chips: 10,
            ..base()
        };
        assert!(config.validate().is_err());
    }
}
