use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::facade::MAX_EVENT_BUFFER;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    /// `None` - места хранятся только в памяти процесса
    pub database: Option<DatabaseConfig>,
    pub inventory: InventoryConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("unknown log format '{other}'"),
        }
    }
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

// Настройки зала
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    pub total_tickets: u32,
    pub lock_timeout_ms: Option<u64>,
    pub event_buffer: usize,
}

impl InventoryConfig {
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Собирает конфигурацию из произвольного источника переменных.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let database = match vars.get("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                pool_size: vars.parse_or("DB_POOL_SIZE", 5)?,
                acquire_timeout_secs: vars.parse_or("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
            }),
            _ => None,
        };

        let config = Config {
            app: AppConfig {
                host: vars.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: vars.parse_or("PORT", 8000)?,
                environment: vars
                    .get("ENVIRONMENT")
                    .unwrap_or_else(|| "development".to_string()),
                rust_log: vars
                    .get("RUST_LOG")
                    .unwrap_or_else(|| "seat_booking=debug,tower_http=debug".to_string()),
                log_format: vars.parse_or("LOG_FORMAT", LogFormat::Pretty)?,
            },
            database,
            inventory: InventoryConfig {
                total_tickets: vars.parse_or("TOTAL_TICKETS", 20)?,
                lock_timeout_ms: vars.parse_opt("LOCK_TIMEOUT_MS")?,
                event_buffer: vars.parse_or("EVENT_BUFFER", 64)?,
            },
        };

        if config.inventory.total_tickets == 0 {
            anyhow::bail!("TOTAL_TICKETS must be greater than zero");
        }
        if config.inventory.event_buffer == 0 || config.inventory.event_buffer > MAX_EVENT_BUFFER {
            anyhow::bail!("EVENT_BUFFER must be between 1 and {}", MAX_EVENT_BUFFER);
        }
        if let Some(db) = &config.database {
            if db.pool_size == 0 {
                anyhow::bail!("DB_POOL_SIZE must be greater than zero");
            }
        }

        Ok(config)
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }

    fn parse_opt<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("{name} has invalid value '{raw}'")),
            None => Ok(None),
        }
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parse_opt(name)?.unwrap_or(default))
    }
}
