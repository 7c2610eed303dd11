use serde::Deserialize;
use std::time::Duration;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
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

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://...` или `memory://` для хранилища в памяти.
    pub url: String,
    pub pool_size: u32,
    pub acquire_timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl DatabaseConfig {
    pub fn is_memory(&self) -> bool {
        self.url == "memory://"
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

// Плоское представление переменных окружения (HOST, PORT, DATABASE_URL, ...)
#[derive(Debug, Deserialize)]
struct EnvVars {
    host: String,
    port: u16,
    environment: String,
    rust_log: String,
    log_format: LogFormat,
    database_url: String,
    db_pool_size: u32,
    db_acquire_timeout_secs: u64,
    db_retry_attempts: u32,
    db_retry_backoff_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::default())
    }

    /// Собирает конфигурацию из переданного источника окружения.
    pub fn load(env: config::Environment) -> Result<Self, config::ConfigError> {
        let vars: EnvVars = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000)?
            .set_default("environment", "development")?
            .set_default("rust_log", "smartseat=debug,tower_http=debug")?
            .set_default("log_format", "pretty")?
            .set_default("db_pool_size", 20)?
            .set_default("db_acquire_timeout_secs", 5)?
            .set_default("db_retry_attempts", 3)?
            .set_default("db_retry_backoff_ms", 50)?
            .add_source(env.try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(Config {
            app: AppConfig {
                host: vars.host,
                port: vars.port,
                environment: vars.environment,
                rust_log: vars.rust_log,
                log_format: vars.log_format,
            },
            database: DatabaseConfig {
                url: vars.database_url,
                pool_size: vars.db_pool_size,
                acquire_timeout_secs: vars.db_acquire_timeout_secs,
                retry_attempts: vars.db_retry_attempts,
                retry_backoff_ms: vars.db_retry_backoff_ms,
            },
        })
    }

    /// Конфигурация для локального запуска и тестов: хранилище в памяти.
    pub fn in_memory() -> Self {
        Config {
            app: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                environment: "test".to_string(),
                rust_log: "smartseat=debug".to_string(),
                log_format: LogFormat::Pretty,
            },
            database: DatabaseConfig {
                url: "memory://".to_string(),
                pool_size: 1,
                acquire_timeout_secs: 1,
                retry_attempts: 3,
                retry_backoff_ms: 1,
            },
        }
    }
}
