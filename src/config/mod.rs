use std::collections::HashMap;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use once_cell::sync::Lazy;
use rocket::serde::{Deserialize, Deserializer};

#[derive(Deserialize, Clone, Debug)]
#[serde(crate = "rocket::serde")]
pub struct DbConfig {
    pub location: String,
    #[serde(rename = "poolsize")]
    pub pool_size: u32,
    /// how long a statement waits on a locked database before failing
    #[serde(rename = "busytimeout", deserialize_with = "human_duration")]
    pub busy_timeout: Duration,
    /// how long a request waits for a free pooled connection before failing
    #[serde(rename = "connectiontimeout", deserialize_with = "human_duration")]
    pub connection_timeout: Duration,
}

/// config properties for bearer token authentication
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(crate = "rocket::serde")]
pub struct AuthConfig {
    /// maps the hex sha256 digest of a bearer token to the id of the user it belongs to
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(crate = "rocket::serde")]
pub struct LogConfig {
    pub level: String,
}

/// config properties for the whole of this application
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(crate = "rocket::serde")]
pub struct FolderServerConfig {
    pub database: DbConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub log: LogConfig,
}

impl Default for DbConfig {
    fn default() -> Self {
        DbConfig {
            location: "./folders.sqlite".to_string(),
            pool_size: 8,
            busy_timeout: Duration::from_secs(5),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
        }
    }
}

/// Parses the config file located at ./FolderServer.toml, if it exists, with `FOLDER_SERVER_`
/// environment variables layered on top (e.g. `FOLDER_SERVER_DATABASE__LOCATION`).
/// If this fails to parse the file, the application will panic
pub fn parse_config() -> FolderServerConfig {
    let defaults = FolderServerConfig::default();
    let builder = Config::builder()
        .set_default("database.location", defaults.database.location.clone())
        .and_then(|b| b.set_default("database.poolsize", i64::from(defaults.database.pool_size)))
        .and_then(|b| b.set_default("database.busytimeout", "5s"))
        .and_then(|b| b.set_default("database.connectiontimeout", "10s"))
        .and_then(|b| b.set_default("log.level", defaults.log.level.clone()))
        .map(|b| {
            b.add_source(config::File::with_name("./FolderServer.toml").required(false))
                .add_source(
                    Environment::with_prefix("FOLDER_SERVER")
                        .prefix_separator("_")
                        .separator("__"),
                )
                .build()
        });
    match builder {
        Ok(Ok(settings)) => match settings.try_deserialize() {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!("Failed to parse config file. Exception is {e}");
                panic!("Failed to parse config file. Exception is {e}");
            }
        },
        Ok(Err(ConfigError::NotFound(key))) => {
            log::warn!("Config property {key} not found. Continuing startup with defaults...");
            defaults
        }
        // basically everything else is unrecoverable, though
        Ok(Err(e)) | Err(e) => {
            log::error!("Failed to parse config file. Exception is {e}");
            panic!("Failed to parse config file. Exception is {e}");
        }
    }
}

/// accepts durations like `5s` or `1m 30s`
fn human_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(rocket::serde::de::Error::custom)
}

/// global variable for config, that way it doesn't need to be repeatedly parsed
pub static FOLDER_SERVER_CONFIG: Lazy<FolderServerConfig> = Lazy::new(parse_config);
