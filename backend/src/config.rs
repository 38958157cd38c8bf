use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOG_FILTER: &str = "debug";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected} (got {value:?})")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Filesystem locations of the three classifier artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPaths {
    pub plant: PathBuf,
    pub toxicity: PathBuf,
    pub other: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            plant: PathBuf::from("models/updated_plant_classification_model.onnx"),
            toxicity: PathBuf::from("models/poison1.onnx"),
            other: PathBuf::from("models/ponp.onnx"),
        }
    }
}

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub models: ModelPaths,
    pub details_csv: PathBuf,
    pub index_page: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: num_cpus::get(),
            models: ModelPaths::default(),
            details_csv: PathBuf::from("Details.csv"),
            index_page: PathBuf::from("templates/index.html"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value: raw,
            })?,
            None => defaults.port,
        };

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => match raw.trim().parse::<usize>().ok() {
                Some(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_UPLOAD_BYTES",
                        expected: "positive byte count",
                        value: raw,
                    })
                }
            },
            None => defaults.max_upload_bytes,
        };

        // An unparsable WORKERS value falls back to one worker per core.
        let workers = lookup("WORKERS")
            .and_then(|w| w.trim().parse().ok())
            .filter(|&w: &usize| w > 0)
            .unwrap_or(defaults.workers);

        let path_or = |key: &str, default: PathBuf| lookup(key).map(PathBuf::from).unwrap_or(default);

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            workers,
            models: ModelPaths {
                plant: path_or("PLANT_MODEL_PATH", defaults.models.plant),
                toxicity: path_or("TOXIC_MODEL_PATH", defaults.models.toxicity),
                other: path_or("OTHER_MODEL_PATH", defaults.models.other),
            },
            details_csv: path_or("DETAILS_CSV_PATH", defaults.details_csv),
            index_page: path_or("INDEX_PAGE_PATH", defaults.index_page),
            max_upload_bytes,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
