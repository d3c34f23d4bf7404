use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: resolve_port(env::var("PORT").ok()),
            data_path: resolve_data_path(env::var("HEALTH_DATA_PATH").ok()),
        }
    }
}

fn resolve_port(value: Option<String>) -> u16 {
    match value {
        None => DEFAULT_PORT,
        Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
            warn!("ignoring invalid PORT value {raw:?}, using {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
    }
}

fn resolve_data_path(value: Option<String>) -> PathBuf {
    match value {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_DATA_PATH),
    }
}
