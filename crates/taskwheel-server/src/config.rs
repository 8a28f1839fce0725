use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct Config {
    /// Listen address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7540
}

fn default_db_path() -> String {
    "taskwheel.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

impl Config {
    /// Loads `taskwheel.toml` if present, then `TASKWHEEL_`-prefixed
    /// environment variables on top.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("taskwheel.toml"))
            .merge(Env::prefixed("TASKWHEEL_"))
            .extract()
    }
}
