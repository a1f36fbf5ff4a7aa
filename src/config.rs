//! Runtime configuration read from the environment
//!
//! Values come from process environment variables, optionally seeded from a
//! `.env` file by the binary before [`Config::from_env`] runs.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE: &str = "notes.redb";
const DEFAULT_FLUSH_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    /// `PORT` - Server port number (default: 3000)
    pub port: u16,

    /// `DATABASE_URL` - Path to database file (default: "notes.redb")
    pub database_url: String,

    /// `FLUSH_INTERVAL_SECS` - Seconds between view count flushes (default: 15)
    pub flush_interval: Duration,

    /// `ADS` - Optional path to the payload shown on flagged notes
    pub ads_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());

        let flush_secs = env::var("FLUSH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_FLUSH_SECS)
            .max(1);

        let ads_path = env::var("ADS").ok().filter(|p| !p.is_empty());

        Self {
            port,
            database_url,
            flush_interval: Duration::from_secs(flush_secs),
            ads_path,
        }
    }

    /// Reads the ads payload; a missing or unreadable file means no ads
    pub fn load_ads(&self) -> Option<Arc<str>> {
        let path = self.ads_path.as_deref()?;
        match std::fs::read_to_string(path) {
            Ok(ads) => {
                info!("loaded ads payload from {path}");
                Some(Arc::from(ads))
            }
            Err(err) => {
                error!("couldn't read ads file {path}: {err}");
                None
            }
        }
    }
}
