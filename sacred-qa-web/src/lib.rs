//! Sacred QA Web - relay and presentation layer for the Sacred QA agent
//!
//! This crate provides:
//! - An HTTP client for the upstream agent service (sankalpas, QA, QA logs)
//! - A typed, escaping table renderer with a single-column free-text filter
//! - A live QA log view that re-polls the backend on a fixed interval
//! - Submission forms for intentions and questions
//! - Two axum entry points: the table server and the form studio

pub mod api;
pub mod backend;
pub mod forms;
pub mod models;
pub mod render;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{Backend, HttpBackend, RelayError, Resource};

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the upstream base URL
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";
/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";

/// Longest live refresh period; one day stays inside the browser's
/// `setInterval` range
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;

/// Configuration for the web layer
#[derive(Debug, Clone, serde::Deserialize)]
pub struct WebConfig {
    /// Base URL of the upstream agent service
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Port the presentation server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds between live log refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Context tag attached to every submitted sankalpa
    #[serde(default = "default_context_tag")]
    pub context_tag: String,
}

fn default_backend_url() -> String { "http://localhost:8000".to_string() }
fn default_port() -> u16 { 3000 }
fn default_refresh_interval_secs() -> u64 { 10 }
fn default_request_timeout_secs() -> u64 { 30 }
fn default_context_tag() -> String { "web-form".to_string() }

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            port: default_port(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            context_tag: default_context_tag(),
        }
    }
}

impl WebConfig {
    /// Load configuration from an optional TOML file, then apply process
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                Self::from_toml(&contents)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse configuration from TOML text; missing keys take their defaults
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `BACKEND_URL` / `PORT` overrides from the given lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(port) = lookup(PORT_ENV).filter(|v| !v.trim().is_empty()) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} is not a valid port: {}", PORT_ENV, port))?;
        }
        // Paths are joined onto the base, so a trailing slash would double up
        while self.backend_url.ends_with('/') {
            self.backend_url.pop();
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.clamp(1, MAX_REFRESH_INTERVAL_SECS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
