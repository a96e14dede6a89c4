//! Client configuration: service location and request deadline.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

/// Which artifact a download URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Csv,
    Log,
}

impl ArtifactKind {
    /// Path segment used by the download endpoint.
    pub fn segment(self) -> &'static str {
        match self {
            ArtifactKind::Csv => "csv",
            ArtifactKind::Log => "log",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:5000/api`.
    pub api_base_url: String,
    /// Overall request deadline. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Self {
        ClientConfig {
            api_base_url: normalize_base_url(api_base_url),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Apply command-line overrides on top of a loaded config.
    ///
    /// A new base URL keeps the loaded timeout. `Some(0)` turns the timeout off.
    pub fn with_overrides(self, api_base_url: Option<&str>, timeout_secs: Option<u64>) -> Self {
        let mut config = match api_base_url {
            Some(url) => ClientConfig::new(url).with_timeout(self.timeout),
            None => self,
        };
        if let Some(secs) = timeout_secs {
            config.timeout = timeout_from_secs(secs);
        }
        config
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.api_base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.api_base_url)
    }

    pub fn download_url(&self, kind: ArtifactKind, file_id: &str, filename: &str) -> String {
        format!(
            "{}/download/{}/{}/{}",
            self.api_base_url,
            kind.segment(),
            file_id,
            filename
        )
    }

    /// Load `~/.csv-cleaner.conf`, falling back to defaults.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from a key=value file. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse `key=value` lines. Unknown keys and `#` comments are ignored.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim();
                match key.trim() {
                    "api_base_url" if !value.is_empty() => {
                        config.api_base_url = normalize_base_url(value);
                    }
                    "timeout_secs" => match value.parse::<u64>() {
                        Ok(secs) => config.timeout = timeout_from_secs(secs),
                        Err(_) => log::warn!("Ignoring invalid timeout_secs '{}'", value),
                    },
                    _ => {}
                }
            }
        }
        config
    }
}

/// Get the config file path: ~/.csv-cleaner.conf
fn config_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".csv-cleaner.conf"))
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
