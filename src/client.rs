//! Upload client for the cleaning service.
//!
//! Builds the multipart request from a selected file plus the option set,
//! sends a single POST and maps the outcome onto [`Failure`]. There is no
//! retry; a failed cycle has to be started again by the user.

use crate::config::ClientConfig;
use crate::error::Failure;
use crate::file_selector::SelectedFile;
use crate::options::{to_form_fields, OptionSet};
use crate::result::{CleaningResult, HealthStatus, ResponseEnvelope};
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub const USER_AGENT: &str = concat!("csv-cleaner-client/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a file plus options into a cleaning result.
///
/// Implementations block until the outcome is known.
pub trait Uploader {
    fn submit(&self, file: &SelectedFile, options: &OptionSet) -> Result<CleaningResult, Failure>;
}

/// Pre-flight checks on a file before any request is built.
pub fn validate_file(file: &SelectedFile) -> Result<(), Failure> {
    if file.name.trim().is_empty() {
        return Err(Failure::Validation("Please select a file.".to_string()));
    }
    if !file.has_csv_extension() {
        return Err(Failure::Validation("Please select a CSV file.".to_string()));
    }
    Ok(())
}

/// Map an HTTP status and body onto a result or a failure.
///
/// Non-2xx is a transport failure whatever the body says. A 2xx body must
/// either be a complete successful result or carry `success: false`.
pub fn interpret_response(status: u16, body: &str) -> Result<CleaningResult, Failure> {
    if !(200..300).contains(&status) {
        return Err(Failure::http_status(status));
    }

    let envelope: ResponseEnvelope =
        serde_json::from_str(body).map_err(|e| invalid_body(status, e))?;
    if !envelope.success {
        let message = envelope
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "Processing failed".to_string());
        return Err(Failure::Application(message));
    }

    serde_json::from_str(body).map_err(|e| invalid_body(status, e))
}

fn invalid_body(status: u16, err: serde_json::Error) -> Failure {
    Failure::Transport {
        status: Some(status),
        detail: format!("Invalid response from server: {}", err),
    }
}

/// Blocking HTTP implementation of [`Uploader`].
///
/// Must not be created or dropped on an async executor thread; the UI runs
/// it on a plain worker thread.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    config: ClientConfig,
    client: Client,
}

impl HttpUploader {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .context("failed to initialize HTTP client")?;
        Ok(HttpUploader { config, client })
    }

    /// Probe `GET {base}/health`.
    pub fn health(&self) -> Result<HealthStatus> {
        let url = self.config.health_url();
        let resp = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("request returned error status: {url}"))?;

        resp.json().context("failed to decode health response")
    }

    /// Stream an artifact to `out_path`, returning the number of bytes written.
    ///
    /// The body lands in a sibling `.part` file first and is moved into place
    /// only once complete, so a failed transfer never leaves `out_path` behind.
    pub fn download_to(&self, url: &str, out_path: &Path) -> Result<u64> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("request returned error status: {url}"))?;

        let part_path = partial_path(out_path);
        let written = match write_body(&mut resp, &part_path) {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&part_path);
                return Err(e.context(format!(
                    "failed while writing downloaded data to {}",
                    out_path.display()
                )));
            }
        };
        if let Err(e) = fs::rename(&part_path, out_path) {
            let _ = fs::remove_file(&part_path);
            return Err(e)
                .with_context(|| format!("failed to move download to {}", out_path.display()));
        }
        log::info!("Saved {} bytes to {}", written, out_path.display());
        Ok(written)
    }
}

/// `<name>.part` next to the final destination.
fn partial_path(out_path: &Path) -> PathBuf {
    let mut name = out_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    out_path.with_file_name(name)
}

fn write_body(body: &mut impl Read, path: &Path) -> Result<u64> {
    let mut out = fs::File::create(path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    let written = io::copy(body, &mut out)?;
    out.sync_all()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(written)
}

impl Uploader for HttpUploader {
    fn submit(&self, file: &SelectedFile, options: &OptionSet) -> Result<CleaningResult, Failure> {
        validate_file(file)?;

        let bytes = file
            .read_bytes()
            .map_err(|e| Failure::Validation(format!("Could not read {}: {}", file.name, e)))?;

        let mut form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(bytes).file_name(file.name.clone()),
        );
        for (name, value) in to_form_fields(options) {
            form = form.text(name, value);
        }

        let url = self.config.upload_url();
        log::info!("Uploading {} to {}", file.name, url);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(Failure::network)?;

        let status = response.status().as_u16();
        log::info!("Upload response status: {}", status);
        if !response.status().is_success() {
            return Err(Failure::http_status(status));
        }

        let body = response.text().map_err(Failure::network)?;
        interpret_response(status, &body)
    }
}
