//! CSV Cleaner Client
//!
//! Desktop client for a remote CSV cleaning service: pick or drop a CSV
//! file, send it with cleaning options, and show the returned summary,
//! preview and operation log.
//!
//! This library provides:
//! - `file_selector`: browse/drop normalization into one chosen file
//! - `options`: the cleaning options form and its flat option set
//! - `client`: multipart upload, response mapping, health probe, downloads
//! - `controller`: the Idle/Processing/Results state machine
//! - `render`: display blocks derived from a cleaning result
//! - `download`: artifact download links
//!
//! Binaries:
//! - `cleaner-ui`: the desktop window

pub mod client;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod file_selector;
pub mod options;
pub mod render;
pub mod result;

pub use client::{HttpUploader, Uploader};
pub use config::{ArtifactKind, ClientConfig};
pub use controller::{Effect, Event, Notification, Session, ViewController, ViewState};
pub use error::{Failure, FailureKind};
pub use file_selector::{FileSelector, SelectedFile};
pub use options::{collect, Form, OptionSet, OptionValue};
pub use result::CleaningResult;
