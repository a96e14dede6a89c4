//! View controller: the Idle -> Processing -> Results state machine.
//!
//! The controller never performs I/O. Each event returns an [`Effect`]
//! telling the caller what to do next (start an upload, show a blocking
//! notification, or nothing). The caller feeds the upload outcome back in
//! with [`ViewController::complete`].
//!
//! | state      | event           | next       | effect              |
//! |------------|-----------------|------------|---------------------|
//! | Idle       | FileChosen(ok)  | Processing | StartUpload         |
//! | Idle       | FileChosen(bad) | Idle       | Notify              |
//! | Processing | UploadSucceeded | Results    | -                   |
//! | Processing | UploadFailed    | Idle       | Notify              |
//! | Results    | Reset           | Idle       | -                   |
//!
//! Every other combination is dropped, including a second `FileChosen`
//! while an upload is in flight.

use crate::client::{validate_file, Uploader};
use crate::error::{Failure, FailureKind};
use crate::file_selector::SelectedFile;
use crate::options::{collect, Form};
use crate::result::CleaningResult;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Processing,
    Results,
}

#[derive(Debug, Clone)]
pub enum Event {
    FileChosen(SelectedFile),
    UploadSucceeded(CleaningResult),
    UploadFailed(Failure),
    Reset,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::FileChosen(_) => "FileChosen",
            Event::UploadSucceeded(_) => "UploadSucceeded",
            Event::UploadFailed(_) => "UploadFailed",
            Event::Reset => "Reset",
        }
    }
}

/// Message the user has to acknowledge before continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn from_failure(failure: &Failure) -> Self {
        let title = match failure.kind() {
            FailureKind::ValidationError => "Invalid file",
            FailureKind::TransportError => "Upload failed",
            FailureKind::ApplicationError => "Processing failed",
        };
        Notification {
            title: title.to_string(),
            message: failure.to_string(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

/// What the caller must do after an event was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    StartUpload(SelectedFile),
    Notify(Notification),
}

/// Owns the view state, the selected file and the current result.
///
/// `current_result` is only ever a successful result, and it is replaced
/// wholesale, never patched.
#[derive(Debug, Default)]
pub struct ViewController {
    state: ViewState,
    selected_file: Option<SelectedFile>,
    current_result: Option<CleaningResult>,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn current_result(&self) -> Option<&CleaningResult> {
        self.current_result.as_ref()
    }

    /// Whether the drop target and browse control should accept input.
    pub fn accepts_files(&self) -> bool {
        self.state == ViewState::Idle
    }

    pub fn handle(&mut self, event: Event) -> Effect {
        match (self.state, event) {
            (ViewState::Idle, Event::FileChosen(file)) => {
                if let Err(failure) = validate_file(&file) {
                    log::warn!("Rejected {:?}: {}", file.name, failure);
                    return Effect::Notify(Notification::from_failure(&failure));
                }
                log::info!("Idle -> Processing ({})", file.name);
                self.selected_file = Some(file.clone());
                self.current_result = None;
                self.state = ViewState::Processing;
                Effect::StartUpload(file)
            }
            (ViewState::Processing, Event::UploadSucceeded(result)) => {
                if !result.success {
                    return self.fail(Failure::Application("Processing failed".to_string()));
                }
                log::info!("Processing -> Results (file_id {})", result.file_id);
                self.current_result = Some(result);
                self.state = ViewState::Results;
                Effect::None
            }
            (ViewState::Processing, Event::UploadFailed(failure)) => self.fail(failure),
            (ViewState::Results, Event::Reset) => {
                log::info!("Results -> Idle (reset)");
                self.clear();
                Effect::None
            }
            (state, event) => {
                log::debug!("Ignoring {} while {:?}", event.name(), state);
                Effect::None
            }
        }
    }

    /// Feed an upload outcome back into the machine.
    pub fn complete(&mut self, outcome: Result<CleaningResult, Failure>) -> Effect {
        match outcome {
            Ok(result) => self.handle(Event::UploadSucceeded(result)),
            Err(failure) => self.handle(Event::UploadFailed(failure)),
        }
    }

    fn fail(&mut self, failure: Failure) -> Effect {
        log::warn!("Processing -> Idle: {}", failure);
        self.clear();
        Effect::Notify(Notification::from_failure(&failure))
    }

    fn clear(&mut self) {
        self.state = ViewState::Idle;
        self.selected_file = None;
        self.current_result = None;
    }
}

/// Drives a [`ViewController`] synchronously against an [`Uploader`].
///
/// Options are collected from the form at the moment the upload starts.
pub struct Session<U> {
    controller: ViewController,
    uploader: U,
    form: Form,
}

impl<U: Uploader> Session<U> {
    pub fn new(uploader: U, form: Form) -> Self {
        Session {
            controller: ViewController::new(),
            uploader,
            form,
        }
    }

    pub fn controller(&self) -> &ViewController {
        &self.controller
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    /// Run one full cycle for a chosen file. Returns the notification to
    /// show, if the cycle ended in one.
    pub fn choose_file(&mut self, file: SelectedFile) -> Option<Notification> {
        let effect = self.controller.handle(Event::FileChosen(file));
        self.run(effect)
    }

    pub fn reset(&mut self) {
        self.controller.handle(Event::Reset);
    }

    fn run(&mut self, mut effect: Effect) -> Option<Notification> {
        loop {
            match effect {
                Effect::None => return None,
                Effect::Notify(notification) => return Some(notification),
                Effect::StartUpload(file) => {
                    let options = collect(&self.form);
                    let outcome = self.uploader.submit(&file, &options);
                    effect = self.controller.complete(outcome);
                }
            }
        }
    }
}
