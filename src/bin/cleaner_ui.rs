//! CSV Cleaner - Graphical User Interface
//!
//! One window with three mutually exclusive sections: upload (drop target
//! plus cleaning options), processing, and results (summary, issues,
//! preview table, cleaning log, downloads).

use clap::Parser;
use csv_cleaner_client::controller::{Effect, Event, Notification, ViewController, ViewState};
use csv_cleaner_client::download::download_links;
use csv_cleaner_client::file_selector::{Affordance, FileSelector, SelectedFile};
use csv_cleaner_client::options::{collect, Control, Form, OptionSet};
use csv_cleaner_client::render::{self, PreviewTable, RenderedResult, NO_DATA_PLACEHOLDER};
use csv_cleaner_client::{ArtifactKind, CleaningResult, ClientConfig, Failure, HttpUploader, Uploader};
use iced::widget::{
    button, checkbox, column, container, mouse_area, pick_list, row, rule, scrollable, text,
};
use iced::{event, window, Border, Center, Element, Fill, Subscription, Task, Theme};
use std::future::Future;
use std::path::{Path, PathBuf};

const CELL_WIDTH: f32 = 120.0;

#[derive(Debug, Parser)]
#[command(name = "cleaner-ui")]
#[command(about = "Desktop client for the CSV data cleaning service")]
struct UiArgs {
    /// Base URL of the cleaning API (overrides ~/.csv-cleaner.conf)
    #[arg(long, env = "CSV_CLEANER_API_URL")]
    api_base_url: Option<String>,

    /// Upload timeout in seconds, 0 to wait indefinitely
    #[arg(long, env = "CSV_CLEANER_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
}

impl UiArgs {
    fn into_config(self) -> ClientConfig {
        ClientConfig::load().with_overrides(self.api_base_url.as_deref(), self.timeout_secs)
    }
}

fn main() -> iced::Result {
    env_logger::init();
    let config = UiArgs::parse().into_config();
    log::info!("Using cleaning service at {}", config.api_base_url);

    iced::application(move || App::new(config.clone()), App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .centered()
        .run()
}

// ============================================================================
// App State
// ============================================================================

struct App {
    config: ClientConfig,
    controller: ViewController,
    selector: FileSelector,
    form: Form,

    // Blocking notification; hides everything else until dismissed
    notification: Option<Notification>,
    // Render of the controller's current result, refreshed on entering Results
    rendered: Option<RenderedResult>,

    service_status: String,
    status_text: String,
}

impl App {
    fn theme(&self) -> Theme {
        Theme::Light
    }

    fn new(config: ClientConfig) -> (Self, Task<Message>) {
        let health = Task::perform(probe_health(config.clone()), Message::HealthChecked);
        (
            App {
                config,
                controller: ViewController::new(),
                selector: FileSelector::new(),
                form: Form::cleaning_defaults(),
                notification: None,
                rendered: None,
                service_status: "Checking service...".to_string(),
                status_text: String::new(),
            },
            health,
        )
    }

    fn current_result(&self) -> Option<&CleaningResult> {
        self.controller.current_result()
    }

    /// Route a chosen file into the state machine.
    fn choose(&mut self, file: SelectedFile) -> Task<Message> {
        if self.notification.is_some() {
            log::debug!("Ignoring {} while a notification is open", file.name);
            return Task::none();
        }
        let effect = self.controller.handle(Event::FileChosen(file));
        self.apply(effect)
    }

    fn apply(&mut self, effect: Effect) -> Task<Message> {
        self.rendered = self.current_result().map(render::render);
        match effect {
            Effect::None => Task::none(),
            Effect::Notify(notification) => {
                self.notification = Some(notification);
                Task::none()
            }
            Effect::StartUpload(file) => {
                self.status_text = format!("Processing {}...", file.name);
                let options = collect(&self.form);
                Task::perform(
                    upload(self.config.clone(), file, options),
                    Message::UploadFinished,
                )
            }
        }
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Debug, Clone)]
enum Message {
    // File acquisition
    BrowseFile,
    FilePicked(Option<PathBuf>),
    DragOver,
    DragLeave,
    FileDropped(PathBuf),

    // Options form
    OptionToggled(String, bool),
    OptionSelected(String, String),

    // Upload lifecycle
    UploadFinished(Result<CleaningResult, Failure>),
    DismissNotification,
    Reset,

    // Downloads
    OpenDownload(ArtifactKind),
    SaveDownload(ArtifactKind),
    SaveTargetSelected(ArtifactKind, Option<PathBuf>),
    DownloadFinished(Result<String, String>),

    HealthChecked(Result<String, String>),
}

// ============================================================================
// Update
// ============================================================================

impl App {
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // -- File acquisition --
            Message::BrowseFile => {
                if !self.controller.accepts_files() || self.notification.is_some() {
                    return Task::none();
                }
                Task::perform(
                    async {
                        let file = rfd::AsyncFileDialog::new()
                            .set_title("Select a CSV file")
                            .add_filter("CSV files", &["csv"])
                            .add_filter("All files", &["*"])
                            .pick_file()
                            .await;
                        file.map(|f| f.path().to_path_buf())
                    },
                    Message::FilePicked,
                )
            }
            Message::FilePicked(path) => match self.selector.picked(path) {
                Some(file) => self.choose(file),
                None => Task::none(),
            },
            Message::DragOver => {
                self.selector.drag_over();
                Task::none()
            }
            Message::DragLeave => {
                self.selector.drag_leave();
                Task::none()
            }
            Message::FileDropped(path) => match self.selector.drop_one(path) {
                Some(file) => self.choose(file),
                None => Task::none(),
            },

            // -- Options form --
            Message::OptionToggled(name, value) => {
                self.form.set_checked(&name, value);
                Task::none()
            }
            Message::OptionSelected(name, value) => {
                self.form.select(&name, &value);
                Task::none()
            }

            // -- Upload lifecycle --
            Message::UploadFinished(outcome) => {
                self.status_text = match &outcome {
                    Ok(result) => result
                        .message
                        .clone()
                        .unwrap_or_else(|| "File processed successfully!".to_string()),
                    Err(_) => String::new(),
                };
                let effect = self.controller.complete(outcome);
                self.apply(effect)
            }
            Message::DismissNotification => {
                self.notification = None;
                Task::none()
            }
            Message::Reset => {
                self.status_text.clear();
                let effect = self.controller.handle(Event::Reset);
                self.apply(effect)
            }

            // -- Downloads --
            Message::OpenDownload(kind) => {
                if let Some(links) = download_links(&self.config, self.current_result()) {
                    let url = &links.get(kind).url;
                    log::info!("Opening {}", url);
                    if let Err(e) = open_in_browser(url) {
                        self.status_text = format!("Could not open browser: {}", e);
                    }
                }
                Task::none()
            }
            Message::SaveDownload(kind) => {
                let Some(links) = download_links(&self.config, self.current_result()) else {
                    return Task::none();
                };
                let filename = links.get(kind).filename.clone();
                Task::perform(
                    async move {
                        let file = rfd::AsyncFileDialog::new()
                            .set_file_name(filename.as_str())
                            .save_file()
                            .await;
                        file.map(|f| f.path().to_path_buf())
                    },
                    move |path| Message::SaveTargetSelected(kind, path),
                )
            }
            Message::SaveTargetSelected(kind, path) => {
                let (Some(path), Some(links)) =
                    (path, download_links(&self.config, self.current_result()))
                else {
                    return Task::none();
                };
                self.status_text = format!("Downloading {}...", links.get(kind).filename);
                Task::perform(
                    download(self.config.clone(), links.get(kind).url.clone(), path),
                    Message::DownloadFinished,
                )
            }
            Message::DownloadFinished(result) => {
                self.status_text = match result {
                    Ok(s) => s,
                    Err(e) => format!("Error: {}", e),
                };
                Task::none()
            }

            Message::HealthChecked(result) => {
                self.service_status = match result {
                    Ok(message) => format!("Service: {}", message),
                    Err(e) => format!("Service unreachable: {}", e),
                };
                Task::none()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(window::Event::FileHovered(_)) => Some(Message::DragOver),
            iced::Event::Window(window::Event::FilesHoveredLeft) => Some(Message::DragLeave),
            iced::Event::Window(window::Event::FileDropped(path)) => {
                Some(Message::FileDropped(path))
            }
            _ => None,
        })
    }
}

// ============================================================================
// View
// ============================================================================

impl App {
    fn view(&self) -> Element<'_, Message> {
        let header = column![
            text("CSV Data Cleaner").size(28),
            text(&self.service_status).size(13),
        ]
        .spacing(4);

        let content: Element<'_, Message> = match (&self.notification, self.controller.state()) {
            (Some(notification), _) => view_notification(notification),
            (None, ViewState::Idle) => self.view_upload(),
            (None, ViewState::Processing) => self.view_processing(),
            (None, ViewState::Results) => self.view_results(),
        };

        column![
            container(header).padding([10, 20]),
            rule::horizontal(1),
            container(content).padding(20).width(Fill).height(Fill),
        ]
        .into()
    }

    // -- Upload section --
    fn view_upload(&self) -> Element<'_, Message> {
        let affordance = self.selector.affordance();
        let zone = container(
            column![
                text("Drop a CSV file here").size(18),
                text("or click to browse").size(13),
            ]
            .spacing(6)
            .align_x(Center),
        )
        .padding(40)
        .width(Fill)
        .align_x(Center)
        .style(move |theme: &Theme| drop_zone_style(theme, affordance));

        column![
            mouse_area(zone).on_press(Message::BrowseFile),
            rule::horizontal(1),
            text("Cleaning Options").size(16),
            view_options(&self.form),
        ]
        .spacing(16)
        .into()
    }

    // -- Processing section --
    fn view_processing(&self) -> Element<'_, Message> {
        let name = self
            .controller
            .selected_file()
            .map(|f| f.name.as_str())
            .unwrap_or("");
        column![
            text("Processing...").size(20),
            text(format!("Cleaning {}. This may take a moment.", name)).size(14),
        ]
        .spacing(12)
        .into()
    }

    // -- Results section --
    fn view_results(&self) -> Element<'_, Message> {
        let Some(rendered) = &self.rendered else {
            return column![].into();
        };
        let summary = &rendered.summary;
        let issues = &rendered.issues;

        let mut summary_lines = vec![
            labeled("Original Rows", summary.original_rows.to_string()),
            labeled("Cleaned Rows", summary.cleaned_rows.to_string()),
            labeled("Columns", summary.column_count.to_string()),
            labeled("Column Names", summary.column_names.join(", ")),
        ];
        if !summary.column_types.is_empty() {
            let types: Vec<String> = summary
                .column_types
                .iter()
                .map(|(col, ty)| format!("{}={}", col, ty))
                .collect();
            summary_lines.push(labeled("Column Types", types.join(", ")));
        }

        let blocks = row![
            column![text("Summary").size(18), column(summary_lines).spacing(4)]
                .spacing(8)
                .width(Fill),
            column![
                text("Issues Found").size(18),
                labeled("Missing Values", issues.missing_values.to_string()),
                labeled("Operations Performed", issues.operations.to_string()),
            ]
            .spacing(8)
            .width(Fill),
        ]
        .spacing(20);

        let log_entries: Vec<Element<'_, Message>> = rendered
            .log
            .iter()
            .map(|entry| {
                column![
                    text(format!("{}:", entry.label)).size(14),
                    text(&entry.detail).size(12).font(iced::Font::MONOSPACE),
                ]
                .spacing(2)
                .into()
            })
            .collect();

        let downloads = row![
            button(text("Open Cleaned CSV").size(13))
                .on_press(Message::OpenDownload(ArtifactKind::Csv)),
            button(text("Save Cleaned CSV...").size(13))
                .on_press(Message::SaveDownload(ArtifactKind::Csv))
                .style(button::secondary),
            button(text("Open Log").size(13)).on_press(Message::OpenDownload(ArtifactKind::Log)),
            button(text("Save Log...").size(13))
                .on_press(Message::SaveDownload(ArtifactKind::Log))
                .style(button::secondary),
            button(text("Back").size(13))
                .on_press(Message::Reset)
                .style(button::secondary),
        ]
        .spacing(10)
        .align_y(Center);

        let mut items: Vec<Element<'_, Message>> = Vec::new();
        if !self.status_text.is_empty() {
            items.push(text(&self.status_text).size(13).into());
        }
        items.push(blocks.into());
        items.push(rule::horizontal(1).into());
        items.push(text("Preview").size(18).into());
        items.push(view_preview(&rendered.preview));
        items.push(rule::horizontal(1).into());
        items.push(text("Cleaning Log").size(18).into());
        items.push(column(log_entries).spacing(8).into());
        items.push(rule::horizontal(1).into());
        items.push(downloads.into());

        scrollable(column(items).spacing(12)).height(Fill).into()
    }
}

// ============================================================================
// Helper widgets
// ============================================================================

fn view_notification(notification: &Notification) -> Element<'_, Message> {
    container(
        column![
            text(&notification.title).size(20),
            text(&notification.message).size(14),
            button(text("OK").size(13)).on_press(Message::DismissNotification),
        ]
        .spacing(12),
    )
    .padding(20)
    .width(Fill)
    .style(container::bordered_box)
    .into()
}

/// Render the options form: checkboxes and single-choice selects.
fn view_options(form: &Form) -> Element<'_, Message> {
    let mut items: Vec<Element<'_, Message>> = Vec::new();
    for control in &form.controls {
        match control {
            Control::Checkbox {
                name,
                label,
                checked,
            } => {
                let name = name.clone();
                items.push(
                    checkbox(*checked)
                        .label(label.as_str())
                        .on_toggle(move |v| Message::OptionToggled(name.clone(), v))
                        .into(),
                );
            }
            Control::SelectOne {
                name,
                label,
                choices,
                selected,
            } => {
                let name = name.clone();
                items.push(
                    row![
                        text(label.as_str()).width(130),
                        pick_list(choices.as_slice(), Some(selected.clone()), move |v: String| {
                            Message::OptionSelected(name.clone(), v)
                        }),
                    ]
                    .spacing(10)
                    .align_y(Center)
                    .into(),
                );
            }
            Control::Other { .. } => {}
        }
    }
    column(items).spacing(8).into()
}

/// Render the preview grid, or the placeholder when there are no rows.
fn view_preview(preview: &PreviewTable) -> Element<'_, Message> {
    match preview {
        PreviewTable::Empty => text(NO_DATA_PLACEHOLDER).size(13).into(),
        PreviewTable::Table { headers, rows } => {
            let mut lines: Vec<Element<'_, Message>> = Vec::new();
            lines.push(
                row(headers
                    .iter()
                    .map(|h| text(h.as_str()).size(13).width(CELL_WIDTH).into()))
                .spacing(8)
                .into(),
            );
            lines.push(rule::horizontal(1).into());
            for cells in rows {
                lines.push(
                    row(cells
                        .iter()
                        .map(|c| text(c.as_str()).size(12).width(CELL_WIDTH).into()))
                    .spacing(8)
                    .into(),
                );
            }
            scrollable(column(lines).spacing(4))
                .direction(scrollable::Direction::Horizontal(
                    scrollable::Scrollbar::default(),
                ))
                .into()
        }
    }
}

fn labeled<'a>(label: &str, value: String) -> Element<'a, Message> {
    text(format!("{}: {}", label, value)).size(14).into()
}

fn drop_zone_style(theme: &Theme, affordance: Affordance) -> container::Style {
    let palette = theme.extended_palette();
    let (border_color, background) = match affordance {
        Affordance::Highlighted => (
            palette.primary.strong.color,
            palette.primary.weak.color.scale_alpha(0.15),
        ),
        Affordance::Resting => (palette.background.strong.color, palette.background.weak.color),
    };
    container::Style {
        background: Some(background.into()),
        border: Border {
            color: border_color,
            width: 2.0,
            radius: 8.0.into(),
        },
        ..container::Style::default()
    }
}

// ============================================================================
// Background work
// ============================================================================

/// Run the blocking upload on a worker thread and resolve with its outcome.
///
/// The blocking HTTP client must stay off the async executor, so it is built
/// and dropped on the worker.
fn upload(
    config: ClientConfig,
    file: SelectedFile,
    options: OptionSet,
) -> impl Future<Output = Result<CleaningResult, Failure>> {
    let (tx, rx) = futures::channel::oneshot::channel();

    std::thread::spawn(move || {
        let outcome = HttpUploader::new(config)
            .map_err(Failure::network)
            .and_then(|uploader| uploader.submit(&file, &options));
        let _ = tx.send(outcome);
    });

    async move {
        rx.await
            .unwrap_or_else(|_| Err(Failure::network("upload worker exited unexpectedly")))
    }
}

fn probe_health(config: ClientConfig) -> impl Future<Output = Result<String, String>> {
    let (tx, rx) = futures::channel::oneshot::channel();

    std::thread::spawn(move || {
        let result = HttpUploader::new(config)
            .and_then(|uploader| uploader.health())
            .map(|health| {
                if health.message.is_empty() {
                    health.status
                } else {
                    health.message
                }
            })
            .map_err(|e| e.to_string());
        let _ = tx.send(result);
    });

    async move {
        rx.await
            .unwrap_or_else(|_| Err("health check worker exited".to_string()))
    }
}

fn download(
    config: ClientConfig,
    url: String,
    out_path: PathBuf,
) -> impl Future<Output = Result<String, String>> {
    let (tx, rx) = futures::channel::oneshot::channel();

    std::thread::spawn(move || {
        let result = HttpUploader::new(config)
            .and_then(|uploader| uploader.download_to(&url, &out_path))
            .map(|bytes| saved_message(&out_path, bytes))
            .map_err(|e| format!("{:#}", e));
        let _ = tx.send(result);
    });

    async move {
        rx.await
            .unwrap_or_else(|_| Err("download worker exited".to_string()))
    }
}

fn saved_message(path: &Path, bytes: u64) -> String {
    format!("Saved {} ({} bytes)", path.display(), bytes)
}

/// Hand a URL to the platform's default browser.
fn open_in_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = std::process::Command::new("xdg-open");

    command.arg(url).spawn().map(|_| ())
}
