//! File acquisition from the browse dialog and from window drag-and-drop.
//!
//! Both paths end in the same place: at most one [`SelectedFile`] per user
//! action, handed to the view controller as a "file chosen" event.

use std::path::PathBuf;
use std::sync::Arc;

/// Where the bytes of a selected file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSource {
    /// A file on disk, read lazily at upload time.
    Path(PathBuf),
    /// Content already held in memory.
    Memory(Arc<[u8]>),
}

/// A user-chosen file: its display name plus a handle to its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub source: ByteSource,
}

impl SelectedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        SelectedFile {
            name,
            source: ByteSource::Path(path),
        }
    }

    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        SelectedFile {
            name: name.into(),
            source: ByteSource::Memory(bytes.into()),
        }
    }

    /// True when the name ends in `.csv`, ignoring case.
    pub fn has_csv_extension(&self) -> bool {
        is_csv_name(&self.name)
    }

    /// Read the full content of the file.
    pub fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            ByteSource::Path(path) => std::fs::read(path),
            ByteSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// Case-insensitive `.csv` suffix check.
pub fn is_csv_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".csv")
}

/// Visual state of the drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affordance {
    #[default]
    Resting,
    Highlighted,
}

/// Normalizes dialog picks and window drops into one "file chosen" signal.
///
/// Drag hover only toggles [`Affordance`]; nothing else changes until a file
/// is actually produced.
#[derive(Debug, Default)]
pub struct FileSelector {
    affordance: Affordance,
    // Files announced by hover events for the drag in progress.
    hovered: usize,
    // Remaining drop events from a multi-file drop that must be swallowed.
    swallow: usize,
}

impl FileSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn affordance(&self) -> Affordance {
        self.affordance
    }

    /// A file is being dragged over the window.
    pub fn drag_over(&mut self) {
        if self.affordance != Affordance::Highlighted {
            log::debug!("Drag entered drop target");
        }
        if self.hovered == 0 {
            // New gesture: leftovers from an earlier partial drop no longer apply
            self.swallow = 0;
        }
        self.affordance = Affordance::Highlighted;
        self.hovered += 1;
    }

    /// The drag left the window without dropping.
    pub fn drag_leave(&mut self) {
        log::debug!("Drag left drop target");
        self.affordance = Affordance::Resting;
        self.hovered = 0;
    }

    /// A whole file list was dropped at once. Only the first entry is kept.
    pub fn drop_files<I>(&mut self, files: I) -> Option<SelectedFile>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.affordance = Affordance::Resting;
        self.hovered = 0;
        files.into_iter().next().map(SelectedFile::from_path)
    }

    /// One file of a drop delivered as separate per-file window events.
    ///
    /// The window reports a multi-file drop as one hover per file followed
    /// by one drop per file; everything after the first drop of the gesture
    /// is discarded.
    pub fn drop_one(&mut self, path: PathBuf) -> Option<SelectedFile> {
        if self.swallow > 0 {
            self.swallow -= 1;
            log::debug!("Ignoring extra dropped file {}", path.display());
            return None;
        }
        self.swallow = self.hovered.saturating_sub(1);
        self.drop_files(std::iter::once(path))
    }

    /// Result of the browse dialog; `None` means the dialog was cancelled.
    pub fn picked(&mut self, path: Option<PathBuf>) -> Option<SelectedFile> {
        path.map(SelectedFile::from_path)
    }
}
