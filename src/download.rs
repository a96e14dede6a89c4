//! Download links for the artifacts produced by a cleaning run.

use crate::config::{ArtifactKind, ClientConfig};
use crate::result::CleaningResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub kind: ArtifactKind,
    /// Filename with the service's `{kind}_{file_id}_` prefix removed.
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLinks {
    pub csv: DownloadLink,
    pub log: DownloadLink,
}

impl DownloadLinks {
    pub fn get(&self, kind: ArtifactKind) -> &DownloadLink {
        match kind {
            ArtifactKind::Csv => &self.csv,
            ArtifactKind::Log => &self.log,
        }
    }
}

/// Strip the `cleaned_{file_id}_` / `log_{file_id}_` prefix. Names without
/// the prefix are returned unchanged.
pub fn strip_artifact_prefix(kind: ArtifactKind, file_id: &str, filename: &str) -> String {
    let prefix = match kind {
        ArtifactKind::Csv => format!("cleaned_{}_", file_id),
        ArtifactKind::Log => format!("log_{}_", file_id),
    };
    filename
        .strip_prefix(prefix.as_str())
        .unwrap_or(filename)
        .to_string()
}

pub fn download_link(
    config: &ClientConfig,
    result: &CleaningResult,
    kind: ArtifactKind,
) -> DownloadLink {
    let stored = match kind {
        ArtifactKind::Csv => &result.cleaned_filename,
        ArtifactKind::Log => &result.log_filename,
    };
    let filename = strip_artifact_prefix(kind, &result.file_id, stored);
    let url = config.download_url(kind, &result.file_id, &filename);
    DownloadLink {
        kind,
        filename,
        url,
    }
}

/// Both links, or `None` when there is no current result.
pub fn download_links(
    config: &ClientConfig,
    result: Option<&CleaningResult>,
) -> Option<DownloadLinks> {
    let result = result?;
    Some(DownloadLinks {
        csv: download_link(config, result, ArtifactKind::Csv),
        log: download_link(config, result, ArtifactKind::Log),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::CleaningSummary;
    use std::collections::BTreeMap;

    fn result() -> CleaningResult {
        CleaningResult {
            success: true,
            file_id: "abc123".to_string(),
            cleaned_filename: "cleaned_abc123_data.csv".to_string(),
            log_filename: "log_abc123_data.json".to_string(),
            summary: CleaningSummary {
                original_shape: [0, 0],
                columns: Vec::new(),
                missing_values: BTreeMap::new(),
                dtypes: BTreeMap::new(),
                log: Vec::new(),
            },
            preview: Vec::new(),
            message: None,
        }
    }

    #[test]
    fn test_csv_link() {
        let config = ClientConfig::new("http://localhost:5000/api");
        let link = download_link(&config, &result(), ArtifactKind::Csv);
        assert_eq!(link.filename, "data.csv");
        assert_eq!(link.url, "http://localhost:5000/api/download/csv/abc123/data.csv");
    }

    #[test]
    fn test_log_link() {
        let config = ClientConfig::new("http://localhost:5000/api");
        let links = download_links(&config, Some(&result())).unwrap();
        assert_eq!(links.get(ArtifactKind::Log).filename, "data.json");
        assert_eq!(
            links.log.url,
            "http://localhost:5000/api/download/log/abc123/data.json"
        );
    }

    #[test]
    fn test_no_result_no_links() {
        assert!(download_links(&ClientConfig::default(), None).is_none());
    }

    #[test]
    fn test_unprefixed_name_kept() {
        assert_eq!(
            strip_artifact_prefix(ArtifactKind::Csv, "abc123", "data.csv"),
            "data.csv"
        );
        // Prefix for another id is not stripped
        assert_eq!(
            strip_artifact_prefix(ArtifactKind::Csv, "abc123", "cleaned_zzz_data.csv"),
            "cleaned_zzz_data.csv"
        );
        assert_eq!(
            strip_artifact_prefix(ArtifactKind::Log, "abc123", "cleaned_abc123_data.csv"),
            "cleaned_abc123_data.csv"
        );
    }
}
