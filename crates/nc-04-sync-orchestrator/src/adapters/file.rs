//! Complaint export file.

use super::parse_backlog;
use crate::domain::SourceError;
use crate::ports::ComplaintSource;
use async_trait::async_trait;
use shared_types::ComplaintRecord;
use std::path::PathBuf;

/// Reads the backlog from a JSON export on disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Source backed by `path`. The file is read on every listing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ComplaintSource for JsonFileSource {
    async fn list_complaints(&self) -> Result<Vec<ComplaintRecord>, SourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| SourceError::Io {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        parse_backlog(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_reads_export() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("complaints.json");
        std::fs::write(
            &path,
            r#"[{"id":"abc123","text":"Test complaint","legalClassification":{"ipc_sections":["IPC 379"]}}]"#,
        )
        .unwrap();

        let complaints = JsonFileSource::new(&path).list_complaints().await.unwrap();
        assert_eq!(complaints.len(), 1);
        assert_eq!(complaints[0].legal_sections(), ["IPC 379".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonFileSource::new(dir.path().join("absent.json"));
        assert!(matches!(
            source.list_complaints().await,
            Err(SourceError::Io { .. })
        ));
    }
}
