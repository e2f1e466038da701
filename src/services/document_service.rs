//! Domain service for the document area on disk.
//!
//! Index construction, summarization and querying are done by external
//! collaborators that read and write the same directories; this service only
//! stores uploads and reports what those collaborators have produced.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::config::DocumentsConfig;
use crate::models::document::{IndexedDocument, StoredDocument};

const SUMMARY_SUFFIX: &str = ".summary.txt";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Returns the sanitized name an upload would be stored under, or why it
    /// would be refused. Touches nothing on disk.
    fn check_upload(&self, file_name: &str) -> Result<String, DocumentError>;

    /// Writes an uploaded file into the upload directory.
    async fn save_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, DocumentError>;

    /// Documents that have an index directory, sorted by stem.
    async fn list_documents(&self) -> Result<Vec<IndexedDocument>, DocumentError>;

    /// The generated summary for one document.
    async fn read_summary(&self, stem: &str) -> Result<String, DocumentError>;
}

pub struct FsDocumentService {
    upload_dir: PathBuf,
    index_dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl FsDocumentService {
    #[must_use]
    pub fn new(config: &DocumentsConfig) -> Self {
        Self {
            upload_dir: PathBuf::from(&config.upload_dir),
            index_dir: PathBuf::from(&config.index_dir),
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    fn summary_path(&self, stem: &str) -> PathBuf {
        self.upload_dir.join(format!("{stem}{SUMMARY_SUFFIX}"))
    }
}

/// Keeps only the final path component and replaces spaces with underscores.
#[must_use]
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default().trim();
    let name = name.replace(' ', "_");

    if name.is_empty() || name.starts_with('.') {
        return None;
    }
    Some(name)
}

fn validate_stem(stem: &str) -> Result<(), DocumentError> {
    if stem.is_empty() || stem.starts_with('.') || stem.contains(['/', '\\']) {
        return Err(DocumentError::Validation(format!(
            "Invalid document name: {stem}"
        )));
    }
    Ok(())
}

#[async_trait]
impl DocumentService for FsDocumentService {
    fn check_upload(&self, file_name: &str) -> Result<String, DocumentError> {
        let name = sanitize_file_name(file_name)
            .ok_or_else(|| DocumentError::Validation(format!("Invalid file name: {file_name}")))?;

        // Summaries are written by the ingestion side only.
        if name.to_ascii_lowercase().ends_with(SUMMARY_SUFFIX) {
            return Err(DocumentError::Validation(format!(
                "Reserved file name: {name}"
            )));
        }

        let extension = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if !self.allowed_extensions.contains(&extension) {
            return Err(DocumentError::Validation(format!(
                "Unsupported file type: {name}"
            )));
        }

        Ok(name)
    }

    async fn save_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<StoredDocument, DocumentError> {
        let name = self.check_upload(file_name)?;
        let path = Path::new(&name);

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let target = self.upload_dir.join(&name);
        tokio::fs::write(&target, bytes).await?;

        info!(file = %target.display(), size = bytes.len(), "Document uploaded");

        Ok(StoredDocument {
            stem,
            file_name: name,
            size: bytes.len() as u64,
        })
    }

    async fn list_documents(&self) -> Result<Vec<IndexedDocument>, DocumentError> {
        let mut entries = match tokio::fs::read_dir(&self.index_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Some(stem) = entry.file_name().to_str().map(ToString::to_string) else {
                continue;
            };
            let has_summary = tokio::fs::try_exists(self.summary_path(&stem))
                .await
                .unwrap_or(false);
            documents.push(IndexedDocument { stem, has_summary });
        }

        documents.sort_by(|a, b| a.stem.cmp(&b.stem));
        Ok(documents)
    }

    async fn read_summary(&self, stem: &str) -> Result<String, DocumentError> {
        validate_stem(stem)?;

        match tokio::fs::read_to_string(self.summary_path(stem)).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(stem.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> (FsDocumentService, PathBuf) {
        let root = std::env::temp_dir().join(format!("insight-docs-test-{}", uuid::Uuid::new_v4()));
        let config = DocumentsConfig {
            upload_dir: root.join("uploads").display().to_string(),
            index_dir: root.join("index").display().to_string(),
            ..DocumentsConfig::default()
        };
        (FsDocumentService::new(&config), root)
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            sanitize_file_name("Quarterly Report.pdf").as_deref(),
            Some("Quarterly_Report.pdf")
        );
        assert_eq!(
            sanitize_file_name("../../etc/passwd.txt").as_deref(),
            Some("passwd.txt")
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\me\\notes.md").as_deref(),
            Some("notes.md")
        );
        assert_eq!(sanitize_file_name(".env"), None);
        assert_eq!(sanitize_file_name("dir/"), None);
    }

    #[tokio::test]
    async fn test_save_upload() {
        let (docs, root) = service();
        let stored = docs.save_upload("My Notes.TXT", b"hello").await.unwrap();
        assert_eq!(stored.stem, "My_Notes");
        assert_eq!(stored.file_name, "My_Notes.TXT");
        assert_eq!(stored.size, 5);

        let written = tokio::fs::read(root.join("uploads").join("My_Notes.TXT"))
            .await
            .unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn test_save_upload_rejects_unsupported_type() {
        let (docs, _) = service();
        assert!(matches!(
            docs.save_upload("run.exe", b"MZ").await,
            Err(DocumentError::Validation(_))
        ));
        assert!(matches!(
            docs.save_upload("README", b"x").await,
            Err(DocumentError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_cannot_overwrite_summary() {
        let (docs, root) = service();
        let summary = root.join("uploads").join("report.summary.txt");
        tokio::fs::create_dir_all(summary.parent().unwrap()).await.unwrap();
        tokio::fs::write(&summary, "generated").await.unwrap();

        for name in ["report.summary.txt", "report.SUMMARY.TXT", "dir/report summary.summary.txt"] {
            assert!(
                matches!(docs.check_upload(name), Err(DocumentError::Validation(_))),
                "{name}"
            );
        }
        assert!(matches!(
            docs.save_upload("report.summary.txt", b"forged").await,
            Err(DocumentError::Validation(_))
        ));
        assert_eq!(tokio::fs::read_to_string(&summary).await.unwrap(), "generated");

        assert_eq!(docs.check_upload("report.txt").unwrap(), "report.txt");
    }

    #[tokio::test]
    async fn test_list_documents() {
        let (docs, root) = service();
        assert!(docs.list_documents().await.unwrap().is_empty());

        tokio::fs::create_dir_all(root.join("index").join("zeta"))
            .await
            .unwrap();
        tokio::fs::create_dir_all(root.join("index").join("alpha"))
            .await
            .unwrap();
        tokio::fs::write(root.join("index").join("stray.txt"), b"")
            .await
            .unwrap();
        tokio::fs::create_dir_all(root.join("uploads")).await.unwrap();
        tokio::fs::write(root.join("uploads").join("alpha.summary.txt"), b"sum")
            .await
            .unwrap();

        let listed = docs.list_documents().await.unwrap();
        assert_eq!(
            listed,
            vec![
                IndexedDocument {
                    stem: "alpha".to_string(),
                    has_summary: true
                },
                IndexedDocument {
                    stem: "zeta".to_string(),
                    has_summary: false
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_read_summary() {
        let (docs, root) = service();
        tokio::fs::create_dir_all(root.join("uploads")).await.unwrap();
        tokio::fs::write(root.join("uploads").join("report.summary.txt"), "short")
            .await
            .unwrap();

        assert_eq!(docs.read_summary("report").await.unwrap(), "short");
        assert!(matches!(
            docs.read_summary("missing").await,
            Err(DocumentError::NotFound(_))
        ));
        assert!(matches!(
            docs.read_summary("../secret").await,
            Err(DocumentError::Validation(_))
        ));
    }
}
