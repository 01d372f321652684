//! Validation engine: parses a document, runs every rule module
//! concurrently, and merges their findings in fixed registration order so
//! output is deterministic regardless of remote completion order.

use std::path::Path;
use std::sync::Arc;

use crate::document::Document;
use crate::error::{NitsError, Result};
use crate::finding::Finding;
use crate::remote::MetadataSource;
use crate::rules::{self, RunOptions};
use crate::{txt, xml};

/// Per-file validation report.
#[derive(Debug, Clone)]
pub struct Report {
    pub file: FileInfo,
    pub nits: Vec<Finding>,
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: String,
    pub size: u64,
}

impl Report {
    /// A report passes when nothing reached Error severity. Warnings and
    /// comments never affect the result.
    pub fn passed(&self) -> bool {
        !self.nits.iter().any(Finding::is_error)
    }
}

pub struct ValidationEngine {
    remote: Arc<dyn MetadataSource>,
    options: RunOptions,
}

impl ValidationEngine {
    pub fn new(remote: Arc<dyn MetadataSource>, options: RunOptions) -> Self {
        Self { remote, options }
    }

    /// Read and validate one document from disk.
    pub async fn validate_file(&self, path: &Path) -> Result<Report> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let document = parse_document(&bytes, path, &filename)?;
        let nits = self.run_rules(&document).await;
        Ok(Report {
            file: FileInfo {
                path: path.display().to_string(),
                size: bytes.len() as u64,
            },
            nits,
        })
    }

    /// Run every rule module concurrently and merge in registration order.
    pub async fn run_rules(&self, document: &Document) -> Vec<Finding> {
        let remote = self.remote.as_ref();
        let (sections, references, downref, metadata, status, drafts, format) = futures::join!(
            rules::sections::check(document, &self.options, remote),
            rules::references::check(document, &self.options, remote),
            rules::downref::check(document, &self.options, remote),
            rules::metadata::check(document, &self.options, remote),
            rules::status::check(document, &self.options, remote),
            rules::drafts::check(document, &self.options, remote),
            rules::format::check(document, &self.options, remote),
        );

        let mut nits = Vec::new();
        for list in [sections, references, downref, metadata, status, drafts, format] {
            nits.extend(list);
        }
        nits
    }
}

/// Dispatch on file extension. Only `.txt` and `.xml` are recognized.
fn parse_document(bytes: &[u8], path: &Path, filename: &str) -> Result<Document> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    match extension.as_deref() {
        Some("txt") => {
            let text = std::str::from_utf8(bytes).map_err(|e| NitsError::TxtParsingFailed {
                line: 1,
                details: format!("input is not valid UTF-8: {e}"),
            })?;
            Ok(Document::Txt(txt::parse(text, filename)?))
        }
        Some("xml") => Ok(Document::Xml(xml::parse(bytes, filename)?)),
        _ => Err(NitsError::UnsupportedDocumentType {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Mode, Severity};
    use crate::remote::OfflineMetadataSource;
    use std::io::Write;

    fn engine(mode: Mode) -> ValidationEngine {
        ValidationEngine::new(Arc::new(OfflineMetadataSource), RunOptions::with_mode(mode))
    }

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "draft.pdf", "not a document");
        let err = engine(Mode::Normal).validate_file(&path).await.unwrap_err();
        assert!(matches!(err, NitsError::UnsupportedDocumentType { .. }));
    }

    #[tokio::test]
    async fn test_txt_round_trip_reports_file_size() {
        let contents = "Internet-Draft                          J. Doe\n\n\
                        Title\nslug\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "draft.txt", contents);
        let report = engine(Mode::Normal).validate_file(&path).await.unwrap();
        assert_eq!(report.file.size, contents.len() as u64);
        assert!(report.file.path.ends_with("draft.txt"));
    }

    #[tokio::test]
    async fn test_error_finding_fails_the_report() {
        // Missing sections produce Error findings offline in Normal mode.
        let contents = "Internet-Draft                          J. Doe\n\n\
                        Title\nslug\n";
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "draft.txt", contents);
        let report = engine(Mode::Normal).validate_file(&path).await.unwrap();
        assert!(report.nits.iter().any(|n| n.severity == Severity::Error));
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn test_merge_order_is_registration_order() {
        // Missing-section nits (sections module) must precede formatting
        // nits even though the rules run concurrently.
        let contents = format!(
            "Internet-Draft                          J. Doe\n\n\
             Title\nslug\n\n{}\n",
            "x".repeat(80)
        );
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "draft.txt", &contents);
        let report = engine(Mode::Normal).validate_file(&path).await.unwrap();
        let section_pos = report
            .nits
            .iter()
            .position(|n| n.code == "MISSING_INTRODUCTION_SECTION")
            .unwrap();
        let format_pos = report
            .nits
            .iter()
            .position(|n| n.code == "LINE_TOO_LONG")
            .unwrap();
        assert!(section_pos < format_pos);
    }

    #[tokio::test]
    async fn test_malformed_xml_aborts_before_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "draft.xml", "<rfc><front></rfc>");
        let err = engine(Mode::Normal).validate_file(&path).await.unwrap_err();
        assert!(err.is_parse_failure());
    }
}
