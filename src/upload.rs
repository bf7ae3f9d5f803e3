//! Uploaded files: a named byte payload with a declared media type.
//!
//! Unsupported types and oversized payloads are rejected here, before any
//! extraction runs, so the extractor only ever sees PDF or spreadsheet bytes.

use std::path::Path;
use thiserror::Error;

use crate::models::MediaType;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type: {0} (expected .pdf, .xlsx or .xls)")]
    Unsupported(String),
    #[error("file {name} is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { name: String, size: u64, limit: u64 },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, media_type: MediaType, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type,
            bytes,
        }
    }

    /// Build an upload from a declared MIME type, as a browser form would send it.
    pub fn from_mime(
        name: impl Into<String>,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        let media_type =
            MediaType::from_mime(mime).ok_or_else(|| UploadError::Unsupported(mime.to_string()))?;
        Ok(Self::new(name, media_type, bytes))
    }

    /// Read a file from disk, inferring the media type from its extension.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self, UploadError> {
        let media_type = MediaType::from_path(path)
            .ok_or_else(|| UploadError::Unsupported(path.display().to_string()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let io_err = |source| UploadError::Io {
            path: path.display().to_string(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > max_bytes {
            return Err(UploadError::TooLarge {
                name,
                size,
                limit: max_bytes,
            });
        }
        let bytes = std::fs::read(path).map_err(io_err)?;

        Ok(Self::new(name, media_type, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size rendered the way the upload panel shows it, e.g. `12.3 KB`.
    pub fn size_display(&self) -> String {
        format!("{:.1} KB", self.size() as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_mime_rejects_unknown_types() {
        let err = Upload::from_mime("notes.txt", "text/plain", b"x".to_vec()).unwrap_err();
        assert!(matches!(err, UploadError::Unsupported(_)));

        let ok = Upload::from_mime("q3.pdf", "application/pdf", b"%PDF".to_vec()).unwrap();
        assert_eq!(ok.media_type, MediaType::Pdf);
    }

    #[test]
    fn from_path_reads_bytes_and_name() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Statement.xlsx");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let upload = Upload::from_path(&path, 1024 * 1024).unwrap();
        assert_eq!(upload.name, "Statement.xlsx");
        assert_eq!(upload.media_type, MediaType::Xlsx);
        assert_eq!(upload.size(), 2048);
        assert_eq!(upload.size_display(), "2.0 KB");
    }

    #[test]
    fn from_path_enforces_size_limit() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("big.pdf");
        std::fs::write(&path, vec![b'x'; 100]).unwrap();

        let err = Upload::from_path(&path, 10).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size: 100, limit: 10, .. }));
    }

    #[test]
    fn from_path_rejects_unsupported_extension() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.csv");
        std::fs::write(&path, "a,b\n").unwrap();

        let err = Upload::from_path(&path, 1024).unwrap_err();
        assert!(matches!(err, UploadError::Unsupported(_)));
    }
}
