//! Core data types shared across the extraction and Q&A pipeline.

use serde::Serialize;
use std::fmt;
use std::path::Path;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_XLS: &str = "application/vnd.ms-excel";

/// Media types accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Pdf,
    Xlsx,
    Xls,
}

impl MediaType {
    /// Map a declared MIME type. Anything else is unsupported.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            MIME_PDF => Some(MediaType::Pdf),
            MIME_XLSX => Some(MediaType::Xlsx),
            MIME_XLS => Some(MediaType::Xls),
            _ => None,
        }
    }

    /// Infer from a file extension (`.pdf`, `.xlsx`, `.xls`, case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(MediaType::Pdf),
            "xlsx" => Some(MediaType::Xlsx),
            "xls" => Some(MediaType::Xls),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Pdf => MIME_PDF,
            MediaType::Xlsx => MIME_XLSX,
            MediaType::Xls => MIME_XLS,
        }
    }

    pub fn is_spreadsheet(self) -> bool {
        matches!(self, MediaType::Xlsx | MediaType::Xls)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}
