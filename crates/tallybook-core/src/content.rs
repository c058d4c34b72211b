//! Content-kind detection for uploaded documents.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{IngestError, Result};

const RASTER_IMAGES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/heic",
    "image/heif",
    "image/gif",
];

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS: &str = "application/vnd.ms-excel";

/// What kind of document an upload is, which decides how it reaches the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Portable document format; sent as inline bytes.
    Pdf,
    /// Raster image; sent as inline bytes.
    Image,
    /// Office Open XML workbook; flattened to text first.
    Spreadsheet,
    /// Legacy binary workbook; flattened to text first.
    LegacySpreadsheet,
    /// Comma-separated text; sent as text.
    DelimitedText,
}

impl ContentKind {
    /// Classify an upload from its declared MIME type and file name.
    ///
    /// A `.csv` file name is accepted whatever the MIME type says, since browsers
    /// disagree on it. When no useful MIME type is given the extension decides.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedFormat`] for anything else.
    pub fn detect(mime_type: &str, filename: &str) -> Result<Self> {
        let mime = mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let by_mime = match mime.as_str() {
            "application/pdf" => Some(Self::Pdf),
            m if RASTER_IMAGES.contains(&m) => Some(Self::Image),
            XLSX => Some(Self::Spreadsheet),
            XLS => Some(Self::LegacySpreadsheet),
            "text/csv" => Some(Self::DelimitedText),
            _ => None,
        };

        let unhelpful_mime = mime.is_empty() || mime == "application/octet-stream";
        let detected = match (by_mime, extension.as_deref()) {
            (_, Some("csv")) => Some(Self::DelimitedText),
            (Some(kind), _) => Some(kind),
            (None, Some(ext)) if unhelpful_mime => Self::from_extension(ext),
            _ => None,
        };

        detected.ok_or_else(|| IngestError::UnsupportedFormat {
            mime_type: mime_type.to_owned(),
            filename: filename.to_owned(),
        })
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "webp" | "heic" | "heif" | "gif" => Some(Self::Image),
            "xlsx" => Some(Self::Spreadsheet),
            "xls" => Some(Self::LegacySpreadsheet),
            _ => None,
        }
    }

    /// Whether the extractor receives the raw bytes rather than text.
    #[must_use]
    pub const fn is_inline_document(self) -> bool {
        matches!(self, Self::Pdf | Self::Image)
    }

    /// Whether a spreadsheet parser must flatten the bytes to text first.
    #[must_use]
    pub const fn needs_flattening(self) -> bool {
        matches!(self, Self::Spreadsheet | Self::LegacySpreadsheet)
    }

    /// MIME type to declare when the bytes are forwarded as a document.
    ///
    /// Pdf uploads are always forwarded as `application/pdf`; images keep their own type.
    #[must_use]
    pub fn forwarded_mime(self, declared: &str) -> String {
        match self {
            Self::Pdf => "application/pdf".to_owned(),
            Self::Image if !declared.trim().is_empty() && declared != "application/octet-stream" => {
                declared.to_owned()
            }
            Self::Image => "image/jpeg".to_owned(),
            Self::Spreadsheet => XLSX.to_owned(),
            Self::LegacySpreadsheet => XLS.to_owned(),
            Self::DelimitedText => "text/csv".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_supported_mime_types() {
        assert_eq!(ContentKind::detect("application/pdf", "a.pdf"), Ok(ContentKind::Pdf));
        assert_eq!(ContentKind::detect("image/png", "scan.png"), Ok(ContentKind::Image));
        assert_eq!(ContentKind::detect("IMAGE/JPEG", "scan"), Ok(ContentKind::Image));
        assert_eq!(ContentKind::detect(XLSX, "book.xlsx"), Ok(ContentKind::Spreadsheet));
        assert_eq!(ContentKind::detect(XLS, "book.xls"), Ok(ContentKind::LegacySpreadsheet));
        assert_eq!(
            ContentKind::detect("text/csv; charset=utf-8", "rows"),
            Ok(ContentKind::DelimitedText)
        );
    }

    #[test]
    fn csv_filename_wins_over_mime_type() {
        assert_eq!(
            ContentKind::detect("application/vnd.ms-excel", "export.CSV"),
            Ok(ContentKind::DelimitedText)
        );
        assert_eq!(
            ContentKind::detect("text/plain", "export.csv"),
            Ok(ContentKind::DelimitedText)
        );
    }

    #[test]
    fn extension_decides_when_mime_is_unhelpful() {
        assert_eq!(
            ContentKind::detect("application/octet-stream", "invoice.pdf"),
            Ok(ContentKind::Pdf)
        );
        assert_eq!(ContentKind::detect("", "photo.jpeg"), Ok(ContentKind::Image));
    }

    #[test]
    fn rejects_everything_else() {
        for (mime, name) in [
            ("text/plain", "notes.txt"),
            ("image/svg+xml", "logo.svg"),
            ("application/zip", "invoice.pdf"),
            ("", "README"),
        ] {
            let err = ContentKind::detect(mime, name).unwrap_err();
            assert_eq!(err.code(), "unsupported_format", "{mime} {name}");
        }
    }
}
