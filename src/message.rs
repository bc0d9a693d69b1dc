//! Messages exchanged with the host: input files in, result messages out.
//!
//! The host hands over a list of [`InputFile`]s and drains a sequence of
//! [`ResultMessage`]s. Each message is one of three kinds:
//!
//! * `Text` — human-readable status or error line
//! * `Blob` — the composite PNG plus its MIME type and filename
//! * `Json` — machine-readable error detail, `{filename: {"error": "..."}}`
//!
//! Messages serialise with an internal `type` tag so the CLI can print them
//! as newline-delimited JSON; blob bytes are written as standard base64.

use crate::error::{FileError, Pdf2ImageError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// MIME type of every blob this crate produces.
pub const PNG_MIME_TYPE: &str = "image/png";

/// Text emitted when a batch is started without any files.
pub const NO_FILES_MESSAGE: &str = "No files provided. Please upload PDF files for processing.";

/// One uploaded file: its name and raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct InputFile {
    pub filename: String,
    pub blob: Vec<u8>,
}

impl InputFile {
    pub fn new(filename: impl Into<String>, blob: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            blob: blob.into(),
        }
    }

    /// Read a local file, using its final path component as the filename.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Pdf2ImageError> {
        let path = path.as_ref();
        let blob = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Pdf2ImageError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Pdf2ImageError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Pdf2ImageError::ReadFailed {
                path: PathBuf::from(path),
                source: e,
            },
        })?;

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());

        debug!("Read {} ({} bytes)", path.display(), blob.len());
        Ok(Self { filename, blob })
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputFile")
            .field("filename", &self.filename)
            .field("blob", &format_args!("<{} bytes>", self.blob.len()))
            .finish()
    }
}

/// Metadata attached to a blob message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobMeta {
    pub mime_type: String,
    pub filename: String,
}

/// One item of the result stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultMessage {
    Text {
        text: String,
    },
    Blob {
        #[serde(serialize_with = "serialize_base64")]
        data: Vec<u8>,
        meta: BlobMeta,
    },
    Json {
        json: serde_json::Value,
    },
}

impl ResultMessage {
    pub fn text(text: impl Into<String>) -> Self {
        ResultMessage::Text { text: text.into() }
    }

    /// A PNG blob named `filename`.
    pub fn png(data: Vec<u8>, filename: impl Into<String>) -> Self {
        ResultMessage::Blob {
            data,
            meta: BlobMeta {
                mime_type: PNG_MIME_TYPE.to_string(),
                filename: filename.into(),
            },
        }
    }

    /// The `{filename: {"error": "..."}}` detail for a failed file.
    pub fn file_error(filename: &str, error: &FileError) -> Self {
        let mut detail = serde_json::Map::new();
        detail.insert(
            filename.to_string(),
            serde_json::json!({ "error": error.to_string() }),
        );
        ResultMessage::Json {
            json: serde_json::Value::Object(detail),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResultMessage::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<(&[u8], &BlobMeta)> {
        match self {
            ResultMessage::Blob { data, meta } => Some((data, meta)),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResultMessage::Json { json } => Some(json),
            _ => None,
        }
    }
}

fn serialize_base64<T, S>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_error_json_shape() {
        let err = FileError::Open {
            detail: "trailer missing".into(),
        };
        let msg = ResultMessage::file_error("file2.pdf", &err);
        let json = msg.as_json().expect("json message");
        let detail = json["file2.pdf"]["error"].as_str().unwrap();
        assert_eq!(detail, "failed to open PDF: trailer missing");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn png_blob_meta() {
        let msg = ResultMessage::png(vec![1, 2, 3], "report.png");
        let (data, meta) = msg.as_blob().unwrap();
        assert_eq!(data, &[1, 2, 3]);
        assert_eq!(meta.mime_type, "image/png");
        assert_eq!(meta.filename, "report.png");
        assert!(msg.as_text().is_none());
    }

    #[test]
    fn blob_serialises_as_base64() {
        let msg = ResultMessage::png(b"PNG".to_vec(), "a.png");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "blob");
        assert_eq!(v["data"], "UE5H");
        assert_eq!(v["meta"]["mime_type"], "image/png");
    }

    #[test]
    fn text_serialises_with_tag() {
        let v = serde_json::to_value(ResultMessage::text("hello")).unwrap();
        assert_eq!(v, serde_json::json!({"type": "text", "text": "hello"}));
    }

    #[test]
    fn input_file_debug_hides_bytes() {
        let f = InputFile::new("a.pdf", vec![0u8; 2048]);
        let s = format!("{f:?}");
        assert!(s.contains("<2048 bytes>"));
        assert!(s.contains("a.pdf"));
    }

    #[test]
    fn from_path_reads_file_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.v2.pdf");
        std::fs::write(&path, b"%PDF-1.4\n").unwrap();

        let f = InputFile::from_path(&path).unwrap();
        assert_eq!(f.filename, "scan.v2.pdf");
        assert_eq!(f.blob, b"%PDF-1.4\n");
    }

    #[test]
    fn from_path_missing_file() {
        let err = InputFile::from_path("/definitely/not/a/real/file.pdf").unwrap_err();
        assert!(matches!(err, Pdf2ImageError::FileNotFound { .. }));
    }
}
