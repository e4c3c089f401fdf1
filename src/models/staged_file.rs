//! A local file chosen for upload but not yet sent.

use bytes::Bytes;
use std::{io, path::Path};
use tokio::fs;

/// A user-selected, not-yet-uploaded file held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct StagedFile {
    /// Bare file name; the staging buffer's uniqueness key.
    pub name: String,
    pub size: u64,
    pub bytes: Bytes,
    pub mime_type: String,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read a file from disk, naming it after its last path component and
    /// guessing its content type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", path.display()),
                )
            })?;
        let bytes = fs::read(path).await?;
        let mime_type = guess_mime_type(&name);
        Ok(Self::new(name, bytes, mime_type))
    }
}

/// Content type for common drawing and document extensions.
/// Anything unrecognised is sent as `application/octet-stream`.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "csv" => "text/csv",
        "txt" => "text/plain",
        "dwg" => "image/vnd.dwg",
        "dxf" => "image/vnd.dxf",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}
