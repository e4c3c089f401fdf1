//! Metadata of a file already stored for a project.

use super::{Category, RecordId};
use serde::{Deserialize, Deserializer, Serialize};

/// A stored project attachment.
///
/// The struct stores metadata only; the content is fetched on demand
/// through the blob endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProjectFile {
    /// Server-assigned identifier.
    pub id: RecordId,

    /// Original filename as uploaded.
    pub file_name: String,

    /// Content type (MIME type) recorded at upload.
    #[serde(default)]
    pub mime_type: String,

    /// Size in bytes.
    #[serde(default)]
    pub file_size: u64,

    /// Stage the file was uploaded under. Files listed through the
    /// whole-project endpoint may predate categories; blank or unknown
    /// tags read as `None`.
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<Category>,

    /// Job number this file belongs to.
    #[serde(default, alias = "projectNo")]
    pub project_no: String,
}

impl ProjectFile {
    pub fn is_previewable(&self) -> bool {
        is_previewable(&self.mime_type)
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Human size as shown in the file list, e.g. `1.50 MB`.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.file_size as f64 / 1024.0 / 1024.0)
    }
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|tag| tag.parse().ok()))
}

/// True when content of this type can be shown inline: images and PDFs.
pub fn is_previewable(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type.ends_with("/pdf")
}
