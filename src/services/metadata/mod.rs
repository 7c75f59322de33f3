pub mod images;
pub mod pdf;

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::path::Path;

pub use self::images::extract_image_metadata;
pub use self::pdf::extract_pdf_metadata;

/// A single extracted metadata value
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    Integer(u64),
    Flag(bool),
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::Text(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::Text(value.to_string())
    }
}

impl From<u64> for MetadataValue {
    fn from(value: u64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Flag(value)
    }
}

pub type Metadata = BTreeMap<String, MetadataValue>;

/// Outcome of running a reader over an uploaded file.
///
/// Serializes to one flat JSON object: the extracted fields, plus an `"error"`
/// key when extraction stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Complete(Metadata),
    Partial { fields: Metadata, error: String },
    Failed(String),
}

impl Extraction {
    /// Fields gathered so far, paired with the failure that stopped the reader
    pub fn interrupted(fields: Metadata, error: String) -> Self {
        if fields.is_empty() {
            Extraction::Failed(error)
        } else {
            Extraction::Partial { fields, error }
        }
    }

    pub fn fields(&self) -> Option<&Metadata> {
        match self {
            Extraction::Complete(fields) | Extraction::Partial { fields, .. } => Some(fields),
            Extraction::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Extraction::Complete(_) => None,
            Extraction::Partial { error, .. } | Extraction::Failed(error) => Some(error),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.fields().and_then(|fields| fields.get(key))
    }
}

impl Serialize for Extraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields();
        let error = self.error();

        let mut map = serializer.serialize_map(None)?;
        if let Some(fields) = fields {
            for (key, value) in fields {
                // "error" is reserved for the failure message
                if error.is_some() && key == "error" {
                    continue;
                }
                map.serialize_entry(key, value)?;
            }
        }
        if let Some(error) = error {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}

/// Which reader handles a file, decided from its extension alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Pdf,
    Unsupported,
}

impl FileCategory {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if [".jpg", ".jpeg", ".png"].iter().any(|ext| lower.ends_with(ext)) {
            FileCategory::Image
        } else if lower.ends_with(".pdf") {
            FileCategory::Pdf
        } else {
            FileCategory::Unsupported
        }
    }

    /// The reader that handles this category; `None` for unsupported files
    pub fn reader(&self) -> Option<fn(&Path) -> Extraction> {
        match self {
            FileCategory::Image => Some(extract_image_metadata),
            FileCategory::Pdf => Some(extract_pdf_metadata),
            FileCategory::Unsupported => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Image => "image",
            FileCategory::Pdf => "pdf",
            FileCategory::Unsupported => "unsupported",
        }
    }
}
