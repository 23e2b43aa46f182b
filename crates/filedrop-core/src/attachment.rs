use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IngestError;
use crate::limits::MAX_FILE_SIZE_BYTES;
use crate::registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Image,
    Document,
    Code,
}

impl Category {
    pub const ALL: &[Category] = &[Category::Image, Category::Document, Category::Code];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Document => "document",
            Category::Code => "code",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Image => "Image",
            Category::Document => "Document",
            Category::Code => "Code",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Category::Image),
            "document" => Some(Category::Document),
            "code" => Some(Category::Code),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One ingested file, ready to be sent along with a message.
///
/// The serialized form (camelCase keys, `relativePath` omitted when absent)
/// is what the receiving backend parses, so field names are part of the
/// wire contract. Attachments are immutable: replacing one means removing it
/// from the store and adding a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "WireAttachment")]
pub struct Attachment {
    id: String,
    filename: String,
    content_type: String,
    payload: String,
    size_bytes: u64,
    category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    relative_path: Option<String>,
}

impl Attachment {
    /// Build a record with a fresh id and a category derived from
    /// `content_type`.
    ///
    /// Fails unless `content_type` is on the allow-list and `size_bytes` is
    /// within [`MAX_FILE_SIZE_BYTES`].
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        payload: String,
        size_bytes: u64,
        relative_path: Option<String>,
    ) -> Result<Self, IngestError> {
        let content_type = content_type.into();
        check_record(&content_type, size_bytes)?;
        Ok(Self {
            id: format!("file-{}", Uuid::new_v4()),
            filename: filename.into(),
            category: registry::classify(&content_type),
            content_type,
            payload,
            size_bytes,
            relative_path,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Base64 of the file bytes, without a `data:` prefix.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// Folder-relative path when known, otherwise the bare filename.
    pub fn display_label(&self) -> &str {
        self.relative_path.as_deref().unwrap_or(&self.filename)
    }

    pub fn type_name(&self) -> String {
        registry::display_name(&self.content_type)
    }

    /// Inline `data:` URL, used for image thumbnails.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.payload)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAttachment {
    id: String,
    filename: String,
    content_type: String,
    payload: String,
    size_bytes: u64,
    category: Category,
    #[serde(default)]
    relative_path: Option<String>,
}

impl TryFrom<WireAttachment> for Attachment {
    type Error = IngestError;

    fn try_from(wire: WireAttachment) -> Result<Self, Self::Error> {
        check_record(&wire.content_type, wire.size_bytes)?;
        let expected = registry::classify(&wire.content_type);
        if wire.category != expected {
            return Err(IngestError::InvalidAttachment(format!(
                "category {} does not match content type {}",
                wire.category.as_str(),
                wire.content_type
            )));
        }
        Ok(Self {
            id: wire.id,
            filename: wire.filename,
            content_type: wire.content_type,
            payload: wire.payload,
            size_bytes: wire.size_bytes,
            category: wire.category,
            relative_path: wire.relative_path,
        })
    }
}

fn check_record(content_type: &str, size_bytes: u64) -> Result<(), IngestError> {
    if !registry::is_allowed(content_type) {
        return Err(IngestError::InvalidAttachment(format!(
            "content type {content_type} is not allowed"
        )));
    }
    if size_bytes > MAX_FILE_SIZE_BYTES {
        return Err(IngestError::InvalidAttachment(format!(
            "size {size_bytes} exceeds {MAX_FILE_SIZE_BYTES} bytes"
        )));
    }
    Ok(())
}

/// Format a byte count for display: `512 B`, `1.5 KB`, `3.2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Attachment {
        Attachment::new(
            "main.rs",
            "text/x-rust",
            "Zm4gbWFpbigpIHt9".to_string(),
            12,
            Some("proj/src/main.rs".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn new_derives_category_and_id() {
        let a = sample();
        assert_eq!(a.category(), Category::Code);
        assert!(a.id().starts_with("file-"));
        assert_ne!(a.id(), sample().id());
    }

    #[test]
    fn category_string_roundtrip() {
        for c in Category::ALL {
            assert_eq!(Category::from_str(c.as_str()), Some(*c));
        }
        assert_eq!(Category::from_str("video"), None);
        assert_eq!(Category::Document.to_string(), "Document");
    }

    #[test]
    fn display_label_prefers_relative_path() {
        let a = sample();
        assert_eq!(a.display_label(), "proj/src/main.rs");

        let b = Attachment::new("notes.md", "text/markdown", String::new(), 0, None).unwrap();
        assert_eq!(b.display_label(), "notes.md");
        assert_eq!(b.type_name(), "Markdown");
    }

    #[test]
    fn data_url_has_prefix() {
        let a = Attachment::new("dot.png", "image/png", "iVBORw0=".to_string(), 5, None).unwrap();
        assert_eq!(a.data_url(), "data:image/png;base64,iVBORw0=");
    }

    #[test]
    fn wire_shape_uses_camel_case() {
        let a = sample();
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["contentType"], "text/x-rust");
        assert_eq!(json["sizeBytes"], 12);
        assert_eq!(json["category"], "code");
        assert_eq!(json["relativePath"], "proj/src/main.rs");
        assert_eq!(json["payload"], "Zm4gbWFpbigpIHt9");

        let b = Attachment::new("a.txt", "text/plain", String::new(), 0, None).unwrap();
        let json = serde_json::to_value(&b).unwrap();
        assert!(json.get("relativePath").is_none());
    }

    #[test]
    fn deserialize_checks_invariants() {
        let a = sample();
        let json = serde_json::to_string(&a).unwrap();
        let back: Attachment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);

        let bad_category = json.replace("\"code\"", "\"image\"");
        assert!(serde_json::from_str::<Attachment>(&bad_category).is_err());

        let bad_type = json.replace("text/x-rust", "application/zip");
        assert!(serde_json::from_str::<Attachment>(&bad_type).is_err());
    }

    #[test]
    fn new_enforces_allow_list_and_size() {
        let err = Attachment::new("clip.mp4", "video/mp4", String::new(), 1, None).unwrap_err();
        assert!(matches!(err, IngestError::InvalidAttachment(_)));

        let over = MAX_FILE_SIZE_BYTES + 1;
        let err = Attachment::new("huge.png", "image/png", String::new(), over, None).unwrap_err();
        assert!(matches!(err, IngestError::InvalidAttachment(_)));

        let at_limit =
            Attachment::new("edge.png", "image/png", String::new(), MAX_FILE_SIZE_BYTES, None);
        assert!(at_limit.is_ok());
    }

    #[test]
    fn deserialize_rejects_oversized_record() {
        let json = r#"{
            "id": "file-1",
            "filename": "huge.png",
            "contentType": "image/png",
            "payload": "",
            "sizeBytes": 99999999999,
            "category": "image"
        }"#;
        let err = serde_json::from_str::<Attachment>(json).unwrap_err();
        assert!(err.to_string().contains("exceeds"));

        let within = json.replace("99999999999", "1024");
        let a: Attachment = serde_json::from_str(&within).unwrap();
        assert_eq!(a.size_bytes(), 1024);
    }

    #[test]
    fn format_file_size_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(9 * 1024 * 1024), "9.0 MB");
    }
}
