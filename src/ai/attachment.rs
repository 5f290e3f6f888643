use base64::Engine;
use serde::Serialize;
use std::path::Path;

use super::error::AssistantError;
use crate::utils::format_size;

/// A file the user attached to their next message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Inline file part of a Gemini request
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a file and guess its MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self, AssistantError> {
        let data = std::fs::read(path).map_err(|source| AssistantError::Attachment {
            path: path.display().to_string(),
            source,
        })?;

        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());

        tracing::debug!(
            "[Attachment] Loaded {} ({}, {})",
            file_name,
            mime_type,
            format_size(data.len() as u64)
        );

        Ok(Self {
            file_name,
            mime_type,
            data,
        })
    }

    pub fn to_inline_data(&self) -> InlineData {
        InlineData {
            mime_type: self.mime_type.clone(),
            data: base64::engine::general_purpose::STANDARD.encode(&self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_path_guesses_mime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "a,b\n1,2").unwrap();

        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.file_name, "sales.csv");
        assert_eq!(attachment.mime_type, "text/csv");
        assert_eq!(attachment.data, b"a,b\n1,2");
    }

    #[test]
    fn test_missing_file_is_attachment_error() {
        let dir = tempdir().unwrap();
        let err = Attachment::from_path(&dir.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, AssistantError::Attachment { .. }));
    }

    #[test]
    fn test_inline_data_is_base64() {
        let attachment = Attachment::new("a.txt", "text/plain", b"hi".to_vec());
        let inline = attachment.to_inline_data();
        assert_eq!(inline.mime_type, "text/plain");
        assert_eq!(inline.data, "aGk=");
    }
}
