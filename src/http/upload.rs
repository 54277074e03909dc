use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// Field name the file is sent under in the multipart form.
pub const FILE_FIELD: &str = "file";

/// An in-memory file to send as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Reads a file from disk, naming the part after the file.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("{:?} has no file name", path))?;
        Ok(Self::new(file_name, bytes))
    }

    pub(crate) fn into_form(self) -> Result<Form> {
        let mut part = Part::bytes(self.bytes).file_name(self.file_name);
        if let Some(mime_type) = &self.mime_type {
            part = part
                .mime_str(mime_type)
                .with_context(|| format!("Invalid MIME type '{}'", mime_type))?;
        }
        Ok(Form::new().part(FILE_FIELD, part))
    }
}
