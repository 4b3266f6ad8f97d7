use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

use crate::error::AnalysisError;

pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// A file as handed over by the picker, drop zone or command line.
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A file that passed validation and can be uploaded.
#[derive(Clone)]
pub struct ImageSubmission {
    id: Uuid,
    file_name: String,
    media_type: String,
    bytes: Rc<[u8]>,
}

/// Declared type `image/*`, or a known image extension.
pub fn is_accepted(media_type: &str, file_name: &str) -> bool {
    let declared_image = media_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/");
    declared_image
        || extension_of(file_name).is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

impl ImageSubmission {
    pub fn validate(file: SelectedFile) -> Result<Self, AnalysisError> {
        if !is_accepted(&file.media_type, &file.name) {
            return Err(AnalysisError::InvalidInput {
                file_name: file.name,
                media_type: file.media_type,
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            file_name: file.name,
            media_type: file.media_type,
            bytes: Rc::from(file.bytes),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content type for the multipart part. Falls back to the extension when
    /// the picker did not declare an image type.
    pub fn upload_media_type(&self) -> &str {
        if self.media_type.to_ascii_lowercase().starts_with("image/") {
            return &self.media_type;
        }
        match extension_of(&self.file_name).as_deref() {
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("bmp") => "image/bmp",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Debug for ImageSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSubmission")
            .field("id", &self.id)
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
