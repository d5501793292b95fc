use crate::error::AppError;
use mime::Mime;
use std::fmt;
use std::path::Path;

/// The same set the browser picker offered: image/jpeg, image/png (and .jpg).
pub fn is_accepted(mime: &Mime) -> bool {
    mime.type_() == mime::IMAGE && (mime.subtype() == mime::JPEG || mime.subtype() == mime::PNG)
}

/// An image picked for upload, held in memory until sent.
#[derive(Clone, PartialEq)]
pub struct ImageFile {
    pub name: String,
    pub mime: Mime,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime", &self.mime.essence_str())
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: Mime, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Reads a picked file, refusing anything the picker would not offer.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        let mime = mime_guess::from_path(path)
            .first()
            .filter(is_accepted)
            .ok_or_else(|| AppError::UnsupportedFile(name.clone()))?;

        log::trace!("Reading upload {:?} as {}", path, mime);
        let bytes = tokio::fs::read(path).await?;
        log::debug!("Selected {} ({} bytes, {})", name, bytes.len(), mime);

        Ok(Self { name, mime, bytes })
    }
}
