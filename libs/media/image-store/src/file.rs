use crate::error::{ImageStoreError, ImageStoreResult};

pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// 10 MiB
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Per batch, and per product.
pub const MAX_FILES: usize = 5;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: Option<String>,
}

impl ImageFile {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// `content_type` without parameters, lowercased.
    pub fn mime(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn extension(&self) -> &'static str {
        match self.mime().as_str() {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        }
    }

    pub fn validate(&self) -> ImageStoreResult<()> {
        let mime = self.mime();
        if !ALLOWED_CONTENT_TYPES.contains(&mime.as_str()) {
            return Err(ImageStoreError::UnsupportedType(mime));
        }

        if self.size() > MAX_FILE_SIZE {
            return Err(ImageStoreError::TooLarge(self.size()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_types() {
        for content_type in ALLOWED_CONTENT_TYPES {
            assert!(ImageFile::new(vec![1, 2, 3], content_type).validate().is_ok());
        }
        assert!(ImageFile::new(vec![1], "IMAGE/PNG; charset=binary")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_rejects_other_types() {
        let err = ImageFile::new(vec![1], "application/pdf").validate().unwrap_err();
        assert!(matches!(err, ImageStoreError::UnsupportedType(_)));

        let err = ImageFile::new(vec![1], "image/svg+xml").validate().unwrap_err();
        assert!(matches!(err, ImageStoreError::UnsupportedType(_)));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(ImageFile::new(vec![0; MAX_FILE_SIZE], "image/jpeg")
            .validate()
            .is_ok());

        let err = ImageFile::new(vec![0; MAX_FILE_SIZE + 1], "image/jpeg")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ImageStoreError::TooLarge(_)));
    }

    #[test]
    fn test_extension_from_mime() {
        assert_eq!(ImageFile::new(vec![], "image/webp").extension(), "webp");
        assert_eq!(ImageFile::new(vec![], "image/jpeg").extension(), "jpg");
    }
}
