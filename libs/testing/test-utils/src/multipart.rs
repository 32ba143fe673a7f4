//! `multipart/form-data` bodies for handler tests.

const BOUNDARY: &str = "----test-utils-boundary-7MA4YWxkTrZu0gW";

/// Builds a `multipart/form-data` body.
///
/// ```
/// use test_utils::MultipartBody;
///
/// let body = MultipartBody::new()
///     .text("name", "Lamp")
///     .file("images", "lamp.png", "image/png", &[0x89, b'P', b'N', b'G']);
///
/// assert!(body.content_type().starts_with("multipart/form-data; boundary="));
/// assert!(!body.into_bytes().is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(name);
        self.bytes.extend_from_slice(b"\r\n\r\n");
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.open_part(name);
        self.bytes
            .extend_from_slice(format!("; filename=\"{}\"\r\n", file_name).as_bytes());
        self.bytes
            .extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.bytes
    }

    fn open_part(&mut self, name: &str) {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"",
                BOUNDARY, name
            )
            .as_bytes(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_file_parts_are_framed() {
        let body = MultipartBody::new()
            .text("name", "Lamp")
            .file("images", "a.png", "image/png", b"PNG");
        let raw = String::from_utf8(body.into_bytes()).unwrap();

        assert!(raw.contains("name=\"name\"\r\n\r\nLamp\r\n"));
        assert!(raw.contains("name=\"images\"; filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\nPNG\r\n"));
        assert!(raw.ends_with(&format!("--{}--\r\n", BOUNDARY)));
    }
}
