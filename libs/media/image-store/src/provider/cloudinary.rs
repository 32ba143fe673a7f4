//! Cloudinary upload API.
//!
//! Uses signed uploads: the request parameters (minus `file` and `api_key`)
//! are sorted, joined as `k=v&k=v`, suffixed with the API secret and hashed
//! with SHA-1.

use super::ImageStore;
use crate::error::{ImageStoreError, ImageStoreResult};
use crate::file::ImageFile;
use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_required};
use regex::Regex;
use reqwest::{Client, multipart};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, warn};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Bounded to 800x600, automatic quality and format.
pub const UPLOAD_TRANSFORMATION: &str = "c_limit,w_800,h_600/q_auto/f_auto";

static PUBLIC_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/v\d+/(.+?)(?:\.[^./]+)?$").expect("public id pattern is valid")
});

/// `.../v<digits>/<folder>/<name>.<ext>` → `<folder>/<name>`.
pub fn cloudinary_public_id(url: &str) -> Option<String> {
    if !url.contains("cloudinary.com") {
        return None;
    }

    PUBLIC_ID_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
}

/// - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`
///   (required)
/// - `CLOUDINARY_FOLDER` (default `products`)
/// - `CLOUDINARY_API_BASE` (default `https://api.cloudinary.com/v1_1`)
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .field("folder", &self.folder)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl FromEnv for CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cloud_name: env_required("CLOUDINARY_CLOUD_NAME")?,
            api_key: env_required("CLOUDINARY_API_KEY")?,
            api_secret: env_required("CLOUDINARY_API_SECRET")?,
            folder: env_or_default("CLOUDINARY_FOLDER", "products"),
            api_base: env_or_default("CLOUDINARY_API_BASE", DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct CloudinaryImageStore {
    config: CloudinaryConfig,
    client: Client,
}

impl CloudinaryImageStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(CloudinaryConfig::from_env()?))
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/{}/image/{}",
            self.config.api_base, self.config.cloud_name, action
        )
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        sign_params(params, &self.config.api_secret)
    }

    async fn error_detail(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => format!("{}: {}", status, parsed.error.message),
            Err(_) => format!("{}: {}", status, body),
        }
    }
}

fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// SHA-1 over the sorted `k=v` pairs joined with `&`, followed by the secret.
pub(crate) fn sign_params(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    const_hex::encode(hasher.finalize())
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn put(&self, file: ImageFile) -> ImageStoreResult<String> {
        let timestamp = unix_timestamp();
        let signature = self.sign(&[
            ("folder", &self.config.folder),
            ("timestamp", &timestamp),
            ("transformation", UPLOAD_TRANSFORMATION),
        ]);

        let size = file.size();
        let file_name = file
            .file_name
            .clone()
            .unwrap_or_else(|| format!("upload.{}", file.extension()));
        let part = multipart::Part::bytes(file.bytes)
            .file_name(file_name)
            .mime_str(&file.content_type)
            .map_err(|e| ImageStoreError::Upload(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("transformation", UPLOAD_TRANSFORMATION)
            .text("signature", signature);

        debug!(size, folder = %self.config.folder, "Uploading image to Cloudinary");

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Cloudinary upload request failed");
                ImageStoreError::Upload(e.to_string())
            })?;

        if !response.status().is_success() {
            let detail = Self::error_detail(response).await;
            error!(error = %detail, "Cloudinary rejected upload");
            return Err(ImageStoreError::Upload(detail));
        }

        let body: UploadResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Unexpected Cloudinary upload response");
            ImageStoreError::Upload(e.to_string())
        })?;

        Ok(body.secure_url)
    }

    async fn delete(&self, public_id: &str) -> ImageStoreResult<()> {
        let timestamp = unix_timestamp();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let form = multipart::Form::new()
            .text("public_id", public_id.to_string())
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageStoreError::Delete(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageStoreError::Delete(Self::error_detail(response).await));
        }

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| ImageStoreError::Delete(e.to_string()))?;

        match body.result.as_str() {
            "ok" => Ok(()),
            "not found" => {
                warn!(public_id, "Image already absent from Cloudinary");
                Ok(())
            }
            other => Err(ImageStoreError::Delete(other.to_string())),
        }
    }

    fn public_id(&self, url: &str) -> Option<String> {
        cloudinary_public_id(url)
    }

    async fn health_check(&self) -> ImageStoreResult<()> {
        if self.config.cloud_name.is_empty() || self.config.api_secret.is_empty() {
            return Err(ImageStoreError::Upload(
                "Cloudinary credentials not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_id_strips_version_and_extension() {
        assert_eq!(
            cloudinary_public_id(
                "https://res.cloudinary.com/demo/image/upload/v1234567890/products/abc123.jpg"
            )
            .as_deref(),
            Some("products/abc123")
        );
    }

    #[test]
    fn test_public_id_after_transformation_segment() {
        assert_eq!(
            cloudinary_public_id(
                "https://res.cloudinary.com/demo/image/upload/c_limit,w_800/v42/shop/items/lamp.webp"
            )
            .as_deref(),
            Some("shop/items/lamp")
        );
    }

    #[test]
    fn test_public_id_without_extension() {
        assert_eq!(
            cloudinary_public_id("https://res.cloudinary.com/demo/image/upload/v1/products/abc")
                .as_deref(),
            Some("products/abc")
        );
    }

    #[test]
    fn test_public_id_rejects_foreign_urls() {
        assert_eq!(
            cloudinary_public_id("https://example.com/image/upload/v1/products/abc.jpg"),
            None
        );
        assert_eq!(cloudinary_public_id("not a url"), None);
        assert_eq!(
            cloudinary_public_id("https://res.cloudinary.com/demo/image/upload/products/abc.jpg"),
            None
        );
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = sign_params(&[("timestamp", "1315060510"), ("public_id", "sample")], "secret");
        let b = sign_params(&[("public_id", "sample"), ("timestamp", "1315060510")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_signature_matches_documented_example() {
        // sha1("eager=w_400,h_300,c_pad|w_260,h_200,c_crop&public_id=sample_image&timestamp=1315060510abcd")
        let signature = sign_params(
            &[
                ("timestamp", "1315060510"),
                ("public_id", "sample_image"),
                ("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop"),
            ],
            "abcd",
        );
        assert_eq!(signature, "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("CLOUDINARY_CLOUD_NAME", Some("demo")),
                ("CLOUDINARY_API_KEY", Some("key")),
                ("CLOUDINARY_API_SECRET", Some("secret")),
                ("CLOUDINARY_FOLDER", None),
                ("CLOUDINARY_API_BASE", Some("http://localhost:9000/v1_1/")),
            ],
            || {
                let config = CloudinaryConfig::from_env().unwrap();
                assert_eq!(config.folder, "products");
                assert_eq!(config.api_base, "http://localhost:9000/v1_1");
                assert!(!format!("{:?}", config).contains("\"secret\""));

                let store = CloudinaryImageStore::new(config);
                assert_eq!(
                    store.endpoint("upload"),
                    "http://localhost:9000/v1_1/demo/image/upload"
                );
            },
        );
    }

    #[test]
    fn test_config_requires_credentials() {
        temp_env::with_var_unset("CLOUDINARY_API_SECRET", || {
            temp_env::with_vars(
                [
                    ("CLOUDINARY_CLOUD_NAME", Some("demo")),
                    ("CLOUDINARY_API_KEY", Some("key")),
                ],
                || {
                    let err = CloudinaryConfig::from_env().unwrap_err();
                    assert!(err.to_string().contains("CLOUDINARY_API_SECRET"));
                },
            );
        });
    }
}
