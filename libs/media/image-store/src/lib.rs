//! Image storage for product photos.
//!
//! ```text
//! ┌──────────────┐   upload / upload_many / delete   ┌──────────────────────┐
//! │ ProductService│ ───────────────────────────────▶ │ dyn ImageStore        │
//! └──────────────┘                                   ├──────────────────────┤
//!                                                    │ CloudinaryImageStore │
//!                                                    │ InMemoryImageStore   │
//!                                                    └──────────────────────┘
//! ```
//!
//! Every upload is validated locally first (content type, 10 MiB limit,
//! at most 5 files per batch) so a rejected batch never reaches the
//! provider. Batches are all-or-nothing. Deletes are best-effort and the
//! caller decides whether a failure matters.
//!
//! Mapping a stored URL back to the provider's identifier depends on the
//! provider's URL layout, so it is part of the [`ImageStore`] trait rather
//! than a free function.

pub mod error;
pub mod file;
pub mod provider;

pub use error::{ImageStoreError, ImageStoreResult};
pub use file::{ALLOWED_CONTENT_TYPES, ImageFile, MAX_FILE_SIZE, MAX_FILES};
pub use provider::{
    CloudinaryConfig, CloudinaryImageStore, ImageStore, InMemoryImageStore, cloudinary_public_id,
};
