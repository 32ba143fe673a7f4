//! Product Service - Business logic layer

use futures::future::join_all;
use image_store::{ImageFile, ImageStore};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_IMAGES, MAX_LIMIT, NewProduct,
    PaginatedProducts, Product, ProductChanges, ProductOwner, ProductQuery, UpdateProduct,
    UpdateProductForm,
};
use crate::repository::ProductRepository;

const UPDATE_FORBIDDEN: &str = "You can only update your own products";
const DELETE_FORBIDDEN: &str = "You can only delete your own products";
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Product service providing business logic operations
///
/// Ownership is enforced here: only the user who created a product may
/// change or delete it. Image uploads go through the [`ImageStore`] and are
/// checked against the per-product cap before anything is sent.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    images: Arc<dyn ImageStore>,
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            images: Arc::clone(&self.images),
        }
    }
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R, images: Arc<dyn ImageStore>) -> Self {
        Self {
            repository: Arc::new(repository),
            images,
        }
    }

    /// Create a product owned by `owner`
    #[instrument(skip(self, input), fields(product_name = %input.name, owner_id = %owner.id))]
    pub async fn create(&self, input: CreateProduct, owner: ProductOwner) -> ProductResult<Product> {
        input.validate()?;
        if input.images.len() > MAX_IMAGES {
            return Err(too_many_images());
        }

        self.repository.insert(NewProduct::new(input, owner)).await
    }

    /// Upload `files` and create a product whose images are the
    /// client-supplied URLs followed by the uploaded ones.
    #[instrument(skip(self, input, files), fields(files = files.len(), owner_id = %owner.id))]
    pub async fn create_with_images(
        &self,
        mut input: CreateProduct,
        files: Vec<ImageFile>,
        owner: ProductOwner,
    ) -> ProductResult<Product> {
        input.validate()?;
        if input.images.len() + files.len() > MAX_IMAGES {
            return Err(too_many_images());
        }

        if files.is_empty() {
            return self.create(input, owner).await;
        }

        let uploaded = self.images.upload_many(files).await?;
        input.images.extend(uploaded.iter().cloned());

        match self.create(input, owner).await {
            Ok(product) => Ok(product),
            Err(err) => {
                tracing::warn!(error = %err, "Product insert failed, discarding uploaded images");
                self.discard_images(&uploaded).await;
                Err(err)
            }
        }
    }

    /// List products, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, query: ProductQuery) -> ProductResult<PaginatedProducts> {
        let page = parse_positive(query.page.as_deref(), "page", DEFAULT_PAGE)?;
        let limit = parse_positive(query.limit.as_deref(), "limit", DEFAULT_LIMIT)?;
        if limit > MAX_LIMIT {
            return Err(ProductError::InvalidQuery(format!(
                "limit must not exceed {MAX_LIMIT}"
            )));
        }

        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        // Past the end of any real table; Postgres rejects offsets above i64::MAX.
        let skip = (page - 1).saturating_mul(limit).min(MAX_OFFSET);

        let (items, total) = self.repository.query(skip, limit, search).await?;

        Ok(PaginatedProducts {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_one(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Partial update. Absent `images` keeps the stored list.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProduct,
        requester: Uuid,
    ) -> ProductResult<Product> {
        self.owned(id, requester, UPDATE_FORBIDDEN).await?;

        input.validate()?;
        if input.images.as_ref().is_some_and(|i| i.len() > MAX_IMAGES) {
            return Err(too_many_images());
        }

        self.apply(id, input.into()).await
    }

    /// Update from a multipart form. The final image list is the kept
    /// `existingImages` followed by the uploaded files; with neither
    /// present the stored images are left alone.
    #[instrument(skip(self, form, files), fields(files = files.len()))]
    pub async fn update_with_images(
        &self,
        id: Uuid,
        form: UpdateProductForm,
        files: Vec<ImageFile>,
        requester: Uuid,
    ) -> ProductResult<Product> {
        self.owned(id, requester, UPDATE_FORBIDDEN).await?;

        let (input, existing) = form.into_parts()?;
        input.validate()?;

        let total = existing.as_ref().map_or(0, Vec::len) + files.len();
        if total > MAX_IMAGES {
            return Err(ProductError::TooManyImages(format!(
                "Total image count ({total}) exceeds maximum of {MAX_IMAGES} images per product"
            )));
        }

        let uploaded = if files.is_empty() {
            Vec::new()
        } else {
            self.images.upload_many(files).await?
        };

        let images = match existing {
            Some(mut kept) => {
                kept.extend(uploaded.iter().cloned());
                Some(kept)
            }
            None if !uploaded.is_empty() => Some(uploaded.clone()),
            None => None,
        };

        let mut changes = ProductChanges::from(input);
        changes.images = images;

        match self.apply(id, changes).await {
            Ok(product) => Ok(product),
            Err(err) => {
                tracing::warn!(error = %err, "Product update failed, discarding uploaded images");
                self.discard_images(&uploaded).await;
                Err(err)
            }
        }
    }

    /// Fails with `NotFound` or `Forbidden` unless `requester` owns the product.
    ///
    /// Handlers call this before reading the request body so a non-owner is
    /// refused regardless of what they sent.
    pub async fn authorize_update(&self, id: Uuid, requester: Uuid) -> ProductResult<()> {
        self.owned(id, requester, UPDATE_FORBIDDEN).await.map(|_| ())
    }

    /// Delete a product and, best-effort, its stored images
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid, requester: Uuid) -> ProductResult<()> {
        let product = self.owned(id, requester, DELETE_FORBIDDEN).await?;

        self.discard_images(&product.images).await;

        if !self.repository.delete_by_id(id).await? {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    async fn owned(
        &self,
        id: Uuid,
        requester: Uuid,
        forbidden: &'static str,
    ) -> ProductResult<Product> {
        let product = self.get_one(id).await?;
        if product.user_id != requester {
            tracing::warn!(product_id = %id, requester = %requester, "Ownership check failed");
            return Err(ProductError::Forbidden(forbidden));
        }
        Ok(product)
    }

    async fn apply(&self, id: Uuid, changes: ProductChanges) -> ProductResult<Product> {
        if !self.repository.update_fields(id, changes).await? {
            return Err(ProductError::NotFound(id));
        }
        self.get_one(id).await
    }

    /// Deletes every URL the store recognises. Failures are logged only.
    async fn discard_images(&self, urls: &[String]) {
        let public_ids: Vec<String> = urls
            .iter()
            .filter_map(|url| self.images.public_id(url))
            .collect();

        let results = join_all(public_ids.iter().map(|id| self.images.delete(id))).await;

        for (public_id, result) in public_ids.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(public_id = %public_id, error = %e, "Failed to delete image");
            }
        }
    }
}

fn too_many_images() -> ProductError {
    ProductError::TooManyImages(format!(
        "Maximum {MAX_IMAGES} images are allowed per product"
    ))
}

fn parse_positive(raw: Option<&str>, field: &str, default: u64) -> ProductResult<u64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ProductError::InvalidQuery(format!("{field} must be a positive integer"))),
    }
}
