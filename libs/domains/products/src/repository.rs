use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{NewProduct, Product, ProductChanges};

/// Repository trait for Product persistence
///
/// Every read joins the owner's public fields.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: NewProduct) -> ProductResult<Product>;

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// One page ordered by `created_at` descending, plus the total match
    /// count. `search` matches name or description, case-insensitively,
    /// with `%` and `_` taken literally.
    async fn query(
        &self,
        skip: u64,
        take: u64,
        search: Option<String>,
    ) -> ProductResult<(Vec<Product>, u64)>;

    /// Returns `false` if no row has this id.
    async fn update_fields(&self, id: Uuid, changes: ProductChanges) -> ProductResult<bool>;

    /// Returns `false` if no row has this id.
    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }
}

fn matches_search(product: &Product, term: &str) -> bool {
    product.name.to_lowercase().contains(term)
        || product
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(term))
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, new: NewProduct) -> ProductResult<Product> {
        let product = Product {
            id: new.id,
            name: new.name,
            price: new.price,
            description: new.description,
            images: new.images,
            user_id: new.owner.id,
            user: new.owner,
            created_at: new.created_at,
            updated_at: new.created_at,
        };

        self.products
            .write()
            .await
            .insert(product.id, product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn query(
        &self,
        skip: u64,
        take: u64,
        search: Option<String>,
    ) -> ProductResult<(Vec<Product>, u64)> {
        let products = self.products.read().await;
        let term = search.map(|s| s.to_lowercase());

        let mut matched: Vec<&Product> = products
            .values()
            .filter(|p| term.as_deref().is_none_or(|t| matches_search(p, t)))
            .collect();

        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(skip as usize)
            .take(take as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn update_fields(&self, id: Uuid, changes: ProductChanges) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let Some(product) = products.get_mut(&id) else {
            return Ok(false);
        };

        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(description) = changes.description {
            product.description = Some(description);
        }
        if let Some(images) = changes.images {
            product.images = images;
        }
        product.updated_at = Utc::now();

        tracing::info!(product_id = %id, "Updated product");
        Ok(true)
    }

    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool> {
        let removed = self.products.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(removed)
    }
}
