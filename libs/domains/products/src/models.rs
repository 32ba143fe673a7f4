use axum_helpers::CurrentUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{ProductError, ProductResult};

/// Per product, across client URLs and uploaded files.
pub const MAX_IMAGES: usize = 5;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Public projection of the owning user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&CurrentUser> for ProductOwner {
    fn from(user: &CurrentUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Product entity with its owner joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "iPhone 15 Pro")]
    pub name: String,
    #[schema(example = 999.99)]
    pub price: f64,
    pub description: Option<String>,
    /// Image URLs, at most five
    pub images: Vec<String>,
    pub user_id: Uuid,
    pub user: ProductOwner,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "iPhone 15 Pro")]
    pub name: String,
    #[validate(range(min = 0.0, max = 99_999_999.99))]
    #[schema(example = 999.99)]
    pub price: f64,
    pub description: Option<String>,
    /// Already-hosted image URLs
    #[serde(default)]
    pub images: Vec<String>,
}

/// DTO for a partial update. Absent fields are left unchanged;
/// `images: []` clears the images.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(range(min = 0.0, max = 99_999_999.99))]
    pub price: Option<f64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

/// Listing parameters. Values arrive as strings and are coerced by the
/// service.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// 1-based page number (default 1)
    #[param(example = "1")]
    pub page: Option<String>,
    /// Page size (default 10, at most 100)
    #[param(example = "10")]
    pub limit: Option<String>,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedProducts {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Row to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub owner: ProductOwner,
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    pub fn new(input: CreateProduct, owner: ProductOwner) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            price: input.price,
            description: input.description,
            images: input.images,
            owner,
            created_at: Utc::now(),
        }
    }
}

/// Columns to overwrite; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

impl From<UpdateProduct> for ProductChanges {
    fn from(update: UpdateProduct) -> Self {
        Self {
            name: update.name,
            price: update.price,
            description: update.description,
            images: update.images,
        }
    }
}

/// Text parts of the multipart create form
#[derive(Debug, Clone, Default)]
pub struct CreateProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    /// Text parts named `images`
    pub image_urls: Vec<String>,
}

impl CreateProductForm {
    pub fn into_create(self) -> ProductResult<CreateProduct> {
        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => return Err(ProductError::InvalidForm("price is required".into())),
            Some(raw) => parse_price(raw)?,
        };

        Ok(CreateProduct {
            name: self.name.unwrap_or_default(),
            price,
            description: self.description,
            images: self.image_urls,
        })
    }
}

/// Text parts of the multipart update form, kept raw until the caller is
/// known to own the product.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    /// JSON array of image URLs to keep
    pub existing_images: Option<String>,
}

impl UpdateProductForm {
    /// Returns the field changes and the parsed `existingImages` list.
    pub fn into_parts(self) -> ProductResult<(UpdateProduct, Option<Vec<String>>)> {
        let price = match self.price.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_price(raw)?),
        };

        let existing_images = self
            .existing_images
            .map(|raw| {
                serde_json::from_str::<Vec<String>>(&raw).map_err(|_| {
                    ProductError::InvalidForm(
                        "Invalid existingImages format. Must be a valid JSON array.".into(),
                    )
                })
            })
            .transpose()?;

        let changes = UpdateProduct {
            name: self.name,
            price,
            description: self.description,
            images: None,
        };

        Ok((changes, existing_images))
    }
}

fn parse_price(raw: &str) -> ProductResult<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| ProductError::InvalidForm("price must be a number".into()))
}
