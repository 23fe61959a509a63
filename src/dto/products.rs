use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppResult, Validator},
    models::{Product, ProductSummary, ReviewWithAuthor},
    reporting::MAX_PRICE,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .check(!self.name.trim().is_empty(), "name is required")
            .check(self.name.len() <= 200, "name must be at most 200 characters")
            .check(self.price >= 0, "price must not be negative")
            .check(self.price <= MAX_PRICE, "price is too large")
            .check(self.stock >= 0, "stock must not be negative")
            .finish()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    /// Detaches the product from its category.
    #[serde(default)]
    pub clear_category: bool,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .check(
                self.name.as_ref().is_none_or(|n| !n.trim().is_empty()),
                "name must not be empty",
            )
            .check(
                self.name.as_ref().is_none_or(|n| n.len() <= 200),
                "name must be at most 200 characters",
            )
            .check(self.price.is_none_or(|p| p >= 0), "price must not be negative")
            .check(self.price.is_none_or(|p| p <= MAX_PRICE), "price is too large")
            .check(self.stock.is_none_or(|s| s >= 0), "stock must not be negative")
            .check(
                !(self.clear_category && self.category_id.is_some()),
                "category_id cannot be combined with clear_category",
            )
            .finish()
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductSummaryList {
    #[schema(value_type = Vec<ProductSummary>)]
    pub items: Vec<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: ProductSummary,
    pub reviews: Vec<ReviewWithAuthor>,
    pub average_rating: f64,
    pub review_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RatedProduct {
    pub product: Product,
    pub average_rating: f64,
    pub in_wishlist: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InfluencerProducts {
    pub influencer_id: Uuid,
    pub username: String,
    pub items: Vec<RatedProduct>,
}
