use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Product, Video};

#[derive(Debug, Serialize, ToSchema, sqlx::FromRow)]
pub struct TopProduct {
    pub id: Uuid,
    pub name: String,
    pub category_name: Option<String>,
    pub total_sales: i64,
    pub total_revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InfluencerDashboard {
    pub total_revenue: i64,
    pub total_orders: i64,
    pub monthly_revenue: i64,
    pub monthly_orders: i64,
    pub top_products: Vec<TopProduct>,
    pub videos: Vec<Video>,
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SoldProductsQuery {
    /// `month` or `product`.
    pub filter_type: Option<String>,
    /// `MM-YYYY` for month, a product id for product.
    pub filter_value: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SoldProductRow {
    pub order_id: Uuid,
    pub customer_name: String,
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub price: i64,
    pub total: String,
    pub date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueStats {
    pub monthly_revenue: String,
    pub weekly_revenue: String,
    pub daily_revenue: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SoldProductsReport {
    pub sold_products: Vec<SoldProductRow>,
    pub stats: RevenueStats,
    pub influencer_products: Vec<Product>,
    pub filter_type: String,
    pub filter_value: String,
    /// Whether the requested filter was understood and applied.
    pub filter_applied: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopProductsQuery {
    pub limit: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct TopProductList {
    #[schema(value_type = Vec<TopProduct>)]
    pub items: Vec<TopProduct>,
}
