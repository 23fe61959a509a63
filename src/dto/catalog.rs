use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppResult, Validator},
    models::{Category, InfluencerCard, InfluencerProfile, ProductSummary, User},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .check(!self.name.trim().is_empty(), "name is required")
            .check(self.name.trim().len() <= 100, "name must be at most 100 characters")
            .finish()
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomeFeed {
    pub categories: Vec<Category>,
    pub influencers: Vec<InfluencerCard>,
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub query: String,
    pub influencers: Vec<InfluencerCard>,
    pub products: Vec<ProductSummary>,
    pub categories: Vec<Category>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct InfluencerList {
    #[schema(value_type = Vec<InfluencerCard>)]
    pub items: Vec<InfluencerCard>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InfluencerDetail {
    pub influencer: User,
    pub profile: Option<InfluencerProfile>,
    pub categories: Vec<Category>,
    pub selected_category: String,
    pub products: Vec<ProductSummary>,
    pub products_count: usize,
}
