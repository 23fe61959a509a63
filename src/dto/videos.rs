use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppResult, Validator},
    models::Video,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

impl UploadVideoRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .check(!self.title.trim().is_empty(), "title is required")
            .check(self.title.len() <= 200, "title must be at most 200 characters")
            .check(!self.video_url.trim().is_empty(), "video_url is required")
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkProductsRequest {
    pub product_ids: Vec<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct VideoList {
    #[schema(value_type = Vec<Video>)]
    pub items: Vec<Video>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoCounters {
    pub id: Uuid,
    pub likes: i32,
    pub views: i32,
}
