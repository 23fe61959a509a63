use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppResult, Validator},
    models::{InfluencerProfile, User},
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    pub photo_url: Option<String>,
    pub featured: Option<bool>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .check(
                self.phone.as_ref().is_none_or(|p| p.len() <= 15),
                "phone must be at most 15 characters",
            )
            .check(
                self.full_name.as_ref().is_none_or(|n| n.len() <= 255),
                "full_name must be at most 255 characters",
            )
            .finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileView {
    pub user: User,
    pub profile: InfluencerProfile,
}
