use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppResult, Validator},
    models::{Review, ReviewWithAuthor},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReviewRequest {
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
}

impl SubmitReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .check((1..=5).contains(&self.rating), "rating must be between 1 and 5")
            .finish()
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<ReviewWithAuthor>)]
    pub items: Vec<ReviewWithAuthor>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MyReview {
    pub review: Option<Review>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_one_to_five() {
        for rating in 1..=5 {
            let req = SubmitReviewRequest { rating, comment: String::new() };
            assert!(req.validate().is_ok());
        }
        for rating in [0, 6, -1] {
            let req = SubmitReviewRequest { rating, comment: String::new() };
            assert!(req.validate().is_err());
        }
    }
}
