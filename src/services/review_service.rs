use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, Set,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::reviews::{MyReview, ReviewList, SubmitReviewRequest},
    entity::{
        products::Entity as Products,
        reviews::{ActiveModel, Column, Entity as Reviews},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    services::product_service::reviews_for,
    state::AppState,
};

async fn ensure_product(state: &AppState, product_id: Uuid) -> AppResult<()> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound)
}

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ReviewList>> {
    ensure_product(state, product_id).await?;
    let items = reviews_for(state, product_id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

async fn find_review(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<Option<Review>> {
    let review = Reviews::find()
        .filter(Column::ProductId.eq(product_id))
        .filter(Column::UserId.eq(user_id))
        .one(&state.orm)
        .await?;
    Ok(review.map(Review::from))
}

pub async fn get_my_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<MyReview>> {
    ensure_product(state, product_id).await?;
    let review = find_review(state, user.user_id, product_id).await?;
    Ok(ApiResponse::success("Review", MyReview { review }, None))
}

/// One review per (product, user): a resubmission overwrites rating and comment.
pub async fn submit_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: SubmitReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;
    ensure_product(state, product_id).await?;

    let now = Utc::now().fixed_offset();
    let review = ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Reviews::insert(review)
        .on_conflict(
            OnConflict::columns([Column::ProductId, Column::UserId])
                .update_columns([Column::Rating, Column::Comment, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    let review = find_review(state, user.user_id, product_id)
        .await?
        .ok_or(AppError::NotFound)?;

    audit::record(
        &state.pool,
        user.user_id,
        "review_submit",
        "reviews",
        serde_json::json!({ "product_id": product_id, "rating": review.rating }),
    )
    .await;

    Ok(ApiResponse::success("Review saved", review, Some(Meta::empty())))
}
