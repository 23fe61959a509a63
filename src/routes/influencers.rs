use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        catalog::{InfluencerDetail, InfluencerList},
        products::InfluencerProducts,
        videos::VideoList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::{CategoryFilter, InfluencerListQuery},
    services::{product_service, profile_service, video_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_influencers))
        .route("/{id}", get(influencer_detail))
        .route("/{id}/products", get(influencer_products))
        .route("/{id}/videos", get(influencer_videos))
}

#[utoipa::path(
    get,
    path = "/api/influencers",
    params(
        ("featured" = Option<bool>, Query, description = "Only featured (true) or non-featured (false) influencers")
    ),
    responses(
        (status = 200, description = "Active influencers, featured first", body = ApiResponse<InfluencerList>)
    ),
    tag = "Influencers"
)]
pub async fn list_influencers(
    State(state): State<AppState>,
    Query(query): Query<InfluencerListQuery>,
) -> AppResult<Json<ApiResponse<InfluencerList>>> {
    let resp = profile_service::list_influencers(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/influencers/{id}",
    params(
        ("id" = Uuid, Path, description = "Influencer user ID"),
        ("category" = Option<String>, Query, description = "Category name; `All` shows everything")
    ),
    responses(
        (status = 200, description = "Influencer storefront", body = ApiResponse<InfluencerDetail>),
        (status = 404, description = "Influencer or category not found")
    ),
    tag = "Influencers"
)]
pub async fn influencer_detail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(filter): Query<CategoryFilter>,
) -> AppResult<Json<ApiResponse<InfluencerDetail>>> {
    let resp = profile_service::influencer_detail(&state, id, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/influencers/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Influencer user ID")
    ),
    responses(
        (status = 200, description = "Products with rating and wishlist flag", body = ApiResponse<InfluencerProducts>),
        (status = 404, description = "Influencer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencers"
)]
pub async fn influencer_products(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InfluencerProducts>>> {
    let resp = product_service::influencer_products(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/influencers/{id}/videos",
    params(
        ("id" = Uuid, Path, description = "Influencer user ID")
    ),
    responses(
        (status = 200, description = "Active videos, newest first", body = ApiResponse<VideoList>)
    ),
    tag = "Influencers"
)]
pub async fn influencer_videos(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VideoList>>> {
    let resp = video_service::list_influencer_videos(&state, id).await?;
    Ok(Json(resp))
}
