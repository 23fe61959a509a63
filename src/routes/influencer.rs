//! Routes an influencer uses to run their own storefront. Every handler here
//! rejects non-influencer callers with 403.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        dashboard::{InfluencerDashboard, SoldProductsQuery, SoldProductsReport},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        profile::{ProfileView, UpdateProfileRequest},
        videos::{LinkProductsRequest, UploadVideoRequest, VideoList},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Product, Video},
    response::{ApiResponse, Empty},
    routes::params::MyProductsQuery,
    services::{dashboard_service, product_service, profile_service, video_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/products", get(list_my_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/videos", get(list_my_videos).post(upload_video))
        .route("/videos/{id}", delete(deactivate_video))
        .route("/videos/{id}/products", put(set_video_products))
        .route("/sold-products", get(sold_products))
}

#[utoipa::path(
    get,
    path = "/api/influencer/dashboard",
    responses(
        (status = 200, description = "Sales summary, top products, videos and products", body = ApiResponse<InfluencerDashboard>),
        (status = 403, description = "Caller is not an influencer")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InfluencerDashboard>>> {
    let resp = dashboard_service::influencer_dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/influencer/profile",
    responses(
        (status = 200, description = "Own profile, created on first access", body = ApiResponse<ProfileView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = profile_service::get_my_profile(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/influencer/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ApiResponse<ProfileView>),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<ProfileView>>> {
    let resp = profile_service::update_my_profile(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/influencer/products",
    params(
        ("status" = Option<String>, Query, description = "`all`, `active` or `inactive`")
    ),
    responses(
        (status = 200, description = "Own products", body = ApiResponse<ProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn list_my_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MyProductsQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_my_products(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/influencer/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Create product", body = ApiResponse<Product>),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/influencer/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found or not owned")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/influencer/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Deleted product", body = ApiResponse<Empty>),
        (status = 404, description = "Product not found or not owned")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/influencer/videos",
    responses(
        (status = 200, description = "Own active videos", body = ApiResponse<VideoList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn list_my_videos(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<VideoList>>> {
    let resp = video_service::list_my_videos(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/influencer/videos",
    request_body = UploadVideoRequest,
    responses(
        (status = 200, description = "Uploaded video with its linked products", body = ApiResponse<Video>),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UploadVideoRequest>,
) -> AppResult<Json<ApiResponse<Video>>> {
    let resp = video_service::upload_video(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/influencer/videos/{id}/products",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = LinkProductsRequest,
    responses(
        (status = 200, description = "Video with replaced product links", body = ApiResponse<Video>),
        (status = 404, description = "Video not found or not owned")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn set_video_products(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LinkProductsRequest>,
) -> AppResult<Json<ApiResponse<Video>>> {
    let resp = video_service::set_video_products(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/influencer/videos/{id}",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video hidden from listings", body = ApiResponse<Empty>),
        (status = 404, description = "Video not found or not owned")
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn deactivate_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let resp = video_service::deactivate_video(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/influencer/sold-products",
    params(
        ("filter_type" = Option<String>, Query, description = "`month` or `product`"),
        ("filter_value" = Option<String>, Query, description = "`MM-YYYY` or a product ID")
    ),
    responses(
        (status = 200, description = "Sold items with revenue stats", body = ApiResponse<SoldProductsReport>)
    ),
    security(("bearer_auth" = [])),
    tag = "Influencer"
)]
pub async fn sold_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SoldProductsQuery>,
) -> AppResult<Json<ApiResponse<SoldProductsReport>>> {
    let resp = dashboard_service::sold_products(&state, &user, query).await?;
    Ok(Json(resp))
}
