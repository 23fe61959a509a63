use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::catalog::{CategoryList, CreateCategoryRequest, HomeFeed, SearchResults},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::SearchQuery,
    services::{catalog_service, search_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/home", get(home))
        .route("/dashboard/customer", get(customer_dashboard))
        .route("/search", get(search))
        .route("/categories", get(list_categories).post(create_category))
}

#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Categories, influencers and latest products", body = ApiResponse<HomeFeed>)
    ),
    tag = "Catalog"
)]
pub async fn home(State(state): State<AppState>) -> AppResult<Json<ApiResponse<HomeFeed>>> {
    let resp = catalog_service::home(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/customer",
    responses(
        (status = 200, description = "Customer landing page", body = ApiResponse<HomeFeed>),
        (status = 403, description = "Caller is not a customer")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn customer_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<HomeFeed>>> {
    let resp = catalog_service::customer_dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = Option<String>, Query, description = "Search term, matched as a case-insensitive substring")
    ),
    responses(
        (status = 200, description = "Matching products and influencers", body = ApiResponse<SearchResults>)
    ),
    tag = "Catalog"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SearchResults>>> {
    let resp = search_service::search(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "All categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = catalog_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Category already exists"),
        (status = 403, description = "Caller is not an influencer")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = catalog_service::create_category(&state, &user, payload).await?;
    Ok(Json(resp))
}
