use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::dashboard::{TopProductList, TopProductsQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/top-products", get(top_products))
}

#[utoipa::path(
    get,
    path = "/api/reports/top-products",
    params(
        ("limit" = Option<i64>, Query, description = "Maximum rows; omit for every product with sales")
    ),
    responses(
        (status = 200, description = "Products ranked by units sold", body = ApiResponse<TopProductList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn top_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<TopProductsQuery>,
) -> AppResult<Json<ApiResponse<TopProductList>>> {
    let resp = dashboard_service::top_products(&state, query).await?;
    Ok(Json(resp))
}
