use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::videos::VideoCounters,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::video_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/view", post(record_view))
        .route("/{id}/like", post(like_video))
}

#[utoipa::path(
    post,
    path = "/api/videos/{id}/view",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Updated counters", body = ApiResponse<VideoCounters>),
        (status = 404, description = "Video not found")
    ),
    tag = "Videos"
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VideoCounters>>> {
    let resp = video_service::record_view(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/videos/{id}/like",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Updated counters", body = ApiResponse<VideoCounters>),
        (status = 404, description = "Video not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Videos"
)]
pub async fn like_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<VideoCounters>>> {
    let resp = video_service::like_video(&state, &user, id).await?;
    Ok(Json(resp))
}
