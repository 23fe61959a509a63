use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::videos::{LinkProductsRequest, UploadVideoRequest, VideoCounters, VideoList},
    entity::{
        influencer_videos::{
            ActiveModel as VideoActive, Column as VideoCol, Entity as Videos, Model as VideoModel,
        },
        products::{Column as ProductCol, Entity as Products},
        video_products::{ActiveModel as LinkActive, Column as LinkCol, Entity as VideoProducts},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_influencer},
    models::Video,
    response::{ApiResponse, Empty, Meta},
    state::AppState,
};

/// Keeps only the ids of products owned by `influencer_id`, preserving request order.
async fn owned_product_ids<C: ConnectionTrait>(
    conn: &C,
    influencer_id: Uuid,
    requested: &[Uuid],
) -> AppResult<Vec<Uuid>> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }
    let owned: Vec<Uuid> = Products::find()
        .select_only()
        .column(ProductCol::Id)
        .filter(ProductCol::InfluencerId.eq(influencer_id))
        .filter(ProductCol::Id.is_in(requested.iter().copied()))
        .into_tuple::<Uuid>()
        .all(conn)
        .await?;

    let mut ids = Vec::with_capacity(owned.len());
    for id in requested {
        if owned.contains(id) && !ids.contains(id) {
            ids.push(*id);
        }
    }
    Ok(ids)
}

async fn link_products<C: ConnectionTrait>(
    conn: &C,
    video_id: Uuid,
    product_ids: &[Uuid],
) -> AppResult<()> {
    if product_ids.is_empty() {
        return Ok(());
    }
    let links = product_ids.iter().map(|product_id| LinkActive {
        video_id: Set(video_id),
        product_id: Set(*product_id),
    });
    VideoProducts::insert_many(links)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Attaches linked product ids to each video.
async fn with_products<C: ConnectionTrait>(
    conn: &C,
    videos: Vec<VideoModel>,
) -> AppResult<Vec<Video>> {
    if videos.is_empty() {
        return Ok(Vec::new());
    }
    let video_ids: Vec<Uuid> = videos.iter().map(|v| v.id).collect();
    let links = VideoProducts::find()
        .filter(LinkCol::VideoId.is_in(video_ids))
        .all(conn)
        .await?;

    let mut by_video: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in links {
        by_video.entry(link.video_id).or_default().push(link.product_id);
    }

    Ok(videos
        .into_iter()
        .map(|video| {
            let product_ids = by_video.remove(&video.id).unwrap_or_default();
            Video::from_entity(video, product_ids)
        })
        .collect())
}

pub(crate) async fn active_videos_of(
    state: &AppState,
    influencer_id: Uuid,
) -> AppResult<Vec<Video>> {
    let videos = Videos::find()
        .filter(VideoCol::InfluencerId.eq(influencer_id))
        .filter(VideoCol::IsActive.eq(true))
        .order_by_desc(VideoCol::CreatedAt)
        .all(&state.orm)
        .await?;
    with_products(&state.orm, videos).await
}

pub async fn upload_video(
    state: &AppState,
    user: &AuthUser,
    payload: UploadVideoRequest,
) -> AppResult<ApiResponse<Video>> {
    ensure_influencer(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let video = VideoActive {
        id: Set(Uuid::new_v4()),
        influencer_id: Set(user.user_id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        video_url: Set(payload.video_url.trim().to_string()),
        thumbnail_url: Set(payload.thumbnail_url.filter(|u| !u.trim().is_empty())),
        likes: Set(0),
        views: Set(0),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let product_ids = owned_product_ids(&txn, user.user_id, &payload.product_ids).await?;
    link_products(&txn, video.id, &product_ids).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "video_upload",
        "influencer_videos",
        serde_json::json!({ "video_id": video.id, "linked_products": product_ids.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Video uploaded",
        Video::from_entity(video, product_ids),
        Some(Meta::empty()),
    ))
}

pub async fn list_my_videos(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<VideoList>> {
    ensure_influencer(user)?;
    let items = active_videos_of(state, user.user_id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Videos", VideoList { items }, Some(meta)))
}

pub async fn list_influencer_videos(
    state: &AppState,
    influencer_id: Uuid,
) -> AppResult<ApiResponse<VideoList>> {
    let items = active_videos_of(state, influencer_id).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Videos", VideoList { items }, Some(meta)))
}

async fn find_owned_video<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    video_id: Uuid,
) -> AppResult<VideoModel> {
    Videos::find_by_id(video_id)
        .filter(VideoCol::InfluencerId.eq(user.user_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn set_video_products(
    state: &AppState,
    user: &AuthUser,
    video_id: Uuid,
    payload: LinkProductsRequest,
) -> AppResult<ApiResponse<Video>> {
    ensure_influencer(user)?;

    let txn = state.orm.begin().await?;
    let video = find_owned_video(&txn, user, video_id).await?;
    let product_ids = owned_product_ids(&txn, user.user_id, &payload.product_ids).await?;

    VideoProducts::delete_many()
        .filter(LinkCol::VideoId.eq(video.id))
        .exec(&txn)
        .await?;
    link_products(&txn, video.id, &product_ids).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "video_link_products",
        "video_products",
        serde_json::json!({ "video_id": video.id, "product_ids": product_ids }),
    )
    .await;

    Ok(ApiResponse::success(
        "Video products updated",
        Video::from_entity(video, product_ids),
        Some(Meta::empty()),
    ))
}

pub async fn deactivate_video(
    state: &AppState,
    user: &AuthUser,
    video_id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    ensure_influencer(user)?;
    let video = find_owned_video(&state.orm, user, video_id).await?;

    let mut active: VideoActive = video.into();
    active.is_active = Set(false);
    active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "video_deactivate",
        "influencer_videos",
        serde_json::json!({ "video_id": video_id }),
    )
    .await;

    Ok(ApiResponse::done("Video removed"))
}

/// Atomically bumps a counter column on an active video and returns the new values.
async fn bump(state: &AppState, video_id: Uuid, column: VideoCol) -> AppResult<VideoCounters> {
    let result = Videos::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .filter(VideoCol::Id.eq(video_id))
        .filter(VideoCol::IsActive.eq(true))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let video = Videos::find_by_id(video_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(VideoCounters {
        id: video.id,
        likes: video.likes,
        views: video.views,
    })
}

pub async fn record_view(
    state: &AppState,
    video_id: Uuid,
) -> AppResult<ApiResponse<VideoCounters>> {
    let counters = bump(state, video_id, VideoCol::Views).await?;
    Ok(ApiResponse::success("View recorded", counters, None))
}

pub async fn like_video(
    state: &AppState,
    user: &AuthUser,
    video_id: Uuid,
) -> AppResult<ApiResponse<VideoCounters>> {
    let counters = bump(state, video_id, VideoCol::Likes).await?;
    tracing::debug!(user_id = %user.user_id, %video_id, likes = counters.likes, "video liked");
    Ok(ApiResponse::success("Liked", counters, None))
}
