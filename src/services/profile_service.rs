use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::OnConflict;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::{
        catalog::{InfluencerDetail, InfluencerList},
        profile::{ProfileView, UpdateProfileRequest},
    },
    entity::{
        influencer_profiles::{
            ActiveModel as ProfileActive, Column as ProfileCol, Entity as Profiles,
            Model as ProfileModel,
        },
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_influencer},
    models::{InfluencerCard, InfluencerProfile, ProductSummary, Role, User},
    response::{ApiResponse, Meta},
    routes::params::{CategoryFilter, InfluencerListQuery, selected_category},
    services::{PRODUCT_SUMMARY_SELECT, all_categories, find_category_by_name},
    state::AppState,
};

/// Fetch the profile for `user_id`, creating an empty one on first access.
pub(crate) async fn get_or_create_profile<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<ProfileModel> {
    if let Some(profile) = Profiles::find()
        .filter(ProfileCol::UserId.eq(user_id))
        .one(conn)
        .await?
    {
        return Ok(profile);
    }

    Profiles::insert(ProfileActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        photo_url: Set(None),
        bio: Set(None),
        featured: Set(false),
        created_at: NotSet,
        updated_at: NotSet,
    })
    .on_conflict(OnConflict::column(ProfileCol::UserId).do_nothing().to_owned())
    .exec_without_returning(conn)
    .await?;

    Profiles::find()
        .filter(ProfileCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

/// Active influencers with their profile, featured first.
pub(crate) async fn influencer_cards(
    pool: &DbPool,
    featured: Option<bool>,
) -> AppResult<Vec<InfluencerCard>> {
    let cards = sqlx::query_as::<_, InfluencerCard>(
        r#"
        SELECT u.id AS user_id, u.username, u.full_name,
               ip.id AS profile_id, ip.photo_url, ip.bio,
               COALESCE(ip.featured, FALSE) AS featured
        FROM users u
        LEFT JOIN influencer_profiles ip ON ip.user_id = u.id
        WHERE u.role = 'influencer'
          AND u.is_active
          AND ($1::BOOLEAN IS NULL OR COALESCE(ip.featured, FALSE) = $1)
        ORDER BY COALESCE(ip.featured, FALSE) DESC, u.username ASC
        "#,
    )
    .bind(featured)
    .fetch_all(pool)
    .await?;
    Ok(cards)
}

pub async fn get_my_profile(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProfileView>> {
    ensure_influencer(user)?;
    let account = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = get_or_create_profile(&state.orm, user.user_id).await?;

    Ok(ApiResponse::success(
        "Profile",
        ProfileView {
            user: User::from(account),
            profile: InfluencerProfile::from(profile),
        },
        None,
    ))
}

pub async fn update_my_profile(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<ProfileView>> {
    ensure_influencer(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let account = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = get_or_create_profile(&txn, user.user_id).await?;

    let mut profile_active: ProfileActive = profile.into();
    if let Some(bio) = payload.bio {
        profile_active.bio = Set(Some(bio).filter(|b| !b.trim().is_empty()));
    }
    if let Some(photo_url) = payload.photo_url {
        profile_active.photo_url = Set(Some(photo_url).filter(|p| !p.trim().is_empty()));
    }
    if let Some(featured) = payload.featured {
        profile_active.featured = Set(featured);
    }
    profile_active.updated_at = Set(Utc::now().into());
    let profile = profile_active.update(&txn).await?;

    let account = if payload.full_name.is_some() || payload.phone.is_some() {
        let mut user_active: UserActive = account.into();
        if let Some(full_name) = payload.full_name {
            user_active.full_name = Set(Some(full_name).filter(|n| !n.trim().is_empty()));
        }
        if let Some(phone) = payload.phone {
            user_active.phone = Set(Some(phone).filter(|p| !p.trim().is_empty()));
        }
        user_active.update(&txn).await?
    } else {
        account
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "profile_update",
        "influencer_profiles",
        serde_json::json!({ "profile_id": profile.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Profile updated",
        ProfileView {
            user: User::from(account),
            profile: InfluencerProfile::from(profile),
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_influencers(
    state: &AppState,
    query: InfluencerListQuery,
) -> AppResult<ApiResponse<InfluencerList>> {
    let items = influencer_cards(&state.pool, query.featured).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Influencers",
        InfluencerList { items },
        Some(meta),
    ))
}

pub async fn influencer_detail(
    state: &AppState,
    influencer_id: Uuid,
    filter: CategoryFilter,
) -> AppResult<ApiResponse<InfluencerDetail>> {
    let influencer = Users::find_by_id(influencer_id)
        .filter(UserCol::Role.eq(Role::Influencer))
        .filter(UserCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let profile = Profiles::find()
        .filter(ProfileCol::UserId.eq(influencer.id))
        .one(&state.orm)
        .await?
        .map(InfluencerProfile::from);

    let categories = all_categories(&state.pool).await?;
    let (selected, category_id) = match selected_category(filter.category.as_deref()) {
        Some(name) => {
            let category = find_category_by_name(&state.pool, name).await?;
            (category.name, Some(category.id))
        }
        None => ("All".to_string(), None),
    };

    let sql = format!(
        "{PRODUCT_SUMMARY_SELECT} WHERE p.influencer_id = $1 AND p.stock > 0 \
         AND ($2::UUID IS NULL OR p.category_id = $2) ORDER BY p.created_at DESC"
    );
    let products = sqlx::query_as::<_, ProductSummary>(&sql)
        .bind(influencer.id)
        .bind(category_id)
        .fetch_all(&state.pool)
        .await?;

    let products_count = products.len();
    Ok(ApiResponse::success(
        "Influencer",
        InfluencerDetail {
            influencer: User::from(influencer),
            profile,
            categories,
            selected_category: selected,
            products,
            products_count,
        },
        Some(Meta::total(products_count)),
    ))
}
