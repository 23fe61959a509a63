use sea_orm::{ActiveModelTrait, Set};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::catalog::{CategoryList, CreateCategoryRequest, HomeFeed},
    entity::categories::ActiveModel as CategoryActive,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer, ensure_influencer},
    models::{Category, ProductSummary},
    response::{ApiResponse, Meta},
    services::{PRODUCT_SUMMARY_SELECT, all_categories, profile_service::influencer_cards},
    state::AppState,
};

const FEED_SIZE: i64 = 12;

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = all_categories(&state.pool).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_influencer(user)?;
    payload.validate()?;
    let name = payload.name.trim().to_string();

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM categories WHERE lower(name) = lower($1)")
            .bind(name.as_str())
            .fetch_optional(&state.pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest(format!("Category {name} already exists")));
    }

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.clone()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::on_unique_violation(err, format!("Category {name} already exists")))?;

    audit::record(
        &state.pool,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

async fn feed_products(state: &AppState, in_stock_only: bool) -> AppResult<Vec<ProductSummary>> {
    let sql = format!(
        "{PRODUCT_SUMMARY_SELECT} WHERE ($1 = FALSE OR p.stock > 0) \
         ORDER BY p.created_at DESC LIMIT $2"
    );
    let products = sqlx::query_as::<_, ProductSummary>(&sql)
        .bind(in_stock_only)
        .bind(FEED_SIZE)
        .fetch_all(&state.pool)
        .await?;
    Ok(products)
}

pub async fn home(state: &AppState) -> AppResult<ApiResponse<HomeFeed>> {
    let feed = HomeFeed {
        categories: all_categories(&state.pool).await?,
        influencers: influencer_cards(&state.pool, None).await?,
        products: feed_products(state, false).await?,
    };
    Ok(ApiResponse::success("Home", feed, None))
}

pub async fn customer_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<HomeFeed>> {
    ensure_customer(user)?;
    let feed = HomeFeed {
        categories: all_categories(&state.pool).await?,
        influencers: influencer_cards(&state.pool, None).await?,
        products: feed_products(state, true).await?,
    };
    Ok(ApiResponse::success("Customer dashboard", feed, None))
}
