use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        CreateProductRequest, InfluencerProducts, ProductDetail, ProductList, ProductSummaryList,
        RatedProduct, UpdateProductRequest,
    },
    entity::{
        categories::Entity as Categories,
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        users::{Column as UserCol, Entity as Users},
        wishlist_items::{Column as WishCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult, Validator},
    middleware::auth::{AuthUser, ensure_influencer},
    models::{Product, ProductSummary, ReviewWithAuthor, Role},
    response::{ApiResponse, Meta},
    routes::params::{MyProductsQuery, ProductQuery, selected_category},
    services::{PRODUCT_SUMMARY_SELECT, find_category_by_name},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductSummaryList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let category_id = match selected_category(query.category.as_deref()) {
        Some(name) => Some(find_category_by_name(&state.pool, name).await?.id),
        None => None,
    };

    let sql = format!(
        "{PRODUCT_SUMMARY_SELECT} WHERE ($1::UUID IS NULL OR p.category_id = $1) \
         ORDER BY p.created_at DESC LIMIT $2 OFFSET $3"
    );
    let items = sqlx::query_as::<_, ProductSummary>(&sql)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM products WHERE ($1::UUID IS NULL OR category_id = $1)",
    )
    .bind(category_id)
    .fetch_one(&state.pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Products",
        ProductSummaryList { items },
        Some(meta),
    ))
}

pub(crate) async fn product_summary(state: &AppState, id: Uuid) -> AppResult<ProductSummary> {
    let sql = format!("{PRODUCT_SUMMARY_SELECT} WHERE p.id = $1");
    sqlx::query_as::<_, ProductSummary>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) async fn reviews_for(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<Vec<ReviewWithAuthor>> {
    let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
        r#"
        SELECT r.id, r.product_id, r.user_id, u.username, r.rating, r.comment,
               r.created_at, r.updated_at
        FROM reviews r
        JOIN users u ON u.id = r.user_id
        WHERE r.product_id = $1
        ORDER BY r.updated_at DESC
        "#,
    )
    .bind(product_id)
    .fetch_all(&state.pool)
    .await?;
    Ok(reviews)
}

pub async fn product_detail(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = product_summary(state, id).await?;
    let reviews = reviews_for(state, id).await?;
    let review_count = reviews.len() as i64;
    let average_rating = average(reviews.iter().map(|r| r.rating));

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product,
            reviews,
            average_rating,
            review_count,
        },
        None,
    ))
}

fn average(ratings: impl Iterator<Item = i32>) -> f64 {
    let (sum, count) = ratings.fold((0i64, 0i64), |(s, c), r| (s + i64::from(r), c + 1));
    if count == 0 { 0.0 } else { sum as f64 / count as f64 }
}

pub async fn influencer_products(
    state: &AppState,
    user: &AuthUser,
    influencer_id: Uuid,
) -> AppResult<ApiResponse<InfluencerProducts>> {
    let influencer = Users::find_by_id(influencer_id)
        .filter(UserCol::Role.eq(Role::Influencer))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let products = Products::find()
        .filter(Column::InfluencerId.eq(influencer.id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?;

    let ratings: Vec<(Uuid, f64)> = sqlx::query_as(
        r#"
        SELECT r.product_id, AVG(r.rating)::FLOAT8
        FROM reviews r
        JOIN products p ON p.id = r.product_id
        WHERE p.influencer_id = $1
        GROUP BY r.product_id
        "#,
    )
    .bind(influencer.id)
    .fetch_all(&state.pool)
    .await?;
    let ratings: HashMap<Uuid, f64> = ratings.into_iter().collect();

    let wishlisted: HashSet<Uuid> = WishlistItems::find()
        .select_only()
        .column(WishCol::ProductId)
        .filter(WishCol::UserId.eq(user.user_id))
        .into_tuple::<Uuid>()
        .all(&state.orm)
        .await?
        .into_iter()
        .collect();

    let items = products
        .into_iter()
        .map(|model| RatedProduct {
            average_rating: ratings.get(&model.id).copied().unwrap_or(0.0),
            in_wishlist: wishlisted.contains(&model.id),
            product: Product::from(model),
        })
        .collect();

    Ok(ApiResponse::success(
        "Influencer products",
        InfluencerProducts {
            influencer_id: influencer.id,
            username: influencer.username,
            items,
        },
        None,
    ))
}

pub async fn list_my_products(
    state: &AppState,
    user: &AuthUser,
    query: MyProductsQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_influencer(user)?;
    let mut condition = Condition::all().add(Column::InfluencerId.eq(user.user_id));
    match query.status.as_deref().map(str::trim) {
        Some("active") => condition = condition.add(Column::IsActive.eq(true)),
        Some("inactive") => condition = condition.add(Column::IsActive.eq(false)),
        _ => {}
    }

    let items: Vec<Product> = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

async fn ensure_category_exists(state: &AppState, category_id: Option<Uuid>) -> AppResult<()> {
    if let Some(id) = category_id {
        let found = Categories::find_by_id(id).one(&state.orm).await?;
        Validator::new()
            .check(found.is_some(), "category does not exist")
            .finish()?;
    }
    Ok(())
}

/// Loads a product only if `user` owns it; anything else is a 404.
pub(crate) async fn find_owned(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .filter(Column::InfluencerId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_influencer(user)?;
    payload.validate()?;
    ensure_category_exists(state, payload.category_id).await?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        influencer_id: Set(user.user_id),
        category_id: Set(payload.category_id),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        image_url: Set(payload.image_url),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_influencer(user)?;
    payload.validate()?;
    let existing = find_owned(state, user, id).await?;
    ensure_category_exists(state, payload.category_id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if payload.clear_category {
        active.category_id = Set(None);
    } else if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(Some(image_url).filter(|u| !u.trim().is_empty()));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<crate::response::Empty>> {
    ensure_influencer(user)?;
    let result = Products::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::InfluencerId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::done("Deleted"))
}
