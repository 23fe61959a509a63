use uuid::Uuid;

use crate::{
    audit,
    dto::wishlist::{AddWishlistRequest, WishlistProductList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, WishlistItem},
    response::{ApiResponse, Empty, Meta},
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<WishlistProductList>> {
    let items = sqlx::query_as::<_, Product>(
        r#"
        SELECT p.id, p.influencer_id, p.category_id, p.name, p.description,
               p.price, p.stock, p.image_url, p.is_active, p.created_at
        FROM wishlist_items w
        JOIN products p ON p.id = w.product_id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", WishlistProductList { items }, Some(meta)))
}

/// Adding a product twice returns the entry created the first time.
pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(&state.pool)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO wishlist_items (id, user_id, product_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .execute(&state.pool)
    .await?
    .rows_affected();

    let item = sqlx::query_as::<_, WishlistItem>(
        "SELECT id, product_id, user_id, created_at FROM wishlist_items \
         WHERE user_id = $1 AND product_id = $2",
    )
    .bind(user.user_id)
    .bind(payload.product_id)
    .fetch_one(&state.pool)
    .await?;

    if inserted > 0 {
        audit::record(
            &state.pool,
            user.user_id,
            "wishlist_add",
            "wishlist_items",
            serde_json::json!({ "product_id": payload.product_id }),
        )
        .await;
    }

    let message = if inserted > 0 { "Added to wishlist" } else { "Already in wishlist" };
    Ok(ApiResponse::success(message, item, None))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    let result = sqlx::query("DELETE FROM wishlist_items WHERE product_id = $1 AND user_id = $2")
        .bind(product_id)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "wishlist_remove",
        "wishlist_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::done("Removed from wishlist"))
}
