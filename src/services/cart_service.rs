use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartItemDto, CartList},
    error::{AppError, AppResult, Validator},
    middleware::auth::AuthUser,
    models::{CartItem, Product},
    reporting::{MAX_QUANTITY, checked_total, line_total},
    response::{ApiResponse, Empty, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartWithProductRow {
    cart_id: Uuid,
    quantity: i32,
    #[sqlx(flatten)]
    product: Product,
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity,
               p.id, p.influencer_id, p.category_id, p.name, p.description,
               p.price, p.stock, p.image_url, p.is_active, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let cart_total = checked_total(rows.iter().map(|row| (row.product.price, row.quantity)))
        .ok_or_else(cart_too_large)?;
    let items = rows
        .into_iter()
        .map(|row| {
            let total =
                line_total(row.product.price, row.quantity).ok_or_else(cart_too_large)?;
            Ok(CartItemDto {
                id: row.cart_id,
                line_total: total,
                product: row.product,
                quantity: row.quantity,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("OK", CartList { items, cart_total }, Some(meta)))
}

pub(crate) fn cart_too_large() -> AppError {
    AppError::BadRequest("cart total is too large".to_string())
}

/// Missing products are a 404, inactive ones cannot be bought.
pub(crate) async fn ensure_purchasable(pool: &DbPool, product_id: Uuid) -> AppResult<()> {
    let product: Option<(bool,)> = sqlx::query_as("SELECT is_active FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_optional(pool)
        .await?;
    match product {
        None => Err(AppError::NotFound),
        Some((false,)) => Err(AppError::BadRequest("product is not available".to_string())),
        Some((true,)) => Ok(()),
    }
}

/// Adds the product or, when it is already in the cart, replaces its quantity.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    Validator::new()
        .check(payload.quantity > 0, "quantity must be greater than 0")
        .check(
            payload.quantity <= MAX_QUANTITY,
            format!("quantity must be at most {MAX_QUANTITY}"),
        )
        .finish()?;
    ensure_purchasable(&state.pool, payload.product_id).await?;

    let cart_item = sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
        RETURNING id, product_id, user_id, quantity, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .bind(payload.quantity)
    .fetch_one(&state.pool)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity }),
    )
    .await;

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Empty>> {
    let result = sqlx::query("DELETE FROM cart_items WHERE product_id = $1 AND user_id = $2")
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
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::done("Removed from cart"))
}
