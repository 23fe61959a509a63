use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems},
    entity::{
        addresses::{Column as AddressCol, Entity as Addresses},
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus},
    reporting::{MAX_QUANTITY, line_total},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service::cart_too_large,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    // Unknown statuses are ignored rather than rejected.
    if let Some(status) = query.status.as_deref().and_then(OrderStatus::parse) {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Turns the caller's cart into a pending order. Cart rows and their products are
/// locked for the whole transaction so stock cannot be oversold.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    if let Some(address_id) = payload.address_id {
        let owned = Addresses::find_by_id(address_id)
            .filter(AddressCol::UserId.eq(user.user_id))
            .one(&txn)
            .await?;
        if owned.is_none() {
            return Err(AppError::BadRequest("Address not found".into()));
        }
    }

    let cart = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .lock_exclusive()
        .all(&txn)
        .await?;

    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let products: HashMap<Uuid, _> = Products::find()
        .filter(ProdCol::Id.is_in(cart.iter().map(|row| row.product_id)))
        .order_by_asc(ProdCol::Id)
        .lock_exclusive()
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    let mut lines = Vec::with_capacity(cart.len());
    let mut total_amount: i64 = 0;
    for row in &cart {
        let product = products.get(&row.product_id).ok_or(AppError::NotFound)?;
        if !product.is_active {
            return Err(AppError::BadRequest(format!(
                "Product {} is no longer available",
                product.name
            )));
        }
        if row.quantity <= 0 || row.quantity > MAX_QUANTITY {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if product.stock < row.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {}",
                product.name
            )));
        }
        total_amount = line_total(product.price, row.quantity)
            .and_then(|line| total_amount.checked_add(line))
            .ok_or_else(cart_too_large)?;
        lines.push((product.id, row.quantity, product.price));
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        address_id: Set(payload.address_id),
        status: Set(OrderStatus::Pending),
        total_amount: Set(total_amount),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for (product_id, quantity, price) in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(Some(product_id)),
            quantity: Set(quantity),
            price: Set(price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(OrderItem::from(item));

        adjust_stock(&txn, product_id, -quantity).await?;
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, total_amount, items = order_items.len(), "order placed");
    audit::record(
        &state.pool,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total_amount": total_amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: Order::from(order),
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

/// Applies `delta` to a product's stock in place.
async fn adjust_stock<C: ConnectionTrait>(conn: &C, product_id: Uuid, delta: i32) -> AppResult<()> {
    Products::update_many()
        .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).add(delta))
        .filter(ProdCol::Id.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn find_owned_order<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: Uuid,
    lock: bool,
) -> AppResult<OrderModel> {
    let mut finder = Orders::find().filter(
        Condition::all()
            .add(OrderCol::UserId.eq(user.user_id))
            .add(OrderCol::Id.eq(id)),
    );
    if lock {
        finder = finder.lock_exclusive();
    }
    finder.one(conn).await?.ok_or(AppError::NotFound)
}

async fn items_of<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = find_owned_order(&state.orm, user, id, false).await?;
    let items = items_of(&state.orm, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Cancels a pending order and puts its quantities back into stock.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;
    let order = find_owned_order(&txn, user, id, true).await?;

    if order.status != OrderStatus::Pending {
        return Err(AppError::BadRequest(
            "Only pending orders can be canceled".into(),
        ));
    }

    let items = items_of(&txn, order.id).await?;
    for item in &items {
        if let Some(product_id) = item.product_id {
            adjust_stock(&txn, product_id, item.quantity).await?;
        }
    }

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Canceled);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order canceled",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}
