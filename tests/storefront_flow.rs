mod common;

use influencer_storefront::{
    dto::{
        addresses::CreateAddressRequest,
        cart::AddToCartRequest,
        catalog::CreateCategoryRequest,
        orders::CheckoutRequest,
        reviews::SubmitReviewRequest,
        wishlist::AddWishlistRequest,
    },
    entity::{AuditLogs, audit_logs},
    error::AppError,
    models::{OrderStatus, Role},
    reporting::checked_total,
    routes::params::{OrderListQuery, ProductQuery, SearchQuery, SortOrder},
    services::{
        address_service, cart_service, catalog_service, order_service, product_service,
        review_service, search_service, wishlist_service,
    },
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{create_product, create_user, setup_state, stock_of, suffix};

fn address() -> CreateAddressRequest {
    CreateAddressRequest {
        full_name: "Asha Rao".into(),
        phone: "9876543210".into(),
        street_address: "12 MG Road".into(),
        city: "Bengaluru".into(),
        state: "Karnataka".into(),
        postal_code: "560001".into(),
    }
}

// Customer journey: browse by category, wishlist, review, cart, checkout, cancel.
#[tokio::test]
async fn browse_review_checkout_and_cancel_flow() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let influencer = create_user(&state, Role::Influencer).await?;
    let customer = create_user(&state, Role::Customer).await?;
    let stranger = create_user(&state, Role::Customer).await?;
    let tag = suffix();

    // Categories are influencer-only and unique ignoring case.
    let category_name = format!("Skincare-{tag}");
    let denied = catalog_service::create_category(
        &state,
        &customer,
        CreateCategoryRequest { name: category_name.clone() },
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let category = catalog_service::create_category(
        &state,
        &influencer,
        CreateCategoryRequest { name: category_name.clone() },
    )
    .await?
    .data
    .unwrap();
    let duplicate = catalog_service::create_category(
        &state,
        &influencer,
        CreateCategoryRequest { name: category_name.to_uppercase() },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let serum_name = format!("Serum {tag}");
    let serum =
        create_product(&state, &influencer, &serum_name, 1_500, 10, Some(category.id)).await?;
    let balm = create_product(&state, &influencer, &format!("Balm {tag}"), 250, 3, None).await?;
    let toner = create_product(&state, &influencer, &format!("Toner {tag}"), 900, 0, None).await?;

    // Category filter is case-insensitive and unknown names are a 404.
    let filtered = product_service::list_products(
        &state,
        ProductQuery {
            category: Some(category_name.to_lowercase()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    let ids: Vec<_> = filtered.items.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![serum.id]);
    assert_eq!(filtered.items[0].category_name.as_deref(), Some(category_name.as_str()));

    let unknown = product_service::list_products(
        &state,
        ProductQuery {
            category: Some(format!("missing-{tag}")),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::NotFound)));

    // Search matches the tag in product names, but never out-of-stock products.
    let found = search_service::search(&state, SearchQuery { q: Some(format!("  {tag} ")) })
        .await?
        .data
        .unwrap();
    assert_eq!(found.products.len(), 2);
    assert!(found.products.iter().all(|p| p.id != toner.id));
    let empty = search_service::search(&state, SearchQuery { q: Some("   ".into()) })
        .await?
        .data
        .unwrap();
    assert!(empty.products.is_empty() && empty.influencers.is_empty());
    assert!(!empty.categories.is_empty());

    // Wishlist adds are idempotent.
    let wish = || AddWishlistRequest { product_id: serum.id };
    let first = wishlist_service::add_to_wishlist(&state, &customer, wish()).await?.data.unwrap();
    let second = wishlist_service::add_to_wishlist(&state, &customer, wish()).await?.data.unwrap();
    assert_eq!(first.id, second.id);
    let wishlist = wishlist_service::list_wishlist(&state, &customer).await?.data.unwrap();
    assert_eq!(wishlist.items.len(), 1);

    let storefront = product_service::influencer_products(&state, &customer, influencer.user_id)
        .await?
        .data
        .unwrap();
    let serum_entry = storefront.items.iter().find(|p| p.product.id == serum.id).unwrap();
    assert!(serum_entry.in_wishlist);
    assert_eq!(serum_entry.average_rating, 0.0);

    // A second review from the same customer replaces the first.
    for rating in [4, 2] {
        review_service::submit_review(
            &state,
            &customer,
            serum.id,
            SubmitReviewRequest { rating, comment: format!("rated {rating}") },
        )
        .await?;
    }
    let reviews = review_service::list_reviews(&state, serum.id).await?.data.unwrap();
    assert_eq!(reviews.items.len(), 1);
    assert_eq!(reviews.items[0].rating, 2);
    let detail = product_service::product_detail(&state, serum.id).await?.data.unwrap();
    assert_eq!(detail.review_count, 1);
    assert_eq!(detail.average_rating, 2.0);
    let mine = review_service::get_my_review(&state, &stranger, serum.id).await?.data.unwrap();
    assert!(mine.review.is_none());

    // Re-adding a product replaces its quantity.
    for (product_id, quantity) in [(serum.id, 2), (serum.id, 3), (balm.id, 1)] {
        let line = AddToCartRequest { product_id, quantity };
        cart_service::add_to_cart(&state, &customer, line).await?;
    }
    let cart = cart_service::list_cart(&state, &customer).await?.data.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.cart_total, 1_500 * 3 + 250);

    // Someone else's address is rejected and the cart survives the rollback.
    let foreign =
        address_service::create_address(&state, &stranger, address()).await?.data.unwrap();
    let rejected = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest { address_id: Some(foreign.id) },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));
    assert_eq!(cart_service::list_cart(&state, &customer).await?.data.unwrap().items.len(), 2);

    let own = address_service::create_address(&state, &customer, address()).await?.data.unwrap();
    let placed = order_service::checkout(
        &state,
        &customer,
        CheckoutRequest { address_id: Some(own.id) },
    )
    .await?
    .data
    .unwrap();
    let line_sum = checked_total(placed.items.iter().map(|item| (item.price, item.quantity)));
    assert_eq!(placed.order.total_amount, 4_750);
    assert_eq!(Some(placed.order.total_amount), line_sum);
    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.address_id, Some(own.id));
    assert_eq!(stock_of(&state, serum.id).await?, 7);
    assert_eq!(stock_of(&state, balm.id).await?, 2);
    assert!(cart_service::list_cart(&state, &customer).await?.data.unwrap().items.is_empty());

    let actions: Vec<String> = AuditLogs::find()
        .filter(audit_logs::Column::UserId.eq(customer.user_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|log| log.action)
        .collect();
    for expected in ["wishlist_add", "review_submit", "cart_update", "address_create", "checkout"] {
        assert!(actions.iter().any(|a| a == expected), "missing audit entry {expected}");
    }

    let again = order_service::checkout(&state, &customer, CheckoutRequest::default()).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    // Orders are private to their owner.
    let peek = order_service::get_order(&state, &stranger, placed.order.id).await;
    assert!(matches!(peek, Err(AppError::NotFound)));

    let canceled = order_service::cancel_order(&state, &customer, placed.order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(canceled.order.status, OrderStatus::Canceled);
    assert_eq!(stock_of(&state, serum.id).await?, 10);
    assert_eq!(stock_of(&state, balm.id).await?, 3);
    let twice = order_service::cancel_order(&state, &customer, placed.order.id).await;
    assert!(matches!(twice, Err(AppError::BadRequest(_))));

    // Asking for more than is in stock fails without touching stock.
    let too_many = AddToCartRequest { product_id: balm.id, quantity: 5 };
    cart_service::add_to_cart(&state, &customer, too_many).await?;
    let short = order_service::checkout(&state, &customer, CheckoutRequest::default()).await;
    assert!(matches!(short, Err(AppError::BadRequest(_))));
    assert_eq!(stock_of(&state, balm.id).await?, 3);

    let removed = cart_service::remove_from_cart(&state, &customer, balm.id).await;
    assert!(removed.is_ok());
    let missing = cart_service::remove_from_cart(&state, &customer, balm.id).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    Ok(())
}

#[tokio::test]
async fn order_history_filters_by_status_and_pages() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let influencer = create_user(&state, Role::Influencer).await?;
    let customer = create_user(&state, Role::Customer).await?;
    let name = format!("Mug {}", suffix());
    let mug = create_product(&state, &influencer, &name, 400, 20, None).await?;

    let mut placed = Vec::new();
    for quantity in [1, 2, 3] {
        let line = AddToCartRequest { product_id: mug.id, quantity };
        cart_service::add_to_cart(&state, &customer, line).await?;
        let order = order_service::checkout(&state, &customer, CheckoutRequest::default())
            .await?
            .data
            .unwrap();
        placed.push(order.order.id);
    }
    order_service::cancel_order(&state, &customer, placed[1]).await?;

    let orders = |query: OrderListQuery| order_service::list_orders(&state, &customer, query);
    let by_status = |status: &str| OrderListQuery {
        status: Some(status.to_string()),
        ..Default::default()
    };

    let pending = orders(by_status("pending")).await?.data.unwrap();
    assert_eq!(pending.items.len(), 2);
    assert!(pending.items.iter().all(|o| o.status == OrderStatus::Pending));
    let canceled = orders(by_status("Cancelled")).await?.data.unwrap();
    assert_eq!(canceled.items.iter().map(|o| o.id).collect::<Vec<_>>(), vec![placed[1]]);
    // Unknown statuses do not filter.
    assert_eq!(orders(by_status("lost")).await?.data.unwrap().items.len(), 3);

    let first_page = orders(OrderListQuery {
        page: Some(1),
        per_page: Some(2),
        sort_order: Some(SortOrder::Asc),
        ..Default::default()
    })
    .await?;
    let meta = first_page.meta.unwrap();
    assert_eq!((meta.page, meta.per_page, meta.total), (Some(1), Some(2), Some(3)));
    let ids: Vec<_> = first_page.data.unwrap().items.iter().map(|o| o.id).collect();
    assert_eq!(ids, placed[..2]);

    let second_page = orders(OrderListQuery {
        page: Some(2),
        per_page: Some(2),
        sort_order: Some(SortOrder::Asc),
        ..Default::default()
    })
    .await?
    .data
    .unwrap();
    assert_eq!(second_page.items.iter().map(|o| o.id).collect::<Vec<_>>(), vec![placed[2]]);

    let newest_first = orders(OrderListQuery::default()).await?.data.unwrap();
    assert_eq!(newest_first.items[0].id, placed[2]);

    let far_away = orders(OrderListQuery { page: Some(i64::MAX), ..Default::default() })
        .await?
        .data
        .unwrap();
    assert!(far_away.items.is_empty());

    Ok(())
}
