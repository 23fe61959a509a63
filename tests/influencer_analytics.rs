mod common;

use chrono::{Datelike, Utc};
use influencer_storefront::{
    dto::{
        cart::AddToCartRequest,
        dashboard::{SoldProductsQuery, TopProductsQuery},
        orders::CheckoutRequest,
        products::UpdateProductRequest,
        videos::{LinkProductsRequest, UploadVideoRequest},
    },
    error::AppError,
    models::Role,
    services::{cart_service, dashboard_service, order_service, product_service, video_service},
};

use common::{create_product, create_user, setup_state, suffix};

// Influencer side: videos with product links, counters, dashboard and sales reports.
#[tokio::test]
async fn videos_dashboard_and_sales_reports() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let influencer = create_user(&state, Role::Influencer).await?;
    let rival = create_user(&state, Role::Influencer).await?;
    let customer = create_user(&state, Role::Customer).await?;
    let tag = suffix();

    let lamp = create_product(&state, &influencer, &format!("Lamp {tag}"), 1_000, 50, None).await?;
    let mat = create_product(&state, &influencer, &format!("Mat {tag}"), 300, 50, None).await?;
    let foreign = create_product(&state, &rival, &format!("Rug {tag}"), 700, 50, None).await?;

    // Only the uploader's own products get linked.
    let video = video_service::upload_video(
        &state,
        &influencer,
        UploadVideoRequest {
            title: "Desk tour".into(),
            description: String::new(),
            video_url: "https://videos.example.com/desk.mp4".into(),
            thumbnail_url: None,
            product_ids: vec![lamp.id, foreign.id],
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(video.product_ids, vec![lamp.id]);

    let relinked = video_service::set_video_products(
        &state,
        &influencer,
        video.id,
        LinkProductsRequest { product_ids: vec![foreign.id, mat.id] },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(relinked.product_ids, vec![mat.id]);

    let not_owner = video_service::set_video_products(
        &state,
        &rival,
        video.id,
        LinkProductsRequest { product_ids: vec![foreign.id] },
    )
    .await;
    assert!(matches!(not_owner, Err(AppError::NotFound)));

    video_service::record_view(&state, video.id).await?;
    let counters = video_service::record_view(&state, video.id).await?.data.unwrap();
    assert_eq!(counters.views, 2);
    let counters = video_service::like_video(&state, &customer, video.id).await?.data.unwrap();
    assert_eq!(counters.likes, 1);

    // Nothing sold yet: every figure is zero.
    let empty =
        dashboard_service::influencer_dashboard(&state, &influencer).await?.data.unwrap();
    assert_eq!(empty.total_revenue, 0);
    assert_eq!(empty.total_orders, 0);
    assert!(empty.top_products.is_empty());
    assert_eq!(empty.videos.len(), 1);
    assert_eq!(empty.products.len(), 2);

    let denied = dashboard_service::influencer_dashboard(&state, &customer).await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    for (product_id, quantity) in [(lamp.id, 2), (mat.id, 5), (foreign.id, 1)] {
        let line = AddToCartRequest { product_id, quantity };
        cart_service::add_to_cart(&state, &customer, line).await?;
    }
    order_service::checkout(&state, &customer, CheckoutRequest::default()).await?;

    // The rival's rug shares the order but not the revenue.
    let dashboard =
        dashboard_service::influencer_dashboard(&state, &influencer).await?.data.unwrap();
    assert_eq!(dashboard.total_revenue, 2 * 1_000 + 5 * 300);
    assert_eq!(dashboard.total_orders, 1);
    assert_eq!(dashboard.monthly_revenue, 3_500);
    assert_eq!(dashboard.monthly_orders, 1);
    let ranked: Vec<_> = dashboard
        .top_products
        .iter()
        .map(|p| (p.id, p.total_sales, p.total_revenue))
        .collect();
    assert_eq!(ranked, vec![(mat.id, 5, 1_500), (lamp.id, 2, 2_000)]);

    let report = dashboard_service::sold_products(
        &state,
        &influencer,
        SoldProductsQuery { filter_type: None, filter_value: None },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(report.sold_products.len(), 2);
    assert_eq!(report.stats.daily_revenue, "35.00");
    assert_eq!(report.stats.monthly_revenue, "35.00");
    assert!(!report.filter_applied);

    let by_product = dashboard_service::sold_products(
        &state,
        &influencer,
        SoldProductsQuery {
            filter_type: Some("product".into()),
            filter_value: Some(lamp.id.to_string()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(by_product.filter_applied);
    assert_eq!(by_product.sold_products.len(), 1);
    assert_eq!(by_product.sold_products[0].total, "20.00");
    assert_eq!(by_product.stats.weekly_revenue, "20.00");

    // `YYYY-MM` is not a valid month filter and is ignored.
    let malformed = dashboard_service::sold_products(
        &state,
        &influencer,
        SoldProductsQuery {
            filter_type: Some("month".into()),
            filter_value: Some("2025-03".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert!(!malformed.filter_applied);
    assert_eq!(malformed.sold_products.len(), 2);

    let top = dashboard_service::top_products(&state, TopProductsQuery { limit: None })
        .await?
        .data
        .unwrap();
    let position = |id| top.items.iter().position(|p| p.id == id);
    assert!(position(mat.id) < position(lamp.id));
    assert!(position(foreign.id).is_some());

    video_service::deactivate_video(&state, &influencer, video.id).await?;
    let listed =
        video_service::list_influencer_videos(&state, influencer.user_id).await?.data.unwrap();
    assert!(listed.items.is_empty());
    let hidden = video_service::record_view(&state, video.id).await;
    assert!(matches!(hidden, Err(AppError::NotFound)));

    Ok(())
}

fn month_filter(value: String) -> SoldProductsQuery {
    SoldProductsQuery {
        filter_type: Some("month".into()),
        filter_value: Some(value),
    }
}

#[tokio::test]
async fn month_filter_follows_order_dates() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };
    let influencer = create_user(&state, Role::Influencer).await?;
    let customer = create_user(&state, Role::Customer).await?;
    let kettle = create_product(&state, &influencer, "Kettle", 1_200, 10, None).await?;

    let mut orders = Vec::new();
    for quantity in [1, 3] {
        let line = AddToCartRequest { product_id: kettle.id, quantity };
        cart_service::add_to_cart(&state, &customer, line).await?;
        let placed = order_service::checkout(&state, &customer, CheckoutRequest::default())
            .await?
            .data
            .unwrap();
        orders.push(placed.order.id);
    }
    sqlx::query("UPDATE orders SET created_at = '2024-01-15T10:00:00Z' WHERE id = $1")
        .bind(orders[0])
        .execute(&state.pool)
        .await?;

    let january = month_filter("01-2024".into());
    let january = dashboard_service::sold_products(&state, &influencer, january)
        .await?
        .data
        .unwrap();
    assert!(january.filter_applied);
    assert_eq!(january.sold_products.len(), 1);
    assert_eq!(january.sold_products[0].order_id, orders[0]);
    assert_eq!(january.sold_products[0].date, "2024-01-15");
    // Old sales fall outside every revenue window.
    assert_eq!(january.stats.monthly_revenue, "0.00");

    let now = Utc::now();
    let current = format!("{:02}-{}", now.month(), now.year());
    let this_month = dashboard_service::sold_products(&state, &influencer, month_filter(current))
        .await?
        .data
        .unwrap();
    assert_eq!(this_month.sold_products.len(), 1);
    assert_eq!(this_month.sold_products[0].order_id, orders[1]);
    assert_eq!(this_month.sold_products[0].total, "36.00");
    assert_eq!(this_month.stats.monthly_revenue, "36.00");

    // The dashboard keeps lifetime totals but only counts this month's order monthly.
    let dashboard =
        dashboard_service::influencer_dashboard(&state, &influencer).await?.data.unwrap();
    assert_eq!(dashboard.total_revenue, 4 * 1_200);
    assert_eq!(dashboard.total_orders, 2);
    assert_eq!(dashboard.monthly_revenue, 3 * 1_200);
    assert_eq!(dashboard.monthly_orders, 1);

    // Inactive products still show up on the dashboard.
    product_service::update_product(
        &state,
        &influencer,
        kettle.id,
        UpdateProductRequest { is_active: Some(false), ..Default::default() },
    )
    .await?;
    let dashboard =
        dashboard_service::influencer_dashboard(&state, &influencer).await?.data.unwrap();
    assert_eq!(dashboard.products.len(), 1);
    assert!(!dashboard.products[0].is_active);

    Ok(())
}
