use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::dashboard::{
        InfluencerDashboard, RevenueStats, SoldProductRow, SoldProductsQuery, SoldProductsReport,
        TopProduct, TopProductList, TopProductsQuery,
    },
    entity::products::{Column as ProductCol, Entity as Products},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_influencer},
    models::Product,
    reporting::{RevenueWindows, SoldFilter, format_amount, line_total, start_of_month},
    response::{ApiResponse, Meta},
    services::video_service::active_videos_of,
    state::AppState,
};

const DASHBOARD_TOP_PRODUCTS: i64 = 5;

/// Revenue summed as NUMERIC and clamped so an oversized total cannot fail the query.
const REVENUE_SUM: &str =
    "LEAST(COALESCE(SUM(oi.price::NUMERIC * oi.quantity), 0), 9223372036854775807)::BIGINT";

/// Canceled orders never count as sales.
const SALES_FROM: &str = r#"
    FROM order_items oi
    JOIN orders o ON o.id = oi.order_id AND o.status <> 'canceled'
    JOIN products p ON p.id = oi.product_id
"#;

async fn revenue_and_orders(
    pool: &DbPool,
    influencer_id: Uuid,
    since: Option<DateTime<Utc>>,
) -> AppResult<(i64, i64)> {
    let sql = format!(
        "SELECT {REVENUE_SUM}, \
                COUNT(DISTINCT oi.order_id)::BIGINT \
         {SALES_FROM} \
         WHERE p.influencer_id = $1 AND ($2::TIMESTAMPTZ IS NULL OR o.created_at >= $2)"
    );
    let totals: (i64, i64) = sqlx::query_as(&sql)
        .bind(influencer_id)
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(totals)
}

/// Products ranked by units sold. `influencer_id = None` ranks the whole catalog,
/// `limit = None` returns every product with at least one sale.
async fn ranked_products(
    pool: &DbPool,
    influencer_id: Option<Uuid>,
    limit: Option<i64>,
) -> AppResult<Vec<TopProduct>> {
    let sql = format!(
        "SELECT p.id, p.name, c.name AS category_name, \
                SUM(oi.quantity)::BIGINT AS total_sales, \
                {REVENUE_SUM} AS total_revenue \
         {SALES_FROM} \
         LEFT JOIN categories c ON c.id = p.category_id \
         WHERE ($1::UUID IS NULL OR p.influencer_id = $1) \
         GROUP BY p.id, p.name, c.name \
         ORDER BY total_sales DESC, p.name ASC, p.id ASC \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, TopProduct>(&sql)
        .bind(influencer_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn influencer_dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<InfluencerDashboard>> {
    ensure_influencer(user)?;
    let (total_revenue, total_orders) = revenue_and_orders(&state.pool, user.user_id, None).await?;
    let month_start = start_of_month(Utc::now());
    let (monthly_revenue, monthly_orders) =
        revenue_and_orders(&state.pool, user.user_id, Some(month_start)).await?;

    let top_products =
        ranked_products(&state.pool, Some(user.user_id), Some(DASHBOARD_TOP_PRODUCTS)).await?;
    let videos = active_videos_of(state, user.user_id).await?;
    let products = Products::find()
        .filter(ProductCol::InfluencerId.eq(user.user_id))
        .order_by_desc(ProductCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Dashboard",
        InfluencerDashboard {
            total_revenue,
            total_orders,
            monthly_revenue,
            monthly_orders,
            top_products,
            videos,
            products,
        },
        None,
    ))
}

#[derive(Debug, FromRow)]
struct SoldLine {
    order_id: Uuid,
    customer_name: String,
    product_id: Option<Uuid>,
    product_name: Option<String>,
    quantity: i32,
    price: i64,
    created_at: DateTime<Utc>,
}

impl SoldLine {
    /// Saturates at `i64::MAX`.
    fn line_total(&self) -> i64 {
        line_total(self.price, self.quantity).unwrap_or(i64::MAX)
    }
}

fn revenue_since(lines: &[SoldLine], since: DateTime<Utc>) -> i64 {
    lines
        .iter()
        .filter(|line| line.created_at >= since)
        .map(SoldLine::line_total)
        .fold(0, i64::saturating_add)
}

fn revenue_stats(lines: &[SoldLine], windows: RevenueWindows) -> RevenueStats {
    RevenueStats {
        monthly_revenue: format_amount(revenue_since(lines, windows.monthly_since)),
        weekly_revenue: format_amount(revenue_since(lines, windows.weekly_since)),
        daily_revenue: format_amount(revenue_since(lines, windows.daily_since)),
    }
}

pub async fn sold_products(
    state: &AppState,
    user: &AuthUser,
    query: SoldProductsQuery,
) -> AppResult<ApiResponse<SoldProductsReport>> {
    ensure_influencer(user)?;
    let filter = SoldFilter::parse(query.filter_type.as_deref(), query.filter_value.as_deref());
    let (from, until, product_id) = match filter {
        Some(SoldFilter::Month { start, end }) => (Some(start), Some(end), None),
        Some(SoldFilter::Product(id)) => (None, None, Some(id)),
        None => (None, None, None),
    };

    let sql = format!(
        "SELECT oi.order_id, \
                COALESCE(NULLIF(TRIM(u.full_name), ''), u.username) AS customer_name, \
                oi.product_id, p.name AS product_name, oi.quantity, oi.price, o.created_at \
         {SALES_FROM} \
         JOIN users u ON u.id = o.user_id \
         WHERE p.influencer_id = $1 \
           AND ($2::TIMESTAMPTZ IS NULL OR o.created_at >= $2) \
           AND ($3::TIMESTAMPTZ IS NULL OR o.created_at < $3) \
           AND ($4::UUID IS NULL OR oi.product_id = $4) \
         ORDER BY o.created_at DESC, oi.id ASC"
    );
    let lines = sqlx::query_as::<_, SoldLine>(&sql)
        .bind(user.user_id)
        .bind(from)
        .bind(until)
        .bind(product_id)
        .fetch_all(&state.pool)
        .await?;

    let stats = revenue_stats(&lines, RevenueWindows::anchored_at(Utc::now()));
    let sold_products: Vec<SoldProductRow> = lines
        .into_iter()
        .map(|line| SoldProductRow {
            total: format_amount(line.line_total()),
            date: line.created_at.format("%Y-%m-%d").to_string(),
            order_id: line.order_id,
            customer_name: line.customer_name,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            price: line.price,
        })
        .collect();

    let influencer_products = Products::find()
        .filter(ProductCol::InfluencerId.eq(user.user_id))
        .order_by_asc(ProductCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::total(sold_products.len());
    Ok(ApiResponse::success(
        "Sold products",
        SoldProductsReport {
            sold_products,
            stats,
            influencer_products,
            filter_type: query.filter_type.unwrap_or_default(),
            filter_value: query.filter_value.unwrap_or_default(),
            filter_applied: filter.is_some(),
        },
        Some(meta),
    ))
}

pub async fn top_products(
    state: &AppState,
    query: TopProductsQuery,
) -> AppResult<ApiResponse<TopProductList>> {
    let limit = query.limit.filter(|limit| *limit > 0);
    let items = ranked_products(&state.pool, None, limit).await?;
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Top products", TopProductList { items }, Some(meta)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn line(price: i64, quantity: i32, created_at: DateTime<Utc>) -> SoldLine {
        SoldLine {
            order_id: Uuid::new_v4(),
            customer_name: "asha".into(),
            product_id: Some(Uuid::new_v4()),
            product_name: Some("Mug".into()),
            quantity,
            price,
            created_at,
        }
    }

    #[test]
    fn stats_multiply_price_by_quantity() {
        let now = Utc.with_ymd_and_hms(2025, 3, 18, 15, 0, 0).unwrap();
        let lines = vec![
            line(1_000, 3, Utc.with_ymd_and_hms(2025, 3, 18, 9, 0, 0).unwrap()),
            line(2_500, 2, Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()),
            line(10_000, 1, Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap()),
            line(99_900, 1, Utc.with_ymd_and_hms(2025, 2, 27, 9, 0, 0).unwrap()),
        ];
        let stats = revenue_stats(&lines, RevenueWindows::anchored_at(now));
        assert_eq!(stats.daily_revenue, "30.00");
        assert_eq!(stats.weekly_revenue, "80.00");
        assert_eq!(stats.monthly_revenue, "180.00");
    }

    #[test]
    fn oversized_lines_saturate_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2025, 3, 18, 15, 0, 0).unwrap();
        let sold_at = Utc.with_ymd_and_hms(2025, 3, 18, 9, 0, 0).unwrap();
        let big = line(i64::MAX / 2 + 1, 2, sold_at);
        assert_eq!(big.line_total(), i64::MAX);

        let lines = vec![big, line(1_000, 1, sold_at)];
        assert_eq!(revenue_since(&lines, now - chrono::Duration::days(1)), i64::MAX);
        let stats = revenue_stats(&lines, RevenueWindows::anchored_at(now));
        assert_eq!(stats.daily_revenue, format_amount(i64::MAX));
    }

    #[test]
    fn empty_windows_are_zero() {
        let now = Utc.with_ymd_and_hms(2025, 3, 18, 15, 0, 0).unwrap();
        let stats = revenue_stats(&[], RevenueWindows::anchored_at(now));
        assert_eq!(stats.daily_revenue, "0.00");
        assert_eq!(stats.weekly_revenue, "0.00");
        assert_eq!(stats.monthly_revenue, "0.00");
    }
}
