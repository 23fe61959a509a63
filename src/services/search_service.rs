use crate::{
    dto::catalog::SearchResults,
    error::AppResult,
    models::{InfluencerCard, ProductSummary},
    response::ApiResponse,
    routes::params::SearchQuery,
    services::{PRODUCT_SUMMARY_SELECT, all_categories, contains_pattern},
    state::AppState,
};

pub async fn search(state: &AppState, query: SearchQuery) -> AppResult<ApiResponse<SearchResults>> {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default().to_string();
    let categories = all_categories(&state.pool).await?;

    if term.is_empty() {
        return Ok(ApiResponse::success(
            "Search",
            SearchResults {
                query: term,
                influencers: Vec::new(),
                products: Vec::new(),
                categories,
            },
            None,
        ));
    }

    let pattern = contains_pattern(&term);

    let sql = format!(
        "{PRODUCT_SUMMARY_SELECT} WHERE p.stock > 0 AND ( \
             p.name ILIKE $1 OR p.description ILIKE $1 \
             OR c.name ILIKE $1 OR u.username ILIKE $1) \
         ORDER BY p.created_at DESC"
    );
    let products = sqlx::query_as::<_, ProductSummary>(&sql)
        .bind(pattern.as_str())
        .fetch_all(&state.pool)
        .await?;

    let influencers = sqlx::query_as::<_, InfluencerCard>(
        r#"
        SELECT u.id AS user_id, u.username, u.full_name,
               ip.id AS profile_id, ip.photo_url, ip.bio,
               COALESCE(ip.featured, FALSE) AS featured
        FROM users u
        LEFT JOIN influencer_profiles ip ON ip.user_id = u.id
        WHERE u.role = 'influencer' AND u.is_active
          AND (u.username ILIKE $1 OR u.full_name ILIKE $1 OR ip.bio ILIKE $1)
        ORDER BY u.username ASC
        "#,
    )
    .bind(pattern.as_str())
    .fetch_all(&state.pool)
    .await?;

    tracing::debug!(
        query = %term,
        products = products.len(),
        influencers = influencers.len(),
        "search"
    );

    Ok(ApiResponse::success(
        "Search",
        SearchResults {
            query: term,
            influencers,
            products,
            categories,
        },
        None,
    ))
}
