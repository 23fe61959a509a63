use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::Category,
};

pub mod address_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod dashboard_service;
pub mod order_service;
pub mod product_service;
pub mod profile_service;
pub mod review_service;
pub mod search_service;
pub mod video_service;
pub mod wishlist_service;

/// Products joined with their category and owner. Callers append `WHERE`/`ORDER BY`.
pub(crate) const PRODUCT_SUMMARY_SELECT: &str = r#"
    SELECT p.id, p.name, p.description, p.price, p.stock, p.image_url, p.is_active,
           p.category_id, c.name AS category_name,
           p.influencer_id, u.username AS influencer_username,
           p.created_at
    FROM products p
    JOIN users u ON u.id = p.influencer_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

/// `ILIKE` pattern matching `term` anywhere, with LIKE wildcards in `term` escaped.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Case-insensitive exact category lookup; a missing category is a 404.
pub(crate) async fn find_category_by_name(pool: &DbPool, name: &str) -> AppResult<Category> {
    sqlx::query_as::<_, Category>(
        "SELECT id, name, created_at FROM categories WHERE lower(name) = lower($1)",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound)
}

pub(crate) async fn all_categories(pool: &DbPool) -> AppResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, created_at FROM categories ORDER BY name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(contains_pattern("mug"), "%mug%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\"), "%c:\\\\%");
    }
}
