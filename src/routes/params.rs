use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

// Query strings cannot use `#[serde(flatten)]` with numeric fields, so paginated
// queries repeat `page`/`per_page` and hand out a `Pagination`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Category name, matched case-insensitively. `All` or absent lists everything.
    pub category: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination { page: self.page, per_page: self.per_page }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CategoryFilter {
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MyProductsQuery {
    /// `all`, `active` or `inactive`.
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InfluencerListQuery {
    pub featured: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination { page: self.page, per_page: self.per_page }
    }
}

/// `All`, empty and absent all mean "no category filter".
pub fn selected_category(category: Option<&str>) -> Option<&str> {
    category
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.eq_ignore_ascii_case("all"))
}
