#![allow(dead_code)]

use influencer_storefront::{
    config::AppConfig,
    db::run_migrations,
    dto::products::CreateProductRequest,
    entity::users::ActiveModel as UserActive,
    middleware::auth::AuthUser,
    models::{Product, Role},
    services::product_service,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

/// Connects to the test database, or returns `None` so the caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(None);
        }
    };

    let state = AppState::connect(AppConfig::for_database(database_url)).await?;
    run_migrations(&state.orm).await?;
    Ok(Some(state))
}

/// Short random suffix so tests never collide on unique columns.
pub fn suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

pub async fn create_user(state: &AppState, role: Role) -> anyhow::Result<AuthUser> {
    let name = format!("{}-{}", role.as_str(), suffix());
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(name.clone()),
        email: Set(format!("{name}@example.com")),
        password_hash: Set("dummy".into()),
        role: Set(role),
        full_name: Set(None),
        phone: Set(None),
        is_active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role,
    })
}

pub async fn create_product(
    state: &AppState,
    owner: &AuthUser,
    name: &str,
    price: i64,
    stock: i32,
    category_id: Option<Uuid>,
) -> anyhow::Result<Product> {
    let resp = product_service::create_product(
        state,
        owner,
        CreateProductRequest {
            name: name.to_string(),
            description: format!("{name} for testing"),
            price,
            stock,
            category_id,
            image_url: None,
            is_active: None,
        },
    )
    .await?;
    Ok(resp.data.expect("created product"))
}

pub async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i32> {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(stock)
}
