use influencer_storefront::{
    config::AppConfig,
    db::{DbPool, run_migrations},
    services::auth_service::hash_password,
    state::AppState,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let state = AppState::connect(AppConfig::for_database(database_url)).await?;
    run_migrations(&state.orm).await?;
    let pool = &state.pool;

    let influencer_id = ensure_user(
        pool,
        "maya",
        "maya@example.com",
        "influencer123",
        "influencer",
        "Maya Sen",
    )
    .await?;
    let customer_id = ensure_user(
        pool,
        "ravi",
        "ravi@example.com",
        "customer123",
        "customer",
        "Ravi Kumar",
    )
    .await?;
    ensure_profile(pool, influencer_id).await?;

    for name in ["Beauty", "Fashion", "Fitness", "Home"] {
        sqlx::query(
            "INSERT INTO categories (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .execute(pool)
        .await?;
    }

    let product_ids = seed_products(pool, influencer_id).await?;
    seed_video(pool, influencer_id, &product_ids).await?;

    println!("Seed completed. Influencer ID: {influencer_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
    full_name: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, full_name)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(full_name)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn ensure_profile(pool: &DbPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO influencer_profiles (id, user_id, bio, featured)
        VALUES ($1, $2, 'Skincare routines and slow fashion.', TRUE)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn seed_products(pool: &DbPool, influencer_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let products = [
        ("Vitamin C Serum", "Brightening daily serum", "Beauty", 89_900_i64, 40),
        ("Linen Shirt", "Breathable summer shirt", "Fashion", 149_900, 25),
        ("Yoga Mat", "6mm non-slip mat", "Fitness", 119_900, 60),
        ("Soy Candle", "Hand-poured, sandalwood", "Home", 45_000, 0),
    ];

    let mut ids = Vec::with_capacity(products.len());
    for (name, description, category, price, stock) in products {
        let existing: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE influencer_id = $1 AND name = $2")
                .bind(influencer_id)
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if let Some((id,)) = existing {
            ids.push(id);
            continue;
        }

        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO products (id, influencer_id, category_id, name, description, price, stock)
            VALUES ($1, $2, (SELECT id FROM categories WHERE name = $3), $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(influencer_id)
        .bind(category)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(stock)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }

    println!("Seeded products");
    Ok(ids)
}

async fn seed_video(
    pool: &DbPool,
    influencer_id: Uuid,
    product_ids: &[Uuid],
) -> anyhow::Result<()> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM influencer_videos WHERE influencer_id = $1 LIMIT 1")
            .bind(influencer_id)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Ok(());
    }

    let (video_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO influencer_videos (id, influencer_id, title, description, video_url)
        VALUES ($1, $2, 'Morning routine', 'Everything I use before 8am',
                'https://videos.example.com/morning.mp4')
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(influencer_id)
    .fetch_one(pool)
    .await?;

    for product_id in product_ids.iter().take(2) {
        sqlx::query(
            "INSERT INTO video_products (video_id, product_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(video_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    }
    Ok(())
}
