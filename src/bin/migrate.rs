use influencer_storefront::{config::AppConfig, db::run_migrations, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let state = AppState::connect(AppConfig::for_database(database_url)).await?;
    run_migrations(&state.orm).await?;
    println!("Migrations applied");
    Ok(())
}
