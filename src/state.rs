use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_pool, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let orm = orm_from_pool(&pool);
        Self {
            pool,
            orm,
            config: Arc::new(config),
        }
    }

    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let pool = create_pool(&config.database_url, config.db_max_connections).await?;
        Ok(Self::new(pool, config))
    }
}
