use std::sync::Arc;

use crate::auth::repo::UserRepo;
use crate::config::AppConfig;
use crate::db::{self, PgStore};
use crate::students::repo::StudentRepo;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub students: Arc<dyn StudentRepo>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.db).await?;
        db::migrate(&pool).await?;
        tracing::info!("database schema ready");

        let store = Arc::new(PgStore::new(pool));
        Ok(Self::from_parts(
            Arc::new(config),
            store.clone() as Arc<dyn UserRepo>,
            store as Arc<dyn StudentRepo>,
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        students: Arc<dyn StudentRepo>,
    ) -> Self {
        Self {
            config,
            users,
            students,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by an in-memory store.
    pub fn fake() -> Self {
        Self::fake_with(AppConfig::for_tests())
    }

    pub fn fake_with(config: AppConfig) -> Self {
        let store = Arc::new(db::memory::MemoryStore::default());
        Self::from_parts(
            Arc::new(config),
            store.clone() as Arc<dyn UserRepo>,
            store as Arc<dyn StudentRepo>,
        )
    }
}
