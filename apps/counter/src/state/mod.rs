//! # Application State
//!
//! Everything a command needs, owned in one place and passed explicitly.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AppState                                       │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────────┐ ┌──────────────────┐    │
//! │  │    db            │ │    shop              │ │    config        │    │
//! │  │                  │ │                      │ │                  │    │
//! │  │  • SQLite pool   │ │  • catalog  • cart   │ │  • shop name     │    │
//! │  │  • collections   │ │  • customers         │ │  • currency      │    │
//! │  │    repository    │ │  • orders            │ │  • scan timings  │    │
//! │  └──────────────────┘ └──────────────────────┘ └──────────────────┘    │
//! │                                                                         │
//! │  `shop` is loaded once when the state is opened and written back by     │
//! │  each mutating command. Nothing is shared through globals.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;

pub use config::{ConfigError, ConfigState, CONFIG_FILE_NAME, DATABASE_FILE_NAME};

use tracing::info;

use crate::error::ApiError;
use maligai_core::ShopState;
use maligai_store::seed::seed_if_empty;
use maligai_store::{CollectionRepository, Database, DbConfig};

/// Open database, in-memory shop collections and configuration.
#[derive(Debug)]
pub struct AppState {
    pub db: Database,
    pub shop: ShopState,
    pub config: ConfigState,
}

impl AppState {
    /// Opens the configured database and loads the shop.
    pub async fn open(config: ConfigState) -> Result<Self, ApiError> {
        let db_path = config.resolve_database_path()?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        Self::with_database(db, config).await
    }

    /// Loads the shop from an already opened database, seeding the sample
    /// catalog first when configured.
    pub async fn with_database(db: Database, config: ConfigState) -> Result<Self, ApiError> {
        if config.seed_sample_catalog {
            seed_if_empty(&db).await?;
        }

        let shop = db.collections().load_state().await?;
        Ok(AppState { db, shop, config })
    }

    pub fn collections(&self) -> CollectionRepository {
        self.db.collections()
    }

    /// Re-reads every collection from the database.
    pub async fn reload(&mut self) -> Result<(), ApiError> {
        self.shop = self.collections().load_state().await?;
        Ok(())
    }
}
