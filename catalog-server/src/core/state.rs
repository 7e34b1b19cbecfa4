//! Server State
//!
//! Everything a handler needs, cheap to clone.

use std::sync::Arc;

use crate::core::{Config, Result};
use crate::db::DbService;
use crate::services::{CatalogService, ImageStore, LocalImageStore};

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub catalog: CatalogService,
}

impl ServerState {
    /// Open the database, prepare the image directory and wire the services
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        std::fs::create_dir_all(&config.images_dir)?;
        if let Some(parent) = std::path::Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = DbService::new(&config.database_path).await?;
        let store = LocalImageStore::new(
            &config.images_dir,
            &config.public_base_url,
            config.max_upload_bytes,
        );
        Ok(Self::with_parts(config.clone(), db, Arc::new(store)))
    }

    /// State over an in-memory database, used by tests
    pub async fn in_memory(config: Config, image_store: Arc<dyn ImageStore>) -> Result<Self> {
        let db = DbService::in_memory().await?;
        Ok(Self::with_parts(config, db, image_store))
    }

    fn with_parts(config: Config, db: DbService, image_store: Arc<dyn ImageStore>) -> Self {
        let catalog = CatalogService::new(db.pool.clone(), image_store);
        Self {
            config,
            db,
            catalog,
        }
    }
}
