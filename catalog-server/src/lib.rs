//! Catalog Server - product catalog backend
//!
//! Category hierarchy, brands, products and product images over SQLite,
//! exposed through a small JSON API.
//!
//! # Modules
//!
//! ```text
//! catalog-server/src/
//! ├── core/          # config, state, errors, HTTP server
//! ├── catalog/       # hierarchy + image consistency engines
//! ├── services/      # catalog service, image store
//! ├── api/           # HTTP routes and handlers
//! ├── utils/         # error bridging, logging, validation
//! └── db/            # pool, migrations, repositories
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use services::{CatalogService, ImageStore, LocalImageStore};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and start logging; returns the resolved configuration
pub fn setup_environment() -> Config {
    // .env is optional
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}

pub fn print_banner() {
    println!(
        r#"
   ______      __        __
  / ____/___ _/ /_____ _/ /___  ____ _
 / /   / __ `/ __/ __ `/ / __ \/ __ `/
/ /___/ /_/ / /_/ /_/ / / /_/ / /_/ /
\____/\__,_/\__/\__,_/_/\____/\__, /
                             /____/
    "#
    );
}
