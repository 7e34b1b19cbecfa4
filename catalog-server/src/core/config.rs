/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Working directory |
/// | DATABASE_PATH | {WORK_DIR}/catalog.db | SQLite database file |
/// | HTTP_PORT | 3000 | HTTP port |
/// | IMAGES_DIR | {WORK_DIR}/images | Stored image files |
/// | PUBLIC_BASE_URL | http://localhost:{HTTP_PORT}/images | URL prefix of stored images |
/// | LOG_LEVEL | info | Log level (RUST_LOG wins) |
/// | LOG_DIR | - | Daily rolling log files when set |
/// | ENVIRONMENT | development | development / staging / production |
/// | MAX_UPLOAD_BYTES | 5242880 | Largest accepted image |
///
/// ```ignore
/// WORK_DIR=/data/catalog HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub database_path: String,
    pub http_port: u16,
    pub images_dir: String,
    pub public_base_url: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// development | staging | production
    pub environment: String,
    pub max_upload_bytes: usize,
}

/// 5 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

fn env_or(key: &str, default: impl FnOnce() -> String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = env_or("WORK_DIR", || "./data".into());
        let http_port = env_parse("HTTP_PORT", 3000u16);
        Self {
            database_path: env_or("DATABASE_PATH", || format!("{work_dir}/catalog.db")),
            images_dir: env_or("IMAGES_DIR", || format!("{work_dir}/images")),
            public_base_url: env_or("PUBLIC_BASE_URL", || {
                format!("http://localhost:{http_port}/images")
            }),
            log_level: env_or("LOG_LEVEL", || "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|v| !v.trim().is_empty()),
            environment: env_or("ENVIRONMENT", || "development".into()),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            work_dir,
            http_port,
        }
    }

    /// Override the directories and port; paths derived from the work dir follow it.
    ///
    /// Mostly used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let work_dir = work_dir.into();
        Self {
            database_path: format!("{work_dir}/catalog.db"),
            images_dir: format!("{work_dir}/images"),
            public_base_url: format!("http://localhost:{http_port}/images"),
            work_dir,
            http_port,
            ..Self::from_env()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
