//! Image Store
//!
//! Object storage behind product images. The catalog only persists the URL
//! an upload returns; files are named by content hash.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tokio::fs;

use crate::utils::{AppError, AppResult, ErrorCode};

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Storage collaborator used by the catalog service
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes`; `path_hint` supplies the file extension. Returns the public URL.
    async fn upload(&self, bytes: &[u8], path_hint: &str) -> AppResult<String>;

    /// Remove a stored file. `Ok(false)` when nothing was there.
    async fn delete(&self, path: &str) -> AppResult<bool>;

    fn public_url(&self, path: &str) -> String;

    /// Storage path for a URL this store produced, `None` for external URLs
    fn path_from_url(&self, url: &str) -> Option<String>;
}

/// Calculate SHA256 hash of data
fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Lower-cased extension of `path_hint` if it is a supported image format
fn image_extension(path_hint: &str) -> AppResult<String> {
    let ext = std::path::Path::new(path_hint)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let is_image = mime_guess::from_ext(&ext)
        .first()
        .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE);

    if !is_image || !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!(
                "Unsupported image format '{ext}', expected one of: {}",
                SUPPORTED_FORMATS.join(", ")
            ),
        ));
    }
    Ok(ext)
}

/// Files on local disk, served under `base_url`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    /// Images directory: {work_dir}/images/
    root: PathBuf,
    base_url: String,
    max_bytes: usize,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    /// Only bare file names are accepted as storage paths
    fn file_path(&self, path: &str) -> Option<PathBuf> {
        let is_plain = !path.is_empty()
            && !path.contains(['/', '\\'])
            && path != "."
            && path != "..";
        is_plain.then(|| self.root.join(path))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn upload(&self, bytes: &[u8], path_hint: &str) -> AppResult<String> {
        if bytes.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyFile));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File too large: {} bytes (max {} bytes)",
                    bytes.len(),
                    self.max_bytes
                ),
            ));
        }
        let ext = image_extension(path_hint)?;

        let file_name = format!("{}.{ext}", calculate_hash(bytes));
        let file_path = self.root.join(&file_name);

        if fs::try_exists(&file_path).await.unwrap_or(false) {
            tracing::debug!(file = %file_name, "Image already stored, reusing file");
        } else {
            fs::create_dir_all(&self.root).await.map_err(|e| {
                AppError::with_message(
                    ErrorCode::FileStorageFailed,
                    format!("Failed to create images dir: {e}"),
                )
            })?;
            fs::write(&file_path, bytes).await.map_err(|e| {
                AppError::with_message(
                    ErrorCode::FileStorageFailed,
                    format!("Failed to save image: {e}"),
                )
            })?;
            tracing::info!(file = %file_name, size = bytes.len(), "Image stored");
        }

        Ok(self.public_url(&file_name))
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let Some(file_path) = self.file_path(path) else {
            return Err(AppError::validation(format!("Invalid image path: {path}")));
        };
        match fs::remove_file(&file_path).await {
            Ok(()) => {
                tracing::info!(file = %path, "Image file deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_message(
                ErrorCode::FileStorageFailed,
                format!("Failed to delete image {path}: {e}"),
            )),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        let rest = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        self.file_path(rest).map(|_| rest.to_string())
    }
}
