//! Local uploads directory for product image files.
//!
//! Files live in `<uploads_dir>/products/` and are referenced from the database
//! by their public path `/uploads/products/<filename>`, never by the absolute
//! filesystem path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Public path prefix under which product images are served.
pub const PUBLIC_PREFIX: &str = "/uploads/products/";

/// A file written to the uploads directory for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
}

impl StoredFile {
    /// Public url stored in `product_images.url`.
    pub fn url(&self) -> String {
        UploadStore::url_for(&self.filename)
    }
}

/// Product image directory on local disk.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Store rooted at the directory that holds product images.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.product_uploads_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create uploads directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;
        info!("Uploads directory ready: {}", self.dir.display());
        Ok(())
    }

    /// Build a unique filename: `{field}-{unix_millis}-{random}{.ext}`.
    ///
    /// The extension is taken lower-cased from the client filename and dropped
    /// if it is missing or not plain alphanumeric.
    pub fn generate_filename(field: &str, original: Option<&str>) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = rand::random::<u32>() % 1_000_000_000;
        let ext = original
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();

        format!("{}-{}-{}{}", field, millis, suffix, ext)
    }

    /// Public url for a stored filename.
    pub fn url_for(filename: &str) -> String {
        format!("{}{}", PUBLIC_PREFIX, filename)
    }

    /// Map a stored url back to its file path.
    ///
    /// Only the last path segment is used, and segments that could escape the
    /// directory are refused.
    pub fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let name = url.rsplit('/').next()?;
        if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
            return None;
        }
        Some(self.dir.join(name))
    }

    /// Create a new, empty file for an upload.
    pub async fn create(
        &self,
        field: &str,
        original: Option<&str>,
    ) -> AppResult<(StoredFile, fs::File)> {
        let filename = Self::generate_filename(field, original);
        let path = self.dir.join(&filename);

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", filename, e)))?;

        Ok((StoredFile { filename, path }, file))
    }

    /// Remove a file. A file that is already gone counts as removed.
    pub async fn remove(&self, path: &Path) -> std::io::Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Best-effort removal of the file behind a stored url.
    pub async fn remove_url(&self, url: &str) {
        let Some(path) = self.path_for_url(url) else {
            warn!("Refusing to remove file for unexpected url: {}", url);
            return;
        };

        if let Err(e) = self.remove(&path).await {
            warn!("Failed to remove image file {}: {}", path.display(), e);
        }
    }
}

/// Files written for a request that has not committed yet.
///
/// Every tracked file is removed when the guard is dropped, so a request that
/// fails, or whose future is dropped mid-flight, leaves nothing behind.
/// Call [`PendingUploads::keep`] once a committed row references the files.
#[derive(Debug, Default)]
pub struct PendingUploads {
    paths: Vec<PathBuf>,
}

impl PendingUploads {
    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Stop tracking: the files now belong to committed rows.
    pub fn keep(&mut self) {
        self.paths.clear();
    }
}

impl Drop for PendingUploads {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed uncommitted upload {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to cleanup uploaded file {}: {}", path.display(), e),
            }
        }
    }
}
