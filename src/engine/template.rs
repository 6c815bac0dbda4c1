//! Base garment template loading

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageError, RgbaImage};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Template-related errors
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load template image: {0}")]
    ImageLoad(#[from] ImageError),
    #[error("Template unavailable for this process: {0}")]
    Unavailable(PathBuf),
    #[error("Template loader task failed: {0}")]
    Join(String),
}

/// The plain garment image every mockup starts from.
///
/// Loaded at most once per process (at startup via [`BaseTemplate::preload`]
/// or lazily on first use) and shared read-only afterwards. A failed load is
/// remembered too: later requests fail fast with
/// [`TemplateError::Unavailable`] instead of hitting the disk again.
pub struct BaseTemplate {
    path: PathBuf,
    image: OnceCell<Option<Arc<RgbaImage>>>,
}

impl BaseTemplate {
    /// Create a template backed by a file that is read on first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        BaseTemplate {
            path: path.into(),
            image: OnceCell::new(),
        }
    }

    /// Create an already-loaded template
    pub fn from_image(image: RgbaImage) -> Self {
        BaseTemplate {
            path: PathBuf::new(),
            image: OnceCell::new_with(Some(Some(Arc::new(image)))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the template has been loaded successfully
    pub fn is_loaded(&self) -> bool {
        matches!(self.image.get(), Some(Some(_)))
    }

    /// Load the template now so the first request doesn't pay for it
    pub async fn preload(&self) -> Result<(), TemplateError> {
        self.get().await.map(|_| ())
    }

    /// Get the template image, loading it on first call
    pub async fn get(&self) -> Result<Arc<RgbaImage>, TemplateError> {
        let cached = self
            .image
            .get_or_init(|| async {
                let path = self.path.clone();
                let loaded = tokio::task::spawn_blocking(move || load_from_disk(&path))
                    .await
                    .map_err(|e| TemplateError::Join(e.to_string()))
                    .and_then(|result| result);

                match loaded {
                    Ok(image) => {
                        info!(
                            path = %self.path.display(),
                            width = image.width(),
                            height = image.height(),
                            "Loaded base garment template"
                        );
                        Some(Arc::new(image))
                    }
                    Err(e) => {
                        error!(
                            path = %self.path.display(),
                            error = %e,
                            "Base garment template unavailable; mockups will be skipped"
                        );
                        None
                    }
                }
            })
            .await;

        cached
            .clone()
            .ok_or_else(|| TemplateError::Unavailable(self.path.clone()))
    }
}

fn load_from_disk(path: &Path) -> Result<RgbaImage, TemplateError> {
    if !path.is_file() {
        return Err(TemplateError::NotFound(path.to_path_buf()));
    }
    Ok(image::open(path)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tee-mockup-{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[tokio::test]
    async fn test_from_image_is_loaded() {
        let template = BaseTemplate::from_image(RgbaImage::from_pixel(4, 3, Rgba([255, 255, 255, 255])));
        assert!(template.is_loaded());
        let image = template.get().await.unwrap();
        assert_eq!(image.dimensions(), (4, 3));
    }

    #[tokio::test]
    async fn test_loads_file_once() {
        let path = temp_path("base.png");
        RgbaImage::from_pixel(10, 12, Rgba([240, 240, 240, 255])).save(&path).unwrap();

        let template = BaseTemplate::new(&path);
        assert!(!template.is_loaded());
        template.preload().await.unwrap();
        assert!(template.is_loaded());

        // Deleting the file doesn't matter once it's cached
        std::fs::remove_file(&path).unwrap();
        let first = template.get().await.unwrap();
        let second = template.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dimensions(), (10, 12));
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let template = BaseTemplate::new(temp_path("missing.png"));
        assert!(template.preload().await.is_err());
        assert!(!template.is_loaded());
        assert!(matches!(template.get().await, Err(TemplateError::Unavailable(_))));
    }

    #[test]
    fn test_load_from_disk_not_found() {
        let path = temp_path("nope.png");
        assert!(matches!(load_from_disk(&path), Err(TemplateError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_file_fails_to_decode() {
        let path = temp_path("corrupt.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(matches!(load_from_disk(&path), Err(TemplateError::ImageLoad(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
