//! Multipart boundary for product image uploads.
//!
//! Image parts are streamed straight into the uploads directory. Text parts
//! `alt_text` and `is_primary` are collected in order. Written files stay
//! tracked by the form until [`ImageForm::keep_files`]; dropping the form
//! before that removes them, whether the request failed or was cancelled.

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::storage::{PendingUploads, StoredFile, UploadStore};
use crate::db::product_images::{NewProductImage, ProductImageChanges};
use crate::error::{AppError, AppResult};

/// Multipart field name carrying image files.
pub const IMAGES_FIELD: &str = "images";
const ALT_TEXT_FIELD: &str = "alt_text";
const IS_PRIMARY_FIELD: &str = "is_primary";
/// Upper bound for a single text field value.
const MAX_TEXT_FIELD_SIZE: usize = 64 * 1024;

/// Limits applied while reading one form.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_size: usize,
}

/// Parsed image form: written files plus raw text values in arrival order.
#[derive(Debug, Default)]
pub struct ImageForm {
    pub files: Vec<StoredFile>,
    pub alt_texts: Vec<String>,
    pub primaries: Vec<String>,
    pending: PendingUploads,
}

/// Read a multipart image form, writing image parts to `store`.
pub async fn read_image_form(
    mut payload: Multipart,
    store: &UploadStore,
    limits: UploadLimits,
) -> AppResult<ImageForm> {
    let mut form = ImageForm::default();
    collect_fields(&mut payload, store, limits, &mut form).await?;
    Ok(form)
}

async fn collect_fields(
    payload: &mut Multipart,
    store: &UploadStore,
    limits: UploadLimits,
    form: &mut ImageForm,
) -> AppResult<()> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let name = field.name().unwrap_or_default().to_string();
        let original = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        match original {
            Some(original) => {
                if name != IMAGES_FIELD {
                    return Err(AppError::InvalidInput(format!("Unexpected field: {}", name)));
                }
                if form.files.len() >= limits.max_files {
                    return Err(AppError::InvalidInput(format!(
                        "Too many files. At most {} image(s) allowed",
                        limits.max_files
                    )));
                }
                let is_image = field
                    .content_type()
                    .is_some_and(|mime| mime.essence_str().starts_with("image/"));
                if !is_image {
                    return Err(AppError::InvalidInput(
                        "Only image files are allowed!".to_string(),
                    ));
                }

                write_file(&mut field, store, &name, &original, limits.max_file_size, form)
                    .await?;
            }
            None => {
                let value = read_text(&mut field).await?;
                match name.as_str() {
                    ALT_TEXT_FIELD => form.alt_texts.push(value),
                    IS_PRIMARY_FIELD => form.primaries.push(value),
                    other => debug!("Ignoring form field '{}'", other),
                }
            }
        }
    }

    Ok(())
}

/// Stream one image part to a new file. The file is registered on the form
/// before the first byte so a failed write is still cleaned up.
async fn write_file(
    field: &mut Field,
    store: &UploadStore,
    name: &str,
    original: &str,
    max_file_size: usize,
    form: &mut ImageForm,
) -> AppResult<()> {
    let (stored, mut file) = store.create(name, Some(original)).await?;
    form.pending.track(stored.path.clone());
    form.files.push(stored);

    let mut size: usize = 0;
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
        size += data.len();
        if size > max_file_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes",
                max_file_size
            )));
        }
        file.write_all(&data).await?;
    }
    file.flush().await?;

    Ok(())
}

async fn read_text(field: &mut Field) -> AppResult<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let data = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
        if buf.len() + data.len() > MAX_TEXT_FIELD_SIZE {
            return Err(AppError::PayloadTooLarge("Form field too large".to_string()));
        }
        buf.extend_from_slice(&data);
    }

    String::from_utf8(buf)
        .map_err(|_| AppError::InvalidInput("Form field is not valid UTF-8".to_string()))
}

impl ImageForm {
    /// Hand the written files over to committed rows.
    pub fn keep_files(&mut self) {
        self.pending.keep();
    }

    /// Image rows for a batch create, one per file in upload order.
    ///
    /// - A single `alt_text` applies to every file; several apply by position.
    ///   Missing or empty values become `Product image {n}`.
    /// - A single `is_primary` applies to the first file only; several apply
    ///   by position. Only the literal `true` sets the flag.
    /// - Only the first flagged file stays primary.
    pub fn batch_images(&self) -> Vec<NewProductImage> {
        let mut primary_taken = false;

        self.files
            .iter()
            .enumerate()
            .map(|(index, file)| {
                let alt_text = match self.alt_texts.as_slice() {
                    [single] => Some(single),
                    many => many.get(index),
                }
                .filter(|alt| !alt.is_empty())
                .cloned()
                .unwrap_or_else(|| format!("Product image {}", index + 1));

                let flagged = match self.primaries.as_slice() {
                    [single] => index == 0 && single == "true",
                    many => many.get(index).is_some_and(|v| v == "true"),
                };
                let is_primary = flagged && !primary_taken;
                primary_taken |= is_primary;

                NewProductImage {
                    url: file.url(),
                    alt_text,
                    is_primary,
                }
            })
            .collect()
    }

    /// Field changes for a single-image update. An empty `alt_text` counts as
    /// not supplied.
    pub fn changes(&self) -> ProductImageChanges {
        ProductImageChanges {
            alt_text: self.alt_texts.first().filter(|alt| !alt.is_empty()).cloned(),
            is_primary: self.primaries.first().map(|v| v == "true"),
            url: self.files.first().map(StoredFile::url),
        }
    }
}
