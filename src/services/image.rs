use crate::models::Step;
use crate::services::attrs;
use crate::Database;
use anyhow::{bail, Result};
use image::GenericImageView;
use std::path::Path;
use uuid::Uuid;

/// Subdirectory of the media dir holding step images.
pub const STEP_IMAGE_DIR: &str = "steps";

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedImage {
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Sniffs the bytes and fully decodes them. Anything that is not a raster
/// image we can read back is rejected.
pub fn check_image(data: &[u8]) -> Result<CheckedImage> {
    if data.is_empty() {
        bail!("The submitted file is empty");
    }

    let kind = match infer::get(data) {
        Some(kind) => kind,
        None => bail!("Unrecognised file type"),
    };
    if !ALLOWED_MIME_TYPES.contains(&kind.mime_type()) {
        bail!("File type not allowed: {}", kind.mime_type());
    }

    let img = image::load_from_memory(data)?;
    let (width, height) = img.dimensions();

    Ok(CheckedImage {
        mime_type: kind.mime_type(),
        extension: kind.extension(),
        width,
        height,
    })
}

/// Writes `data` under `media_dir/steps/` and points the step at it. The
/// previous file, if any, is removed once the row is updated. `None` if the
/// step is not the user's.
pub fn store_step_image(
    db: &Database,
    media_dir: &Path,
    user_id: i64,
    step_id: i64,
    data: &[u8],
    checked: &CheckedImage,
) -> Result<Option<Step>> {
    let conn = db.get()?;
    let previous = match attrs::find_by_id::<Step>(&conn, user_id, step_id)? {
        Some(step) => step.image,
        None => return Ok(None),
    };

    let relative = format!("{}/{}.{}", STEP_IMAGE_DIR, Uuid::new_v4(), checked.extension);
    let file_path = media_dir.join(&relative);
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file_path, data)?;

    let updated = conn.execute(
        "UPDATE steps SET image = ? WHERE id = ? AND user_id = ?",
        (&relative, step_id, user_id),
    );
    if let Err(e) = updated {
        let _ = std::fs::remove_file(&file_path);
        return Err(e.into());
    }

    if let Some(old) = previous {
        let old_path = media_dir.join(&old);
        if old_path.exists() {
            if let Err(e) = std::fs::remove_file(&old_path) {
                tracing::warn!("Could not remove old step image {:?}: {}", old_path, e);
            }
        }
    }

    tracing::info!(
        "Stored {}x{} {} for step {}",
        checked.width,
        checked.height,
        checked.mime_type,
        step_id
    );
    attrs::find_by_id::<Step>(&conn, user_id, step_id)
}
