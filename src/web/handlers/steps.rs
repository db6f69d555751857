use crate::models::{Step, StepImage};
use crate::services::attrs::{self, Attr};
use crate::services::image;
use crate::web::error::{ApiError, AppResult};
use crate::web::extractors::CurrentUser;
use crate::web::state::AppState;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::response::Json;
use std::sync::Arc;

const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// POST /steps/:id/upload_image/
///
/// Expects a multipart body with an `image` file field. The stored image is
/// only replaced once the upload decodes as an image.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<StepImage>> {
    if attrs::get_attr::<Step>(&state.db, user.id, id)?.is_none() {
        return Err(ApiError::NotFound);
    }

    let mut multipart = multipart?;
    let mut data = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            data = Some(field.bytes().await?);
        }
    }

    let data = data.ok_or_else(|| ApiError::field("image", "No file was submitted."))?;
    let checked = image::check_image(&data).map_err(|e| {
        tracing::debug!("Rejected image upload for step {}: {}", id, e);
        ApiError::field("image", INVALID_IMAGE)
    })?;

    let step = image::store_step_image(&state.db, &state.media_dir, user.id, id, &data, &checked)?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(StepImage::from(step.present(state.media_prefix()))))
}
