use crate::models::{Posting, PostingDetail, PostingPayload, WriteMode};
use crate::services::attrs::Attr;
use crate::services::filter::PostingFilter;
use crate::services::postings;
use crate::web::error::{ApiError, AppResult};
use crate::web::extractors::{ApiJson, CurrentUser};
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct PostingListParams {
    pub tags: Option<String>,
    pub steps: Option<String>,
}

fn present(mut posting: Posting, media_prefix: &str) -> Posting {
    posting.steps = posting
        .steps
        .into_iter()
        .map(|s| s.present(media_prefix))
        .collect();
    posting
}

fn present_detail(mut detail: PostingDetail, media_prefix: &str) -> PostingDetail {
    detail.posting = present(detail.posting, media_prefix);
    detail
}

/// GET /postings/
pub async fn list(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PostingListParams>,
) -> AppResult<Json<Vec<Posting>>> {
    let filter = PostingFilter::from_query(params.tags.as_deref(), params.steps.as_deref())?;
    let list = postings::list_postings(&state.db, user.id, &filter)?
        .into_iter()
        .map(|p| present(p, state.media_prefix()))
        .collect();
    Ok(Json(list))
}

/// POST /postings/
pub async fn create(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<PostingPayload>,
) -> AppResult<Response> {
    let input = payload.validate_new()?;
    let detail = postings::create_posting(&state.db, user.id, input)?;
    Ok((
        StatusCode::CREATED,
        Json(present_detail(detail, state.media_prefix())),
    )
        .into_response())
}

/// GET /postings/:id/
pub async fn retrieve(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PostingDetail>> {
    let detail = postings::get_posting(&state.db, user.id, id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(present_detail(detail, state.media_prefix())))
}

/// PUT /postings/:id/
pub async fn replace(
    state: State<Arc<AppState>>,
    user: CurrentUser,
    id: Path<i64>,
    ApiJson(payload): ApiJson<PostingPayload>,
) -> AppResult<Json<PostingDetail>> {
    update(state, user, id, payload, WriteMode::Replace).await
}

/// PATCH /postings/:id/
pub async fn partial_update(
    state: State<Arc<AppState>>,
    user: CurrentUser,
    id: Path<i64>,
    ApiJson(payload): ApiJson<PostingPayload>,
) -> AppResult<Json<PostingDetail>> {
    update(state, user, id, payload, WriteMode::Partial).await
}

async fn update(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    payload: PostingPayload,
    mode: WriteMode,
) -> AppResult<Json<PostingDetail>> {
    // Ownership is checked before validation so foreign ids always 404.
    if postings::get_posting(&state.db, user.id, id)?.is_none() {
        return Err(ApiError::NotFound);
    }
    let changes = payload.validate(mode)?;
    let detail = postings::update_posting(&state.db, user.id, id, changes)?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(present_detail(detail, state.media_prefix())))
}

/// DELETE /postings/:id/
pub async fn destroy(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if postings::delete_posting(&state.db, user.id, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
