//! List, create, retrieve, update and delete for tags and steps. Each
//! handler is instantiated per kind in the router, e.g. `list::<Tag>`.

use crate::models::AttrPayload;
use crate::services::attrs::{self, Attr};
use crate::services::filter::parse_flag;
use crate::web::error::{ApiError, AppResult};
use crate::web::extractors::{ApiJson, CurrentUser};
use crate::web::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct AttrListParams {
    pub assigned_only: Option<String>,
}

/// GET /tags/, /steps/
pub async fn list<A>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<AttrListParams>,
) -> AppResult<Json<Vec<A>>>
where
    A: Attr + Serialize,
{
    let assigned_only = parse_flag(params.assigned_only.as_deref())
        .map_err(|message| ApiError::field("assigned_only", message))?;
    let items = attrs::list_attrs::<A>(&state.db, user.id, assigned_only)?
        .into_iter()
        .map(|a| a.present(state.media_prefix()))
        .collect();
    Ok(Json(items))
}

/// POST /tags/, /steps/
pub async fn create<A>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<AttrPayload>,
) -> AppResult<Response>
where
    A: Attr + Serialize,
{
    let name = payload
        .validate(false)?
        .ok_or_else(|| ApiError::field("name", crate::models::REQUIRED))?;
    let created = attrs::create_attr::<A>(&state.db, user.id, &name)?;
    Ok((
        StatusCode::CREATED,
        Json(created.present(state.media_prefix())),
    )
        .into_response())
}

/// GET /tags/:id/, /steps/:id/
pub async fn retrieve<A>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<A>>
where
    A: Attr + Serialize,
{
    let found = attrs::get_attr::<A>(&state.db, user.id, id)?.ok_or(ApiError::NotFound)?;
    Ok(Json(found.present(state.media_prefix())))
}

/// PUT /tags/:id/, /steps/:id/
pub async fn replace<A>(
    state: State<Arc<AppState>>,
    user: CurrentUser,
    id: Path<i64>,
    ApiJson(payload): ApiJson<AttrPayload>,
) -> AppResult<Json<A>>
where
    A: Attr + Serialize,
{
    update::<A>(state, user, id, payload, false).await
}

/// PATCH /tags/:id/, /steps/:id/
pub async fn partial_update<A>(
    state: State<Arc<AppState>>,
    user: CurrentUser,
    id: Path<i64>,
    ApiJson(payload): ApiJson<AttrPayload>,
) -> AppResult<Json<A>>
where
    A: Attr + Serialize,
{
    update::<A>(state, user, id, payload, true).await
}

async fn update<A>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    payload: AttrPayload,
    partial: bool,
) -> AppResult<Json<A>>
where
    A: Attr + Serialize,
{
    if attrs::get_attr::<A>(&state.db, user.id, id)?.is_none() {
        return Err(ApiError::NotFound);
    }
    let name = payload.validate(partial)?;
    let updated = attrs::update_attr::<A>(&state.db, user.id, id, name.as_deref())?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated.present(state.media_prefix())))
}

/// DELETE /tags/:id/, /steps/:id/
pub async fn destroy<A>(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode>
where
    A: Attr,
{
    if attrs::delete_attr::<A>(&state.db, user.id, id)? {
        tracing::info!("User {} deleted {} {}", user.id, A::KIND, id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
