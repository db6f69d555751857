use crate::models::User;
use crate::services::api_token;
use crate::web::error::ApiError;
use crate::web::state::AppState;
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use axum_extra::headers::authorization::{Authorization, Bearer};
use axum_extra::headers::HeaderMapExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// The user owning the bearer token on the request. Rejects with 401.
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> Pin<Box<dyn Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let state = state.clone();
        let token = request_token(&parts.headers);
        Box::pin(async move {
            let token = token.ok_or(ApiError::Unauthorized(
                "Authentication credentials were not provided.",
            ))?;

            let user = api_token::authenticate_token(&state.db, &token)?
                .ok_or(ApiError::Unauthorized("Invalid token."))?;

            Ok(CurrentUser(user))
        })
    }
}

/// Reads `Authorization: Bearer <token>`, also accepting the `Token` scheme.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("token") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

/// `axum::Json` with rejections reported as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
