//! Bearer-token middleware. Every request passes through here; handlers
//! that need an identity call `user.sub()?`, everything else (webhooks,
//! health) ignores the extension.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use hyper::header::AUTHORIZATION;
use sea_orm::EntityTrait;

use crate::entity::user;
use crate::error::{ApiError, AuthorizationError};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct TokenUser {
    pub sub: String,
}

#[derive(Debug, Clone)]
pub enum AppUser {
    Token(TokenUser),
    Unauthorized,
}

impl AppUser {
    pub fn sub(&self) -> Result<String, AuthorizationError> {
        match self {
            AppUser::Token(user) => Ok(user.sub.clone()),
            AppUser::Unauthorized => Err(ApiError::unauthorized("Missing bearer token")),
        }
    }

    pub async fn get_user(&self, state: &AppState) -> Result<user::Model, ApiError> {
        let sub = self.sub()?;
        user::Entity::find_by_id(&sub)
            .one(&state.db)
            .await?
            .ok_or_else(|| ApiError::unauthorized("User not found"))
    }
}

pub async fn jwt_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response<Body>, AuthorizationError> {
    let mut request = request;

    if let Some(auth_header) = request.headers().get(AUTHORIZATION)
        && let Ok(token) = auth_header.to_str()
    {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        let claims = state
            .validate_token(token)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;
        let sub = claims
            .get("sub")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::unauthorized("Token has no sub claim"))?;
        request.extensions_mut().insert::<AppUser>(AppUser::Token(TokenUser {
            sub: sub.to_string(),
        }));
        return Ok(next.run(request).await);
    }

    request
        .extensions_mut()
        .insert::<AppUser>(AppUser::Unauthorized);
    Ok(next.run(request).await)
}
