use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Basic};
use jury_core::Judge;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::Store;
use crate::utils::jwt;

/// Username expected in admin Basic credentials.
pub const ADMIN_USER: &str = "admin";

/// Judge authenticated by the `Authorization: Bearer <token>` header.
///
/// The token must verify and must also be the one stored on the judge row,
/// so deleting a judge or logging in again revokes older tokens.
pub struct JudgeAuth {
    pub judge: Judge,
}

impl FromRequestParts<AppState> for JudgeAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.token_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        let judge = Store::new(&state.db)
            .find_judge(claims.jid)
            .await?
            .filter(|j| j.token == token)
            .ok_or(AppError::TokenInvalid)?;

        Ok(JudgeAuth { judge })
    }
}

/// Admin authenticated with HTTP Basic credentials.
pub struct AdminAuth;

/// Check admin credentials against the configured password.
pub fn check_admin(state: &AppState, user: &str, password: &str) -> Result<(), AppError> {
    if user == ADMIN_USER && password == state.config.auth.admin_password {
        Ok(())
    } else {
        Err(AppError::InvalidCredentials)
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    if e.is_missing() {
                        AppError::TokenMissing
                    } else {
                        AppError::TokenInvalid
                    }
                })?;

        check_admin(state, basic.username(), basic.password())?;
        Ok(AdminAuth)
    }
}
