use serde::Serialize;

use crate::error::AppError;

/// Bare success marker, `{"ok": 1}`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OkResponse {
    #[schema(example = 1)]
    pub ok: u8,
}

impl OkResponse {
    pub fn new() -> Self {
        Self { ok: 1 }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CountResponse {
    pub ok: u8,
    #[schema(example = 42)]
    pub count: u64,
}

/// Trim a required free-text field and bound its length.
pub fn required_text(value: &str, field: &str, max: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(value.to_string())
}
