use axum::extract::{FromRequest, Multipart, Request};

use crate::error::AppError;

/// Multipart CSV upload: a `csv` file field plus an optional `hasHeader`
/// form field (defaults to true).
pub struct CsvUpload {
    pub data: Vec<u8>,
    pub has_header: bool,
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(AppError::Validation(format!(
            "hasHeader must be true or false, got '{other}'"
        ))),
    }
}

impl<S> FromRequest<S> for CsvUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        let mut data = None;
        let mut has_header = true;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("csv") => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    data = Some(bytes.to_vec());
                }
                Some("hasHeader") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(e.body_text()))?;
                    has_header = parse_flag(&text)?;
                }
                _ => {}
            }
        }

        let data = data.ok_or_else(|| AppError::Validation("Missing 'csv' file field".into()))?;
        Ok(CsvUpload { data, has_header })
    }
}
