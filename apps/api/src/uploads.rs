//! Multipart helper shared by the CV and job-description upload endpoints.

use axum::extract::Multipart;

use crate::errors::AppError;

/// Pulls the `file` field out of a multipart body, returning its original
/// filename and raw bytes.
pub async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;

        return Ok((filename, bytes.to_vec()));
    }

    Err(AppError::Validation("No file provided".to_string()))
}
