//! Media upload handler and multipart helpers

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use shared::{MediaFolder, MediaRef};

use crate::error::{AppError, AppResult};
use crate::media::MediaUpload;
use crate::middleware::CurrentUser;
use crate::AppState;

fn multipart_error(field: &str, err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::validation(field, err.body_text())
}

/// Read a file part into memory
pub(crate) async fn read_upload(field: Field<'_>) -> AppResult<MediaUpload> {
    let name = field.name().unwrap_or("file").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let filename = field.file_name().unwrap_or("upload").to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| multipart_error(&name, e))?;

    Ok(MediaUpload {
        bytes: bytes.to_vec(),
        content_type,
        filename,
    })
}

pub(crate) async fn read_text(field: Field<'_>) -> AppResult<String> {
    let name = field.name().unwrap_or_default().to_string();
    field.text().await.map_err(|e| multipart_error(&name, e))
}

pub(crate) async fn next_field(multipart: &mut Multipart) -> AppResult<Option<Field<'_>>> {
    multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("body", e))
}

/// Upload an image to one of the media folders
pub async fn upload_media(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<MediaRef>)> {
    let mut file = None;
    let mut folder = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => file = Some(read_upload(field).await?),
            Some("folder") => {
                let name = read_text(field).await?;
                folder = Some(MediaFolder::parse(name.trim()).ok_or_else(|| {
                    AppError::validation(
                        "folder",
                        "Folder must be one of turfs, payment-proofs, payment-qr",
                    )
                })?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::validation("file", "File is required"))?;
    let folder = folder.unwrap_or(MediaFolder::Turfs);
    file.validate("file", state.config.media.max_upload_bytes)?;

    let media = state.media.upload(file, folder).await?;
    Ok((StatusCode::CREATED, Json(media)))
}
