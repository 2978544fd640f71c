use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::core::extractor::OwnerId;
use crate::features::attachments::dtos::{
    DeleteMediaResponseDto, MediaAttachmentResponseDto, UploadMediaDto,
};
use crate::features::attachments::services::AttachmentService;
use crate::shared::constants::MAX_MEDIA_SIZE;
use crate::shared::types::{ApiResponse, Meta};

/// State for media attachment handlers
#[derive(Clone)]
pub struct MediaState {
    pub attachment_service: Arc<AttachmentService>,
}

/// Upload a media file and start text extraction
///
/// Returns immediately with the attachment in `processing`; poll the list
/// endpoint for the extraction outcome.
#[utoipa::path(
    post,
    path = "/api/notes/{note_id}/media",
    tag = "media",
    params(
        ("note_id" = Uuid, Path, description = "Note ID")
    ),
    request_body(
        content = UploadMediaDto,
        content_type = "multipart/form-data",
        description = "Media file to attach to the note"
    ),
    responses(
        (status = 201, description = "File uploaded, conversion in progress", body = ApiResponse<MediaAttachmentResponseDto>),
        (status = 400, description = "Missing file or unsupported media kind"),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Note not found"),
        (status = 413, description = "File too large")
    )
)]
pub async fn upload_media(
    OwnerId(owner_id): OwnerId,
    Path(note_id): Path<Uuid>,
    State(state): State<MediaState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MediaAttachmentResponseDto>>), AppError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut mime_type: Option<String> = None;
    let mut declared_kind: Option<String> = None;

    // Process multipart fields
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let ct = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let fname = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                file_data = Some(data.to_vec());
                file_name = Some(fname);
                mime_type = Some(ct);
            }
            "media_kind" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read media_kind field: {}", e))
                })?;
                declared_kind = Some(value);
            }
            other => {
                debug!("Ignoring unknown field: {}", other);
            }
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::BadRequest("Filename is required".to_string()))?;
    let mime_type =
        mime_type.ok_or_else(|| AppError::BadRequest("Content type is required".to_string()))?;

    if file_data.len() > MAX_MEDIA_SIZE {
        return Err(AppError::BadRequest(format!(
            "File too large. Maximum size is {} bytes ({} MB)",
            MAX_MEDIA_SIZE,
            MAX_MEDIA_SIZE / 1024 / 1024
        )));
    }

    let attachment = state
        .attachment_service
        .ingest(
            note_id,
            &owner_id,
            file_data,
            &file_name,
            declared_kind.as_deref(),
            &mime_type,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(attachment.into()),
            Some("File uploaded successfully. Conversion in progress.".to_string()),
            None,
        )),
    ))
}

/// List all media attachments for a note with their conversion state
#[utoipa::path(
    get,
    path = "/api/notes/{note_id}/media",
    tag = "media",
    params(
        ("note_id" = Uuid, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "List of attachments", body = ApiResponse<Vec<MediaAttachmentResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Note not found")
    )
)]
pub async fn list_media(
    OwnerId(owner_id): OwnerId,
    Path(note_id): Path<Uuid>,
    State(state): State<MediaState>,
) -> Result<Json<ApiResponse<Vec<MediaAttachmentResponseDto>>>, AppError> {
    let attachments = state
        .attachment_service
        .list_by_note(note_id, &owner_id)
        .await?;

    let total = attachments.len() as i64;
    let dtos: Vec<MediaAttachmentResponseDto> =
        attachments.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta { total }),
    )))
}

/// Delete a media attachment and its stored file
#[utoipa::path(
    delete,
    path = "/api/notes/{note_id}/media/{attachment_id}",
    tag = "media",
    params(
        ("note_id" = Uuid, Path, description = "Note ID"),
        ("attachment_id" = Uuid, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "Attachment deleted", body = ApiResponse<DeleteMediaResponseDto>),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Note or attachment not found")
    )
)]
pub async fn delete_media(
    OwnerId(owner_id): OwnerId,
    Path((note_id, attachment_id)): Path<(Uuid, Uuid)>,
    State(state): State<MediaState>,
) -> Result<Json<ApiResponse<DeleteMediaResponseDto>>, AppError> {
    state
        .attachment_service
        .delete(note_id, attachment_id, &owner_id)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(DeleteMediaResponseDto { deleted: true }),
        Some("Media attachment deleted successfully".to_string()),
        None,
    )))
}
