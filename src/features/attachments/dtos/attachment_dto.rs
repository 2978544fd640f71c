use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::attachments::models::MediaAttachment;

/// Upload request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadMediaDto {
    /// The media file to attach
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Declared media kind: "audio", "image" or "document".
    /// Sniffed from the MIME type when omitted.
    #[schema(example = "audio")]
    pub media_kind: Option<String>,
}

/// Response DTO for a media attachment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MediaAttachmentResponseDto {
    pub id: Uuid,
    pub note_id: Uuid,
    /// Original filename as uploaded
    pub file_name: String,
    /// One of "audio", "image", "document"
    pub media_kind: String,
    pub mime_type: String,
    pub file_size: i64,
    /// One of "processing", "completed", "failed"
    pub conversion_status: String,
    /// Extracted text once completed; the failure diagnostic once failed
    pub extracted_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MediaAttachment> for MediaAttachmentResponseDto {
    fn from(attachment: MediaAttachment) -> Self {
        Self {
            id: attachment.id,
            note_id: attachment.note_id,
            file_name: attachment.file_name,
            media_kind: attachment.media_kind,
            mime_type: attachment.mime_type,
            file_size: attachment.file_size,
            conversion_status: attachment.conversion_status,
            extracted_text: attachment.extracted_text,
            created_at: attachment.created_at,
            updated_at: attachment.updated_at,
        }
    }
}

/// Response DTO for attachment deletion
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteMediaResponseDto {
    pub deleted: bool,
}
