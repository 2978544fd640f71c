use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::features::attachments::handlers::{delete_media, list_media, upload_media, MediaState};
use crate::features::attachments::services::AttachmentService;
use crate::shared::constants::MAX_MEDIA_SIZE;

/// Create routes for the media attachments feature
pub fn routes(attachment_service: Arc<AttachmentService>) -> Router {
    let state = MediaState { attachment_service };

    Router::new()
        .route(
            "/api/notes/{note_id}/media",
            // Allow body size up to MAX_MEDIA_SIZE + buffer for multipart overhead
            post(upload_media).layer(DefaultBodyLimit::max(MAX_MEDIA_SIZE + 1024 * 1024)),
        )
        .route("/api/notes/{note_id}/media", get(list_media))
        .route(
            "/api/notes/{note_id}/media/{attachment_id}",
            delete(delete_media),
        )
        .with_state(state)
}
