use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::attachments::{dtos as attachments_dtos, handlers as attachments_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Media attachments
        attachments_handlers::attachment_handler::upload_media,
        attachments_handlers::attachment_handler::list_media,
        attachments_handlers::attachment_handler::delete_media,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Media attachments
            attachments_dtos::UploadMediaDto,
            attachments_dtos::MediaAttachmentResponseDto,
            attachments_dtos::DeleteMediaResponseDto,
            ApiResponse<attachments_dtos::MediaAttachmentResponseDto>,
            ApiResponse<Vec<attachments_dtos::MediaAttachmentResponseDto>>,
            ApiResponse<attachments_dtos::DeleteMediaResponseDto>,
        )
    ),
    tags(
        (name = "media", description = "Media attachments with asynchronous text extraction"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Merkzettel API",
        version = "0.1.0",
        description = "API documentation for Merkzettel",
    )
)]
pub struct ApiDoc;

/// Adds the gateway-forwarded owner header as an API key scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "owner_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Owner-Id"))),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
