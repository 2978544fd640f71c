pub mod attachment_handler;

pub use attachment_handler::{delete_media, list_media, upload_media, MediaState};
