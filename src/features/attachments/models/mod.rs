mod media_attachment;

pub use media_attachment::{ConversionStatus, MediaAttachment};
