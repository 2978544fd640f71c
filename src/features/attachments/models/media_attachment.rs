use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for media attachments
///
/// `extracted_text` doubles as the diagnostic field: a failed attachment
/// stores its human-readable failure explanation there, marked by the
/// conversion-error prefix.
#[derive(Debug, Clone, FromRow)]
pub struct MediaAttachment {
    pub id: Uuid,
    pub note_id: Uuid,
    pub owner_id: String,
    pub file_name: String,
    pub media_kind: String,
    pub file_path: String,
    pub file_size: i64,
    pub mime_type: String,
    pub extracted_text: Option<String>,
    pub conversion_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversion lifecycle of an attachment. `Processing` is the only
/// non-terminal state; a terminal attachment never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Processing,
    Completed,
    Failed,
}

impl ConversionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionStatus::Processing => "processing",
            ConversionStatus::Completed => "completed",
            ConversionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_values_match_the_database_check_constraint() {
        assert_eq!(ConversionStatus::Processing.as_str(), "processing");
        assert_eq!(ConversionStatus::Completed.as_str(), "completed");
        assert_eq!(ConversionStatus::Failed.as_str(), "failed");
    }
}
