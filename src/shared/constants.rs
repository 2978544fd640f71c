/// Maximum accepted media upload size in bytes (25 MB, Whisper's own cap)
pub const MAX_MEDIA_SIZE: usize = 25 * 1024 * 1024;

/// Prefix stored in `extracted_text` when a conversion fails.
/// A completed attachment never carries this prefix.
pub const CONVERSION_ERROR_PREFIX: &str = "Konvertierungsfehler: ";

/// Diagnostic stored when a conversion nominally succeeds but yields no text
pub const EMPTY_RESULT_DIAGNOSTIC: &str =
    "Konvertierung erfolgreich, aber kein Text extrahiert.";
