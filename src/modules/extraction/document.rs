//! Two-stage text extraction for page-description documents (PDF)
//!
//! Strategy A is a structural heuristic over the raw bytes: literal strings
//! inside `BT`/`ET` text blocks plus readable words salvaged from content
//! streams. It is cheap, local, and has no I/O. Strategy B submits the
//! whole document to the vision service. A strategy only wins when it
//! yields more than [`MIN_EXTRACTED_LEN`] characters; below that floor the
//! pipeline reports failure rather than storing a near-empty result.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::modules::extraction::error::{ExtractError, ExtractResult};
use crate::modules::extraction::vision::VisionTextDetection;

/// Confidence floor: extracted text at or below this length does not count
/// as a successful extraction.
pub const MIN_EXTRACTED_LEN: usize = 50;

pub struct DocumentExtractor {
    vision: Arc<dyn VisionTextDetection>,
}

impl DocumentExtractor {
    pub fn new(vision: Arc<dyn VisionTextDetection>) -> Self {
        Self { vision }
    }

    pub async fn extract(&self, data: &[u8]) -> ExtractResult<String> {
        let heuristic = scan_document_text(data);
        if heuristic.len() > MIN_EXTRACTED_LEN {
            debug!(
                "Document text extracted structurally, length: {}",
                heuristic.len()
            );
            return Ok(heuristic);
        }

        debug!(
            "Structural parse yielded only {} chars, falling back to optical recognition",
            heuristic.len()
        );

        match self.vision.annotate_document(data).await {
            Ok(text) if text.len() > MIN_EXTRACTED_LEN => {
                debug!("Document text extracted optically, length: {}", text.len());
                Ok(text)
            }
            Ok(text) => {
                warn!(
                    "Optical recognition returned too little text: {} chars",
                    text.len()
                );
                Err(ExtractError::DocumentUnreadable)
            }
            Err(ExtractError::UnsupportedDocumentFormat) => {
                Err(ExtractError::UnsupportedDocumentFormat)
            }
            Err(e) => {
                warn!("Optical document recognition failed: {}", e);
                Err(ExtractError::DocumentUnreadable)
            }
        }
    }
}

/// Strategy A: structural heuristic parse of raw document bytes.
///
/// Pure `bytes -> string`; collapses all whitespace runs to single spaces.
/// Callers decide whether the result clears the confidence floor.
pub fn scan_document_text(data: &[u8]) -> String {
    let content = String::from_utf8_lossy(data);
    let content = content.as_ref();
    let mut tokens: Vec<String> = Vec::new();

    // Literal strings inside BT ... ET text-drawing blocks
    let mut cursor = 0;
    while let Some(rel) = content[cursor..].find("BT") {
        let bt = cursor + rel;
        let Some(rel_end) = content[bt..].find("ET") else {
            break;
        };
        let et = bt + rel_end;

        for line in content[bt + 2..et].lines() {
            let line = line.trim();

            // Parenthesized literal: (text), with PDF escape sequences
            if let (Some(start), Some(end)) = (line.find('('), line.rfind(')')) {
                if start < end {
                    let decoded = decode_literal_escapes(&line[start + 1..end]);
                    if decoded.len() > 2 {
                        tokens.push(decoded);
                    }
                }
            }

            // Hex string: <48656c6c6f>
            if line.len() > 10 {
                if let (Some(start), Some(end)) = (line.find('<'), line.rfind('>')) {
                    if start < end {
                        if let Some(decoded) = decode_hex_string(&line[start + 1..end]) {
                            if decoded.len() > 2 {
                                tokens.push(decoded);
                            }
                        }
                    }
                }
            }
        }

        cursor = et + 2;
    }

    // Readable words inside raw stream ... endstream content. Streams are
    // usually compressed; this only salvages the uncompressed ones.
    let mut cursor = 0;
    while let Some(rel) = content[cursor..].find("stream") {
        let start = cursor + rel;
        let Some(rel_end) = content[start..].find("endstream") else {
            break;
        };
        let end = start + rel_end;

        for word in content[start + 6..end].split_whitespace() {
            let total = word.chars().count();
            if total > 3 {
                let readable = word.chars().filter(char::is_ascii_alphanumeric).count();
                if readable as f64 / total as f64 > 0.7 {
                    tokens.push(word.to_string());
                }
            }
        }

        cursor = end + 9;
    }

    // Collapse repeated whitespace (decoded escapes may contain newlines)
    tokens
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode the basic PDF literal-string escape sequences
fn decode_literal_escapes(text: &str) -> String {
    text.replace("\\(", "(")
        .replace("\\)", ")")
        .replace("\\\\", "\\")
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
}

/// Decode a hex string pair by pair, keeping printable ASCII only.
/// Returns None for odd-length input; invalid pairs are skipped.
fn decode_hex_string(hex: &str) -> Option<String> {
    let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
    if hex.len() % 2 != 0 {
        return None;
    }

    let mut result = String::new();
    let bytes = hex.as_bytes();
    for pair in bytes.chunks(2) {
        let Ok(pair) = std::str::from_utf8(pair) else {
            continue;
        };
        let Ok(b) = u8::from_str_radix(pair, 16) else {
            continue;
        };
        if (32..=126).contains(&b) {
            result.push(b as char);
        }
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_parenthesized_literals_from_text_blocks() {
        let doc = b"%PDF-1.4\nBT\n/F1 12 Tf\n(Hallo Welt aus dem Dokument) Tj\nET\n";
        let text = scan_document_text(doc);
        assert!(text.contains("Hallo Welt aus dem Dokument"), "got: {}", text);
    }

    #[test]
    fn extracts_from_multiple_text_blocks() {
        let doc = b"BT (Erster Block mit Inhalt) Tj ET junk BT (Zweiter Block mit Inhalt) Tj ET";
        let text = scan_document_text(doc);
        assert!(text.contains("Erster Block mit Inhalt"));
        assert!(text.contains("Zweiter Block mit Inhalt"));
    }

    #[test]
    fn decodes_escape_sequences_in_literals() {
        let doc = b"BT\n(Klammern \\(so\\) und Backslash \\\\ hier) Tj\nET";
        let text = scan_document_text(doc);
        assert!(text.contains("Klammern (so) und Backslash \\ hier"), "got: {}", text);
    }

    #[test]
    fn escaped_newlines_are_collapsed_to_spaces() {
        let doc = b"BT\n(Zeile eins\\nZeile zwei) Tj\nET";
        let text = scan_document_text(doc);
        assert!(text.contains("Zeile eins Zeile zwei"), "got: {}", text);
    }

    #[test]
    fn short_literals_are_dropped() {
        // Decoded length must exceed 2 characters
        let doc = b"BT\n(ab) Tj\n(abc) Tj\nET";
        let text = scan_document_text(doc);
        assert!(!text.contains("ab "), "got: {}", text);
        assert!(text.contains("abc"));
    }

    #[test]
    fn decodes_hex_strings_on_long_lines() {
        // 48616c6c6f2057656c74 = "Hallo Welt"
        let doc = b"BT\n<48616c6c6f2057656c74> Tj\nET";
        let text = scan_document_text(doc);
        assert!(text.contains("Hallo Welt"), "got: {}", text);
    }

    #[test]
    fn hex_decoding_keeps_printable_ascii_only() {
        // 01 and 7f are dropped, 41 42 43 survive
        assert_eq!(decode_hex_string("0141427f43"), Some("ABC".to_string()));
    }

    #[test]
    fn odd_length_hex_is_rejected() {
        assert_eq!(decode_hex_string("414"), None);
    }

    #[test]
    fn invalid_hex_pairs_are_skipped() {
        assert_eq!(decode_hex_string("41zz42"), Some("AB".to_string()));
    }

    #[test]
    fn salvages_readable_words_from_streams() {
        let doc = b"1 0 obj\nstream\nRechnung Betrag x\xfe\xffy$% Gesamt\nendstream\n";
        let text = scan_document_text(doc);
        assert!(text.contains("Rechnung"));
        assert!(text.contains("Betrag"));
        assert!(text.contains("Gesamt"));
    }

    #[test]
    fn stream_words_below_alnum_threshold_are_dropped() {
        // "((((a" is 5 chars with 1 alphanumeric -> ratio 0.2
        let doc = b"stream\n((((a Textinhalt\nendstream";
        let text = scan_document_text(doc);
        assert!(!text.contains("((((a"));
        assert!(text.contains("Textinhalt"));
    }

    #[test]
    fn short_stream_words_are_dropped() {
        let doc = b"stream\nab abc Lesbarer\nendstream";
        let text = scan_document_text(doc);
        assert_eq!(text, "Lesbarer");
    }

    #[test]
    fn whitespace_is_collapsed() {
        let doc = b"BT\n(Eins und) Tj\n(zwei und) Tj\nET";
        let text = scan_document_text(doc);
        assert_eq!(text, "Eins und zwei und");
    }

    #[test]
    fn binary_garbage_yields_little_or_no_text() {
        let doc: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
        let text = scan_document_text(&doc);
        assert!(text.len() <= MIN_EXTRACTED_LEN, "got: {}", text);
    }

    #[test]
    fn unterminated_text_block_is_ignored() {
        let doc = b"BT (haengender Block ohne Ende";
        assert_eq!(scan_document_text(doc), "");
    }
}
