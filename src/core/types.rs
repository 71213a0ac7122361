// Shared data model for the OCR processing workflow

use serde::{Deserialize, Serialize};

/// Fallback confidence when the engine reports a non-finite or missing score
pub const DEFAULT_CONFIDENCE: f32 = 0.9;

/// Placeholder text stored when OCR finds no Chinese characters.
/// This is a valid business outcome, not an error.
pub const NO_TEXT_SENTINEL: &str = "no text detected";

/// Message accompanying the no-text sentinel result
pub const NO_TEXT_MESSAGE: &str = "No text detected in image";

/// A single recognized character with pronunciation, gloss, and OCR confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub char: String,
    pub pinyin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
    pub confidence: f32,
}

/// The one result schema shared by the write and read paths.
/// Written once per validated upload, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub image_id: String,
    pub original_text: String,
    pub segmented_text: Vec<String>,
    pub characters: Vec<CharacterRecord>,
    pub translation: String,
}

impl ProcessingResult {
    /// Minimal result persisted when OCR found no Chinese text, so that
    /// `/results/{image_id}` behaves consistently for every processed upload
    pub fn no_text(image_id: String) -> Self {
        Self {
            image_id,
            original_text: NO_TEXT_SENTINEL.to_string(),
            segmented_text: Vec::new(),
            characters: Vec::new(),
            translation: String::new(),
        }
    }
}

/// Output of a recognition engine before enrichment:
/// the full text plus an ordered per-character confidence stream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognizedText {
    pub text: String,
    pub characters: Vec<(char, f32)>,
}

impl RecognizedText {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Response body for POST /process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub image_id: String,
    pub original_text: String,
    pub segmented_text: Vec<String>,
    pub characters: Vec<CharacterRecord>,
    pub translation: String,
    pub message: String,
}

impl ProcessResponse {
    pub fn from_result(result: ProcessingResult, message: impl Into<String>) -> Self {
        Self {
            image_id: result.image_id,
            original_text: result.original_text,
            segmented_text: result.segmented_text,
            characters: result.characters,
            translation: result.translation,
            message: message.into(),
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// Structured error body: `{error, message, detail?}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
