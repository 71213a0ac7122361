// OCR service: capability interface over swappable recognition engines
//
// The orchestrator only sees the `TextRecognizer` contract; the concrete
// engine is chosen once at startup from configuration, never by branching
// in the request path. After recognition the character stream is filtered
// to CJK Unified Ideographs: OCR engines commonly emit noise in unrelated
// scripts, and an all-filtered result is the canonical "no text" outcome,
// not an error.

pub mod paddle;

use crate::core::config::OcrConfig;
use crate::core::errors::OcrResult;
use crate::core::types::RecognizedText;
use anyhow::Result;
use std::sync::Arc;

pub use paddle::PaddleRecognizer;

/// Uniform contract over an external OCR engine
pub trait TextRecognizer: Send + Sync {
    /// Recognize Chinese text in raw image bytes.
    ///
    /// Fails with `OcrError::InvalidImage` for undecodable bytes and
    /// `OcrError::Inference` when the engine call itself fails. Absence
    /// of Chinese text is a successful, empty `RecognizedText`.
    fn recognize(&self, image_bytes: &[u8]) -> OcrResult<RecognizedText>;
}

/// Construct the configured recognition engine
pub fn build_recognizer(config: &OcrConfig) -> Result<Arc<dyn TextRecognizer>> {
    match config.engine.as_str() {
        "paddle" => Ok(Arc::new(PaddleRecognizer::new(
            config.model_path.as_ref(),
            config.charset_path.as_ref(),
        )?)),
        other => anyhow::bail!("Unknown OCR engine: {}", other),
    }
}

/// CJK Unified Ideographs block (U+4E00..U+9FFF)
pub fn is_han(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Keep only Han characters from a raw engine character stream,
/// preserving order and per-character confidence
pub fn filter_to_han(raw: Vec<(char, f32)>) -> RecognizedText {
    let characters: Vec<(char, f32)> = raw.into_iter().filter(|(c, _)| is_han(*c)).collect();
    let text: String = characters.iter().map(|(c, _)| *c).collect();
    RecognizedText { text, characters }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn han_range_bounds() {
        assert!(is_han('中'));
        assert!(is_han('一')); // U+4E00
        assert!(!is_han('A'));
        assert!(!is_han('あ'));
        assert!(!is_han('。'));
    }

    #[test]
    fn filter_drops_non_han_noise() {
        let raw = vec![('A', 0.5), ('中', 0.9), ('1', 0.4), ('国', 0.8)];
        let filtered = filter_to_han(raw);
        assert_eq!(filtered.text, "中国");
        assert_eq!(filtered.characters, vec![('中', 0.9), ('国', 0.8)]);
    }

    #[test]
    fn all_noise_filters_to_empty() {
        let raw = vec![('h', 0.9), ('i', 0.9), ('!', 0.9)];
        let filtered = filter_to_han(raw);
        assert!(filtered.is_empty());
        assert!(filtered.characters.is_empty());
    }

    #[test]
    fn empty_stream_filters_to_empty() {
        assert!(filter_to_han(Vec::new()).is_empty());
    }
}
