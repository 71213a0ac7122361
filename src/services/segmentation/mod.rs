// Word segmentation for unspaced Chinese text
//
// Thin wrapper over jieba-rs. Segmentation is an enhancement, not a
// correctness requirement: a degraded outcome falls back to a single
// token containing the whole text instead of propagating a failure.

use jieba_rs::Jieba;
use tracing::debug;

/// Shared read-only segmenter, initialized once at startup
pub struct Segmenter {
    jieba: Jieba,
}

impl Segmenter {
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }

    /// Split text into an ordered list of word-like tokens.
    /// Empty input yields an empty list; a degenerate segmentation of
    /// non-empty input falls back to the unsegmented text.
    pub fn segment(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let words: Vec<String> = self
            .jieba
            .cut(text, false)
            .into_iter()
            .map(|w| w.to_string())
            .collect();

        if words.is_empty() {
            debug!("Segmentation produced no tokens, falling back to whole text");
            return vec![text.to_string()];
        }

        words
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}
