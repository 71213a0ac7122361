// Per-character enrichment: pinyin, dictionary gloss, confidence clamping
//
// Every lookup here is best-effort. A failed pinyin lookup yields an empty
// string, a dictionary miss yields an absent gloss, and a bad confidence
// value falls back to the default. One bad character never aborts the batch.

use crate::core::types::{CharacterRecord, DEFAULT_CONFIDENCE};
use crate::services::dictionary::CedictDictionary;
use pinyin::ToPinyin;

/// Romanized pronunciation with tone marks, or empty when unknown
pub fn lookup_pinyin(c: char) -> String {
    c.to_pinyin()
        .map(|p| p.with_tone().to_string())
        .unwrap_or_default()
}

/// Clamp an engine confidence into [0, 1]; non-finite values fall back
/// to the default
pub fn normalize_confidence(confidence: f32) -> f32 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        DEFAULT_CONFIDENCE
    }
}

/// Build enriched records for each non-whitespace recognized character
pub fn enrich_characters(
    characters: &[(char, f32)],
    dictionary: &CedictDictionary,
) -> Vec<CharacterRecord> {
    characters
        .iter()
        .filter(|(c, _)| !c.is_whitespace())
        .map(|&(c, confidence)| {
            let english = dictionary
                .lookup(&c.to_string())
                .filter(|gloss| !gloss.is_empty())
                .map(|gloss| gloss.to_string());

            CharacterRecord {
                char: c.to_string(),
                pinyin: lookup_pinyin(c),
                english,
                confidence: normalize_confidence(confidence),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> CedictDictionary {
        CedictDictionary::parse("中 中 [zhong1] /middle/center/\n")
    }

    #[test]
    fn enriches_known_character() {
        let records = enrich_characters(&[('中', 0.95)], &dict());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].char, "中");
        assert_eq!(records[0].pinyin, "zhōng");
        assert_eq!(records[0].english.as_deref(), Some("middle"));
        assert!((records[0].confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn dictionary_miss_yields_absent_gloss() {
        let records = enrich_characters(&[('鑫', 0.8)], &dict());
        assert_eq!(records[0].english, None);
    }

    #[test]
    fn non_han_character_has_empty_pinyin() {
        assert_eq!(lookup_pinyin('A'), "");
    }

    #[test]
    fn skips_whitespace_characters() {
        let records = enrich_characters(&[(' ', 0.9), ('中', 0.9), ('\n', 0.9)], &dict());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn confidence_is_clamped_into_range() {
        assert_eq!(normalize_confidence(1.7), 1.0);
        assert_eq!(normalize_confidence(-0.3), 0.0);
        assert_eq!(normalize_confidence(0.5), 0.5);
    }

    #[test]
    fn non_finite_confidence_uses_default() {
        assert_eq!(normalize_confidence(f32::NAN), DEFAULT_CONFIDENCE);
        assert_eq!(normalize_confidence(f32::INFINITY), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn record_count_matches_non_blank_input() {
        let input: Vec<(char, f32)> = "你好世界".chars().map(|c| (c, 0.9)).collect();
        let records = enrich_characters(&input, &dict());
        assert_eq!(records.len(), 4);
        for record in &records {
            assert!((0.0..=1.0).contains(&record.confidence));
            assert!(!record.pinyin.is_empty());
        }
    }
}
