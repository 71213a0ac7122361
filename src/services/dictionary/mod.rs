// CEDICT dictionary: flat-file parse into a read-only in-memory map
//
// Format, one entry per line:
//   Traditional Simplified [pin1 yin1] /gloss1/gloss2/.../
// Only the first gloss is retained. Both scripts are stored as keys.
// The map is built once at startup and shared read-only by all requests.

use crate::core::errors::DictionaryError;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Read-only Chinese-English dictionary built from a CEDICT file
pub struct CedictDictionary {
    entries: HashMap<String, String>,
}

impl CedictDictionary {
    /// Load from a CEDICT flat file. A missing file degrades to an empty
    /// dictionary with a warning so glosses become absent rather than fatal.
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        if !path.exists() {
            warn!(
                "CEDICT file not found at {}, English glosses will be unavailable",
                path.display()
            );
            return Ok(Self {
                entries: HashMap::new(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|source| {
            DictionaryError::ReadFailed {
                path: path.display().to_string(),
                source,
            }
        })?;

        let dictionary = Self::parse(&content);
        info!(
            "CEDICT dictionary loaded: {} entries from {}",
            dictionary.entries.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Parse CEDICT content, keeping the first gloss of each entry
    pub fn parse(content: &str) -> Self {
        // Example line: 中國 中国 [Zhong1 guo2] /China/Middle Kingdom/
        let line_re = Regex::new(r"^(\S+)\s+(\S+)\s+\[(.+?)\]\s+/(.+?)/")
            .expect("CEDICT line pattern is valid");

        let mut entries = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = line_re.captures(line) {
                let traditional = &caps[1];
                let simplified = &caps[2];
                let first_gloss = caps[4].split('/').next().unwrap_or("").trim();
                if first_gloss.is_empty() {
                    continue;
                }

                entries.insert(traditional.to_string(), first_gloss.to_string());
                if simplified != traditional {
                    entries.insert(simplified.to_string(), first_gloss.to_string());
                }
            }
        }

        Self { entries }
    }

    /// Look up the first-sense gloss for a single- or multi-character headword.
    /// A miss is an absent gloss, never an error.
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# CC-CEDICT
# A comment line
中國 中国 [Zhong1 guo2] /China/Middle Kingdom/
你 你 [ni3] /you (informal)/
好 好 [hao3] /good/well/proper/
malformed line without brackets
";

    #[test]
    fn parses_first_gloss_only() {
        let dict = CedictDictionary::parse(SAMPLE);
        assert_eq!(dict.lookup("好"), Some("good"));
    }

    #[test]
    fn stores_both_scripts() {
        let dict = CedictDictionary::parse(SAMPLE);
        assert_eq!(dict.lookup("中國"), Some("China"));
        assert_eq!(dict.lookup("中国"), Some("China"));
    }

    #[test]
    fn skips_comments_and_malformed_lines() {
        let dict = CedictDictionary::parse(SAMPLE);
        // Three parseable lines; the first yields two keys (both scripts)
        assert_eq!(dict.len(), 4);
    }

    #[test]
    fn lookup_miss_is_none() {
        let dict = CedictDictionary::parse(SAMPLE);
        assert_eq!(dict.lookup("貓"), None);
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let dict = CedictDictionary::load(Path::new("/nonexistent/cedict.u8")).unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cedict_ts.u8");
        std::fs::write(&path, SAMPLE).unwrap();

        let dict = CedictDictionary::load(&path).unwrap();
        assert_eq!(dict.lookup("你"), Some("you (informal)"));
    }
}
