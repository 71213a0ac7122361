pub mod dictionary;
pub mod enrichment;
pub mod ocr;
pub mod segmentation;
pub mod translation;

// Re-export commonly used services
pub use dictionary::CedictDictionary;
pub use ocr::{PaddleRecognizer, TextRecognizer};
pub use segmentation::Segmenter;
pub use translation::{MarianTranslator, TranslationBackend};
