pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::Config;
pub use errors::{
    ConfigError, DictionaryError, OcrError, StoreError, TranslationError, ValidationError,
};
pub use types::{
    CharacterRecord, ErrorBody, HealthResponse, ProcessResponse, ProcessingResult, RecognizedText,
};
