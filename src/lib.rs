// Library exports for the Chinese OCR processing backend

// Core modules
pub mod api;
pub mod core;
pub mod orchestration;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export commonly used types and functions
pub use crate::core::{
    config::Config,
    errors::{
        ConfigError, DictionaryError, OcrError, StoreError, TranslationError, ValidationError,
    },
    types::{CharacterRecord, ProcessResponse, ProcessingResult, RecognizedText},
};

pub use crate::api::app;
pub use crate::orchestration::{ApiError, Pipeline};
pub use crate::services::{
    CedictDictionary, MarianTranslator, PaddleRecognizer, Segmenter, TextRecognizer,
    TranslationBackend,
};
pub use crate::storage::ResultStore;
