// Custom error types for better error handling and debugging
//
// Using thiserror for ergonomic error definitions with:
// - Context preservation
// - Type-safe error matching
// - Automatic Display/Error trait implementations
// - Source error chaining

use thiserror::Error;

/// Upload validation errors (client-fixable, always mapped to 400)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No filename provided")]
    MissingFilename,

    #[error("File type {extension} not allowed. Allowed types: {allowed}")]
    DisallowedExtension { extension: String, allowed: String },

    #[error("File size {size} exceeds maximum {max} bytes")]
    FileTooLarge { size: usize, max: usize },

    #[error("File signature {detected} is not an allowed image type")]
    DisallowedSignature { detected: String },
}

/// OCR adapter errors
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Invalid image format: {0}")]
    InvalidImage(#[from] image::ImageError),

    #[error("OCR inference failed: {0}")]
    Inference(#[from] ort::Error),

    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Translation adapter errors (internal to the adapter; the public
/// `translate` contract degrades these to sentinel strings)
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Translation inference failed: {0}")]
    Inference(#[from] ort::Error),

    #[error("Model produced no output")]
    EmptyOutput,
}

/// Dictionary loading errors
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Failed to read dictionary file {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
}

/// Result store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No result stored for image_id: {0}")]
    NotFound(String),

    #[error("Stored result for {image_id} contains invalid data: {source}")]
    Corrupt {
        image_id: String,
        source: serde_json::Error,
    },

    #[error("I/O error for {image_id}: {source}")]
    Io {
        image_id: String,
        source: std::io::Error,
    },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Max upload size must be > 0")]
    InvalidMaxUploadSize,

    #[error("Allowed extensions list must not be empty")]
    EmptyExtensionList,

    #[error("Unknown OCR engine: {0} (supported: paddle)")]
    UnknownOcrEngine(String),

    #[error("Invalid storage path: {0}")]
    InvalidStoragePath(String),
}

// Convenience type aliases for Results
pub type OcrResult<T> = Result<T, OcrError>;
pub type TranslationResult<T> = Result<T, TranslationError>;
pub type StoreResult<T> = Result<T, StoreError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
