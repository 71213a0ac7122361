// Processing pipeline: main request workflow coordinator
//
// Sequences validation -> save -> OCR -> segmentation -> enrichment ->
// translation -> persistence, and owns the mapping from every failure
// mode to an HTTP status and structured error payload. Segmentation,
// enrichment, and translation degrade per-step and never fail a request;
// only validation, OCR engine failure, and unrecoverable I/O surface as
// error responses. When processing fails outright after the upload was
// written, the saved file is deleted before the error is returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::core::config::Config;
use crate::core::errors::{OcrError, StoreError, ValidationError};
use crate::core::types::{
    ErrorBody, ProcessResponse, ProcessingResult, NO_TEXT_MESSAGE,
};
use crate::services::dictionary::CedictDictionary;
use crate::services::enrichment::enrich_characters;
use crate::services::ocr::TextRecognizer;
use crate::services::segmentation::Segmenter;
use crate::services::translation::TranslationBackend;
use crate::storage::ResultStore;
use crate::utils::{generate_image_id, validate_upload};

/// HTTP-mapped pipeline failure: status, stable error kind, and a
/// structured `{error, message, detail?}` body
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    pub fn service_unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            kind: "ServiceUnavailable",
            message: "OCR processor is not available".to_string(),
            detail: Some("OCR engine is not installed or failed to initialize".to_string()),
        }
    }

    pub fn missing_file() -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "MissingFile",
            message: "No file provided".to_string(),
            detail: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "InvalidRequest",
            message: message.into(),
            detail: None,
        }
    }

    pub fn not_found(image_id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: "NotFound",
            message: format!("Results not found for image_id: {image_id}"),
            detail: None,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "ProcessingError",
            message: "An error occurred while processing the image".to_string(),
            detail: Some(detail.into()),
        }
    }

    fn from_validation(err: ValidationError, filename: &str) -> Self {
        let kind = match &err {
            ValidationError::MissingFilename | ValidationError::DisallowedExtension { .. } => {
                "InvalidFileType"
            }
            ValidationError::FileTooLarge { .. } => "FileTooLarge",
            ValidationError::DisallowedSignature { .. } => "InvalidMimeType",
        };
        Self {
            status: StatusCode::BAD_REQUEST,
            kind,
            message: err.to_string(),
            detail: Some(format!("Filename: {filename}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind.to_string(),
            message: self.message,
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Request orchestrator. Collaborators are constructed once at startup
/// and injected; the pipeline itself holds no mutable state.
pub struct Pipeline {
    config: Arc<Config>,
    recognizer: Option<Arc<dyn TextRecognizer>>,
    segmenter: Segmenter,
    dictionary: CedictDictionary,
    translator: Arc<dyn TranslationBackend>,
    store: ResultStore,
    /// Raw failure detail leaks to clients only when debug logging is on
    debug_detail: bool,
}

impl Pipeline {
    pub fn new(
        config: Arc<Config>,
        recognizer: Option<Arc<dyn TextRecognizer>>,
        segmenter: Segmenter,
        dictionary: CedictDictionary,
        translator: Arc<dyn TranslationBackend>,
        store: ResultStore,
    ) -> Self {
        let debug_detail = matches!(
            config.log_level(),
            tracing::Level::DEBUG | tracing::Level::TRACE
        );
        Self {
            config,
            recognizer,
            segmenter,
            dictionary,
            translator,
            store,
            debug_detail,
        }
    }

    pub fn ocr_available(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Run the full upload workflow. Validation failures abort before any
    /// filesystem side effect; failures after the upload is saved clean
    /// the saved file up before surfacing.
    pub fn process_upload(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<ProcessResponse, ApiError> {
        info!(
            "Received upload request - filename: {}, content_type: {:?}, size: {}",
            filename,
            content_type,
            bytes.len()
        );

        let Some(recognizer) = &self.recognizer else {
            error!("OCR processor not available");
            return Err(ApiError::service_unavailable());
        };

        validate_upload(filename, bytes.len(), bytes, content_type, &self.config.upload)
            .map_err(|e| {
                warn!("File validation failed: {}", e);
                ApiError::from_validation(e, filename)
            })?;

        let image_id = generate_image_id();
        info!("Processing image {}", image_id);

        self.store
            .save_upload(&image_id, bytes)
            .map_err(|e| self.engine_failure("Failed to save upload", e.to_string()))?;

        let recognized = match recognizer.recognize(bytes) {
            Ok(recognized) => recognized,
            Err(OcrError::InvalidImage(e)) => {
                error!("Image format error for {}: {}", image_id, e);
                self.store.delete_upload(&image_id);
                return Err(ApiError {
                    status: StatusCode::BAD_REQUEST,
                    kind: "InvalidImageFormat",
                    message: "The uploaded file is not a valid image".to_string(),
                    detail: Some(e.to_string()),
                });
            }
            Err(e) => {
                error!("OCR processing failed for {}: {}", image_id, e);
                self.store.delete_upload(&image_id);
                return Err(ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "OCRProcessingError",
                    message:
                        "OCR processing failed. Please ensure the image contains readable text."
                            .to_string(),
                    detail: self.debug_detail.then(|| e.to_string()),
                });
            }
        };

        // Absence of Chinese text is a valid outcome: persist a minimal
        // sentinel result so /results/{id} behaves consistently
        if recognized.is_empty() {
            info!("No text detected in image {}", image_id);
            let result = ProcessingResult::no_text(image_id);
            self.store.put(&result);
            return Ok(ProcessResponse::from_result(result, NO_TEXT_MESSAGE));
        }

        info!(
            "OCR completed for {}: {} characters",
            image_id,
            recognized.characters.len()
        );

        let segmented_text = self.segmenter.segment(&recognized.text);
        let characters = enrich_characters(&recognized.characters, &self.dictionary);
        let translation = self.translator.translate(&recognized.text);

        let result = ProcessingResult {
            image_id: image_id.clone(),
            original_text: recognized.text,
            segmented_text,
            characters,
            translation,
        };

        // Best-effort persistence; the in-memory result is still returned
        self.store.put(&result);

        info!("Successfully processed image {}", image_id);
        Ok(ProcessResponse::from_result(
            result,
            "Image processed successfully",
        ))
    }

    /// Retrieve a previously stored result by id
    pub fn fetch_result(&self, image_id: &str) -> Result<ProcessingResult, ApiError> {
        match self.store.get(image_id) {
            Ok(result) => {
                info!("Retrieved results for {}", image_id);
                Ok(result)
            }
            Err(StoreError::NotFound(_)) => {
                warn!("Results not found for image_id: {}", image_id);
                Err(ApiError::not_found(image_id))
            }
            Err(StoreError::Corrupt { source, .. }) => {
                error!("Invalid JSON in results file for {}: {}", image_id, source);
                Err(ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "InvalidData",
                    message: "Results file contains invalid data".to_string(),
                    detail: Some(source.to_string()),
                })
            }
            Err(StoreError::Io { source, .. }) => {
                error!("Error reading results for {}: {}", image_id, source);
                Err(ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "ReadError",
                    message: "Failed to read results".to_string(),
                    detail: Some(source.to_string()),
                })
            }
        }
    }

    fn engine_failure(&self, message: &str, detail: String) -> ApiError {
        error!("{}: {}", message, detail);
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "ProcessingError",
            message: message.to_string(),
            detail: self.debug_detail.then_some(detail),
        }
    }
}
