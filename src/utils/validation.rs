// Upload validation: extension allow-list, size ceiling, magic-byte sniffing
//
// The sniff check is advisory by design: an unidentifiable byte stream is
// accepted (extension and size checks are authoritative), and a mismatch
// between the declared content type and the sniffed one is logged only.
// Only a positive identification as a non-allowed type rejects the upload.

use crate::core::config::UploadConfig;
use crate::core::errors::ValidationError;
use std::path::Path;
use tracing::{debug, warn};

/// Validate an uploaded file before any filesystem side effect.
///
/// Checks, in order: filename present, extension in the allow-list,
/// size within the ceiling, magic-byte signature consistent with an
/// allowed image type.
pub fn validate_upload(
    filename: &str,
    size: usize,
    bytes: &[u8],
    declared_content_type: Option<&str>,
    config: &UploadConfig,
) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::MissingFilename);
    }

    let extension = Path::new(filename)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    if !config.allowed_extensions.contains(&extension) {
        return Err(ValidationError::DisallowedExtension {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                extension
            },
            allowed: config.allowed_extensions.join(", "),
        });
    }

    if size > config.max_file_size {
        return Err(ValidationError::FileTooLarge {
            size,
            max: config.max_file_size,
        });
    }

    match infer::get(bytes) {
        Some(kind) => {
            if !is_allowed_signature(kind.mime_type(), config) {
                warn!(
                    "Rejected upload {}: sniffed signature {} is not an allowed image type",
                    filename,
                    kind.mime_type()
                );
                return Err(ValidationError::DisallowedSignature {
                    detected: kind.mime_type().to_string(),
                });
            }

            // Declared/sniffed mismatch stays advisory
            if let Some(declared) = declared_content_type {
                if !declared.eq_ignore_ascii_case(kind.mime_type()) {
                    warn!(
                        "Content type mismatch for {}: declared {}, sniffed {}",
                        filename,
                        declared,
                        kind.mime_type()
                    );
                }
            }
        }
        None => {
            // Best-effort check must never become a hard failure
            debug!("Could not sniff file signature for {}, accepting", filename);
        }
    }

    Ok(())
}

/// Map the extension allow-list to the image MIME types a sniffed
/// signature may legitimately resolve to
fn is_allowed_signature(mime: &str, config: &UploadConfig) -> bool {
    config.allowed_extensions.iter().any(|ext| {
        matches!(
            (ext.as_str(), mime),
            (".png", "image/png")
                | (".jpg" | ".jpeg", "image/jpeg")
                | (".bmp", "image/bmp")
                | (".tiff", "image/tiff")
                | (".webp", "image/webp")
        )
    })
}
