use crate::core::errors::ConfigError;
use std::env;
use std::path::Path;
use tracing::Level;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub log_level: Level,
}

/// OCR engine configuration
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Which adapter to construct at startup ("paddle")
    pub engine: String,
    pub model_path: String,
    pub charset_path: String,
}

/// Translation model configuration
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub encoder_path: String,
    pub decoder_path: String,
    pub tokenizer_path: String,
    pub max_output_tokens: usize,
}

/// Upload validation configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub allowed_extensions: Vec<String>,
    pub max_file_size: usize,
}

/// Filesystem storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub results_dir: String,
    pub cedict_path: String,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub translation: TranslationConfig,
    pub upload: UploadConfig,
    pub storage: StorageConfig,
}

const DEFAULT_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".bmp", ".tiff", ".webp"];
const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10 MiB

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Result<Self, ConfigError> {
        // Parse log level
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect());

        Ok(Self {
            server: ServerConfig {
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8000),
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                log_level,
            },
            ocr: OcrConfig {
                engine: env::var("OCR_ENGINE")
                    .map(|s| s.trim().to_lowercase())
                    .unwrap_or_else(|_| "paddle".to_string()),
                model_path: env::var("OCR_MODEL_PATH")
                    .unwrap_or_else(|_| "models/ocr/rec_ch.onnx".to_string()),
                charset_path: env::var("OCR_CHARSET_PATH")
                    .unwrap_or_else(|_| "models/ocr/ppocr_keys_v1.txt".to_string()),
            },
            translation: TranslationConfig {
                encoder_path: env::var("TRANSLATION_ENCODER_PATH")
                    .unwrap_or_else(|_| "models/opus-mt-zh-en/encoder_model.onnx".to_string()),
                decoder_path: env::var("TRANSLATION_DECODER_PATH")
                    .unwrap_or_else(|_| "models/opus-mt-zh-en/decoder_model.onnx".to_string()),
                tokenizer_path: env::var("TRANSLATION_TOKENIZER_PATH")
                    .unwrap_or_else(|_| "models/opus-mt-zh-en/tokenizer.json".to_string()),
                max_output_tokens: env::var("TRANSLATION_MAX_OUTPUT_TOKENS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(256),
            },
            upload: UploadConfig {
                allowed_extensions,
                max_file_size: env::var("MAX_FILE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_FILE_SIZE),
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                results_dir: env::var("RESULTS_DIR").unwrap_or_else(|_| "results".to_string()),
                cedict_path: env::var("CEDICT_PATH")
                    .unwrap_or_else(|_| "data/cedict_ts.u8".to_string()),
            },
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.upload.max_file_size == 0 {
            return Err(ConfigError::InvalidMaxUploadSize);
        }

        if self.upload.allowed_extensions.is_empty() {
            return Err(ConfigError::EmptyExtensionList);
        }

        if self.ocr.engine != "paddle" {
            return Err(ConfigError::UnknownOcrEngine(self.ocr.engine.clone()));
        }

        // Storage dirs are created at startup; only their parents must exist
        for dir in [&self.storage.upload_dir, &self.storage.results_dir] {
            if let Some(parent) = Path::new(dir).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(ConfigError::InvalidStoragePath(format!(
                        "Parent directory does not exist: {}",
                        parent.display()
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }

    pub fn max_file_size(&self) -> usize {
        self.upload.max_file_size
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.upload.allowed_extensions
    }
}

// Note: No Default implementation because Config::new() can fail
// Users should explicitly call Config::new()? and handle errors

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig {
                port: 8000,
                host: "127.0.0.1".to_string(),
                log_level: Level::INFO,
            },
            ocr: OcrConfig {
                engine: "paddle".to_string(),
                model_path: "models/ocr/rec_ch.onnx".to_string(),
                charset_path: "models/ocr/ppocr_keys_v1.txt".to_string(),
            },
            translation: TranslationConfig {
                encoder_path: "enc.onnx".to_string(),
                decoder_path: "dec.onnx".to_string(),
                tokenizer_path: "tokenizer.json".to_string(),
                max_output_tokens: 256,
            },
            upload: UploadConfig {
                allowed_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
                max_file_size: DEFAULT_MAX_FILE_SIZE,
            },
            storage: StorageConfig {
                upload_dir: "uploads".to_string(),
                results_dir: "results".to_string(),
                cedict_path: "data/cedict_ts.u8".to_string(),
            },
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn zero_max_file_size_rejected() {
        let mut config = base_config();
        config.upload.max_file_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMaxUploadSize)
        ));
    }

    #[test]
    fn unknown_engine_rejected() {
        let mut config = base_config();
        config.ocr.engine = "tesseract".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnknownOcrEngine(_))
        ));
    }

    #[test]
    fn empty_extension_list_rejected() {
        let mut config = base_config();
        config.upload.allowed_extensions.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyExtensionList)
        ));
    }
}
