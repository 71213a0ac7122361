// Main entry point for the Chinese OCR processing backend

use runex_ocr::{
    core::Config,
    orchestration::Pipeline,
    services::{
        dictionary::CedictDictionary, ocr, segmentation::Segmenter, translation::MarianTranslator,
        translation::TranslationBackend,
    },
    storage::ResultStore,
};

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new().expect("Failed to load configuration"));

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "runex_ocr={},ort=off",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("=== RUNE-X OCR API ===");

    // OCR engine: a failed initialization leaves the service up but
    // answering /process with 503
    let recognizer = match ocr::build_recognizer(&config.ocr) {
        Ok(recognizer) => {
            info!(
                "OCR processor initialized successfully with engine: {}",
                config.ocr.engine
            );
            Some(recognizer)
        }
        Err(e) => {
            error!("Failed to initialize OCR processor: {:#}", e);
            None
        }
    };

    // Translator construction is cheap; the model loads lazily on first use
    let translator: Arc<dyn TranslationBackend> =
        Arc::new(MarianTranslator::new(config.translation.clone()));
    info!("Translator initialized (model loads on first translation)");

    // CEDICT dictionary: shared read-only across all requests
    let dictionary = match CedictDictionary::load(Path::new(&config.storage.cedict_path)) {
        Ok(dictionary) => dictionary,
        Err(e) => {
            error!("Failed to load CEDICT dictionary: {:#}", e);
            CedictDictionary::parse("")
        }
    };
    if dictionary.is_empty() {
        warn!("Dictionary is empty, English glosses will be unavailable");
    }

    let segmenter = Segmenter::new();

    let store = ResultStore::new(&config.storage.upload_dir, &config.storage.results_dir)?;

    let pipeline = Arc::new(Pipeline::new(
        config.clone(),
        recognizer,
        segmenter,
        dictionary,
        translator,
        store,
    ));

    let app = runex_ocr::api::app(pipeline, &config);

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("{}", "=".repeat(60));
    info!("Server starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /                   - Root endpoint");
    info!("  GET  /health             - Health check");
    info!("  POST /process            - Process image (multipart/form-data)");
    info!("  GET  /results/:image_id  - Retrieve stored results");
    info!("{}", "=".repeat(60));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
