// Chinese-to-English translation over a Marian seq2seq ONNX export
//
// The model is loaded lazily on the first translation call, not at
// construction, so a process that never translates never pays the load
// cost. Translation is best-effort relative to the rest of the pipeline:
// a model that never loads or a generation failure degrades to a fixed
// sentinel string instead of failing the request.
//
// Lifecycle: Uninitialized -> Ready | LoadFailed (terminal).

use crate::core::config::TranslationConfig;
use crate::core::errors::{TranslationError, TranslationResult};
use anyhow::{Context, Result};
use ort::{session::Session, value::Value};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::Arc;
use tokenizers::Tokenizer;
use tracing::{debug, error, info, warn};

/// Returned when the model never became available
pub const TRANSLATION_UNAVAILABLE: &str = "[Translation unavailable]";

/// Returned when a loaded model failed during generation
pub const TRANSLATION_ERROR: &str = "[Translation error]";

/// Degrading translation contract: blank in, blank out; failures map to
/// sentinel strings, never to errors
pub trait TranslationBackend: Send + Sync {
    fn translate(&self, text: &str) -> String;
}

/// Observable lifecycle phase of the lazily loaded model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslatorPhase {
    Uninitialized,
    Ready,
    LoadFailed,
}

enum TranslatorState {
    Uninitialized,
    Ready(Arc<LoadedModel>),
    LoadFailed,
}

struct LoadedModel {
    tokenizer: Tokenizer,
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    eos_id: i64,
    decoder_start_id: i64,
    max_output_tokens: usize,
}

/// Marian zh->en translator backed by an ONNX encoder/decoder pair
/// with greedy decoding
pub struct MarianTranslator {
    config: TranslationConfig,
    state: RwLock<TranslatorState>,
}

impl MarianTranslator {
    /// Construction never touches the model files; it only records paths
    pub fn new(config: TranslationConfig) -> Self {
        Self {
            config,
            state: RwLock::new(TranslatorState::Uninitialized),
        }
    }

    pub fn phase(&self) -> TranslatorPhase {
        match *self.state.read() {
            TranslatorState::Uninitialized => TranslatorPhase::Uninitialized,
            TranslatorState::Ready(_) => TranslatorPhase::Ready,
            TranslatorState::LoadFailed => TranslatorPhase::LoadFailed,
        }
    }

    /// Check-then-load guard for the lazy transition. Concurrent first
    /// calls serialize on the write lock; only one performs the load.
    fn ensure_loaded(&self) -> Option<Arc<LoadedModel>> {
        if let TranslatorState::Ready(model) = &*self.state.read() {
            return Some(model.clone());
        }

        let mut state = self.state.write();
        match &*state {
            TranslatorState::Ready(model) => Some(model.clone()),
            TranslatorState::LoadFailed => None,
            TranslatorState::Uninitialized => match Self::load(&self.config) {
                Ok(model) => {
                    let model = Arc::new(model);
                    *state = TranslatorState::Ready(model.clone());
                    info!("Translation model loaded successfully");
                    Some(model)
                }
                Err(e) => {
                    error!("Could not load translation model: {:#}", e);
                    *state = TranslatorState::LoadFailed;
                    None
                }
            },
        }
    }

    fn load(config: &TranslationConfig) -> Result<LoadedModel> {
        for path in [
            &config.encoder_path,
            &config.decoder_path,
            &config.tokenizer_path,
        ] {
            if !Path::new(path).exists() {
                anyhow::bail!("Translation model file not found: {}", path);
            }
        }

        info!("Loading translation model from {}", config.encoder_path);

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {}", e))?;

        let encoder = Session::builder()?
            .with_intra_threads(4)?
            .commit_from_file(&config.encoder_path)
            .context("Failed to load translation encoder")?;

        let decoder = Session::builder()?
            .with_intra_threads(4)?
            .commit_from_file(&config.decoder_path)
            .context("Failed to load translation decoder")?;

        let eos_id = tokenizer.token_to_id("</s>").unwrap_or(0) as i64;
        // Marian uses the pad token as the decoder start token
        let decoder_start_id = tokenizer
            .token_to_id("<pad>")
            .map(|id| id as i64)
            .unwrap_or(eos_id);

        Ok(LoadedModel {
            tokenizer,
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            eos_id,
            decoder_start_id,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn generate(model: &LoadedModel, text: &str) -> TranslationResult<String> {
        let encoding = model
            .tokenizer
            .encode(text, true)
            .map_err(|e| TranslationError::Tokenizer(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        if input_ids.is_empty() {
            return Err(TranslationError::EmptyOutput);
        }
        let src_len = input_ids.len();
        let attention_mask = vec![1i64; src_len];

        // Encode the source sentence once
        let (hidden_shape, hidden_data) = {
            let ids = Value::from_array(([1usize, src_len], input_ids))?;
            let mask = Value::from_array(([1usize, src_len], attention_mask.clone()))?;

            let mut encoder = model.encoder.lock();
            let outputs = encoder.run(ort::inputs![
                "input_ids" => ids,
                "attention_mask" => mask
            ])?;

            let first_key = outputs
                .keys()
                .next()
                .ok_or(TranslationError::EmptyOutput)?;
            let (shape, data) = outputs[first_key].try_extract_tensor::<f32>()?;
            let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
            (dims, data.to_vec())
        };

        if hidden_shape.len() != 3 {
            return Err(TranslationError::EmptyOutput);
        }
        let hidden_dims: [usize; 3] = [hidden_shape[0], hidden_shape[1], hidden_shape[2]];

        // Greedy decode until EOS or the output length ceiling
        let mut generated: Vec<i64> = vec![model.decoder_start_id];
        loop {
            let cur_len = generated.len();
            let next_id = {
                let dec_ids = Value::from_array(([1usize, cur_len], generated.clone()))?;
                let enc_mask = Value::from_array(([1usize, src_len], attention_mask.clone()))?;
                let enc_hidden = Value::from_array((hidden_dims, hidden_data.clone()))?;

                let mut decoder = model.decoder.lock();
                let outputs = decoder.run(ort::inputs![
                    "input_ids" => dec_ids,
                    "encoder_attention_mask" => enc_mask,
                    "encoder_hidden_states" => enc_hidden
                ])?;

                let first_key = outputs
                    .keys()
                    .next()
                    .ok_or(TranslationError::EmptyOutput)?;
                let (shape, logits) = outputs[first_key].try_extract_tensor::<f32>()?;
                let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
                if dims.len() != 3 {
                    return Err(TranslationError::EmptyOutput);
                }

                // Argmax over the vocabulary at the last position
                let vocab_size = dims[2];
                let offset = (dims[1] - 1) * vocab_size;
                let last = &logits[offset..offset + vocab_size];
                last.iter()
                    .enumerate()
                    .max_by(|a, b| a.1.total_cmp(b.1))
                    .map(|(idx, _)| idx as i64)
                    .ok_or(TranslationError::EmptyOutput)?
            };

            if next_id == model.eos_id {
                break;
            }
            generated.push(next_id);

            if generated.len() >= model.max_output_tokens {
                debug!("Translation hit the output token ceiling");
                break;
            }
        }

        // Drop the decoder start token before detokenizing
        let output_ids: Vec<u32> = generated[1..].iter().map(|&id| id as u32).collect();
        let translation = model
            .tokenizer
            .decode(&output_ids, true)
            .map_err(|e| TranslationError::Tokenizer(e.to_string()))?;

        Ok(translation.trim().to_string())
    }
}

impl TranslationBackend for MarianTranslator {
    fn translate(&self, text: &str) -> String {
        // Blank input short-circuits without touching the model
        if text.trim().is_empty() {
            return String::new();
        }

        let Some(model) = self.ensure_loaded() else {
            warn!("Translation model not loaded");
            return TRANSLATION_UNAVAILABLE.to_string();
        };

        match Self::generate(&model, text) {
            Ok(translation) => translation,
            Err(e) => {
                error!("Translation error: {}", e);
                TRANSLATION_ERROR.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_model_config() -> TranslationConfig {
        TranslationConfig {
            encoder_path: "/nonexistent/encoder.onnx".to_string(),
            decoder_path: "/nonexistent/decoder.onnx".to_string(),
            tokenizer_path: "/nonexistent/tokenizer.json".to_string(),
            max_output_tokens: 32,
        }
    }

    #[test]
    fn construction_does_not_load() {
        let translator = MarianTranslator::new(missing_model_config());
        assert_eq!(translator.phase(), TranslatorPhase::Uninitialized);
    }

    #[test]
    fn blank_input_short_circuits_without_loading() {
        let translator = MarianTranslator::new(missing_model_config());
        assert_eq!(translator.translate(""), "");
        assert_eq!(translator.translate("   \n"), "");
        // The model was never touched
        assert_eq!(translator.phase(), TranslatorPhase::Uninitialized);
    }

    #[test]
    fn failed_load_degrades_to_sentinel() {
        let translator = MarianTranslator::new(missing_model_config());
        assert_eq!(translator.translate("你好"), TRANSLATION_UNAVAILABLE);
        assert_eq!(translator.phase(), TranslatorPhase::LoadFailed);
    }

    #[test]
    fn load_failure_is_terminal() {
        let translator = MarianTranslator::new(missing_model_config());
        let _ = translator.translate("你好");
        // Subsequent calls stay in LoadFailed and keep returning the sentinel
        assert_eq!(translator.translate("世界"), TRANSLATION_UNAVAILABLE);
        assert_eq!(translator.phase(), TranslatorPhase::LoadFailed);
    }
}
