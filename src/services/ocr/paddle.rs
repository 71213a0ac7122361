// PaddleOCR-style recognition adapter
//
// CPU-only ONNX inference over a PP-OCR CTC recognition model. The engine
// itself is opaque: this adapter handles image normalization, tensor
// layout, and greedy CTC decoding of the output logits, then applies the
// shared Han filter.

use crate::core::errors::{OcrError, OcrResult};
use crate::core::types::RecognizedText;
use anyhow::{Context, Result};
use image::DynamicImage;
use ndarray::Array4;
use ort::{session::Session, value::Value};
use parking_lot::Mutex;
use std::path::Path;
use tracing::{debug, info};

/// PP-OCR recognition model input height
const TARGET_HEIGHT: u32 = 48;
const MIN_WIDTH: u32 = 16;

/// CTC blank token index in PP-OCR output
const BLANK_INDEX: usize = 0;

/// ONNX-backed recognizer for the PaddleOCR Chinese recognition model
pub struct PaddleRecognizer {
    session: Mutex<Session>,
    charset: Vec<String>,
}

impl PaddleRecognizer {
    pub fn new(model_path: &Path, charset_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            anyhow::bail!(
                "OCR model not found at: {}. OCR is unavailable.",
                model_path.display()
            );
        }
        if !charset_path.exists() {
            anyhow::bail!(
                "OCR charset not found at: {}. OCR is unavailable.",
                charset_path.display()
            );
        }

        info!("Loading OCR model from {}", model_path.display());

        let session = Session::builder()?
            .with_intra_threads(4)?
            .commit_from_file(model_path)
            .context("Failed to load OCR ONNX model")?;

        let charset = Self::load_charset(charset_path)?;

        info!(
            "OCR engine initialized: charset_size={}, blank_index={}",
            charset.len(),
            BLANK_INDEX
        );

        Ok(Self {
            session: Mutex::new(session),
            charset,
        })
    }

    /// Load the PP-OCR keys file: one character per line, 1-based
    /// (index 0 is the CTC blank), with a trailing space entry
    fn load_charset(charset_path: &Path) -> Result<Vec<String>> {
        let content =
            std::fs::read_to_string(charset_path).context("Failed to read OCR charset file")?;

        // Index 0 reserved for the blank token
        let mut charset = vec![String::new()];
        charset.extend(content.lines().map(|line| line.to_string()));
        charset.push(" ".to_string());

        debug!("Loaded {} charset entries", charset.len());
        Ok(charset)
    }

    /// Preprocess image for the recognition model:
    /// - resize to target height keeping aspect ratio
    /// - normalize RGB to [-1, 1]
    /// - layout as [1, 3, H, W]
    fn preprocess(image: &DynamicImage) -> Array4<f32> {
        let (w, h) = (image.width(), image.height());

        let scale = TARGET_HEIGHT as f32 / h as f32;
        let new_w = ((w as f32 * scale) as u32).max(MIN_WIDTH);

        let resized = image.resize_exact(
            new_w,
            TARGET_HEIGHT,
            image::imageops::FilterType::Lanczos3,
        );
        let rgb = resized.to_rgb8();

        let mut tensor = Array4::<f32>::zeros((1, 3, TARGET_HEIGHT as usize, new_w as usize));
        for y in 0..TARGET_HEIGHT as usize {
            for x in 0..new_w as usize {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                tensor[[0, 0, y, x]] = pixel[0] as f32 / 255.0 * 2.0 - 1.0;
                tensor[[0, 1, y, x]] = pixel[1] as f32 / 255.0 * 2.0 - 1.0;
                tensor[[0, 2, y, x]] = pixel[2] as f32 / 255.0 * 2.0 - 1.0;
            }
        }

        tensor
    }

    /// Greedy CTC decode over [T, V] probabilities:
    /// collapse repeats, drop blanks, keep the winning probability as
    /// the per-character confidence
    fn ctc_decode(
        probs: &[f32],
        seq_len: usize,
        vocab_size: usize,
        charset: &[String],
    ) -> Vec<(char, f32)> {
        let mut decoded = Vec::new();
        let mut prev_idx: Option<usize> = None;

        for t in 0..seq_len {
            let offset = t * vocab_size;
            let mut best_idx = 0;
            let mut best_val = f32::NEG_INFINITY;
            for i in 0..vocab_size {
                let val = probs[offset + i];
                if val > best_val {
                    best_val = val;
                    best_idx = i;
                }
            }

            if best_idx != BLANK_INDEX && Some(best_idx) != prev_idx {
                if let Some(entry) = charset.get(best_idx) {
                    if let Some(c) = entry.chars().next() {
                        decoded.push((c, best_val.clamp(0.0, 1.0)));
                    }
                }
            }

            prev_idx = Some(best_idx);
        }

        decoded
    }

    fn run_inference(&self, tensor: Array4<f32>) -> OcrResult<Vec<(char, f32)>> {
        let shape: Vec<usize> = tensor.shape().to_vec();
        let (data, _offset) = tensor.into_raw_vec_and_offset();

        let shape_arr: [usize; 4] = [shape[0], shape[1], shape[2], shape[3]];
        let input = Value::from_array((shape_arr, data))?;

        // Extract output data while the session lock is held, then release
        let (dims, probs) = {
            let mut session = self.session.lock();
            let outputs = session.run(ort::inputs!["x" => input])?;

            let first_key = outputs
                .keys()
                .next()
                .ok_or_else(|| OcrError::Engine("No outputs from OCR model".to_string()))?;
            let (shape, data) = outputs[first_key].try_extract_tensor::<f32>()?;

            let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
            (dims, data.to_vec())
        };

        // Output is [1, T, V]
        let (seq_len, vocab_size) = match dims.len() {
            3 => (dims[1], dims[2]),
            2 => (dims[0], dims[1]),
            _ => {
                return Err(OcrError::Engine(format!(
                    "Unexpected OCR output shape: {:?}",
                    dims
                )))
            }
        };

        Ok(Self::ctc_decode(&probs, seq_len, vocab_size, &self.charset))
    }
}

impl super::TextRecognizer for PaddleRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> OcrResult<RecognizedText> {
        // Undecodable bytes are a client error, distinct from engine failure
        let image = image::load_from_memory(image_bytes)?;

        let tensor = Self::preprocess(&image);
        let raw = self.run_inference(tensor)?;

        let raw_count = raw.len();
        let recognized = super::filter_to_han(raw);

        if recognized.is_empty() && raw_count > 0 {
            debug!(
                "OCR produced {} characters but none were Han after filtering",
                raw_count
            );
        }

        Ok(recognized)
    }
}
