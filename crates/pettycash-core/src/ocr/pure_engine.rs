//! Built-in recognizer using `pure-onnx-ocr`.

use std::cmp::Ordering;
use std::time::Instant;

use image::GenericImageView;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::TextRecognizer;

/// Pixel height of one reading-order band.
const LINE_BAND: f32 = 20.0;

/// Recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrRecognizer {
    /// Load detection, recognition and dictionary files named in the config.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.exists() {
                return Err(OcrError::ModelLoad(format!(
                    "model file not found: {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
        })
    }
}

impl TextRecognizer for PureOcrRecognizer {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let start = Instant::now();
        let image = image::load_from_memory(image)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;
        let (width, height) = image.dimensions();
        debug!("Recognizing {}x{} image", width, height);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        let mut regions: Vec<(f32, f32, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                (x, y, text)
            })
            .collect();

        // Top to bottom in bands, then left to right.
        regions.sort_by(|a, b| {
            let band_a = (a.1 / LINE_BAND) as i32;
            let band_b = (b.1 / LINE_BAND) as i32;
            band_a
                .cmp(&band_b)
                .then_with(|| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
        });

        let text = join_bands(&regions);

        info!(
            "OCR complete: {} regions in {}ms",
            regions.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}

/// Smallest x and y of a region's quadrilateral.
fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
    polygon
        .exterior()
        .coords()
        .take(4)
        .fold((f32::MAX, f32::MAX), |(x, y), c| {
            (x.min(c.x as f32), y.min(c.y as f32))
        })
}

/// Regions sharing a band form one line, separated by wide gaps so the
/// normalizer can collapse them.
fn join_bands(regions: &[(f32, f32, String)]) -> String {
    let mut out = String::new();
    let mut current_band = None;

    for (_, y, text) in regions {
        let band = (*y / LINE_BAND) as i32;
        match current_band {
            Some(b) if b == band => out.push_str("  "),
            Some(_) => out.push('\n'),
            None => {}
        }
        out.push_str(text);
        current_band = Some(band);
    }

    out
}
