//! ONNX Runtime backend
//!
//! Input: one `[1, 11]` f32 tensor built by `FeatureRecord::to_model_input`.
//! Output: the `probabilities` tensor when the graph has one, else the last
//! output. A `[1, 2]` output is read at `positive_class_index`, a `[1, 1]`
//! output is taken as the positive-class probability directly.
//!
//! Column names come from an optional sidecar manifest next to the artifact
//! (`model.onnx` → `model.json`). Without it the artifact is assumed to use
//! the built-in layout.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::inference::{checked_probability, ModelLoadError, ModelMetadata, PredictError, RiskModel};
use crate::logic::features::layout::{LayoutInfo, FEATURE_COUNT};
use crate::logic::features::record::FeatureRecord;

pub const MODEL_TYPE: &str = "onnx";

/// Preferred output name for classifier probabilities
const PROBABILITIES_OUTPUT: &str = "probabilities";

/// Sidecar manifest describing how the artifact was trained
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxManifest {
    pub feature_names: Vec<String>,
    #[serde(default = "default_positive_class")]
    pub positive_class_index: usize,
}

fn default_positive_class() -> usize {
    1
}

impl Default for OnnxManifest {
    fn default() -> Self {
        Self {
            feature_names: LayoutInfo::current().feature_names,
            positive_class_index: default_positive_class(),
        }
    }
}

impl OnnxManifest {
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("json")
    }

    /// Read the sidecar if present, defaults otherwise
    pub fn load_for(model_path: &Path) -> Result<Self, ModelLoadError> {
        let sidecar = Self::sidecar_path(model_path);
        if !sidecar.exists() {
            log::debug!("No manifest at {}, using built-in layout", sidecar.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&sidecar)
            .map_err(|e| ModelLoadError::new(&sidecar, e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| ModelLoadError::new(&sidecar, format!("invalid manifest: {}", e)))
    }
}

/// ONNX classifier session.
///
/// `Session::run` needs exclusive access, so concurrent predictions queue
/// on the mutex.
pub struct OnnxRiskModel {
    session: Mutex<Session>,
    output_name: String,
    manifest: OnnxManifest,
    layout: LayoutInfo,
    metadata: ModelMetadata,
}

impl OnnxRiskModel {
    pub fn load(model_path: &Path) -> Result<Self, ModelLoadError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        let manifest = OnnxManifest::load_for(model_path)?;

        let session = Session::builder()
            .map_err(|e| ModelLoadError::new(model_path, format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::new(model_path, format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelLoadError::new(model_path, format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROBABILITIES_OUTPUT)
            .or_else(|| session.outputs.last())
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelLoadError::new(model_path, "No output defined"))?;

        let layout = LayoutInfo::from_names(&manifest.feature_names);
        let metadata = ModelMetadata::new(model_path, MODEL_TYPE, &layout);

        log::info!(
            "ONNX model loaded successfully (output '{}', positive class {})",
            output_name,
            manifest.positive_class_index
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            manifest,
            layout,
            metadata,
        })
    }
}

impl RiskModel for OnnxRiskModel {
    fn predict(&self, record: &FeatureRecord) -> Result<f64, PredictError> {
        record.validate_against(self.layout.hash)?;

        let start_time = std::time::Instant::now();

        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), record.to_model_input().to_vec())
            .map_err(|e| PredictError::Inference(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| PredictError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| PredictError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| PredictError::Inference("No output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictError::Inference(format!("Extract error: {}", e)))?;

        let data = output_tensor.1;
        let value = match data.len() {
            0 => return Err(PredictError::Inference("Empty output".to_string())),
            1 => data[0],
            _ => *data.get(self.manifest.positive_class_index).ok_or_else(|| {
                PredictError::Inference(format!(
                    "positive class index {} out of range for {} outputs",
                    self.manifest.positive_class_index,
                    data.len()
                ))
            })?,
        };

        log::trace!("ONNX inference took {}us", start_time.elapsed().as_micros());
        checked_probability(f64::from(value))
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            OnnxManifest::sidecar_path(Path::new("/models/catboost.onnx")),
            PathBuf::from("/models/catboost.json")
        );
    }

    #[test]
    fn test_manifest_defaults_without_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = OnnxManifest::load_for(&dir.path().join("model.onnx")).unwrap();
        assert_eq!(manifest.positive_class_index, 1);
        assert!(LayoutInfo::from_names(&manifest.feature_names).is_current());
    }

    #[test]
    fn test_manifest_from_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("model.json"),
            r#"{ "feature_names": ["Age", "CGPA"], "positive_class_index": 0 }"#,
        )
        .unwrap();

        let manifest = OnnxManifest::load_for(&dir.path().join("model.onnx")).unwrap();
        assert_eq!(manifest.positive_class_index, 0);
        assert_eq!(manifest.feature_names, vec!["Age", "CGPA"]);
    }

    #[test]
    fn test_invalid_onnx_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.onnx");
        std::fs::write(&path, b"not a protobuf").unwrap();
        assert!(OnnxRiskModel::load(&path).is_err());
    }
}
