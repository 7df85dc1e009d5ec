//! ONNX Runtime inference engine with support for session pooling.
//!
//! Both classifier architectures are served from ONNX artifacts through the
//! same engine; the adapters differ only in preprocessing and output
//! interpretation. Sessions are pooled behind mutexes so a single adapter
//! never runs concurrent calls into one session, while concurrent requests
//! can proceed against different pool entries.

use crate::core::errors::{ScanError, ScanResult};
use crate::core::{Tensor2D, Tensor4D};
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct OrtInfer {
    sessions: Vec<Mutex<Session>>,
    next_idx: std::sync::atomic::AtomicUsize,
    input_name: String,
    output_name: Option<String>,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates a new OrtInfer instance with a single session.
    ///
    /// When `input_name` is not provided, the input tensor name is
    /// discovered from session metadata; Keras and PyTorch exports name
    /// their inputs differently, so discovery is the common path.
    pub fn new(model_path: impl AsRef<Path>, input_name: Option<&str>) -> ScanResult<Self> {
        Self::with_pool(model_path, input_name, 1)
    }

    /// Creates a new OrtInfer instance with a pool of identical sessions.
    ///
    /// # Arguments
    ///
    /// * `model_path` - Path to the ONNX model file.
    /// * `input_name` - Optional input tensor name; discovered when `None`.
    /// * `pool_size` - Number of sessions to create (minimum 1).
    pub fn with_pool(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
        pool_size: usize,
    ) -> ScanResult<Self> {
        let path = model_path.as_ref();
        let pool_size = pool_size.max(1);

        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = Session::builder()?
                .with_log_level(LogLevel::Error)
                .map_err(ort::Error::from)?
                .commit_from_file(path)
                .map_err(|e| {
                    ScanError::model_load(
                        path,
                        "failed to create ONNX session; verify model path and format",
                        Some(e),
                    )
                })?;
            sessions.push(Mutex::new(session));
        }

        let input_name = match input_name {
            Some(name) => name.to_string(),
            None => Self::detect_input_name(&sessions[0], path)?,
        };

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        Ok(OrtInfer {
            sessions,
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name,
            output_name: None,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Reads the first input tensor name from session metadata.
    fn detect_input_name(session: &Mutex<Session>, path: &Path) -> ScanResult<String> {
        let session = session.lock().map_err(|_| {
            ScanError::invalid_input("failed to acquire session lock during input discovery")
        })?;
        session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| {
                ScanError::model_load(
                    path,
                    "model declares no inputs; the artifact may be invalid or corrupted",
                    None::<std::io::Error>,
                )
            })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Attempts to retrieve the primary input tensor shape from the first session.
    ///
    /// Returns a vector of dimensions if available. Dynamic dimensions
    /// (e.g., -1) are returned as-is.
    pub fn primary_input_shape(&self) -> Option<Vec<i64>> {
        let session_mutex = self.sessions.first()?;
        let session_guard = session_mutex.lock().ok()?;
        let input = session_guard.inputs().first()?;
        match input.dtype() {
            ValueType::Tensor { shape, .. } => Some(shape.iter().copied().collect()),
            _ => None,
        }
    }

    /// Returns the configured or discovered output tensor name.
    fn get_output_name(&self) -> ScanResult<String> {
        if let Some(ref name) = self.output_name {
            Ok(name.clone())
        } else {
            let session = self.sessions[0].lock().map_err(|_| {
                ScanError::invalid_input("failed to acquire session lock during output discovery")
            })?;
            session
                .outputs()
                .first()
                .map(|output| output.name().to_string())
                .ok_or_else(|| {
                    ScanError::invalid_input(
                        "no outputs available in session - model may be invalid or corrupted",
                    )
                })
        }
    }

    /// Runs inference and returns the output as a 2D tensor
    /// (batch_size x num_classes).
    ///
    /// # Arguments
    ///
    /// * `x` - The preprocessed input batch.
    ///
    /// # Returns
    ///
    /// The classifier output, or an error if the session fails or the
    /// output is not a 2D tensor of matching size.
    pub fn infer_2d(&self, x: &Tensor4D) -> ScanResult<Tensor2D> {
        let input_shape = x.shape().to_vec();
        let output_name = self.get_output_name()?;

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ScanError::prediction(
                &self.model_name,
                &format!("failed to convert input tensor with shape {input_shape:?}"),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            ScanError::invalid_input(format!(
                "failed to acquire session lock for session {}/{}",
                idx,
                self.sessions.len()
            ))
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            ScanError::prediction(
                &self.model_name,
                &format!(
                    "ONNX Runtime inference failed with input '{}' -> output '{}'",
                    self.input_name, output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ScanError::prediction(
                    &self.model_name,
                    &format!("failed to extract output tensor '{output_name}' as f32"),
                    e,
                )
            })?;

        if output_shape.len() != 2 {
            return Err(ScanError::invalid_input(format!(
                "model '{}': expected 2D output tensor, got {}D with shape {:?}",
                self.model_name,
                output_shape.len(),
                output_shape
            )));
        }

        let rows = output_shape[0] as usize;
        let cols = output_shape[1] as usize;
        if output_data.len() != rows * cols {
            return Err(ScanError::invalid_input(format!(
                "output data size mismatch: expected {}, got {}",
                rows * cols,
                output_data.len()
            )));
        }

        Ok(Tensor2D::from_shape_vec(
            (rows, cols),
            output_data.to_vec(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_missing_model_file() {
        let result = OrtInfer::new("dummy_path.onnx", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_pool_size_is_clamped_to_one() {
        // A missing file still fails, but pool size 0 must not panic first.
        let result = OrtInfer::with_pool("dummy_path.onnx", None, 0);
        assert!(result.is_err());
    }
}
