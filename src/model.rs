use std::{
    path::Path,
    sync::{Mutex, Once, OnceLock, PoisonError},
};

use ndarray::Array4;
use ort::{session::Session, value::Tensor};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{config::ModelConfig, download::ensure_model, error::BotError};

/// Output of one forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    /// Raw policy scores, one per index of the move encoding.
    pub policy: Vec<f32>,
    /// Position evaluation for the side to move.
    pub value: f32,
}

/// A network mapping an encoded board to policy scores and a value.
///
/// Inference must not change the model: calling `infer` twice with the
/// same board yields the same result.
pub trait PolicyModel {
    fn infer(&mut self, board: Array4<f32>) -> Result<Inference, BotError>;
}

impl<M: PolicyModel + ?Sized> PolicyModel for &mut M {
    fn infer(&mut self, board: Array4<f32>) -> Result<Inference, BotError> {
        (**self).infer(board)
    }
}

/// Serializes inference on a model shared between games.
impl<M: PolicyModel> PolicyModel for &Mutex<M> {
    fn infer(&mut self, board: Array4<f32>) -> Result<Inference, BotError> {
        // Inference leaves no partial state behind, so a poisoned lock is
        // still usable.
        let mut model = self.lock().unwrap_or_else(PoisonError::into_inner);
        model.infer(board)
    }
}

/// Which alternative runtime executes the ONNX graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Tract,
    Candle,
}

static BACKEND: Once = Once::new();

/// Install the runtime backend. Only the first call has any effect;
/// returns whether this call was the one that installed it.
pub fn install_backend(backend: Backend) -> bool {
    let mut installed = false;
    BACKEND.call_once(|| {
        installed = true;
        info!(?backend, "installing ONNX backend");
        match backend {
            Backend::Tract => ort::set_api(ort_tract::api()),
            Backend::Candle => ort::set_api(ort_candle::api()),
        };
    });
    installed
}

/// Policy network running in an ONNX Runtime session.
pub struct OnnxPolicyModel {
    session: Session,
    input_name: String,
    policy_output: String,
    value_output: String,
}

impl OnnxPolicyModel {
    /// Initialize from a local `.onnx` file path with the default
    /// tensor names.
    ///
    /// Installs the default backend unless one is already installed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BotError> {
        install_backend(Backend::default());
        let session = Session::builder()?.commit_from_file(path)?;

        Ok(Self::with_session(session, &ModelConfig::default()))
    }

    /// Initialize from raw bytes with the default tensor names.
    ///
    /// Installs the default backend unless one is already installed.
    pub fn from_memory(model_bytes: &[u8]) -> Result<Self, BotError> {
        install_backend(Backend::default());
        let session = Session::builder()?.commit_from_memory(model_bytes)?;

        Ok(Self::with_session(session, &ModelConfig::default()))
    }

    /// Install the configured backend, fetch the model file if needed
    /// and open a session on it.
    pub fn load(config: &ModelConfig) -> Result<Self, BotError> {
        install_backend(config.backend);
        let path = ensure_model(config)?;

        info!(path = %path.display(), "loading policy model");
        let session = Session::builder()?.commit_from_file(&path)?;

        Ok(Self::with_session(session, config))
    }

    fn with_session(session: Session, config: &ModelConfig) -> Self {
        Self {
            session,
            input_name: config.input_name.clone(),
            policy_output: config.policy_output.clone(),
            value_output: config.value_output.clone(),
        }
    }
}

impl PolicyModel for OnnxPolicyModel {
    fn infer(&mut self, board: Array4<f32>) -> Result<Inference, BotError> {
        let outputs = self.session.run(ort::inputs! {
            self.input_name.as_str() => Tensor::from_array(board)?,
        })?;

        let policy = outputs
            .get(self.policy_output.as_str())
            .ok_or_else(|| BotError::MissingOutput(self.policy_output.clone()))?
            .try_extract_array::<f32>()?
            .iter()
            .copied()
            .collect::<Vec<f32>>();

        let value = outputs
            .get(self.value_output.as_str())
            .ok_or_else(|| BotError::MissingOutput(self.value_output.clone()))?
            .try_extract_array::<f32>()?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| BotError::MissingOutput(self.value_output.clone()))?;

        debug!(policy_len = policy.len(), value, "inference done");
        Ok(Inference { policy, value })
    }
}

static SHARED: OnceLock<Mutex<OnnxPolicyModel>> = OnceLock::new();

/// The process-wide model, loaded on first use.
///
/// Later calls return the same instance and ignore `config`. If two
/// threads race on the first call, both load but only one model is kept.
pub fn shared_model(config: &ModelConfig) -> Result<&'static Mutex<OnnxPolicyModel>, BotError> {
    if let Some(model) = SHARED.get() {
        return Ok(model);
    }

    let model = OnnxPolicyModel::load(config)?;
    Ok(SHARED.get_or_init(|| Mutex::new(model)))
}
