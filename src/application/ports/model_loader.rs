use std::sync::Arc;

use crate::domain::Method;

use super::InferenceBackend;

/// Builds the backend for one method from a named model.
pub trait ModelLoader: Send + Sync {
    fn method(&self) -> Method;

    fn load(&self, model_name: &str) -> Result<Arc<dyn InferenceBackend>, LoadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("model conversion failed: {0}")]
    ConversionFailed(String),
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
}
