use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Weak};

use candle_core::Device;
use hf_hub::api::sync::ApiBuilder;
use serde::{Deserialize, Serialize};

use crate::application::ports::{InferenceBackend, LoadError, ModelLoader};
use crate::domain::{Method, ModelName};

use super::candle_whisper_engine::CandleWhisperEngine;
use super::streaming_whisper_engine::StreamingWhisperEngine;
use super::whisper_model::{WhisperFiles, WhisperModel};

const CONFIG_FILE: &str = "config.json";
const TOKENIZER_FILE: &str = "tokenizer.json";
const WEIGHTS_FILE: &str = "model.safetensors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePreference {
    #[default]
    Auto,
    Cpu,
    Cuda,
}

pub fn select_device(preference: DevicePreference) -> Result<Device, LoadError> {
    match preference {
        DevicePreference::Cpu => Ok(Device::Cpu),
        DevicePreference::Auto => Device::cuda_if_available(0)
            .map_err(|e| LoadError::DeviceUnavailable(e.to_string())),
        DevicePreference::Cuda => {
            Device::new_cuda(0).map_err(|e| LoadError::DeviceUnavailable(e.to_string()))
        }
    }
}

/// Resolves model names to checkpoints and keeps at most one live copy of
/// each, so the engines of every method share the same weights.
pub struct WhisperModelSource {
    model_path: PathBuf,
    device: Device,
    loaded: Mutex<HashMap<String, Weak<WhisperModel>>>,
}

impl WhisperModelSource {
    pub fn new(model_path: impl Into<PathBuf>, device: Device) -> Self {
        Self {
            model_path: model_path.into(),
            device,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, model_name: &str) -> Result<Arc<WhisperModel>, LoadError> {
        let name: ModelName = model_name
            .parse()
            .map_err(|e: crate::domain::UnsupportedModelError| {
                LoadError::ModelNotFound(e.to_string())
            })?;

        let mut loaded = self
            .loaded
            .lock()
            .map_err(|_| LoadError::ConversionFailed("model cache poisoned".to_string()))?;
        loaded.retain(|_, model| model.strong_count() > 0);

        if let Some(model) = loaded.get(name.as_str()).and_then(Weak::upgrade) {
            tracing::debug!(model = %name, "Reusing loaded Whisper weights");
            return Ok(model);
        }

        let files = self.resolve(&name)?;
        tracing::info!(model = %name, weights = %files.weights.display(), "Loading Whisper model");
        let model = Arc::new(WhisperModel::load(&files, self.device.clone())?);
        loaded.insert(name.as_str().to_string(), Arc::downgrade(&model));
        Ok(model)
    }

    /// Local `<model_path>/<name>/` directory first, then the Hugging Face hub
    /// with `model_path` as the download cache.
    fn resolve(&self, name: &ModelName) -> Result<WhisperFiles, LoadError> {
        let local = self.model_path.join(name.as_str());
        let local_files = WhisperFiles {
            config: local.join(CONFIG_FILE),
            tokenizer: local.join(TOKENIZER_FILE),
            weights: local.join(WEIGHTS_FILE),
        };
        if local_files.config.is_file()
            && local_files.tokenizer.is_file()
            && local_files.weights.is_file()
        {
            return Ok(local_files);
        }

        let api = ApiBuilder::new()
            .with_cache_dir(self.model_path.clone())
            .build()
            .map_err(|e| LoadError::ModelNotFound(format!("hub client: {}", e)))?;
        let repo = api.model(name.hub_repository());
        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| LoadError::ModelNotFound(format!("{} {}: {}", name, file, e)))
        };

        Ok(WhisperFiles {
            config: fetch(CONFIG_FILE)?,
            tokenizer: fetch(TOKENIZER_FILE)?,
            weights: fetch(WEIGHTS_FILE)?,
        })
    }
}

/// Builds the engine for one method on top of a shared [`WhisperModelSource`].
pub struct WhisperModelLoader {
    method: Method,
    source: Arc<WhisperModelSource>,
}

impl WhisperModelLoader {
    pub fn new(method: Method, source: Arc<WhisperModelSource>) -> Self {
        Self { method, source }
    }
}

impl ModelLoader for WhisperModelLoader {
    fn method(&self) -> Method {
        self.method
    }

    fn load(&self, model_name: &str) -> Result<Arc<dyn InferenceBackend>, LoadError> {
        let model = self.source.get(model_name)?;
        let backend: Arc<dyn InferenceBackend> = match self.method {
            Method::Reference => Arc::new(CandleWhisperEngine::new(model_name, model)),
            Method::Streaming => Arc::new(StreamingWhisperEngine::new(model_name, model)),
        };
        Ok(backend)
    }
}

