use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::application::ports::{InferenceBackend, LoadError, ModelLoader};
use crate::domain::Method;

/// A loaded backend together with the model name it was loaded under.
#[derive(Clone)]
pub struct ModelHandle {
    model_name: String,
    backend: Arc<dyn InferenceBackend>,
}

impl ModelHandle {
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn backend(&self) -> &dyn InferenceBackend {
        self.backend.as_ref()
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model_name", &self.model_name)
            .field("method", &self.backend.method())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelChange {
    pub old_model: Option<String>,
    pub new_model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("no model loaded for method {0}")]
    NotLoaded(Method),
    #[error("blocking worker failed: {0}")]
    Worker(String),
}

#[derive(Default)]
struct RegistryState {
    active_model: Option<String>,
    handles: HashMap<Method, ModelHandle>,
}

/// Owns the active model handles and the single lock that serializes
/// inference and model swaps.
pub struct ModelRegistry {
    loaders: Arc<[Arc<dyn ModelLoader>]>,
    state: Arc<Mutex<RegistryState>>,
    published_model: Arc<RwLock<Option<String>>>,
}

impl ModelRegistry {
    pub fn new(loaders: Vec<Arc<dyn ModelLoader>>) -> Self {
        Self {
            loaders: loaders.into(),
            state: Arc::new(Mutex::new(RegistryState::default())),
            published_model: Arc::new(RwLock::new(None)),
        }
    }

    /// Methods with a configured loader.
    pub fn methods(&self) -> Vec<Method> {
        self.loaders.iter().map(|loader| loader.method()).collect()
    }

    /// Waits for the access lock. Handles can only be read or replaced through the guard.
    pub async fn lock(&self) -> RegistryGuard {
        RegistryGuard {
            loaders: Arc::clone(&self.loaders),
            state: Arc::clone(&self.state).lock_owned().await,
            published_model: Arc::clone(&self.published_model),
        }
    }

    pub async fn active_model(&self) -> Option<String> {
        self.state.lock().await.active_model.clone()
    }

    /// Last successfully loaded model name, read without waiting for the lock.
    pub fn current_model(&self) -> Option<String> {
        self.published_model
            .read()
            .map(|name| (*name).clone())
            .unwrap_or_default()
    }

    pub async fn initialize(&self, model_name: &str) -> Result<ModelChange, RegistryError> {
        tracing::info!(model = model_name, methods = ?self.methods(), "Loading initial model");
        self.change_model(model_name).await
    }

    /// Swaps every backend to `new_model`. Waits for in-flight inference to finish first.
    pub async fn change_model(&self, new_model: &str) -> Result<ModelChange, RegistryError> {
        let mut guard = self.lock().await;
        let new_model = new_model.to_string();

        tokio::task::spawn_blocking(move || guard.change_model(&new_model))
            .await
            .map_err(|e| RegistryError::Worker(e.to_string()))?
            .map_err(RegistryError::from)
    }

    /// Runs `f` on a blocking thread with the handle for `method`, holding the
    /// lock until `f` returns.
    pub async fn with_backend<F, R>(&self, method: Method, f: F) -> Result<R, RegistryError>
    where
        F: FnOnce(&ModelHandle) -> R + Send + 'static,
        R: Send + 'static,
    {
        let guard = self.lock().await;

        tokio::task::spawn_blocking(move || guard.get(method).map(f))
            .await
            .map_err(|e| RegistryError::Worker(e.to_string()))?
    }
}

/// Exclusive access to the registry state for the lifetime of the guard.
pub struct RegistryGuard {
    loaders: Arc<[Arc<dyn ModelLoader>]>,
    state: OwnedMutexGuard<RegistryState>,
    published_model: Arc<RwLock<Option<String>>>,
}

impl RegistryGuard {
    pub fn get(&self, method: Method) -> Result<&ModelHandle, RegistryError> {
        self.state
            .handles
            .get(&method)
            .ok_or(RegistryError::NotLoaded(method))
    }

    /// Loads `model_name` for every configured method and replaces all handles
    /// at once. On failure the previous handles and name stay active.
    pub fn load(&mut self, model_name: &str) -> Result<(), LoadError> {
        let mut staged = HashMap::with_capacity(self.loaders.len());

        for loader in self.loaders.iter() {
            let method = loader.method();
            let backend = loader.load(model_name).inspect_err(|e| {
                tracing::error!(
                    model = model_name,
                    method = %method,
                    error = %e,
                    "Model load failed, keeping previous model"
                );
            })?;
            staged.insert(
                method,
                ModelHandle {
                    model_name: model_name.to_string(),
                    backend,
                },
            );
        }

        self.state.handles = staged;
        self.state.active_model = Some(model_name.to_string());
        if let Ok(mut published) = self.published_model.write() {
            *published = Some(model_name.to_string());
        }
        Ok(())
    }

    pub fn change_model(&mut self, new_model: &str) -> Result<ModelChange, LoadError> {
        let old_model = self.state.active_model.clone();

        if old_model.as_deref() == Some(new_model) {
            tracing::debug!(model = new_model, "Requested model already active");
            return Ok(ModelChange {
                old_model,
                new_model: new_model.to_string(),
            });
        }

        self.load(new_model)?;

        tracing::info!(
            old_model = ?old_model,
            new_model = new_model,
            "Model changed"
        );

        Ok(ModelChange {
            old_model,
            new_model: new_model.to_string(),
        })
    }
}
