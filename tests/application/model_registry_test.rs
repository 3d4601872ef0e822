use std::sync::Arc;
use std::time::Duration;

use whisper_asr::application::ports::{LoadError, ModelLoader};
use whisper_asr::application::services::{ModelRegistry, RegistryError};
use whisper_asr::domain::Method;
use whisper_asr::infrastructure::audio::{InferenceTracker, MockInferenceBackend, MockModelLoader};

fn registry_with(loaders: &[MockModelLoader]) -> ModelRegistry {
    ModelRegistry::new(
        loaders
            .iter()
            .map(|l| Arc::new(l.clone()) as Arc<dyn ModelLoader>)
            .collect(),
    )
}

#[tokio::test]
async fn given_empty_registry_when_initialized_then_old_model_is_none() {
    let loader = MockModelLoader::new(Method::Reference);
    let registry = registry_with(&[loader.clone()]);

    let change = registry.initialize("base").await.unwrap();

    assert_eq!(change.old_model, None);
    assert_eq!(change.new_model, "base");
    assert_eq!(loader.loads(), 1);
    assert_eq!(registry.active_model().await.as_deref(), Some("base"));
    assert_eq!(registry.current_model().as_deref(), Some("base"));
}

#[tokio::test]
async fn given_active_model_when_changing_to_same_name_then_no_load_happens() {
    let loader = MockModelLoader::new(Method::Reference);
    let registry = registry_with(&[loader.clone()]);
    registry.initialize("base").await.unwrap();

    let change = registry.change_model("base").await.unwrap();

    assert_eq!(change.old_model.as_deref(), Some("base"));
    assert_eq!(change.new_model, "base");
    assert_eq!(loader.loads(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_two_concurrent_changes_to_same_model_then_loads_exactly_once() {
    let loader = MockModelLoader::new(Method::Reference);
    let registry = Arc::new(registry_with(&[loader.clone()]));
    registry.initialize("base").await.unwrap();

    let first = tokio::spawn({
        let registry = Arc::clone(&registry);
        async move { registry.change_model("small").await }
    });
    let second = tokio::spawn({
        let registry = Arc::clone(&registry);
        async move { registry.change_model("small").await }
    });

    let (first, second) = (first.await.unwrap().unwrap(), second.await.unwrap().unwrap());

    assert_eq!(loader.loads(), 2, "one initial load plus one swap");
    assert_eq!(registry.active_model().await.as_deref(), Some("small"));
    let olds = [first.old_model.as_deref(), second.old_model.as_deref()];
    assert!(olds.contains(&Some("base")));
    assert!(olds.contains(&Some("small")));
}

#[tokio::test]
async fn given_failing_load_when_changing_model_then_previous_model_stays_active() {
    let reference = MockModelLoader::new(Method::Reference);
    let streaming = MockModelLoader::new(Method::Streaming).failing_on("medium");
    let registry = registry_with(&[reference.clone(), streaming.clone()]);
    registry.initialize("base").await.unwrap();

    let result = registry.change_model("medium").await;

    assert!(matches!(
        result,
        Err(RegistryError::Load(LoadError::ModelNotFound(_)))
    ));
    assert_eq!(registry.active_model().await.as_deref(), Some("base"));
    let guard = registry.lock().await;
    assert_eq!(guard.get(Method::Reference).unwrap().model_name(), "base");
    assert_eq!(guard.get(Method::Streaming).unwrap().model_name(), "base");
}

#[tokio::test]
async fn given_unconfigured_method_when_getting_backend_then_not_loaded() {
    let registry = registry_with(&[MockModelLoader::new(Method::Reference)]);
    registry.initialize("base").await.unwrap();

    let result = registry
        .with_backend(Method::Streaming, |handle| handle.model_name().to_string())
        .await;

    assert!(matches!(result, Err(RegistryError::NotLoaded(Method::Streaming))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_inference_when_running_then_calls_never_overlap() {
    let tracker = Arc::new(InferenceTracker::default());
    let template = MockInferenceBackend::new(Method::Reference, "")
        .with_delay(Duration::from_millis(20))
        .with_tracker(Arc::clone(&tracker));
    let registry = Arc::new(registry_with(&[MockModelLoader::from_template(template)]));
    registry.initialize("base").await.unwrap();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .with_backend(Method::Reference, |handle| {
                        handle.backend().detect_language(&[0.0; 16])
                    })
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap().unwrap();
    }

    assert_eq!(tracker.calls(), 4);
    assert_eq!(tracker.max_in_flight(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_inference_in_flight_when_changing_model_then_swap_waits_for_it() {
    let tracker = Arc::new(InferenceTracker::default());
    let template = MockInferenceBackend::new(Method::Reference, "")
        .with_delay(Duration::from_millis(50))
        .with_tracker(Arc::clone(&tracker));
    let registry = Arc::new(registry_with(&[MockModelLoader::from_template(template)]));
    registry.initialize("base").await.unwrap();

    let inference = tokio::spawn({
        let registry = Arc::clone(&registry);
        async move {
            registry
                .with_backend(Method::Reference, |handle| {
                    handle.backend().detect_language(&[0.0; 16]).unwrap();
                    handle.model_name().to_string()
                })
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    registry.change_model("small").await.unwrap();

    assert_eq!(inference.await.unwrap().unwrap(), "base");
    assert_eq!(registry.active_model().await.as_deref(), Some("small"));
}
