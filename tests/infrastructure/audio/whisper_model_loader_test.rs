use std::sync::Arc;

use candle_core::Device;
use whisper_asr::application::ports::{LoadError, ModelLoader};
use whisper_asr::domain::Method;
use whisper_asr::infrastructure::audio::{
    DevicePreference, WhisperModelLoader, WhisperModelSource, select_device,
};

#[test]
fn given_unknown_model_name_when_loading_then_model_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(WhisperModelSource::new(dir.path(), Device::Cpu));
    let loader = WhisperModelLoader::new(Method::Reference, source);

    let result = loader.load("gigantic");

    assert!(matches!(result, Err(LoadError::ModelNotFound(_))));
}

#[test]
fn given_loader_when_asked_for_method_then_reports_configured_method() {
    let dir = tempfile::tempdir().unwrap();
    let source = Arc::new(WhisperModelSource::new(dir.path(), Device::Cpu));

    let loader = WhisperModelLoader::new(Method::Streaming, source);

    assert_eq!(loader.method(), Method::Streaming);
}

#[test]
fn given_cpu_preference_when_selecting_device_then_cpu() {
    let device = select_device(DevicePreference::Cpu).unwrap();

    assert!(device.is_cpu());
}
