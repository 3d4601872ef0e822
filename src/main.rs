use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use whisper_asr::application::ports::{AudioDecoder, ModelLoader};
use whisper_asr::application::services::{AudioNormalizer, ModelRegistry, TranscriptionService};
use whisper_asr::infrastructure::audio::{
    FfmpegAudioDecoder, SymphoniaAudioDecoder, WhisperModelLoader, WhisperModelSource,
    check_ffmpeg_binary, select_device,
};
use whisper_asr::infrastructure::observability::{TracingConfig, init_tracing};
use whisper_asr::presentation::{AppState, DecoderKind, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    init_tracing(&TracingConfig::new(
        environment.as_str(),
        settings.logging.json,
        settings.logging.level.clone(),
    ));

    let decoder: Arc<dyn AudioDecoder> = match settings.audio.decoder {
        DecoderKind::Ffmpeg => {
            if let Err(e) = check_ffmpeg_binary(&settings.audio.ffmpeg_binary) {
                tracing::warn!(
                    binary = %settings.audio.ffmpeg_binary,
                    error = %e,
                    "ffmpeg not available, encoded uploads will fail to decode"
                );
            }
            Arc::new(FfmpegAudioDecoder::new(settings.audio.ffmpeg_binary.clone()))
        }
        DecoderKind::Symphonia => Arc::new(SymphoniaAudioDecoder),
    };
    let normalizer = Arc::new(AudioNormalizer::new(decoder, settings.audio.sample_rate));

    let device = select_device(settings.model.device).context("Failed to select device")?;
    let source = Arc::new(WhisperModelSource::new(&settings.model.path, device));
    let loaders: Vec<Arc<dyn ModelLoader>> = settings
        .model
        .methods
        .iter()
        .map(|&method| {
            Arc::new(WhisperModelLoader::new(method, Arc::clone(&source))) as Arc<dyn ModelLoader>
        })
        .collect();

    let registry = Arc::new(ModelRegistry::new(loaders));
    registry
        .initialize(&settings.model.name)
        .await
        .with_context(|| format!("Failed to load model {}", settings.model.name))?;

    let transcription_service = Arc::new(TranscriptionService::new(normalizer, registry));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let router = create_router(AppState::new(transcription_service, settings));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
