use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::whisper::{self as m, Config};
use tokenizers::Tokenizer;

use crate::application::ports::{InferenceError, LoadError, TranscribeOptions};
use crate::domain::{LANGUAGES, Segment, Task};

use super::mel_filters::mel_filters;

const TIMESTAMP_RESOLUTION: f64 = 0.02;
const MAX_DECODE_TOKENS: usize = 224;
const NO_SPEECH_THRESHOLD: f32 = 0.6;
/// RMS below which a window is treated as silence and skipped without decoding.
const SILENCE_RMS: f32 = 1e-3;
const START_OF_PREV_TOKEN: &str = "<|startofprev|>";
const NO_SPEECH_TOKENS: [&str; 2] = ["<|nospeech|>", "<|nocaptions|>"];

/// Files making up one Whisper checkpoint.
#[derive(Debug, Clone)]
pub struct WhisperFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
}

struct SpecialTokens {
    sot: u32,
    transcribe: u32,
    translate: u32,
    no_timestamps: u32,
    eot: u32,
    start_of_prev: Option<u32>,
    no_speech: Option<u32>,
}

impl SpecialTokens {
    fn timestamp_begin(&self) -> u32 {
        self.no_timestamps + 1
    }
}

/// A loaded Whisper checkpoint shared by the reference and streaming engines.
pub struct WhisperModel {
    model: Mutex<m::model::Whisper>,
    tokenizer: Tokenizer,
    config: Config,
    device: Device,
    dtype: DType,
    mel_filters: Vec<f32>,
    tokens: SpecialTokens,
    language_tokens: Vec<(&'static str, u32)>,
}

impl WhisperModel {
    pub fn load(files: &WhisperFiles, device: Device) -> Result<Self, LoadError> {
        let config_contents = std::fs::read_to_string(&files.config)
            .map_err(|e| LoadError::ModelNotFound(format!("read config: {}", e)))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| LoadError::ConversionFailed(format!("parse config: {}", e)))?;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| LoadError::ConversionFailed(format!("tokenizer: {}", e)))?;

        let tokens = SpecialTokens {
            sot: load_token_id(&tokenizer, m::SOT_TOKEN)?,
            transcribe: load_token_id(&tokenizer, m::TRANSCRIBE_TOKEN)?,
            translate: load_token_id(&tokenizer, m::TRANSLATE_TOKEN)?,
            no_timestamps: load_token_id(&tokenizer, m::NO_TIMESTAMPS_TOKEN)?,
            eot: load_token_id(&tokenizer, m::EOT_TOKEN)?,
            start_of_prev: tokenizer.token_to_id(START_OF_PREV_TOKEN),
            no_speech: NO_SPEECH_TOKENS
                .iter()
                .find_map(|token| tokenizer.token_to_id(token)),
        };

        let language_tokens: Vec<(&'static str, u32)> = LANGUAGES
            .iter()
            .filter_map(|&(code, _)| {
                tokenizer
                    .token_to_id(&format!("<|{}|>", code))
                    .map(|id| (code, id))
            })
            .collect();

        let dtype = Self::select_dtype(&device);

        // SAFETY: safetensors files are memory-mapped read-only
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&files.weights], dtype, &device)
                .map_err(|e| LoadError::ConversionFailed(format!("weights: {}", e)))?
        };

        let model = m::model::Whisper::load(&vb, config.clone())
            .map_err(|e| LoadError::ConversionFailed(format!("model: {}", e)))?;

        let mel_filters = mel_filters(m::SAMPLE_RATE as u32, m::N_FFT, config.num_mel_bins);

        tracing::info!(
            device = ?device,
            dtype = ?dtype,
            mel_bins = config.num_mel_bins,
            languages = language_tokens.len(),
            "Whisper model loaded"
        );

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            config,
            device,
            dtype,
            mel_filters,
            tokens,
            language_tokens,
        })
    }

    /// Half precision on accelerators, full precision on CPU.
    pub fn select_dtype(device: &Device) -> DType {
        if device.is_cpu() {
            DType::F32
        } else {
            DType::F16
        }
    }

    pub fn uses_gpu(&self) -> bool {
        self.device.is_cuda()
    }

    pub fn is_multilingual(&self) -> bool {
        !self.language_tokens.is_empty()
    }

    /// Tokens for an initial prompt, without special tokens.
    pub fn prompt_tokens(&self, prompt: &str) -> Result<Vec<u32>, InferenceError> {
        let encoding = self
            .tokenizer
            .encode(format!(" {}", prompt.trim()), false)
            .map_err(|e| InferenceError::TranscriptionFailed(format!("encode prompt: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Most likely language of the first window.
    pub fn detect_language(&self, samples: &[f32]) -> Result<String, InferenceError> {
        if !self.is_multilingual() {
            return Ok("en".to_string());
        }

        let window = &samples[..samples.len().min(m::N_SAMPLES)];
        let mel = self.window_mel(window).map_err(detection_failed)?;

        let mut model = self.lock_model()?;
        let audio_features = model
            .encoder
            .forward(&mel, true)
            .map_err(detection_failed)?;

        let sot = Tensor::new(&[[self.tokens.sot]], &self.device).map_err(detection_failed)?;
        let ys = model
            .decoder
            .forward(&sot, &audio_features, true)
            .map_err(detection_failed)?;
        let logits = model
            .decoder
            .final_linear(&ys.i(..1).map_err(detection_failed)?)
            .and_then(|l| l.i(0))
            .and_then(|l| l.i(0))
            .and_then(|l| l.to_dtype(DType::F32))
            .and_then(|l| l.to_vec1::<f32>())
            .map_err(detection_failed)?;
        model.reset_kv_cache();

        let (code, _) = self
            .language_tokens
            .iter()
            .filter_map(|&(code, id)| logits.get(id as usize).map(|&logit| (code, logit)))
            .fold(("en", f32::NEG_INFINITY), |best, candidate| {
                if candidate.1 > best.1 { candidate } else { best }
            });

        Ok(code.to_string())
    }

    /// Greedily decodes one window of at most 30 seconds. Segment times are
    /// shifted by `offset` seconds.
    pub fn decode_window(
        &self,
        window: &[f32],
        offset: f64,
        request: &WindowRequest,
        prompt: &[u32],
    ) -> Result<DecodedWindow, InferenceError> {
        let mel = self.window_mel(window).map_err(transcription_failed)?;

        let mut tokens: Vec<u32> = Vec::new();
        if let Some(start_of_prev) = self.tokens.start_of_prev {
            if !prompt.is_empty() {
                let keep = self.config.max_target_positions / 2 - 1;
                tokens.push(start_of_prev);
                tokens.extend_from_slice(&prompt[prompt.len().saturating_sub(keep)..]);
            }
        }
        let sot_index = tokens.len();
        tokens.push(self.tokens.sot);
        if let Some(language_token) = request.language_token {
            tokens.push(language_token);
        }
        tokens.push(match request.task {
            Task::Transcribe => self.tokens.transcribe,
            Task::Translate => self.tokens.translate,
        });
        let sample_begin = tokens.len();

        let mut model = self.lock_model()?;
        let audio_features = model
            .encoder
            .forward(&mel, true)
            .map_err(transcription_failed)?;

        for i in 0..MAX_DECODE_TOKENS {
            let tokens_t = Tensor::new(tokens.as_slice(), &self.device)
                .and_then(|t| t.unsqueeze(0))
                .map_err(transcription_failed)?;
            let ys = model
                .decoder
                .forward(&tokens_t, &audio_features, i == 0)
                .map_err(transcription_failed)?;

            if i == 0 {
                if let Some(no_speech) = self.tokens.no_speech {
                    let sot_logits = self.position_logits(&model, &ys, sot_index)?;
                    if softmax_at(&sot_logits, no_speech as usize) > NO_SPEECH_THRESHOLD {
                        tracing::debug!(offset, "Window classified as no speech");
                        model.reset_kv_cache();
                        return Ok(DecodedWindow::default());
                    }
                }
            }

            let seq_len = ys.dim(1).map_err(transcription_failed)?;
            let mut logits = self.position_logits(&model, &ys, seq_len - 1)?;
            suppress_logits(
                &mut logits,
                &tokens[sample_begin..],
                &self.config.suppress_tokens,
                self.timestamp_tokens(),
            );

            let next_token = argmax(&logits);
            if next_token == self.tokens.eot || tokens.len() >= self.config.max_target_positions {
                break;
            }
            tokens.push(next_token);
        }

        model.reset_kv_cache();
        drop(model);

        let window_seconds = window.len() as f64 / m::SAMPLE_RATE as f64;
        self.segments_from_tokens(&tokens[sample_begin..], offset, window_seconds)
    }

    /// Resolves the language (detecting it when the caller gave none) and the
    /// prompt tokens for a request over `waveform`.
    pub fn window_request(
        &self,
        waveform: &[f32],
        options: &TranscribeOptions,
    ) -> Result<(String, WindowRequest), InferenceError> {
        let language = match &options.language {
            Some(code) => code.clone(),
            None if waveform.is_empty() => "en".to_string(),
            None => {
                let detected = self.detect_language(waveform).map_err(|e| match e {
                    InferenceError::LanguageDetectionFailed(msg) => {
                        InferenceError::TranscriptionFailed(msg)
                    }
                    other => other,
                })?;
                tracing::debug!(language = %detected, "Language detected from first window");
                detected
            }
        };

        let initial_prompt = match options.initial_prompt.as_deref() {
            Some(prompt) if !prompt.trim().is_empty() => self.prompt_tokens(prompt)?,
            _ => Vec::new(),
        };

        let request = WindowRequest {
            task: options.task,
            language_token: self.language_token(&language)?,
            initial_prompt,
        };
        Ok((language, request))
    }

    pub fn language_token(&self, code: &str) -> Result<Option<u32>, InferenceError> {
        if !self.is_multilingual() {
            return Ok(None);
        }
        self.language_tokens
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, id)| Some(id))
            .ok_or_else(|| {
                InferenceError::TranscriptionFailed(format!(
                    "language {} not supported by model",
                    code
                ))
            })
    }

    fn lock_model(&self) -> Result<std::sync::MutexGuard<'_, m::model::Whisper>, InferenceError> {
        self.model
            .lock()
            .map_err(|_| InferenceError::TranscriptionFailed("model lock poisoned".to_string()))
    }

    fn window_mel(&self, window: &[f32]) -> candle_core::Result<Tensor> {
        let mut padded = window.to_vec();
        padded.resize(m::N_SAMPLES, 0.0);

        let mel = m::audio::pcm_to_mel(&self.config, &padded, &self.mel_filters);
        let n_mel = self.config.num_mel_bins;
        let n_frames = mel.len() / n_mel;

        Tensor::from_vec(mel, (1, n_mel, n_frames), &self.device)?
            .narrow(2, 0, n_frames.min(m::N_FRAMES))?
            .to_dtype(self.dtype)
    }

    fn position_logits(
        &self,
        model: &m::model::Whisper,
        ys: &Tensor,
        position: usize,
    ) -> Result<Vec<f32>, InferenceError> {
        let hidden = ys
            .i((..1, position..position + 1))
            .map_err(transcription_failed)?;
        model
            .decoder
            .final_linear(&hidden)
            .and_then(|l| l.i(0))
            .and_then(|l| l.i(0))
            .and_then(|l| l.to_dtype(DType::F32))
            .and_then(|l| l.to_vec1::<f32>())
            .map_err(transcription_failed)
    }

    fn timestamp_tokens(&self) -> TimestampTokens {
        TimestampTokens {
            timestamp_begin: self.tokens.timestamp_begin(),
            no_timestamps: self.tokens.no_timestamps,
            eot: self.tokens.eot,
        }
    }

    fn segments_from_tokens(
        &self,
        sampled: &[u32],
        offset: f64,
        window_seconds: f64,
    ) -> Result<DecodedWindow, InferenceError> {
        let tokens = self.timestamp_tokens();
        let mut decoded = DecodedWindow {
            segments: Vec::new(),
            text_tokens: sampled.iter().copied().filter(|&t| t < tokens.eot).collect(),
        };

        for span in pair_timestamps(sampled, tokens, window_seconds) {
            self.push_segment(&mut decoded, &span.tokens, offset + span.start, offset + span.end)?;
        }

        Ok(decoded)
    }

    fn push_segment(
        &self,
        decoded: &mut DecodedWindow,
        tokens: &[u32],
        start: f64,
        end: f64,
    ) -> Result<(), InferenceError> {
        let text = self
            .tokenizer
            .decode(tokens, true)
            .map_err(|e| InferenceError::TranscriptionFailed(format!("detokenize: {}", e)))?;
        if !text.trim().is_empty() {
            decoded.segments.push(Segment::new(start, end.max(start), text));
        }
        Ok(())
    }
}

/// Per-request decoding choices resolved against the loaded model.
#[derive(Debug, Clone)]
pub struct WindowRequest {
    pub task: Task,
    pub language_token: Option<u32>,
    pub initial_prompt: Vec<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct DecodedWindow {
    pub segments: Vec<Segment>,
    pub text_tokens: Vec<u32>,
}

/// Walks a waveform in 30-second windows, decoding one window per refill and
/// conditioning each window on the text of the previous one.
pub struct WindowDecoder {
    model: Arc<WhisperModel>,
    waveform: Arc<[f32]>,
    request: WindowRequest,
    skip_silence: bool,
    next_window: usize,
    previous_tokens: Vec<u32>,
    pending: VecDeque<Segment>,
    failed: bool,
}

impl WindowDecoder {
    pub fn new(
        model: Arc<WhisperModel>,
        waveform: Arc<[f32]>,
        request: WindowRequest,
        skip_silence: bool,
    ) -> Self {
        Self {
            model,
            waveform,
            request,
            skip_silence,
            next_window: 0,
            previous_tokens: Vec::new(),
            pending: VecDeque::new(),
            failed: false,
        }
    }

    pub fn window_count(&self) -> usize {
        window_count(self.waveform.len())
    }

    fn decode_next_window(&mut self) -> Result<(), InferenceError> {
        let index = self.next_window;
        self.next_window += 1;

        let start = index * m::N_SAMPLES;
        let end = (start + m::N_SAMPLES).min(self.waveform.len());
        let window = &self.waveform[start..end];

        if self.skip_silence && is_silent(window) {
            tracing::debug!(window = index, "Skipping silent window");
            self.previous_tokens.clear();
            return Ok(());
        }

        let mut prompt = self.request.initial_prompt.clone();
        prompt.extend_from_slice(&self.previous_tokens);

        let offset = start as f64 / m::SAMPLE_RATE as f64;
        let decoded = self
            .model
            .decode_window(window, offset, &self.request, &prompt)?;

        tracing::debug!(
            window = index,
            segments = decoded.segments.len(),
            "Window decoded"
        );

        self.previous_tokens = decoded.text_tokens;
        self.pending.extend(decoded.segments);
        Ok(())
    }
}

impl Iterator for WindowDecoder {
    type Item = Result<Segment, InferenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(segment) = self.pending.pop_front() {
                return Some(Ok(segment));
            }
            if self.failed || self.next_window >= self.window_count() {
                return None;
            }
            if let Err(e) = self.decode_next_window() {
                self.failed = true;
                return Some(Err(e));
            }
        }
    }
}

/// Token ids that drive the timestamp rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampTokens {
    pub timestamp_begin: u32,
    pub no_timestamps: u32,
    pub eot: u32,
}

impl TimestampTokens {
    fn is_timestamp(&self, token: u32) -> bool {
        token >= self.timestamp_begin
    }
}

/// Text tokens between two timestamps, times relative to the window start.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedTokens {
    pub start: f64,
    pub end: f64,
    pub tokens: Vec<u32>,
}

/// Whether a window's RMS energy is low enough to skip decoding it.
pub fn is_silent(window: &[f32]) -> bool {
    rms(window) < SILENCE_RMS
}

/// Number of 30-second windows covering `samples` samples.
pub fn window_count(samples: usize) -> usize {
    samples.div_ceil(m::N_SAMPLES)
}

/// Masks `logits` for the next token: the suppress list and `<|notimestamps|>`
/// always; text before the first timestamp; a third timestamp in a row; text
/// right after a closing timestamp; and any timestamp earlier than the last one.
pub fn suppress_logits(
    logits: &mut [f32],
    sampled: &[u32],
    suppress_tokens: &[u32],
    tokens: TimestampTokens,
) {
    let timestamp_begin = (tokens.timestamp_begin as usize).min(logits.len());

    for &token in suppress_tokens {
        if let Some(logit) = logits.get_mut(token as usize) {
            *logit = f32::NEG_INFINITY;
        }
    }
    if let Some(logit) = logits.get_mut(tokens.no_timestamps as usize) {
        *logit = f32::NEG_INFINITY;
    }

    let Some(&last) = sampled.last() else {
        logits[..timestamp_begin].fill(f32::NEG_INFINITY);
        return;
    };

    let penultimate_was_timestamp =
        sampled.len() < 2 || tokens.is_timestamp(sampled[sampled.len() - 2]);

    if tokens.is_timestamp(last) {
        if penultimate_was_timestamp {
            logits[timestamp_begin..].fill(f32::NEG_INFINITY);
        } else {
            let eot = tokens.eot as usize;
            for (token, logit) in logits.iter_mut().enumerate().take(timestamp_begin) {
                if token != eot {
                    *logit = f32::NEG_INFINITY;
                }
            }
        }
    }

    if let Some(&last_timestamp) = sampled.iter().rev().find(|&&t| tokens.is_timestamp(t)) {
        let floor = (last_timestamp as usize).min(logits.len());
        if timestamp_begin < floor {
            logits[timestamp_begin..floor].fill(f32::NEG_INFINITY);
        }
    }
}

/// Groups sampled tokens into spans bounded by timestamp pairs. A trailing
/// span without a closing timestamp ends at `window_seconds`.
pub fn pair_timestamps(
    sampled: &[u32],
    tokens: TimestampTokens,
    window_seconds: f64,
) -> Vec<TimedTokens> {
    let mut spans = Vec::new();
    let mut start: Option<f64> = None;
    let mut pending: Vec<u32> = Vec::new();

    for &token in sampled {
        if tokens.is_timestamp(token) {
            let seconds = ((token - tokens.timestamp_begin) as f64 * TIMESTAMP_RESOLUTION)
                .min(window_seconds);
            if pending.is_empty() {
                start = Some(seconds);
            } else {
                let begin = start.take().unwrap_or(0.0);
                spans.push(TimedTokens {
                    start: begin,
                    end: seconds.max(begin),
                    tokens: std::mem::take(&mut pending),
                });
            }
        } else if token < tokens.eot {
            pending.push(token);
        }
    }

    if !pending.is_empty() {
        let begin = start.unwrap_or(0.0);
        spans.push(TimedTokens {
            start: begin,
            end: window_seconds.max(begin),
            tokens: pending,
        });
    }

    spans
}

fn load_token_id(tokenizer: &Tokenizer, token: &str) -> Result<u32, LoadError> {
    tokenizer
        .token_to_id(token)
        .ok_or_else(|| LoadError::ConversionFailed(format!("token not found: {}", token)))
}

fn transcription_failed(e: candle_core::Error) -> InferenceError {
    InferenceError::TranscriptionFailed(e.to_string())
}

fn detection_failed(e: candle_core::Error) -> InferenceError {
    InferenceError::LanguageDetectionFailed(e.to_string())
}

fn argmax(logits: &[f32]) -> u32 {
    logits
        .iter()
        .enumerate()
        .fold((0usize, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0 as u32
}

fn softmax_at(logits: &[f32], index: usize) -> f32 {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let sum: f32 = logits.iter().map(|&v| (v - max).exp()).sum();
    logits.get(index).map_or(0.0, |&v| (v - max).exp() / sum)
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}
