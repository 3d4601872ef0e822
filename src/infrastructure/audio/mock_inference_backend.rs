use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{
    BackendOutput, CompleteTranscript, InferenceBackend, InferenceError, LoadError, ModelLoader,
    SegmentStream, TranscribeOptions,
};
use crate::domain::{Method, Segment};

/// Counts calls and overlapping calls across every mock sharing it.
#[derive(Debug, Default)]
pub struct InferenceTracker {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InferenceTracker {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct MockInferenceBackend {
    pub method: Method,
    pub model_name: String,
    pub language: String,
    pub segments: Vec<Segment>,
    pub gpu: bool,
    pub delay: Duration,
    pub tracker: Arc<InferenceTracker>,
}

impl MockInferenceBackend {
    pub fn new(method: Method, model_name: impl Into<String>) -> Self {
        Self {
            method,
            model_name: model_name.into(),
            language: "en".to_string(),
            segments: vec![
                Segment::new(0.0, 1.5, " Hello there."),
                Segment::new(1.5, 3.0, " General Kenobi."),
            ],
            gpu: false,
            delay: Duration::ZERO,
            tracker: Arc::new(InferenceTracker::default()),
        }
    }

    pub fn with_segments(mut self, segments: Vec<Segment>) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_tracker(mut self, tracker: Arc<InferenceTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    fn simulate_work(&self) {
        self.tracker.enter();
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.tracker.exit();
    }
}

impl InferenceBackend for MockInferenceBackend {
    fn method(&self) -> Method {
        self.method
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn uses_gpu(&self) -> bool {
        self.gpu
    }

    fn transcribe(
        &self,
        waveform: Arc<[f32]>,
        options: &TranscribeOptions,
    ) -> Result<BackendOutput, InferenceError> {
        self.simulate_work();

        let language = options
            .language
            .clone()
            .unwrap_or_else(|| self.language.clone());

        match self.method {
            Method::Reference => Ok(BackendOutput::Complete(CompleteTranscript {
                language,
                text: self.segments.iter().map(|s| s.text.as_str()).collect(),
                segments: self.segments.clone(),
                duration: None,
            })),
            Method::Streaming => {
                let duration = waveform.len() as f64 / 16_000.0;
                let segments = self.segments.clone().into_iter().map(Ok);
                Ok(BackendOutput::Streaming(SegmentStream::new(
                    language,
                    Some(duration),
                    segments,
                )))
            }
        }
    }

    fn detect_language(&self, _waveform: &[f32]) -> Result<String, InferenceError> {
        self.simulate_work();
        Ok(self.language.clone())
    }
}

/// Hands out [`MockInferenceBackend`]s built from a template, counting loads.
#[derive(Debug, Clone)]
pub struct MockModelLoader {
    template: MockInferenceBackend,
    loads: Arc<AtomicUsize>,
    failing_models: Vec<String>,
}

impl MockModelLoader {
    pub fn new(method: Method) -> Self {
        Self::from_template(MockInferenceBackend::new(method, ""))
    }

    pub fn from_template(template: MockInferenceBackend) -> Self {
        Self {
            template,
            loads: Arc::new(AtomicUsize::new(0)),
            failing_models: Vec::new(),
        }
    }

    /// Loading `model_name` fails with [`LoadError::ModelNotFound`].
    pub fn failing_on(mut self, model_name: impl Into<String>) -> Self {
        self.failing_models.push(model_name.into());
        self
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for MockModelLoader {
    fn method(&self) -> Method {
        self.template.method
    }

    fn load(&self, model_name: &str) -> Result<Arc<dyn InferenceBackend>, LoadError> {
        if self.failing_models.iter().any(|m| m == model_name) {
            return Err(LoadError::ModelNotFound(model_name.to_string()));
        }
        self.loads.fetch_add(1, Ordering::SeqCst);

        let mut backend = self.template.clone();
        backend.model_name = model_name.to_string();
        Ok(Arc::new(backend))
    }
}
