use std::sync::Arc;
use std::time::Instant;

use crate::domain::{STOPPED_STEP, TOTAL_ELAPSED_STEP, TimedSteps};

/// Receives one formatted line per recorded step.
pub type StepSink = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    #[error("timer is running, stop it before starting again")]
    AlreadyRunning,
    #[error("timer is not running, start it first")]
    NotRunning,
}

/// Measures elapsed time between named checkpoints of one operation.
pub struct StepTimer {
    name: String,
    sink: Option<StepSink>,
    started_at: Option<Instant>,
    last_step: Option<Instant>,
    steps: TimedSteps,
}

impl StepTimer {
    /// Timer that reports each step through `tracing` at debug level.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_sink(name, Arc::new(|line: &str| tracing::debug!("{}", line)))
    }

    pub fn with_sink(name: impl Into<String>, sink: StepSink) -> Self {
        Self {
            name: name.into(),
            sink: Some(sink),
            started_at: None,
            last_step: None,
            steps: TimedSteps::new(),
        }
    }

    pub fn silent(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink: None,
            started_at: None,
            last_step: None,
            steps: TimedSteps::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn steps(&self) -> &TimedSteps {
        &self.steps
    }

    pub fn start(&mut self) -> Result<(), TimerError> {
        if self.started_at.is_some() {
            return Err(TimerError::AlreadyRunning);
        }

        let now = Instant::now();
        self.started_at = Some(now);
        self.last_step = Some(now);
        self.steps.clear();
        Ok(())
    }

    /// Records the time since the previous checkpoint under `name` and returns it in seconds.
    pub fn time_step(&mut self, name: &str) -> Result<f64, TimerError> {
        let last = self.last_step.ok_or(TimerError::NotRunning)?;

        let now = Instant::now();
        let elapsed = now.duration_since(last).as_secs_f64();
        self.last_step = Some(now);

        self.steps.record(name, elapsed);
        self.emit(name, elapsed);

        Ok(elapsed)
    }

    /// Stops the timer and returns the total elapsed seconds.
    pub fn stop(&mut self) -> Result<f64, TimerError> {
        let started_at = self.started_at.take().ok_or(TimerError::NotRunning)?;
        let last = self.last_step.take().unwrap_or(started_at);

        let now = Instant::now();
        let step_elapsed = now.duration_since(last).as_secs_f64();
        let total_elapsed = now.duration_since(started_at).as_secs_f64();

        self.steps.record(STOPPED_STEP, step_elapsed);
        self.steps.record(TOTAL_ELAPSED_STEP, total_elapsed);
        self.emit(STOPPED_STEP, step_elapsed);
        self.emit(TOTAL_ELAPSED_STEP, total_elapsed);

        Ok(total_elapsed)
    }

    fn emit(&self, step: &str, elapsed: f64) {
        if let Some(sink) = &self.sink {
            sink(&format!("{}:{} - {:.4}", self.name, step, elapsed));
        }
    }
}

impl std::fmt::Debug for StepTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepTimer")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .field("steps", &self.steps)
            .finish()
    }
}
