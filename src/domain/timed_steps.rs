use serde::Serialize;
use serde::ser::SerializeMap;

pub const STOPPED_STEP: &str = "Stopped";
pub const TOTAL_ELAPSED_STEP: &str = "Total_Elapsed";

/// Named step durations in seconds, kept in the order they were recorded.
///
/// A name is recorded once; later writes under the same name are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimedSteps {
    steps: Vec<(String, f64)>,
}

impl TimedSteps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `seconds` under `name` unless the name is already present.
    /// Returns whether the value was stored.
    pub fn record(&mut self, name: &str, seconds: f64) -> bool {
        if self.get(name).is_some() {
            return false;
        }
        self.steps.push((name.to_string(), seconds.max(0.0)));
        true
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.steps
            .iter()
            .find(|(step, _)| step == name)
            .map(|(_, seconds)| *seconds)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.steps.iter().map(|(name, seconds)| (name.as_str(), *seconds))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total_elapsed(&self) -> Option<f64> {
        self.get(TOTAL_ELAPSED_STEP)
    }

    pub(crate) fn clear(&mut self) {
        self.steps.clear();
    }
}

impl Serialize for TimedSteps {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.steps.len()))?;
        for (name, seconds) in &self.steps {
            map.serialize_entry(name, seconds)?;
        }
        map.end()
    }
}
