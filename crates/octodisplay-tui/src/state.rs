//! Display state.
//!
//! `DisplayState` mirrors the last known value of every field on screen. It is
//! owned by the render loop and mutated only through [`crate::update::update`].
//! Fields start empty and render as placeholders until the first successful
//! poll fills them.

use octodisplay_core::source::TemperatureRecord;

/// Banner shown before the first CPU sample.
pub const BANNER_PLACEHOLDER: &str = " OctoPrint ";

/// Time line shown before the first progress poll.
pub const TIME_PLACEHOLDER: &str = "00:00:00h left";

/// Temperature block shown before the first temperature poll.
pub const TEMPERATURE_PLACEHOLDER: &str = "Extruder: ?°C / ?°C\nBed: ?°C / ?°C";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    /// Completion percentage, 0..=100.
    pub completion: u8,
    pub eta: Option<String>,
    pub job_name: Option<String>,
    pub temperatures: Option<TemperatureRecord>,
    pub cpu_percent: Option<f32>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gauge ratio in 0.0..=1.0.
    pub fn ratio(&self) -> f64 {
        f64::from(self.completion.min(100)) / 100.0
    }

    pub fn banner_text(&self) -> String {
        match self.cpu_percent {
            Some(pct) => format!("Octoprint CPU: {pct:.1}%"),
            None => BANNER_PLACEHOLDER.to_string(),
        }
    }

    pub fn time_text(&self) -> String {
        match (&self.job_name, &self.eta) {
            (Some(job), Some(eta)) => format!("{job}\n{eta}h left"),
            _ => TIME_PLACEHOLDER.to_string(),
        }
    }

    pub fn temperature_text(&self) -> String {
        match &self.temperatures {
            Some(t) => format!(
                "Extruder: {}°C / {}°C \nBed: {}°C / {}°C",
                t.tool_actual, t.tool_target, t.bed_actual, t.bed_target
            ),
            None => TEMPERATURE_PLACEHOLDER.to_string(),
        }
    }
}
