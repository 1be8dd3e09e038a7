//! Status event types.
//!
//! Events are the only data that crosses from the pollers to the render
//! loop. Each event carries exactly one category of status; failed fetches
//! produce no event at all.

use std::fmt;

use crate::source::{ProgressRecord, TemperatureRecord};

/// A status update produced by one poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// Job progress, ETA and job name.
    Progress(ProgressRecord),

    /// Tool and bed temperatures.
    Temperature(TemperatureRecord),

    /// Trigger to sample host CPU load. The consumer samples synchronously.
    Cpu,
}

impl StatusEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            StatusEvent::Progress(_) => "progress",
            StatusEvent::Temperature(_) => "temperature",
            StatusEvent::Cpu => "cpu",
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Progress(p) => match p.completion {
                Some(pct) => write!(f, "progress {pct}% eta {} ({})", p.eta, p.job_name),
                None => write!(f, "progress eta {} ({})", p.eta, p.job_name),
            },
            StatusEvent::Temperature(t) => write!(
                f,
                "temperature tool {}/{} bed {}/{}",
                t.tool_actual, t.tool_target, t.bed_actual, t.bed_target
            ),
            StatusEvent::Cpu => write!(f, "cpu"),
        }
    }
}
