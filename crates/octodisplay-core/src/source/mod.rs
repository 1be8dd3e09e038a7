//! Status source contract.
//!
//! A status source answers two questions about the printer: how far along the
//! current job is, and what the tool/bed temperatures are. Failures are values
//! (`FetchError`), never panics; pollers log them and skip the cycle.

mod octoprint;

use std::fmt;
use std::future::Future;

pub use octoprint::{NO_JOB, OctoPrintClient, UNKNOWN_TEMPERATURE};

/// ETA shown when the source reports no remaining time.
pub const UNKNOWN_ETA: &str = "00:00:00";

/// Job progress snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    /// Completion percentage in 0..=100; `None` when the source has none.
    pub completion: Option<u8>,
    /// Remaining time as `H:MM:SS`.
    pub eta: String,
    pub job_name: String,
}

/// Tool and bed temperatures, already coerced to display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureRecord {
    pub tool_actual: String,
    pub tool_target: String,
    pub bed_actual: String,
    pub bed_target: String,
}

/// Category of fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Network error, timeout or connection refused.
    Transport,
    /// Non-success HTTP status.
    HttpStatus,
    /// Success response that is not JSON or lacks an expected field.
    Malformed,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Transport => write!(f, "transport"),
            FetchErrorKind::HttpStatus => write!(f, "http_status"),
            FetchErrorKind::Malformed => write!(f, "malformed"),
        }
    }
}

/// Failure to obtain a status record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// One-line summary suitable for the log.
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Transport, message)
    }

    pub fn http_status(status: u16) -> Self {
        Self::new(FetchErrorKind::HttpStatus, format!("HTTP {status}"))
    }

    /// Creates an error for a response missing `field`.
    pub fn missing(field: &str) -> Self {
        Self::new(
            FetchErrorKind::Malformed,
            format!("response is missing '{field}'"),
        )
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {}

/// Remote printer status API.
pub trait StatusSource: Send + Sync + 'static {
    /// Fetches progress of the active print job.
    fn fetch_job_progress(&self)
    -> impl Future<Output = Result<ProgressRecord, FetchError>> + Send;

    /// Fetches current tool and bed temperatures.
    fn fetch_temperatures(&self)
    -> impl Future<Output = Result<TemperatureRecord, FetchError>> + Send;
}

/// Formats remaining seconds as `H:MM:SS`.
///
/// Hours are not padded and not wrapped, so `90000` is `"25:00:00"`.
pub fn format_duration(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{h}:{m:02}:{s:02}")
}

/// Formats an optional remaining-seconds value, substituting [`UNKNOWN_ETA`].
///
/// Fractional seconds are floored; negative values count as zero.
pub fn format_eta(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) if secs.is_finite() => format_duration(secs.max(0.0).floor() as u64),
        _ => UNKNOWN_ETA.to_string(),
    }
}
