//! OctoPrint REST client.
//!
//! Talks to `/api/job` and `/api/printer`, authenticating with the static API
//! key passed as the `apikey` query parameter.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use url::Url;

use super::{
    FetchError, FetchErrorKind, ProgressRecord, StatusSource, TemperatureRecord, format_eta,
};

const JOB_PATH: &str = "api/job";
const PRINTER_PATH: &str = "api/printer";

/// Job name shown when the printer has no file selected.
pub const NO_JOB: &str = "(no job)";

/// Temperature shown when the printer reports `null` (e.g. heater off).
pub const UNKNOWN_TEMPERATURE: &str = "?";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP status source backed by an OctoPrint server.
#[derive(Debug, Clone)]
pub struct OctoPrintClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    timeout: Duration,
}

impl OctoPrintClient {
    /// Creates a client for `host` (`name[:port]` or a full `http(s)://` URL).
    ///
    /// # Errors
    /// Returns an error if the host is empty or not a valid URL, or if the
    /// HTTP client cannot be built.
    pub fn new(host: &str, api_key: &str) -> Result<Self> {
        let base = base_url(host)?;
        let http = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base,
            api_key: api_key.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| FetchError::transport(format!("invalid endpoint '{path}': {e}")))?;

        // Errors carry the request URL, which includes the API key.
        let response = self
            .http
            .get(url)
            .query(query)
            .query(&[("apikey", self.api_key.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            FetchError::new(
                FetchErrorKind::Malformed,
                format!("invalid JSON: {}", e.without_url()),
            )
        })
    }
}

impl StatusSource for OctoPrintClient {
    async fn fetch_job_progress(&self) -> Result<ProgressRecord, FetchError> {
        let json = self.get_json(JOB_PATH, &[]).await?;
        let record = parse_job(&json)?;
        tracing::debug!(?record, "Got progress");
        Ok(record)
    }

    async fn fetch_temperatures(&self) -> Result<TemperatureRecord, FetchError> {
        let json = self.get_json(PRINTER_PATH, &[("history", "false")]).await?;
        let record = parse_printer(&json)?;
        tracing::debug!(?record, "Got temps");
        Ok(record)
    }
}

fn base_url(host: &str) -> Result<Url> {
    let trimmed = host.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("Host must not be empty");
    }
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        format!("{trimmed}/")
    } else {
        format!("http://{trimmed}/")
    };
    Url::parse(&with_scheme).with_context(|| format!("Invalid host '{host}'"))
}

fn parse_job(json: &Value) -> Result<ProgressRecord, FetchError> {
    let progress = json
        .get("progress")
        .filter(|v| v.is_object())
        .ok_or_else(|| FetchError::missing("progress"))?;

    let completion = progress
        .get("completion")
        .and_then(Value::as_f64)
        .map(to_percent);
    let eta = format_eta(progress.get("printTimeLeft").and_then(Value::as_f64));

    let file = json
        .get("job")
        .and_then(|job| job.get("file"))
        .filter(|v| v.is_object())
        .ok_or_else(|| FetchError::missing("job.file"))?;
    let job_name = match file.get("name") {
        Some(Value::String(name)) => name.clone(),
        Some(Value::Null) | None => NO_JOB.to_string(),
        Some(other) => other.to_string(),
    };

    Ok(ProgressRecord {
        completion,
        eta,
        job_name,
    })
}

fn parse_printer(json: &Value) -> Result<TemperatureRecord, FetchError> {
    let temperature = json
        .get("temperature")
        .filter(|v| v.is_object())
        .ok_or_else(|| FetchError::missing("temperature"))?;
    // Older servers nest readings under `temps`.
    let temps = temperature
        .get("temps")
        .filter(|v| v.is_object())
        .unwrap_or(temperature);

    let reading = |device: &str, field: &str| {
        temps
            .get(device)
            .and_then(|d| d.get(field))
            .map(display_value)
            .ok_or_else(|| FetchError::missing(&format!("temperature.{device}.{field}")))
    };

    Ok(TemperatureRecord {
        tool_actual: reading("tool0", "actual")?,
        tool_target: reading("tool0", "target")?,
        bed_actual: reading("bed", "actual")?,
        bed_target: reading("bed", "target")?,
    })
}

fn to_percent(value: f64) -> u8 {
    value.clamp(0.0, 100.0).floor() as u8
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => UNKNOWN_TEMPERATURE.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn job_body() -> Value {
        json!({
            "job": { "file": { "name": "part.gcode" } },
            "progress": { "completion": 42.7, "printTimeLeft": 3725 },
            "state": "Printing"
        })
    }

    fn printer_body() -> Value {
        json!({
            "temperature": {
                "tool0": { "actual": 200, "target": 210 },
                "bed": { "actual": 60, "target": 60 }
            }
        })
    }

    #[test]
    fn test_base_url_adds_scheme_and_slash() {
        assert_eq!(
            base_url("octopi.local").unwrap().as_str(),
            "http://octopi.local/"
        );
        assert_eq!(
            base_url("10.0.0.5:5000/").unwrap().as_str(),
            "http://10.0.0.5:5000/"
        );
        assert_eq!(
            base_url("https://printer.example/octo").unwrap().as_str(),
            "https://printer.example/octo/"
        );
    }

    #[test]
    fn test_base_url_rejects_empty_host() {
        assert!(base_url("  ").is_err());
    }

    #[test]
    fn test_parse_job_full_record() {
        let record = parse_job(&job_body()).unwrap();
        assert_eq!(
            record,
            ProgressRecord {
                completion: Some(42),
                eta: "1:02:05".to_string(),
                job_name: "part.gcode".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_job_without_time_left_uses_placeholder() {
        let body = json!({
            "job": { "file": { "name": "part.gcode" } },
            "progress": { "completion": 3.0, "printTimeLeft": null }
        });
        let record = parse_job(&body).unwrap();
        assert_eq!(record.eta, "00:00:00");
        assert_eq!(record.completion, Some(3));
    }

    #[test]
    fn test_parse_job_idle_printer() {
        let body = json!({
            "job": { "file": { "name": null } },
            "progress": { "completion": null, "printTimeLeft": null }
        });
        let record = parse_job(&body).unwrap();
        assert_eq!(record.completion, None);
        assert_eq!(record.job_name, NO_JOB);
    }

    #[test]
    fn test_parse_job_clamps_completion() {
        let body = json!({
            "job": { "file": { "name": "a.gcode" } },
            "progress": { "completion": 100.4 }
        });
        assert_eq!(parse_job(&body).unwrap().completion, Some(100));
    }

    #[test]
    fn test_parse_job_missing_progress_is_malformed() {
        let err = parse_job(&json!({ "job": { "file": {} } })).unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Malformed);

        let err = parse_job(&json!({ "progress": {} })).unwrap_err();
        assert_eq!(err, FetchError::missing("job.file"));
    }

    #[test]
    fn test_parse_printer_flat_layout() {
        let record = parse_printer(&printer_body()).unwrap();
        assert_eq!(
            record,
            TemperatureRecord {
                tool_actual: "200".to_string(),
                tool_target: "210".to_string(),
                bed_actual: "60".to_string(),
                bed_target: "60".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_printer_nested_temps_layout() {
        let body = json!({
            "temperature": {
                "temps": {
                    "tool0": { "actual": 214.8, "target": 215.0 },
                    "bed": { "actual": 59.9, "target": null }
                }
            }
        });
        let record = parse_printer(&body).unwrap();
        assert_eq!(record.tool_actual, "214.8");
        assert_eq!(record.tool_target, "215.0");
        assert_eq!(record.bed_target, UNKNOWN_TEMPERATURE);
    }

    #[test]
    fn test_parse_printer_missing_bed_is_malformed() {
        let body = json!({
            "temperature": { "tool0": { "actual": 20, "target": 0 } }
        });
        let err = parse_printer(&body).unwrap_err();
        assert_eq!(err, FetchError::missing("temperature.bed.actual"));
    }

    #[tokio::test]
    async fn test_fetch_job_progress_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/job"))
            .and(query_param("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(job_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OctoPrintClient::new(&server.uri(), "secret").unwrap();
        let record = client.fetch_job_progress().await.unwrap();
        assert_eq!(record.completion, Some(42));
        assert_eq!(record.job_name, "part.gcode");
    }

    #[tokio::test]
    async fn test_fetch_temperatures_disables_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/printer"))
            .and(query_param("history", "false"))
            .and(query_param("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(printer_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = OctoPrintClient::new(&server.uri(), "secret").unwrap();
        let record = client.fetch_temperatures().await.unwrap();
        assert_eq!(record.tool_target, "210");
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/job"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = OctoPrintClient::new(&server.uri(), "wrong").unwrap();
        let err = client.fetch_job_progress().await.unwrap_err();
        assert_eq!(err, FetchError::http_status(403));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/printer"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = OctoPrintClient::new(&server.uri(), "secret").unwrap();
        let err = client.fetch_temperatures().await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Malformed);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error_without_key() {
        let client = OctoPrintClient::new("127.0.0.1:1", "top-secret")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let err = client.fetch_job_progress().await.unwrap_err();
        assert_eq!(err.kind, FetchErrorKind::Transport);
        assert!(!err.message.contains("top-secret"));
    }
}
