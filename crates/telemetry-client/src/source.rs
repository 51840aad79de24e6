//! Telemetry Sources
//!
//! `HttpSource` reads the remote endpoint. `StaticSource` serves a fixed
//! reading for offline runs and tests.

use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use telemetry_types::RawReading;
use tracing::{debug, info};

/// Anything that can produce a batch of raw readings
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

#[async_trait]
impl TelemetrySource for Box<dyn TelemetrySource> {
    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        (**self).fetch().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// The endpoint answers with either one record or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<RawReading>),
    One(RawReading),
}

/// Decode a response body into raw readings
pub fn decode_payload(body: &[u8]) -> Result<Vec<RawReading>, FetchError> {
    let readings = match serde_json::from_slice::<Payload>(body)? {
        Payload::Many(readings) => readings,
        Payload::One(reading) => vec![reading],
    };

    if readings.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(readings)
}

/// HTTP telemetry endpoint
pub struct HttpSource {
    client: Client,
    endpoint: String,
    device_id: Option<String>,
    timeout: Duration,
}

impl HttpSource {
    /// Create a source for the given endpoint
    pub fn new(endpoint: &str, device_id: Option<String>, timeout: Duration) -> Self {
        info!("Creating HTTP telemetry source for {}", endpoint);
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            device_id,
            timeout,
        }
    }
}

#[async_trait]
impl TelemetrySource for HttpSource {
    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        let mut request = self.client.get(&self.endpoint).timeout(self.timeout);
        if let Some(device_id) = &self.device_id {
            request = request.query(&[("device_id", device_id)]);
        }

        let timeout_ms = self.timeout.as_millis() as u64;
        let to_fetch_error = |err: reqwest::Error| {
            if err.is_timeout() {
                FetchError::Timeout(timeout_ms)
            } else {
                FetchError::Http(err.to_string())
            }
        };

        let response = request.send().await.map_err(to_fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(to_fetch_error)?;
        debug!("Fetched {} bytes from {}", body.len(), self.endpoint);
        decode_payload(&body)
    }

    fn describe(&self) -> String {
        match &self.device_id {
            Some(id) => format!("{} (device {})", self.endpoint, id),
            None => self.endpoint.clone(),
        }
    }
}

/// Fixed readings, re-stamped with the current time on every fetch
pub struct StaticSource {
    readings: Vec<RawReading>,
}

impl StaticSource {
    pub fn new(readings: Vec<RawReading>) -> Self {
        Self { readings }
    }

    /// A single healthy RO purifier
    pub fn sample() -> Self {
        info!("Creating static telemetry source with a sample reading");
        Self::new(vec![RawReading {
            device_id: Some("223".to_string()),
            tds: Some("185".to_string()),
            flow: Some("2.1".to_string()),
            temperature: Some("26.4".to_string()),
            ph: Some("7.24".to_string()),
            filter_health: Some("58.0".to_string()),
            filter_type: Some("RO".to_string()),
            timestamp: None,
        }])
    }
}

#[async_trait]
impl TelemetrySource for StaticSource {
    async fn fetch(&self) -> Result<Vec<RawReading>, FetchError> {
        if self.readings.is_empty() {
            return Err(FetchError::Empty);
        }
        let now = chrono::Utc::now().to_rfc3339();
        Ok(self
            .readings
            .iter()
            .cloned()
            .map(|mut reading| {
                reading.timestamp.get_or_insert_with(|| now.clone());
                reading
            })
            .collect())
    }

    fn describe(&self) -> String {
        format!("static ({} reading(s))", self.readings.len())
    }
}
