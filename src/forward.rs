//! Forwarding of sensor payloads to Home Assistant.
//!
//! The sink is an explicit collaborator the boundary hands payloads to,
//! not state stored on a station. A failed forward is a dropped update:
//! logged with full request context, never retried, never surfaced to
//! the inbound request.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::payload::SensorPayload;

/// Fixed timeout for a state POST. Station firmware uploads every few
/// seconds; a slow Home Assistant must not back up inbound requests.
const FORWARD_TIMEOUT: Duration = Duration::from_secs(1);

/// Forwarding errors
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Home Assistant returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Downstream collaborator receiving the per-sensor payloads of an
/// applied update batch.
#[async_trait]
pub trait PayloadSink: Send + Sync {
    /// Hand over every payload of one batch. Implementations own their
    /// failure handling; publishing never fails the caller.
    async fn publish(&self, station_id: &str, payloads: &HashMap<String, SensorPayload>);
}

/// Home Assistant REST API client.
///
/// One `POST /api/states/sensor.<station>_<sensor>` per payload, bearer
/// token auth, 1 second timeout.
#[derive(Debug, Clone)]
pub struct HaClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HaClient {
    pub fn new(
        host: &str,
        port: u16,
        use_https: bool,
        token: &str,
    ) -> Result<Self, ForwardError> {
        let scheme = if use_https { "https" } else { "http" };
        let http = reqwest::Client::builder()
            .timeout(FORWARD_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{scheme}://{host}:{port}"),
            token: token.to_string(),
        })
    }

    fn state_url(&self, station_id: &str, sensor_name: &str) -> String {
        format!(
            "{}/api/states/sensor.{}_{}",
            self.base_url, station_id, sensor_name
        )
    }

    /// POST one sensor state. Non-2xx responses are logged here, where
    /// the response body is still available, and reported as `Status`.
    async fn post_state(
        &self,
        url: &str,
        payload: &SensorPayload,
    ) -> Result<(), ForwardError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_sent = serde_json::to_string(payload).unwrap_or_default();
            let response_body = response.text().await.unwrap_or_default();
            warn!(
                url = %url,
                status = %status,
                headers = "Authorization: Bearer <redacted>",
                body_sent = %body_sent,
                response = %response_body,
                "Home Assistant rejected state update"
            );
            return Err(ForwardError::Status(status));
        }

        Ok(())
    }
}

#[async_trait]
impl PayloadSink for HaClient {
    async fn publish(&self, station_id: &str, payloads: &HashMap<String, SensorPayload>) {
        for (sensor_name, payload) in payloads {
            let url = self.state_url(station_id, sensor_name);
            if let Err(err) = self.post_state(&url, payload).await {
                // One failed sensor must not block the remaining ones.
                warn!(
                    station = %station_id,
                    sensor = %sensor_name,
                    url = %url,
                    error = %err,
                    "State update dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_url_shape() {
        let client = HaClient::new("ha.local", 8123, false, "token").unwrap();
        assert_eq!(
            client.state_url("KCASANFR5", "outdoor_temperature"),
            "http://ha.local:8123/api/states/sensor.KCASANFR5_outdoor_temperature"
        );
    }

    #[test]
    fn https_flag_switches_scheme() {
        let client = HaClient::new("ha.local", 443, true, "token").unwrap();
        assert_eq!(
            client.state_url("s1", "uv_index"),
            "https://ha.local:443/api/states/sensor.s1_uv_index"
        );
    }
}
