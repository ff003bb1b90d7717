//! Stations, authentication, and per-station measurement state.
//!
//! Authentication is a filter, not a lookup: `authenticate` returns
//! every station whose (id, secret) pair equals the request credentials.
//! Id/secret pairs are not enforced unique, so the match set may hold
//! more than one station; whether an empty set is an error is the
//! caller's policy, not the registry's.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::protocol::DATE_SENSOR;
use crate::types::Measurement;

/// A provisioned station id/secret pair, as it appears in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationCredentials {
    pub id: String,
    pub secret: String,
}

/// One upload batch as stored: the full measurement set plus the batch
/// timestamp decoded from the `dateutc` field, if it was present.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub measurements: HashMap<String, Measurement>,
    pub batch_timestamp: Option<NaiveDateTime>,
}

/// Per-station mutable state. Holds at most the latest snapshot; each
/// upload fully replaces the previous one (never a merge).
#[derive(Debug, Clone, Default)]
pub struct StationState {
    latest: Option<Snapshot>,
}

impl StationState {
    /// Replace the stored snapshot with a freshly decoded batch and
    /// stamp the batch timestamp from its date measurement.
    pub fn apply(&mut self, measurements: HashMap<String, Measurement>) {
        let batch_timestamp = measurements
            .get(DATE_SENSOR)
            .and_then(|m| m.value.as_timestamp());
        self.latest = Some(Snapshot {
            measurements,
            batch_timestamp,
        });
    }

    /// The latest snapshot, or `None` if no upload has been applied yet.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }
}

/// A provisioned station and its process-lifetime state.
///
/// The state sits behind a lock so measurements and batch timestamp are
/// always replaced as one unit; a reader never observes the timestamp of
/// one batch paired with the values of another.
#[derive(Debug)]
pub struct Station {
    pub id: String,
    secret: String,
    state: Mutex<StationState>,
}

impl Station {
    pub fn new(id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            state: Mutex::new(StationState::default()),
        }
    }

    fn matches(&self, id: &str, secret: &str) -> bool {
        self.id == id && self.secret == secret
    }

    /// Atomically replace this station's snapshot.
    pub async fn apply_batch(&self, measurements: HashMap<String, Measurement>) {
        self.state.lock().await.apply(measurements);
    }

    /// A consistent copy of the current state.
    pub async fn state(&self) -> StationState {
        self.state.lock().await.clone()
    }
}

/// The static set of provisioned stations.
#[derive(Debug, Default)]
pub struct StationRegistry {
    stations: Vec<Arc<Station>>,
}

impl StationRegistry {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations: stations.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn from_credentials(credentials: &[StationCredentials]) -> Self {
        Self::new(
            credentials
                .iter()
                .map(|c| Station::new(c.id.clone(), c.secret.clone()))
                .collect(),
        )
    }

    /// Every station whose credentials equal the given pair. Possibly
    /// empty, possibly more than one — callers decide what that means.
    pub fn authenticate(&self, id: &str, secret: &str) -> Vec<Arc<Station>> {
        self.stations
            .iter()
            .filter(|station| station.matches(id, secret))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Measurement, Value};
    use chrono::NaiveDate;

    fn sample_registry(count: usize) -> StationRegistry {
        StationRegistry::new(
            (0..count)
                .map(|i| Station::new(format!("test_station{i}"), "test_password"))
                .collect(),
        )
    }

    fn batch(pairs: &[(&str, Value)]) -> HashMap<String, Measurement> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), Measurement::new(value.clone())))
            .collect()
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(10, 32, 35)
            .unwrap()
    }

    #[test]
    fn authenticate_exact_match_only() {
        let registry = sample_registry(3);
        let matched = registry.authenticate("test_station1", "test_password");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, "test_station1");

        assert!(registry.authenticate("test_station1", "wrong").is_empty());
        assert!(registry.authenticate("unknown", "test_password").is_empty());
    }

    #[test]
    fn authenticate_returns_all_duplicates() {
        let registry = StationRegistry::new(vec![
            Station::new("dup", "s"),
            Station::new("dup", "s"),
            Station::new("other", "s"),
        ]);
        assert_eq!(registry.authenticate("dup", "s").len(), 2);
    }

    #[tokio::test]
    async fn apply_stamps_batch_timestamp_from_date() {
        let station = Station::new("s1", "p");
        station
            .apply_batch(batch(&[
                ("date", Value::Timestamp(date(2000, 1, 1))),
                ("outdoor_temperature", Value::Float(70.0)),
            ]))
            .await;

        let state = station.state().await;
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.batch_timestamp, Some(date(2000, 1, 1)));
        assert_eq!(snapshot.measurements.len(), 2);
    }

    #[tokio::test]
    async fn apply_without_date_leaves_timestamp_unset() {
        let station = Station::new("s1", "p");
        station
            .apply_batch(batch(&[("outdoor_humidity", Value::Float(90.0))]))
            .await;

        let state = station.state().await;
        assert_eq!(state.snapshot().unwrap().batch_timestamp, None);
    }

    #[tokio::test]
    async fn second_batch_replaces_first() {
        let station = Station::new("s1", "p");
        station
            .apply_batch(batch(&[
                ("date", Value::Timestamp(date(2000, 1, 1))),
                ("outdoor_temperature", Value::Float(70.0)),
            ]))
            .await;
        station
            .apply_batch(batch(&[
                ("date", Value::Timestamp(date(2000, 1, 2))),
                ("outdoor_humidity", Value::Float(90.0)),
            ]))
            .await;

        let state = station.state().await;
        let snapshot = state.snapshot().unwrap();
        assert!(!snapshot.measurements.contains_key("outdoor_temperature"));
        assert!(snapshot.measurements.contains_key("outdoor_humidity"));
        assert_eq!(snapshot.batch_timestamp, Some(date(2000, 1, 2)));
    }

    #[tokio::test]
    async fn fresh_station_has_no_snapshot() {
        let station = Station::new("s1", "p");
        assert!(station.state().await.snapshot().is_none());
    }
}
