//! Rendering of a station snapshot into Home Assistant state payloads.
//!
//! One payload per non-date sensor: `state` is the string rendering of
//! the measurement value, `attributes` carry unit, device class, a
//! friendly name, and the batch timestamp. Pure — no network, no clock.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::protocol::DATE_SENSOR;
use crate::station::StationState;

/// Why payloads could not be generated from a station's state.
///
/// `DateAbsent` is deliberately distinct from `NoMeasurement`: a batch
/// was stored but carried no decodable date, and substituting wall-clock
/// time or a stale timestamp would misdate every sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("no measurement")]
    NoMeasurement,

    #[error("date absent from measurement")]
    DateAbsent,
}

/// Sensor attributes, serialized in a fixed field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    pub friendly_name: String,
    pub updated: String,
}

/// The JSON body POSTed to `/api/states/sensor.<station>_<sensor>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorPayload {
    pub state: String,
    pub attributes: PayloadAttributes,
}

/// Render the batch timestamp the way Home Assistant expects: ISO-8601
/// with an offset when one is known. The upload protocol's date is
/// naive, so no offset suffix is produced.
fn render_updated(timestamp: chrono::NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Build one payload per non-date sensor in the latest snapshot.
pub fn build_payloads(
    state: &StationState,
) -> Result<HashMap<String, SensorPayload>, PayloadError> {
    let snapshot = state.snapshot().ok_or(PayloadError::NoMeasurement)?;
    let batch_timestamp = snapshot.batch_timestamp.ok_or(PayloadError::DateAbsent)?;
    let updated = render_updated(batch_timestamp);

    let mut payloads = HashMap::new();
    for (name, measurement) in &snapshot.measurements {
        // The date stamps the batch; it is not a sensor of its own.
        if name == DATE_SENSOR {
            continue;
        }

        payloads.insert(
            name.clone(),
            SensorPayload {
                state: measurement.value.render(),
                attributes: PayloadAttributes {
                    unit_of_measurement: measurement.unit.map(str::to_string),
                    device_class: measurement.device_class.map(str::to_string),
                    friendly_name: name.clone(),
                    updated: updated.clone(),
                },
            },
        );
    }

    Ok(payloads)
}
