//! Best-effort decoding of raw upload fields into measurements.
//!
//! Each field is processed independently: unknown parameters and
//! malformed values are logged at warning level and skipped, never
//! aborting the batch. Credentials (`ID`, `PASSWORD`) are stripped by
//! the boundary before this module ever sees the fields.

use std::collections::HashMap;
use tracing::warn;

use super::catalog::ParameterCatalog;
use crate::types::Measurement;

/// Result of decoding one upload batch.
#[derive(Debug, Default)]
pub struct DecodedBatch {
    /// Sensor name → measurement, for every field the catalog recognized
    /// and decoded successfully.
    pub measurements: HashMap<String, Measurement>,
    /// Wire name → raw value, for every field outside the catalog.
    pub unmatched: HashMap<String, String>,
}

/// Decode a raw wire-name → value map against the catalog.
///
/// Unknown fields land in `unmatched`; a field whose value fails its
/// decoder is dropped while its siblings are kept.
pub fn decode_fields(
    raw_fields: &HashMap<String, String>,
    catalog: &ParameterCatalog,
) -> DecodedBatch {
    let mut batch = DecodedBatch::default();

    for (wire_name, raw_value) in raw_fields {
        let Some(spec) = catalog.lookup(wire_name) else {
            warn!(parameter = %wire_name, value = %raw_value, "Unknown parameter");
            batch.unmatched.insert(wire_name.clone(), raw_value.clone());
            continue;
        };

        match spec.decode(raw_value) {
            Ok(measurement) => {
                batch
                    .measurements
                    .insert(spec.sensor_name.to_string(), measurement);
            }
            Err(err) => {
                warn!(parameter = %wire_name, value = %raw_value, error = %err,
                    "Parameter decode failed");
            }
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::catalog::units;
    use crate::types::Value;
    use chrono::NaiveDate;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decodes_known_field_via_catalog() {
        let catalog = ParameterCatalog::standard();
        let batch = decode_fields(&fields(&[("tempf", "42.0")]), &catalog);

        assert_eq!(batch.measurements.len(), 1);
        assert!(batch.unmatched.is_empty());

        let m = &batch.measurements["outdoor_temperature"];
        assert_eq!(m.value, Value::Float(42.0));
        assert_eq!(m.unit, Some(units::FAHRENHEIT));
    }

    #[test]
    fn unknown_field_goes_to_unmatched() {
        let catalog = ParameterCatalog::standard();
        let batch = decode_fields(&fields(&[("nonxist", "42.0")]), &catalog);

        assert!(batch.measurements.is_empty());
        assert_eq!(batch.unmatched.len(), 1);
        assert_eq!(batch.unmatched["nonxist"], "42.0");
    }

    #[test]
    fn malformed_field_dropped_siblings_kept() {
        let catalog = ParameterCatalog::standard();
        let batch = decode_fields(
            &fields(&[
                ("tempf", "not-a-number"),
                ("humidity", "90"),
                ("UV", "5"),
                ("dateutc", "2000-01-01 10:32:35"),
            ]),
            &catalog,
        );

        // tempf is dropped, the other three survive
        assert_eq!(batch.measurements.len(), 3);
        assert!(!batch.measurements.contains_key("outdoor_temperature"));
        assert_eq!(
            batch.measurements["outdoor_humidity"].value,
            Value::Float(90.0)
        );
        assert_eq!(batch.measurements["uv_index"].value, Value::Integer(5));
        assert!(batch.unmatched.is_empty());
    }

    #[test]
    fn malformed_date_dropped_like_any_field() {
        let catalog = ParameterCatalog::standard();
        let batch = decode_fields(
            &fields(&[("dateutc", "01/01/2000"), ("tempf", "70")]),
            &catalog,
        );

        assert_eq!(batch.measurements.len(), 1);
        assert!(batch.measurements.contains_key("outdoor_temperature"));
    }

    #[test]
    fn representative_firmware_request() {
        // Field set a real station sends (minus credentials)
        let catalog = ParameterCatalog::standard();
        let batch = decode_fields(
            &fields(&[
                ("dateutc", "2000-01-01 10:32:35"),
                ("winddir", "230"),
                ("windspeedmph", "12"),
                ("windgustmph", "12"),
                ("tempf", "70"),
                ("rainin", "0"),
                ("baromin", "29.1"),
                ("dewptf", "68.2"),
                ("humidity", "90"),
                ("weather", "sunny"),
                ("clouds", "none"),
                ("softwaretype", "vws%20versionxx"),
                ("action", "updateraw"),
            ]),
            &catalog,
        );

        assert_eq!(batch.measurements.len(), 12);
        assert_eq!(batch.unmatched.len(), 1);
        assert!(batch.unmatched.contains_key("action"));

        let date = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(10, 32, 35)
            .unwrap();
        assert_eq!(
            batch.measurements["date"].value,
            Value::Timestamp(date)
        );
        assert_eq!(
            batch.measurements["weather_text"].value,
            Value::Text("sunny".to_string())
        );
    }
}
