//! Core measurement types shared across the pipeline.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A decoded measurement value.
///
/// The concrete kind is chosen by the catalog entry's decoder, not
/// declared by the station: `tempf` always decodes to `Float`, `UV`
/// to `Integer`, `dateutc` to `Timestamp`, free-text fields to `Text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Float(f64),
    Integer(i64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Render the value as a Home Assistant state string.
    ///
    /// Floats always carry a decimal point (`42.0` renders as "42.0"),
    /// integers and text render verbatim, timestamps as naive ISO-8601.
    pub fn render(&self) -> String {
        match self {
            Value::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    format!("{v:.1}")
                } else {
                    v.to_string()
                }
            }
            Value::Integer(v) => v.to_string(),
            Value::Text(s) => s.clone(),
            Value::Timestamp(t) => t.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }

    /// Extract the timestamp, if this value holds one.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

/// A single normalized sensor reading.
///
/// Immutable once constructed. Unit and device class come from the
/// catalog entry that produced it; a measurement's own unit takes
/// precedence over the catalog default when payloads are built.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub value: Value,
    pub unit: Option<&'static str>,
    pub device_class: Option<&'static str>,
}

impl Measurement {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            unit: None,
            device_class: None,
        }
    }

    pub fn with_unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_device_class(mut self, device_class: &'static str) -> Self {
        self.device_class = Some(device_class);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn float_state_keeps_decimal_point() {
        assert_eq!(Value::Float(42.0).render(), "42.0");
        assert_eq!(Value::Float(29.1).render(), "29.1");
    }

    #[test]
    fn integer_and_text_render_verbatim() {
        assert_eq!(Value::Integer(1013).render(), "1013");
        assert_eq!(Value::Text("sunny".to_string()).render(), "sunny");
    }

    #[test]
    fn timestamp_renders_naive_iso8601() {
        let t = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(Value::Timestamp(t).render(), "1999-12-31T23:59:59");
    }

    #[test]
    fn measurement_builder_attaches_metadata() {
        let m = Measurement::new(Value::Float(42.0))
            .with_unit("°F")
            .with_device_class("temperature");
        assert_eq!(m.value, Value::Float(42.0));
        assert_eq!(m.unit, Some("°F"));
        assert_eq!(m.device_class, Some("temperature"));
    }
}
