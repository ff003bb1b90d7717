//! PWS Upload Protocol parameter catalog.
//!
//! Maps each wire parameter of the PWS upload query string to a semantic
//! sensor name, a value decoder, and optional unit / device-class
//! metadata. The whole protocol vocabulary lives in one declarative
//! table; adding a parameter means adding one entry.
//!
//! Reference: the PWS Upload Protocol sends readings as GET query
//! parameters, e.g.
//! `?ID=KCASANFR5&PASSWORD=XXX&dateutc=2000-01-01+10%3A32%3A35&tempf=70&...`

use chrono::NaiveDateTime;
use std::collections::HashMap;
use thiserror::Error;

use crate::types::{Measurement, Value};

/// Sensor name carried by the `dateutc` parameter. The date is a batch
/// timestamp, not a sensor reading; payload generation skips it.
pub const DATE_SENSOR: &str = "date";

/// Wire format of the `dateutc` parameter (naive local timestamp).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Units of measurement, matching the Home Assistant vocabulary.
pub mod units {
    pub const FAHRENHEIT: &str = "°F";
    pub const PERCENTAGE: &str = "%";
    pub const MILES_PER_HOUR: &str = "mph";
    pub const INCHES_OF_MERCURY: &str = "inHg";
    pub const WATTS_PER_SQUARE_METER: &str = "W/m²";
    pub const UV_INDEX: &str = "UV index";
    pub const INCHES: &str = "in";
    pub const PARTS_PER_MILLION: &str = "ppm";
    pub const PARTS_PER_BILLION: &str = "ppb";
    pub const MICROGRAMS_PER_CUBIC_METER: &str = "µg/m³";
}

/// Home Assistant sensor device classes used by the catalog.
pub mod device_classes {
    pub const DATE: &str = "date";
    pub const TEMPERATURE: &str = "temperature";
    pub const HUMIDITY: &str = "humidity";
    pub const PRESSURE: &str = "pressure";
    pub const WIND_SPEED: &str = "wind_speed";
    pub const WIND_DIRECTION: &str = "wind_direction";
    pub const MOISTURE: &str = "moisture";
    pub const IRRADIANCE: &str = "irradiance";
    pub const PRECIPITATION: &str = "precipitation";
}

/// Errors from applying a parameter decoder to a raw wire value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid integer: {0}")]
    Integer(#[from] std::num::ParseIntError),

    #[error("invalid float: {0}")]
    Float(#[from] std::num::ParseFloatError),

    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// How a raw wire value becomes a typed [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDecoder {
    /// Pass the string through unchanged.
    Identity,
    /// Parse as `i64`.
    Integer,
    /// Parse as `f64`.
    Float,
    /// Parse as a naive timestamp in [`DATE_FORMAT`].
    Timestamp,
}

impl ValueDecoder {
    pub fn apply(self, raw: &str) -> Result<Value, DecodeError> {
        match self {
            ValueDecoder::Identity => Ok(Value::Text(raw.to_string())),
            ValueDecoder::Integer => Ok(Value::Integer(raw.parse()?)),
            ValueDecoder::Float => Ok(Value::Float(raw.parse()?)),
            ValueDecoder::Timestamp => Ok(Value::Timestamp(NaiveDateTime::parse_from_str(
                raw,
                DATE_FORMAT,
            )?)),
        }
    }
}

/// One entry of the catalog: wire name → sensor name + decoder + metadata.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub wire_name: &'static str,
    pub sensor_name: &'static str,
    pub decoder: ValueDecoder,
    pub device_class: Option<&'static str>,
    pub unit: Option<&'static str>,
}

impl ParameterSpec {
    const fn new(wire_name: &'static str, sensor_name: &'static str, decoder: ValueDecoder) -> Self {
        Self {
            wire_name,
            sensor_name,
            decoder,
            device_class: None,
            unit: None,
        }
    }

    const fn device_class(mut self, device_class: &'static str) -> Self {
        self.device_class = Some(device_class);
        self
    }

    const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Decode a raw wire value into a measurement carrying this entry's
    /// unit and device-class metadata.
    pub fn decode(&self, raw: &str) -> Result<Measurement, DecodeError> {
        Ok(Measurement {
            value: self.decoder.apply(raw)?,
            unit: self.unit,
            device_class: self.device_class,
        })
    }
}

/// The full PWS upload parameter table.
///
/// Wire names are case-sensitive, exactly as station firmware sends them
/// (`tempf`, `UV`, `AqPM2.5`). `ID` and `PASSWORD` are protocol framing,
/// not measurements, and never appear here.
const STANDARD_PARAMETERS: &[ParameterSpec] = &{
    use self::device_classes as dc;
    use self::ValueDecoder::{Float, Identity, Integer, Timestamp};
    [
        // Generic fields
        ParameterSpec::new("dateutc", DATE_SENSOR, Timestamp).device_class(dc::DATE),
        ParameterSpec::new("softwaretype", "software_type", Identity),
        // Wind
        ParameterSpec::new("winddir", "wind_direction", Identity).device_class(dc::WIND_DIRECTION),
        ParameterSpec::new("windspeedmph", "wind_speed", Float)
            .device_class(dc::WIND_SPEED)
            .unit(units::MILES_PER_HOUR),
        ParameterSpec::new("windgustmph", "wind_gust_speed", Float)
            .device_class(dc::WIND_SPEED)
            .unit(units::MILES_PER_HOUR),
        ParameterSpec::new("windgustdir", "wind_gust_direction", Identity)
            .device_class(dc::WIND_DIRECTION),
        ParameterSpec::new("windspdmph_avg2m", "wind_speed_avg_2m", Float)
            .device_class(dc::WIND_SPEED)
            .unit(units::MILES_PER_HOUR),
        ParameterSpec::new("winddir_avg2m", "wind_direction_avg_2m", Float)
            .device_class(dc::WIND_DIRECTION),
        ParameterSpec::new("windgustmph_10m", "wind_gust_speed_10m", Float)
            .device_class(dc::WIND_SPEED)
            .unit(units::MILES_PER_HOUR),
        ParameterSpec::new("windgustdir_10m", "wind_gust_direction_10m", Identity)
            .device_class(dc::WIND_DIRECTION),
        // Outdoor temperature/pressure/humidity
        ParameterSpec::new("humidity", "outdoor_humidity", Float)
            .device_class(dc::HUMIDITY)
            .unit(units::PERCENTAGE),
        ParameterSpec::new("dewptf", "dew_temperature", Float)
            .device_class(dc::TEMPERATURE)
            .unit(units::FAHRENHEIT),
        ParameterSpec::new("tempf", "outdoor_temperature", Float)
            .device_class(dc::TEMPERATURE)
            .unit(units::FAHRENHEIT),
        // for extra outdoor sensors firmware sends temp2f, temp3f, ...
        ParameterSpec::new("baromin", "barometric_pressure", Float)
            .device_class(dc::PRESSURE)
            .unit(units::INCHES_OF_MERCURY),
        // General weather info (free text)
        ParameterSpec::new("weather", "weather_text", Identity),
        ParameterSpec::new("clouds", "clouds", Identity),
        // Soil
        ParameterSpec::new("soiltempf", "soil_temperature", Float)
            .device_class(dc::TEMPERATURE)
            .unit(units::FAHRENHEIT),
        ParameterSpec::new("soilmoisture", "soil_moisture", Float)
            .device_class(dc::MOISTURE)
            .unit(units::PERCENTAGE),
        ParameterSpec::new("leafwetness", "leaf_wetness", Float)
            .device_class(dc::MOISTURE)
            .unit(units::PERCENTAGE),
        // Sunlight
        ParameterSpec::new("solarradiation", "solar_radiation", Float)
            .device_class(dc::IRRADIANCE)
            .unit(units::WATTS_PER_SQUARE_METER),
        ParameterSpec::new("UV", "uv_index", Integer).unit(units::UV_INDEX),
        ParameterSpec::new("visibility", "nm_visibility", Identity),
        // Rain
        ParameterSpec::new("rainin", "rain_hourly", Float)
            .device_class(dc::PRECIPITATION)
            .unit(units::INCHES),
        ParameterSpec::new("dailyrainin", "rain_daily", Float)
            .device_class(dc::PRECIPITATION)
            .unit(units::INCHES),
        // Indoor sensors
        ParameterSpec::new("indoortempf", "indoor_temperature", Float)
            .device_class(dc::TEMPERATURE)
            .unit(units::FAHRENHEIT),
        ParameterSpec::new("indoorhumidity", "indoor_humidity", Float)
            .device_class(dc::HUMIDITY)
            .unit(units::PERCENTAGE),
        // Air quality
        ParameterSpec::new("AqNO", "pollution_no", Integer).unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqNO2T", "pollution_no2t", Integer).unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqNO2", "pollution_no2", Integer).unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqNO2Y", "pollution_no2y", Integer).unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqNOX", "pollution_nox", Integer).unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqNOY", "pollution_noy", Integer).unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqNO3", "pollution_no3_ion", Float)
            .unit(units::MICROGRAMS_PER_CUBIC_METER),
        ParameterSpec::new("AqSO4", "pollution_so4_ion", Float)
            .unit(units::MICROGRAMS_PER_CUBIC_METER),
        ParameterSpec::new("AqSO2", "pollution_sulfur_dioxide", Integer)
            .unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqSO2T", "pollution_sulfur_dioxide_trace", Integer)
            .unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqCO", "pollution_carbon_monoxide", Integer)
            .unit(units::PARTS_PER_MILLION),
        ParameterSpec::new("AqCOT", "pollution_carbon_monoxide_trace", Integer)
            .unit(units::PARTS_PER_BILLION),
        ParameterSpec::new("AqEC", "pollution_elemental_carbon", Float)
            .unit(units::MICROGRAMS_PER_CUBIC_METER),
        ParameterSpec::new("AqOC", "pollution_organic_carbon", Float)
            .unit(units::MICROGRAMS_PER_CUBIC_METER),
        ParameterSpec::new("AqBC", "pollution_black_carbon", Float)
            .unit(units::MICROGRAMS_PER_CUBIC_METER),
        ParameterSpec::new("AqUV", "pollution_uv_aeth", Float)
            .unit(units::MICROGRAMS_PER_CUBIC_METER),
        ParameterSpec::new("AqPM2.5", "pollution_pm25_mass", Float)
            .unit(units::MICROGRAMS_PER_CUBIC_METER),
        ParameterSpec::new("AqPM10", "pollution_pm10_mass", Float),
        ParameterSpec::new("AqOZONE", "pollution_ozone", Integer).unit(units::PARTS_PER_BILLION),
    ]
};

/// Immutable lookup table over the parameter entries.
///
/// An injectable value rather than a global: tests substitute a reduced
/// catalog without touching any shared state.
#[derive(Debug, Clone)]
pub struct ParameterCatalog {
    entries: HashMap<&'static str, ParameterSpec>,
}

impl ParameterCatalog {
    /// Build a catalog from an explicit entry list.
    pub fn from_entries(entries: &[ParameterSpec]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|spec| (spec.wire_name, spec.clone()))
                .collect(),
        }
    }

    /// The full standard PWS upload protocol table.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_PARAMETERS)
    }

    /// Look up a wire parameter. `None` is the expected answer for any
    /// vendor-specific or unsupported field, not an error.
    pub fn lookup(&self, wire_name: &str) -> Option<&ParameterSpec> {
        self.entries.get(wire_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ParameterCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
