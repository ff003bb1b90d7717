//! PWS Upload Protocol translation.
//!
//! The protocol is a fixed-schema HTTP GET query string: `ID` and
//! `PASSWORD` carry the station credentials, every other recognized key
//! is a sensor reading. This module owns the parameter catalog and the
//! best-effort decoding of a raw field map into typed measurements.

pub mod catalog;
pub mod decoder;

pub use catalog::{DecodeError, ParameterCatalog, ParameterSpec, ValueDecoder, DATE_SENSOR};
pub use decoder::{decode_fields, DecodedBatch};
