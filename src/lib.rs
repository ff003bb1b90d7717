//! PWS Bridge: Personal Weather Station → Home Assistant
//!
//! Translates the PWS Upload Protocol (the fixed HTTP GET query-string
//! format weather-station firmware reports with) into normalized, typed
//! measurements and republishes them as Home Assistant sensor states.
//!
//! ## Pipeline
//!
//! - **Protocol**: wire parameter catalog and best-effort batch decoding
//! - **Station**: credential registry and per-station snapshot state
//! - **Payload**: per-sensor `{state, attributes}` rendering
//! - **Forward**: Home Assistant REST client behind a sink trait

pub mod config;
pub mod forward;
pub mod payload;
pub mod protocol;
pub mod server;
pub mod station;
pub mod types;

// Re-export the pipeline surface
pub use config::{AuthPolicy, BridgeConfig};
pub use forward::{HaClient, PayloadSink};
pub use payload::{build_payloads, PayloadError, SensorPayload};
pub use protocol::{decode_fields, DecodedBatch, ParameterCatalog};
pub use station::{Station, StationRegistry, StationState};
pub use types::{Measurement, Value};
