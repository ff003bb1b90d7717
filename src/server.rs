//! Inbound HTTP boundary.
//!
//! Station firmware uploads readings as
//! `GET /weatherstation/updateweatherstation.php?ID=..&PASSWORD=..&tempf=..`.
//! The handler splits credentials from payload fields, authenticates,
//! decodes, applies the snapshot, and hands the payloads to the sink.
//! Forwarding failures never reach the inbound response — by the time
//! they happen the upload protocol is already satisfied.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::AuthPolicy;
use crate::forward::PayloadSink;
use crate::payload::build_payloads;
use crate::protocol::{decode_fields, ParameterCatalog};
use crate::station::StationRegistry;

/// The fixed upload path PWS firmware is hardcoded to.
pub const UPDATE_PATH: &str = "/weatherstation/updateweatherstation.php";

/// Response body firmware checks for on success.
const SUCCESS_BODY: &str = "success\n";

/// Shared state for the bridge router.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<StationRegistry>,
    pub catalog: Arc<ParameterCatalog>,
    pub sink: Arc<dyn PayloadSink>,
    pub auth_policy: AuthPolicy,
}

/// Build the bridge router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(UPDATE_PATH, get(update_weatherstation))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the probe router: same path, but decode-and-log only. Accepts
/// any credentials and forwards nothing.
pub fn probe_router(catalog: Arc<ParameterCatalog>) -> Router {
    Router::new()
        .route(UPDATE_PATH, get(probe_weatherstation))
        .layer(TraceLayer::new_for_http())
        .with_state(catalog)
}

/// Split `ID`/`PASSWORD` out of the query fields. Credentials are
/// protocol framing, never measurements.
fn split_credentials(
    fields: &mut HashMap<String, String>,
) -> Result<(String, String), &'static str> {
    let id = fields.remove("ID").ok_or("missing ID parameter\n")?;
    let secret = fields.remove("PASSWORD").ok_or("missing PASSWORD parameter\n")?;
    Ok((id, secret))
}

/// GET /weatherstation/updateweatherstation.php
async fn update_weatherstation(
    State(state): State<AppState>,
    Query(mut fields): Query<HashMap<String, String>>,
) -> Response {
    let (id, secret) = match split_credentials(&mut fields) {
        Ok(credentials) => credentials,
        Err(body) => return (StatusCode::BAD_REQUEST, body).into_response(),
    };

    let matched = state.registry.authenticate(&id, &secret);
    if matched.is_empty() {
        return match state.auth_policy {
            AuthPolicy::Strict => {
                warn!(station = %id, "Rejected update: invalid station ID/password");
                (StatusCode::FORBIDDEN, "Invalid station ID/password\n").into_response()
            }
            AuthPolicy::Lenient => {
                warn!(station = %id, "Ignored update from unknown station");
                (StatusCode::OK, SUCCESS_BODY).into_response()
            }
        };
    }

    for station in matched {
        let batch = decode_fields(&fields, &state.catalog);
        info!(
            station = %station.id,
            recognized = batch.measurements.len(),
            unmatched = batch.unmatched.len(),
            "Station update"
        );

        station.apply_batch(batch.measurements).await;

        match build_payloads(&station.state().await) {
            Ok(payloads) => state.sink.publish(&station.id, &payloads).await,
            Err(err) => {
                // Snapshot is stored; only payload generation is skipped.
                warn!(station = %station.id, error = %err, "Not forwarding batch");
            }
        }
    }

    (StatusCode::OK, SUCCESS_BODY).into_response()
}

/// GET /weatherstation/updateweatherstation.php (probe mode)
async fn probe_weatherstation(
    State(catalog): State<Arc<ParameterCatalog>>,
    Query(mut fields): Query<HashMap<String, String>>,
) -> Response {
    let station_id = fields.remove("ID");
    let station_key = fields.remove("PASSWORD");

    info!(
        station = %station_id.as_deref().unwrap_or("<none>"),
        key = %station_key.as_deref().unwrap_or("<none>"),
        "*** Begin station update ***"
    );

    let batch = decode_fields(&fields, &catalog);
    for (sensor, measurement) in &batch.measurements {
        info!(
            sensor = %sensor,
            value = %measurement.value.render(),
            unit = measurement.unit.unwrap_or(""),
            "Recognized sensor"
        );
    }
    for (parameter, value) in &batch.unmatched {
        debug!(parameter = %parameter, value = %value, "Unrecognized parameter");
    }

    info!("*** End station update ***");
    (StatusCode::OK, SUCCESS_BODY).into_response()
}
