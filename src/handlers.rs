//! ==============================================================================
//! handlers.rs - ingest, query, clear and health operations
//! ==============================================================================
//!
//! purpose:
//!     the request logic, independent of axum. every function takes the
//!     history by reference so tests can run against an isolated log.
//!     server.rs wraps these in thin http handlers.
//!
//! relationships:
//!     - uses: event_log.rs (append / snapshot / clear / count)
//!     - uses: domain.rs (Submission -> EventRecord)
//!     - used by: server.rs
//!
//! ==============================================================================

use crate::domain::{self, EventRecord, Order, Submission};
use crate::error::{ApiError, ApiResult};
use crate::event_log::BoundedEventLog;

use serde::Serialize;

/// reply to a successful ingest
#[derive(Debug, Serialize)]
pub struct IngestAck {
    pub status: &'static str,
    pub message: &'static str,
    pub total_registros: usize,
    pub timestamp: String,
}

/// `{total, registros}` as returned by both history endpoints
#[derive(Debug, Serialize)]
pub struct RecordList {
    pub total: usize,
    pub registros: Vec<EventRecord>,
}

#[derive(Debug, Serialize)]
pub struct ClearAck {
    pub status: &'static str,
    pub message: &'static str,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub registros: usize,
    pub timestamp: String,
}

/// parse a raw ingest body into a submission
///
/// the body must be a json object. an empty body, broken json, or any
/// other json value (array, string, null...) is malformed input.
pub fn parse_submission(body: &[u8]) -> ApiResult<Submission> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::MalformedInput("no JSON body received".to_string()));
    }

    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::MalformedInput(format!("invalid JSON body: {}", e)))?;

    if !value.is_object() {
        return Err(ApiError::MalformedInput(
            "JSON body must be an object".to_string(),
        ));
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::MalformedInput(format!("invalid field: {}", e)))
}

/// accept one reading and commit it to the history
///
/// nothing is appended unless the body parses.
pub async fn ingest(
    log: &BoundedEventLog,
    body: &[u8],
    show_readings: bool,
) -> ApiResult<IngestAck> {
    let submission = parse_submission(body)?;
    let record = EventRecord::from_submission(submission, domain::clock_hms());

    let timestamp = record.recorded_at.clone();
    let preview = show_readings.then(|| record.clone());
    let total = log.append(record).await;

    if let Some(r) = preview {
        tracing::info!(
            device = %r.device,
            time = %r.recorded_at,
            uid_hex = %r.uid_hex,
            uid_dec = %r.uid_dec,
            total,
            "[RFID] tag read received"
        );
    }

    Ok(IngestAck {
        status: "success",
        message: "UID received",
        total_registros: total,
        timestamp,
    })
}

/// history, newest first (what the dashboard polls)
pub async fn list_recent(log: &BoundedEventLog) -> RecordList {
    let (total, registros) = log.counted_snapshot(Order::NewestFirst).await;
    RecordList { total, registros }
}

/// history in arrival order
pub async fn list_all(log: &BoundedEventLog) -> RecordList {
    let (total, registros) = log.counted_snapshot(Order::OldestFirst).await;
    RecordList { total, registros }
}

pub async fn health(log: &BoundedEventLog) -> Health {
    Health {
        status: "online",
        registros: log.count().await,
        timestamp: domain::clock_hms(),
    }
}

/// wipe the history; clearing an empty log is fine
pub async fn clear_all(log: &BoundedEventLog) -> ClearAck {
    log.clear().await;
    tracing::info!("[RFID] history cleared");
    ClearAck {
        status: "cleared",
        message: "history cleared",
        total: 0,
    }
}
