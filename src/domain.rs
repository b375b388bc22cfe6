//! ==============================================================================
//! domain.rs - rfid reading types
//! ==============================================================================
//!
//! purpose:
//!     the values that flow between the esp32 readers, the history and the
//!     dashboard. a `Submission` is what a device posts, an `EventRecord` is
//!     what we keep.
//!
//! relationships:
//!     - used by: event_log.rs (stores EventRecord)
//!     - used by: handlers.rs (parses Submission, builds EventRecord)
//!
//! ==============================================================================

use serde::{Deserialize, Deserializer, Serialize};

/// placeholder for a uid the device did not send
pub const MISSING_UID: &str = "N/A";

/// device name assumed when the submission does not carry one
pub const DEFAULT_DEVICE: &str = "ESP32";

/// one rfid tag read, immutable once recorded
///
/// serializes as `{timestamp, uid_hex, uid_dec, device}` for the api.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// local arrival time as HH:MM:SS
    #[serde(rename = "timestamp")]
    pub recorded_at: String,
    /// tag uid in hex, as formatted by the device (e.g. "A1 B2 C3 D4")
    pub uid_hex: String,
    /// tag uid in decimal, as formatted by the device
    pub uid_dec: String,
    /// submitting device
    pub device: String,
}

impl EventRecord {
    /// build a record from a submission, filling in the defaults
    pub fn from_submission(submission: Submission, recorded_at: String) -> Self {
        Self {
            recorded_at,
            uid_hex: submission.uid_hex.unwrap_or_else(|| MISSING_UID.to_string()),
            uid_dec: submission.uid_dec.unwrap_or_else(|| MISSING_UID.to_string()),
            device: submission.device.unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
        }
    }
}

/// what a reader posts to /api/rfid
///
/// every field is optional. the firmware only sends the two uids, so the
/// device falls back to "ESP32". uids are opaque display strings; numbers
/// and booleans are accepted and rendered as text, `null` counts as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "lenient_text")]
    pub uid_hex: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub uid_dec: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub device: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        serde_json::Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected text, got {}",
            if other.is_array() { "an array" } else { "an object" }
        ))),
    }
}

/// snapshot ordering
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// arrival order
    OldestFirst,
    /// reverse arrival order, what the dashboard shows
    NewestFirst,
}

/// current local wall-clock time as HH:MM:SS
pub fn clock_hms() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_submission_takes_defaults() {
        let sub: Submission = serde_json::from_str("{}").unwrap();
        let record = EventRecord::from_submission(sub, "12:00:00".into());

        assert_eq!(record.uid_hex, "N/A");
        assert_eq!(record.uid_dec, "N/A");
        assert_eq!(record.device, "ESP32");
        assert_eq!(record.recorded_at, "12:00:00");
    }

    #[test]
    fn firmware_payload_keeps_uids_verbatim() {
        let sub: Submission =
            serde_json::from_str(r#"{"uid_hex":"0A FF 3C 11","uid_dec":"184499217"}"#).unwrap();
        let record = EventRecord::from_submission(sub, "08:15:42".into());

        assert_eq!(record.uid_hex, "0A FF 3C 11");
        assert_eq!(record.uid_dec, "184499217");
        assert_eq!(record.device, "ESP32");
    }

    #[test]
    fn scalar_fields_become_text_and_null_is_absent() {
        let sub: Submission =
            serde_json::from_str(r#"{"uid_hex":null,"uid_dec":2717339292,"device":true}"#).unwrap();

        assert_eq!(sub.uid_hex, None);
        assert_eq!(sub.uid_dec.as_deref(), Some("2717339292"));
        assert_eq!(sub.device.as_deref(), Some("true"));
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(serde_json::from_str::<Submission>(r#"{"uid_hex":[1,2]}"#).is_err());
        assert!(serde_json::from_str::<Submission>(r#"{"device":{"name":"x"}}"#).is_err());
    }

    #[test]
    fn record_serializes_with_timestamp_key() {
        let record = EventRecord {
            recorded_at: "09:30:01".into(),
            uid_hex: "A1 B2".into(),
            uid_dec: "41394".into(),
            device: "ESP32-A".into(),
        };
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["timestamp"], "09:30:01");
        assert_eq!(json["device"], "ESP32-A");
        assert!(json.get("recorded_at").is_none());
    }

    #[test]
    fn clock_is_hms() {
        let t = clock_hms();
        let parts: Vec<&str> = t.split(':').collect();

        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.len() == 2 && p.chars().all(|c| c.is_ascii_digit())));
    }
}
