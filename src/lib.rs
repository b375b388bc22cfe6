//! rfid-sink: keeps the latest RFID tag reads posted by ESP32 readers and
//! serves them to a polling dashboard. see main.rs for the process layout.

pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod event_log;
pub mod handlers;
pub mod netinfo;
pub mod server;

pub use domain::{EventRecord, Order, Submission};
pub use error::ApiError;
pub use event_log::BoundedEventLog;
pub use server::{app, AppState};
