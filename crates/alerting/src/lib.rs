//! Alerting System
//!
//! Turns confirmed emergencies into dispatchable alerts:
//! - Alert composition from a frame report
//! - Per-source, per-type cooldown deduplication
//! - Hourly throttling

mod alert;
mod manager;

pub use alert::AccidentAlert;
pub use manager::{AlertConfig, AlertManager};

use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("Invalid alert configuration: {0}")]
    InvalidConfig(String),
}
