//! Accident alert composition

use std::collections::BTreeMap;

use accident_engine::{AccidentType, FrameReport, Severity};
use frame::ObjectClass;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Alert for one confirmed emergency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentAlert {
    /// Camera or clip the alert concerns
    pub source: String,
    /// Raw frame index that raised it
    pub frame_index: u64,
    pub accident_type: AccidentType,
    pub severity: Severity,
    pub reason: Option<String>,
    pub vehicle_count: u32,
    pub person_count: u32,
    pub class_counts: BTreeMap<ObjectClass, u32>,
}

impl AccidentAlert {
    /// Compose an alert; `None` unless the report carries an emergency
    pub fn from_report(source: &str, frame_index: u64, report: &FrameReport) -> Option<Self> {
        if !report.emergency {
            debug!(source, frame_index, "no emergency, no alert");
            return None;
        }
        Some(Self {
            source: source.to_string(),
            frame_index,
            accident_type: report.accident_type?,
            severity: report.severity?,
            reason: report.reason.clone(),
            vehicle_count: report.vehicle_count,
            person_count: report.person_count,
            class_counts: report.cumulative_class_counts.clone(),
        })
    }

    /// Deduplication key
    pub fn key(&self) -> (String, AccidentType) {
        (self.source.clone(), self.accident_type)
    }

    /// Human-readable alert text
    pub fn message(&self) -> String {
        let mut message = format!(
            "{} accident ({}) at {} frame {}",
            self.accident_type, self.severity, self.source, self.frame_index
        );
        if let Some(reason) = &self.reason {
            message.push_str(&format!(": {reason}"));
        }
        message.push_str(&format!(
            ". {} vehicles, {} persons in view",
            self.vehicle_count, self.person_count
        ));
        if !self.class_counts.is_empty() {
            let counts: Vec<String> = self
                .class_counts
                .iter()
                .map(|(class, n)| format!("{class}={n}"))
                .collect();
            message.push_str(&format!(". Totals: {}", counts.join(", ")));
        }
        message
    }
}
