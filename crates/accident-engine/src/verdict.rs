//! Accident types, severities and the per-frame verdict

use serde::{Deserialize, Serialize};

/// Accident type, ordered by priority (collision lowest, fire highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccidentType {
    Collision,
    Damaged,
    Rollover,
    Fire,
}

impl AccidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collision => "COLLISION",
            Self::Damaged => "DAMAGED",
            Self::Rollover => "ROLLOVER",
            Self::Fire => "FIRE",
        }
    }

    /// Rollover and fire are always critical
    pub fn is_catastrophic(&self) -> bool {
        matches!(self, Self::Rollover | Self::Fire)
    }

    /// Severity assigned when an accident of this type is confirmed
    pub fn confirmed_severity(&self) -> Severity {
        if self.is_catastrophic() {
            Severity::Critical
        } else {
            Severity::High
        }
    }
}

impl std::fmt::Display for AccidentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-frame accident signal, rebuilt from nothing every frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccidentVerdict {
    pub signal: bool,
    pub accident_type: Option<AccidentType>,
    pub severity: Option<Severity>,
    pub reason: Option<String>,
}

impl AccidentVerdict {
    /// No accident in this frame
    pub fn none() -> Self {
        Self::default()
    }

    pub fn signal(accident_type: AccidentType, severity: Severity, reason: impl Into<String>) -> Self {
        Self {
            signal: true,
            accident_type: Some(accident_type),
            severity: Some(severity),
            reason: Some(reason.into()),
        }
    }

    /// A signal without a resolved type is reported as a collision
    pub fn with_type_fallback(mut self) -> Self {
        if self.signal && self.accident_type.is_none() {
            self.accident_type = Some(AccidentType::Collision);
            if self.reason.is_none() {
                self.reason = Some("Accident detected (type unspecified)".into());
            }
        }
        self
    }

    /// Replace the type with fire when fire outranks it
    pub fn upgrade_to_fire(&mut self) -> bool {
        if !self.signal || self.accident_type >= Some(AccidentType::Fire) {
            return false;
        }
        self.accident_type = Some(AccidentType::Fire);
        self.severity = Some(Severity::Critical);
        self.reason = Some("Fire detected after crash".into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(AccidentType::Fire > AccidentType::Rollover);
        assert!(AccidentType::Rollover > AccidentType::Damaged);
        assert!(AccidentType::Damaged > AccidentType::Collision);
    }

    #[test]
    fn test_confirmed_severity() {
        assert_eq!(AccidentType::Fire.confirmed_severity(), Severity::Critical);
        assert_eq!(AccidentType::Rollover.confirmed_severity(), Severity::Critical);
        assert_eq!(AccidentType::Damaged.confirmed_severity(), Severity::High);
        assert_eq!(AccidentType::Collision.confirmed_severity(), Severity::High);
    }

    #[test]
    fn test_type_fallback() {
        let verdict = AccidentVerdict {
            signal: true,
            ..Default::default()
        }
        .with_type_fallback();
        assert_eq!(verdict.accident_type, Some(AccidentType::Collision));
        assert!(verdict.reason.is_some());

        let quiet = AccidentVerdict::none().with_type_fallback();
        assert_eq!(quiet.accident_type, None);
    }

    #[test]
    fn test_fire_upgrade() {
        let mut verdict = AccidentVerdict::signal(AccidentType::Damaged, Severity::Low, "Single-vehicle damage");
        assert!(verdict.upgrade_to_fire());
        assert_eq!(verdict.accident_type, Some(AccidentType::Fire));
        assert_eq!(verdict.severity, Some(Severity::Critical));

        assert!(!verdict.upgrade_to_fire());
        assert!(!AccidentVerdict::none().upgrade_to_fire());
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&AccidentVerdict::signal(
            AccidentType::Rollover,
            Severity::Critical,
            "overturned",
        ))
        .unwrap();
        assert!(json.contains("\"ROLLOVER\""));
        assert!(json.contains("\"CRITICAL\""));
    }
}
