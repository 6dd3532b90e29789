//! Alert Manager Implementation

use accident_engine::AccidentType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::{AccidentAlert, AlertError};

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Cooldown between alerts for the same source and accident type (seconds)
    pub cooldown_seconds: u64,
    /// Maximum alerts per hour before throttling
    pub max_alerts_per_hour: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 600, // 10 minutes
            max_alerts_per_hour: 10,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<(), AlertError> {
        if self.max_alerts_per_hour == 0 {
            return Err(AlertError::InvalidConfig(
                "max_alerts_per_hour must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// State of an alert key
#[derive(Debug, Clone)]
struct AlertState {
    last_fired: Instant,
    fire_count: usize,
}

/// Alert manager for deduplication and throttling
pub struct AlertManager {
    config: AlertConfig,
    /// Alert states by source and accident type
    states: HashMap<(String, AccidentType), AlertState>,
    /// Alerts fired in current hour
    hourly_count: usize,
    /// Hour start time
    hour_start: Instant,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Result<Self, AlertError> {
        config.validate()?;
        info!(?config, "creating alert manager");
        Ok(Self {
            config,
            states: HashMap::new(),
            hourly_count: 0,
            hour_start: Instant::now(),
        })
    }

    /// Check whether an alert may be dispatched
    fn should_fire(&mut self, alert: &AccidentAlert) -> bool {
        // Reset hourly counter if needed
        if self.hour_start.elapsed() > Duration::from_secs(3600) {
            self.hourly_count = 0;
            self.hour_start = Instant::now();
        }

        if self.hourly_count >= self.config.max_alerts_per_hour {
            warn!(source = %alert.source, "alert throttled: max alerts per hour reached");
            return false;
        }

        if let Some(state) = self.states.get(&alert.key()) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            if state.last_fired.elapsed() < cooldown {
                debug!(source = %alert.source, kind = %alert.accident_type, "alert suppressed: in cooldown period");
                return false;
            }
        }

        true
    }

    /// Record that an alert was fired
    fn record_fire(&mut self, alert: &AccidentAlert) {
        self.hourly_count += 1;

        let state = self.states.entry(alert.key()).or_insert(AlertState {
            last_fired: Instant::now(),
            fire_count: 0,
        });

        state.last_fired = Instant::now();
        state.fire_count += 1;

        info!(
            source = %alert.source,
            kind = %alert.accident_type,
            count = state.fire_count,
            "alert recorded"
        );
    }

    /// `should_fire` then `record_fire`; returns whether the alert goes out
    pub fn dispatch(&mut self, alert: &AccidentAlert) -> bool {
        if !self.should_fire(alert) {
            return false;
        }
        self.record_fire(alert);
        true
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self {
            config: AlertConfig::default(),
            states: HashMap::new(),
            hourly_count: 0,
            hour_start: Instant::now(),
        }
    }
}
