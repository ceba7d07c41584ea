// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Sensor registry - per-category sensor configuration entries

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{Condition, DetectorCategory, SensorHost, TriggerRule};
use crate::core::{AlarmOptions, ObjectId, ProtectionMode, ZoneError};
use crate::notification::ActionRef;

fn default_true() -> bool {
    true
}

/// Action run when a sensor raises an alarm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertingAction {
    #[serde(default)]
    pub use_action: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionRef>,
}

/// Sensor entry as stored in the configuration, conditions still encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEntryRecord {
    pub sensor_id: ObjectId,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub primary_condition: String,
    #[serde(default)]
    pub secondary_condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_rule: Option<TriggerRule>,
    #[serde(default)]
    pub permanent_monitoring: bool,
    #[serde(default)]
    pub full_protection_active: bool,
    #[serde(default)]
    pub hull_protection_active: bool,
    #[serde(default)]
    pub partial_protection_active: bool,
    #[serde(default)]
    pub check_full_protection_activation: bool,
    #[serde(default)]
    pub check_hull_protection_activation: bool,
    #[serde(default)]
    pub check_partial_protection_activation: bool,
    #[serde(default)]
    pub verification_delay_ms: u64,
    #[serde(default)]
    pub use_multiple_alerts: bool,
    #[serde(default)]
    pub alarm_options: AlarmOptions,
    #[serde(default)]
    pub use_notification: bool,
    #[serde(default)]
    pub use_alarm_protocol: bool,
    #[serde(default)]
    pub alerting_action: AlertingAction,
}

/// Sensor entry with parsed rules
#[derive(Debug, Clone, PartialEq)]
pub struct SensorEntry {
    pub sensor_id: ObjectId,
    pub enabled: bool,
    pub designation: String,
    pub comment: String,
    pub primary_condition: Condition,
    pub secondary_condition: Condition,
    pub trigger_rule: Option<TriggerRule>,
    pub permanent_monitoring: bool,
    pub full_protection_active: bool,
    pub hull_protection_active: bool,
    pub partial_protection_active: bool,
    pub check_full_protection_activation: bool,
    pub check_hull_protection_activation: bool,
    pub check_partial_protection_activation: bool,
    pub verification_delay_ms: u64,
    pub use_multiple_alerts: bool,
    pub alarm_options: AlarmOptions,
    pub use_notification: bool,
    pub use_alarm_protocol: bool,
    pub alerting_action: AlertingAction,
}

impl SensorEntry {
    /// Minimal enabled entry, mostly useful for building registries in code
    pub fn new(sensor_id: ObjectId, designation: &str, primary_condition: Condition) -> Self {
        Self {
            sensor_id,
            enabled: true,
            designation: designation.to_string(),
            comment: String::new(),
            primary_condition,
            secondary_condition: Condition::default(),
            trigger_rule: None,
            permanent_monitoring: false,
            full_protection_active: false,
            hull_protection_active: false,
            partial_protection_active: false,
            check_full_protection_activation: false,
            check_hull_protection_activation: false,
            check_partial_protection_activation: false,
            verification_delay_ms: 0,
            use_multiple_alerts: false,
            alarm_options: AlarmOptions::default(),
            use_notification: false,
            use_alarm_protocol: false,
            alerting_action: AlertingAction::default(),
        }
    }

    pub fn from_record(record: &SensorEntryRecord) -> Result<Self, ZoneError> {
        Ok(Self {
            sensor_id: record.sensor_id,
            enabled: record.enabled,
            designation: record.designation.clone(),
            comment: record.comment.clone(),
            primary_condition: Condition::parse(&record.primary_condition)?,
            secondary_condition: Condition::parse(&record.secondary_condition)?,
            trigger_rule: record.trigger_rule.clone(),
            permanent_monitoring: record.permanent_monitoring,
            full_protection_active: record.full_protection_active,
            hull_protection_active: record.hull_protection_active,
            partial_protection_active: record.partial_protection_active,
            check_full_protection_activation: record.check_full_protection_activation,
            check_hull_protection_activation: record.check_hull_protection_activation,
            check_partial_protection_activation: record.check_partial_protection_activation,
            verification_delay_ms: record.verification_delay_ms,
            use_multiple_alerts: record.use_multiple_alerts,
            alarm_options: record.alarm_options,
            use_notification: record.use_notification,
            use_alarm_protocol: record.use_alarm_protocol,
            alerting_action: record.alerting_action.clone(),
        })
    }

    /// Per-mode activation flag
    pub fn is_active_in(&self, mode: ProtectionMode) -> bool {
        match mode {
            ProtectionMode::Disarmed => false,
            ProtectionMode::FullProtection => self.full_protection_active,
            ProtectionMode::HullProtection => self.hull_protection_active,
            ProtectionMode::PartialProtection => self.partial_protection_active,
        }
    }

    /// Whether an open sensor blocks activation of `mode`
    pub fn requires_closure_in(&self, mode: ProtectionMode) -> bool {
        match mode {
            ProtectionMode::Disarmed => false,
            ProtectionMode::FullProtection => self.check_full_protection_activation,
            ProtectionMode::HullProtection => self.check_hull_protection_activation,
            ProtectionMode::PartialProtection => self.check_partial_protection_activation,
        }
    }

    pub fn label(&self) -> String {
        if self.designation.is_empty() {
            format!("ID {}", self.sensor_id)
        } else {
            self.designation.clone()
        }
    }

    /// Current level of the sensor: its trigger rule (or primary condition)
    /// and the secondary condition. Entries with neither rule never pass.
    pub fn is_open(&self, host: &dyn SensorHost) -> bool {
        let primary = match &self.trigger_rule {
            Some(rule) => match host.live_value(self.sensor_id) {
                Some(value) => rule.is_satisfied(&value),
                None => false,
            },
            None => !self.primary_condition.is_empty() && self.primary_condition.evaluate(host),
        };
        primary && self.secondary_condition.evaluate(host)
    }

    /// Detection for one value report
    pub fn detects(&self, host: &dyn SensorHost, value_changed: bool) -> bool {
        match &self.trigger_rule {
            Some(rule) => {
                let Some(value) = host.live_value(self.sensor_id) else {
                    debug!("No live value for sensor {}", self.sensor_id);
                    return false;
                };
                rule.fires(&value, value_changed) && self.secondary_condition.evaluate(host)
            }
            None => self.is_open(host),
        }
    }
}

/// Ordered sensor entries per detector category
#[derive(Debug, Clone, Default)]
pub struct SensorRegistry {
    entries: HashMap<DetectorCategory, Vec<SensorEntry>>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: DetectorCategory, entry: SensorEntry) -> Result<(), ZoneError> {
        let list = self.entries.entry(category).or_default();
        if list.iter().any(|e| e.sensor_id == entry.sensor_id) {
            return Err(ZoneError::DuplicateSensor {
                category,
                sensor_id: entry.sensor_id,
            });
        }
        list.push(entry);
        Ok(())
    }

    /// Add records to a category. Bad records are skipped and returned.
    pub fn load(&mut self, category: DetectorCategory, records: &[SensorEntryRecord]) -> Vec<ZoneError> {
        let mut skipped = Vec::new();

        for record in records {
            let result = SensorEntry::from_record(record).and_then(|entry| self.insert(category, entry));
            if let Err(e) = result {
                warn!("Skipping {} entry {}: {}", category, record.sensor_id, e);
                skipped.push(e);
            }
        }

        info!("Loaded {} {} entries", self.entries(category).len(), category);
        skipped
    }

    /// Load a JSON list of records
    pub fn load_json(&mut self, category: DetectorCategory, json: &str) -> Result<Vec<ZoneError>, ZoneError> {
        let records: Vec<SensorEntryRecord> = serde_json::from_str(json)?;
        Ok(self.load(category, &records))
    }

    pub fn entries(&self, category: DetectorCategory) -> &[SensorEntry] {
        self.entries.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, category: DetectorCategory, sensor_id: ObjectId) -> Option<&SensorEntry> {
        self.entries(category).iter().find(|e| e.sensor_id == sensor_id)
    }

    pub fn get_mut(&mut self, category: DetectorCategory, sensor_id: ObjectId) -> Option<&mut SensorEntry> {
        self.entries
            .get_mut(&category)
            .and_then(|list| list.iter_mut().find(|e| e.sensor_id == sensor_id))
    }

    pub fn enabled(&self, category: DetectorCategory) -> impl Iterator<Item = &SensorEntry> {
        self.entries(category).iter().filter(|e| e.enabled)
    }

    /// Find which category a sensor belongs to
    pub fn category_of(&self, sensor_id: ObjectId) -> Option<DetectorCategory> {
        DetectorCategory::ALL
            .into_iter()
            .find(|c| self.get(*c, sensor_id).is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
