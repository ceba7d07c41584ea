// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Alert evaluation for incoming sensor reports

use tracing::{debug, warn};

use crate::core::{AlarmState, ObjectId};
use crate::notification::{Notice, ProtocolKind};
use crate::sensors::{DetectorCategory, SensorEntry};
use crate::zone::Zone;

impl Zone {
    /// Route a value report to every category the sensor is configured in
    pub fn report_value(&mut self, sensor_id: ObjectId, value_changed: bool) -> bool {
        let mut raised = false;
        for category in DetectorCategory::ALL {
            if self.registry.get(category, sensor_id).is_some() {
                raised |= self.evaluate(category, sensor_id, value_changed);
            }
        }
        raised
    }

    /// Evaluate a value report of `sender_id`. Returns true if an alarm was raised now.
    pub fn evaluate(&mut self, category: DetectorCategory, sender_id: ObjectId, value_changed: bool) -> bool {
        if let Err(e) = self.maintenance_check() {
            debug!("Zone '{}': report of {} ignored: {}", self.settings.name, sender_id, e);
            return false;
        }

        let Some(entry) = self
            .registry
            .get(category, sender_id)
            .filter(|entry| entry.enabled)
            .cloned()
        else {
            debug!("Zone '{}': no enabled {} entry for {}", self.settings.name, category, sender_id);
            return false;
        };

        let raised = if !entry.use_multiple_alerts && !value_changed {
            debug!("Zone '{}': repeated report of {} suppressed", self.settings.name, entry.label());
            false
        } else {
            let detected = entry.detects(self.host.as_ref(), value_changed);
            if self.alerting(category, &entry, detected) {
                if category.supports_verification() && entry.verification_delay_ms > 0 {
                    self.schedule_verification(category, sender_id, entry.verification_delay_ms);
                    false
                } else {
                    self.raise_alarm(category, &entry);
                    true
                }
            } else {
                false
            }
        };

        self.refresh_category_state(category);
        if category.tracks_closure() {
            self.refresh_arm_state();
        }
        raised
    }

    /// Alerting policy for a detection, given the zone state right now.
    ///
    /// Permanently monitored sensors alert whenever they detect. Everything
    /// else only alerts while the zone is armed (not delayed) and the entry is
    /// active in the current mode. A blacklisted door/window stays silent while
    /// open and leaves the blacklist once it is closed.
    pub(crate) fn alerting(&mut self, category: DetectorCategory, entry: &SensorEntry, detected: bool) -> bool {
        if entry.permanent_monitoring {
            return detected;
        }

        if category.tracks_closure() && self.state.is_blacklisted(entry.sensor_id) {
            if !entry.is_open(self.host.as_ref()) {
                debug!("Zone '{}': {} closed, removed from blacklist", self.settings.name, entry.label());
                let mut blacklist = self.state.blacklist.clone();
                blacklist.retain(|id| *id != entry.sensor_id);
                self.update_blacklist(blacklist);
            } else if detected {
                debug!("Zone '{}': {} is blacklisted", self.settings.name, entry.label());
            }
            return false;
        }

        detected && self.state.arm_state.is_active() && entry.is_active_in(self.state.mode)
    }

    /// Alarm state, alerting sensor, options, protocol, notification and action
    pub(crate) fn raise_alarm(&mut self, category: DetectorCategory, entry: &SensorEntry) {
        let label = entry.label();
        warn!("Zone '{}': alarm raised by {} '{}'", self.settings.name, category, label);

        self.update_alarm_state(AlarmState::Alarm, &label);
        let mut options = self.state.options;
        options.apply(&entry.alarm_options);
        self.update_options(options);

        if entry.use_alarm_protocol {
            self.protocol(&format!("{} {} triggered an alarm", category.label(), label), ProtocolKind::Alarm);
        }
        if entry.use_notification {
            self.notify(Notice::Alarm(category), &label);
        }
        if entry.alerting_action.use_action {
            self.run_action(
                entry.alerting_action.action.as_ref(),
                serde_json::json!({
                    "sensor": entry.sensor_id,
                    "category": category.key(),
                    "mode": self.state.mode.as_u8(),
                }),
            );
        }
    }
}
