// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Delayed verification of detectors before they escalate to an alarm
//!
//! A pending verification is not cancelled by disarming the zone. On wake
//! it re-reads the entry and the zone state, so a disabled entry or a
//! disarmed zone simply does not raise.

use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{ObjectId, ZoneTask};
use crate::sensors::DetectorCategory;
use crate::zone::Zone;

/// In-flight re-check of one sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationEntry {
    pub sensor_id: ObjectId,
    pub category: DetectorCategory,
    pub scheduled_at: DateTime<Utc>,
    pub delay_ms: u64,
}

fn timer_name(category: DetectorCategory, sensor_id: ObjectId) -> String {
    format!("verify:{}:{}", category.key(), sensor_id)
}

impl Zone {
    /// Register a re-check of `sensor_id` in `category` after `delay_ms`.
    /// Returns false if one is already pending for that sensor and category.
    pub fn schedule_verification(&mut self, category: DetectorCategory, sensor_id: ObjectId, delay_ms: u64) -> bool {
        if self.is_verification_pending(category, sensor_id) {
            debug!(
                "Zone '{}': {} verification of {} already pending",
                self.settings.name, category, sensor_id
            );
            return false;
        }

        self.pending.push(VerificationEntry {
            sensor_id,
            category,
            scheduled_at: Utc::now(),
            delay_ms,
        });
        self.scheduler.schedule(
            &timer_name(category, sensor_id),
            Instant::now(),
            Duration::from_millis(delay_ms),
            ZoneTask::Verify { category, sensor_id },
        );
        info!(
            "Zone '{}': {} {} will be verified in {} ms",
            self.settings.name, category, sensor_id, delay_ms
        );
        true
    }

    /// Re-check a sensor whose verification delay has elapsed
    pub fn verify(&mut self, category: DetectorCategory, sensor_id: ObjectId) -> bool {
        self.scheduler.cancel(&timer_name(category, sensor_id));

        let Some(entry) = self
            .registry
            .get(category, sensor_id)
            .filter(|entry| entry.enabled)
            .cloned()
        else {
            debug!("Zone '{}': verification of {} dropped, entry disabled", self.settings.name, sensor_id);
            self.remove_pending(category, sensor_id);
            return false;
        };

        let raised = match self.maintenance_check() {
            Err(e) => {
                debug!("Zone '{}': verification of {} suppressed: {}", self.settings.name, sensor_id, e);
                false
            }
            Ok(()) => {
                let open = entry.is_open(self.host.as_ref());
                if self.alerting(category, &entry, open) {
                    self.raise_alarm(category, &entry);
                    true
                } else {
                    info!("Zone '{}': {} not confirmed", self.settings.name, entry.label());
                    false
                }
            }
        };

        self.remove_pending(category, sensor_id);
        self.refresh_category_state(category);
        raised
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use crate::core::{AlarmState, ProtectionMode};
    use crate::sensors::DetectorCategory;
    use crate::zone::testing::*;
    use crate::zone::{SelectOptions, Zone};

    fn armed_with_delay(category: DetectorCategory, id: u32, delay_ms: u64) -> (Zone, std::sync::Arc<crate::sensors::MemoryHost>) {
        let (mut zone, host) = zone();
        zone.registry.get_mut(category, id).unwrap().verification_delay_ms = delay_ms;
        assert!(zone.select_protection_mode(ProtectionMode::FullProtection, 1, SelectOptions::silent()));
        (zone, host)
    }

    fn later(ms: u64) -> Instant {
        Instant::now() + Duration::from_millis(ms)
    }

    #[test]
    fn test_confirmed_detection_raises_after_delay() {
        let (mut zone, host) = armed_with_delay(DetectorCategory::GlassBreakage, LIVING_GLASS, 2_000);

        set(&host, LIVING_GLASS, true);
        assert!(!zone.evaluate(DetectorCategory::GlassBreakage, LIVING_GLASS, true));
        assert!(zone.is_verification_pending(DetectorCategory::GlassBreakage, LIVING_GLASS));
        assert_eq!(zone.attributes().pending_verifications, vec![LIVING_GLASS]);
        assert_eq!(zone.state().alarm_state, AlarmState::None);

        assert_eq!(zone.run_due_tasks(later(2_500)), 1);
        assert_eq!(zone.state().alarm_state, AlarmState::Alarm);
        assert_eq!(zone.state().alerting_sensor, "Living room glass");
        assert!(zone.pending_verifications().is_empty());
    }

    #[test]
    fn test_unconfirmed_detection_does_not_raise() {
        let (mut zone, host) = armed_with_delay(DetectorCategory::Water, BASEMENT_WATER, 1_000);

        set(&host, BASEMENT_WATER, true);
        zone.evaluate(DetectorCategory::Water, BASEMENT_WATER, true);
        set(&host, BASEMENT_WATER, false);

        assert!(!zone.verify(DetectorCategory::Water, BASEMENT_WATER));
        assert_eq!(zone.state().alarm_state, AlarmState::None);
        assert!(!zone.is_verification_pending(DetectorCategory::Water, BASEMENT_WATER));
        assert!(!zone.state().water_sensor_state);
        assert_eq!(zone.run_due_tasks(later(5_000)), 0);
    }

    #[test]
    fn test_disabling_entry_drops_pending_verification() {
        let (mut zone, host) = armed_with_delay(DetectorCategory::GlassBreakage, LIVING_GLASS, 1_000);

        set(&host, LIVING_GLASS, true);
        zone.evaluate(DetectorCategory::GlassBreakage, LIVING_GLASS, true);
        assert!(zone.is_verification_pending(DetectorCategory::GlassBreakage, LIVING_GLASS));

        zone.set_entry_enabled(DetectorCategory::GlassBreakage, LIVING_GLASS, false);
        assert!(!zone.is_verification_pending(DetectorCategory::GlassBreakage, LIVING_GLASS));

        assert_eq!(zone.run_due_tasks(later(2_000)), 1);
        assert_eq!(zone.state().alarm_state, AlarmState::None);
        assert!(zone.pending_verifications().is_empty());
    }

    #[test]
    fn test_disabled_while_pending_only_removes_entry() {
        let (mut zone, host) = armed_with_delay(DetectorCategory::GlassBreakage, LIVING_GLASS, 1_000);

        set(&host, LIVING_GLASS, true);
        zone.evaluate(DetectorCategory::GlassBreakage, LIVING_GLASS, true);
        assert!(zone.state().glass_breakage_state);

        // Disable behind the zone's back so only the wake-up check can notice
        zone.registry
            .get_mut(DetectorCategory::GlassBreakage, LIVING_GLASS)
            .unwrap()
            .enabled = false;
        host.clear_records();

        assert!(!zone.verify(DetectorCategory::GlassBreakage, LIVING_GLASS));
        assert!(!zone.is_verification_pending(DetectorCategory::GlassBreakage, LIVING_GLASS));
        assert!(host.protocol().is_empty());
        assert!(zone.state().glass_breakage_state);
    }

    #[test]
    fn test_disarm_does_not_cancel_but_suppresses_raise() {
        let (mut zone, host) = armed_with_delay(DetectorCategory::GlassBreakage, LIVING_GLASS, 1_000);

        set(&host, LIVING_GLASS, true);
        zone.evaluate(DetectorCategory::GlassBreakage, LIVING_GLASS, true);
        zone.select_protection_mode(ProtectionMode::Disarmed, 1, SelectOptions::silent());
        assert!(zone.is_verification_pending(DetectorCategory::GlassBreakage, LIVING_GLASS));

        assert_eq!(zone.run_due_tasks(later(1_500)), 1);
        assert_eq!(zone.state().alarm_state, AlarmState::None);
        assert!(!zone.is_verification_pending(DetectorCategory::GlassBreakage, LIVING_GLASS));
    }

    #[test]
    fn test_no_duplicate_pending_entries() {
        let (mut zone, host) = armed_with_delay(DetectorCategory::Water, BASEMENT_WATER, 1_000);
        zone.registry
            .get_mut(DetectorCategory::Water, BASEMENT_WATER)
            .unwrap()
            .use_multiple_alerts = true;

        set(&host, BASEMENT_WATER, true);
        zone.evaluate(DetectorCategory::Water, BASEMENT_WATER, true);
        zone.evaluate(DetectorCategory::Water, BASEMENT_WATER, false);
        assert_eq!(zone.pending_verifications().len(), 1);
        assert!(!zone.schedule_verification(DetectorCategory::Water, BASEMENT_WATER, 1_000));
    }

    #[test]
    fn test_sensor_in_two_categories_verifies_each() {
        const KITCHEN: u32 = 500;
        let (mut zone, host) = zone();
        for category in [DetectorCategory::GlassBreakage, DetectorCategory::Water] {
            let mut entry = detector(KITCHEN, "Kitchen");
            entry.verification_delay_ms = 1_000;
            zone.registry.insert(category, entry).unwrap();
        }
        assert!(zone.select_protection_mode(ProtectionMode::FullProtection, 1, SelectOptions::silent()));

        set(&host, KITCHEN, true);
        assert!(!zone.report_value(KITCHEN, true));
        let categories: Vec<_> = zone.pending_verifications().iter().map(|p| p.category).collect();
        assert_eq!(categories, vec![DetectorCategory::GlassBreakage, DetectorCategory::Water]);
        assert_eq!(zone.attributes().pending_verifications, vec![KITCHEN]);

        // Disabling one category leaves the other pending
        zone.set_entry_enabled(DetectorCategory::Water, KITCHEN, false);
        assert!(zone.is_verification_pending(DetectorCategory::GlassBreakage, KITCHEN));
        assert!(!zone.is_verification_pending(DetectorCategory::Water, KITCHEN));

        zone.set_entry_enabled(DetectorCategory::Water, KITCHEN, true);
        assert!(zone.schedule_verification(DetectorCategory::Water, KITCHEN, 1_000));
        host.clear_records();

        assert_eq!(zone.run_due_tasks(later(1_500)), 2);
        let templates = host.notification_templates();
        assert!(templates.contains(&"glass_breakage_alarm".to_string()));
        assert!(templates.contains(&"water_alarm".to_string()));
        assert!(zone.pending_verifications().is_empty());
        assert!(zone.state().glass_breakage_state && zone.state().water_sensor_state);
    }
}
