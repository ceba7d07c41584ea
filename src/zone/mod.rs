// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Alarm zone - owns the zone state and every collaborator it talks to
//!
//! The zone's operations are split over several files:
//! arming and disarming live in [`state_machine`], the closure check in
//! [`door_window`], and sensor evaluation and verification in
//! [`crate::detection`]. All of them take `&mut Zone`, so one zone only
//! ever runs one operation at a time.

mod door_window;
mod state_machine;

pub use door_window::{DoorWindowReport, OpenSensor};
pub use state_machine::SelectOptions;

use std::sync::Arc;
use std::time::Instant;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ZoneSettings;
use crate::core::{
    AlarmOptions, AlarmState, ArmState, EventBus, ObjectId, ProtectionMode, Scheduler,
    ZoneEventKind, ZoneState, ZoneTask,
};
use crate::detection::VerificationEntry;
use crate::notification::{ActionRef, Notice, NotificationSink, ProtocolKind};
use crate::sensors::{DetectorCategory, SensorHost, SensorRegistry};

/// Name of the delayed activation timer
pub(crate) const ACTIVATION_TIMER: &str = "activation";

/// Persisted zone attributes, stored by the host as opaque JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneAttributes {
    pub blacklist: Vec<ObjectId>,
    pub pending_verifications: Vec<ObjectId>,
}

pub struct Zone {
    pub(crate) settings: ZoneSettings,
    pub(crate) registry: SensorRegistry,
    pub(crate) state: ZoneState,
    pub(crate) pending: Vec<VerificationEntry>,
    pub(crate) scheduler: Scheduler,
    /// Sender and options of a delayed activation still waiting for its timer
    pub(crate) activation_request: Option<(ObjectId, SelectOptions)>,
    pub(crate) host: Arc<dyn SensorHost>,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) bus: Arc<EventBus>,
}

impl Zone {
    pub fn new(
        settings: ZoneSettings,
        registry: SensorRegistry,
        host: Arc<dyn SensorHost>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        info!("Creating zone '{}' with {} sensors", settings.name, registry.len());
        Self {
            settings,
            registry,
            state: ZoneState::new(),
            pending: Vec::new(),
            scheduler: Scheduler::new(),
            activation_request: None,
            host,
            sink,
            bus: Arc::new(EventBus::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    pub fn state(&self) -> &ZoneState {
        &self.state
    }

    pub fn settings(&self) -> &ZoneSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ZoneSettings {
        &mut self.settings
    }

    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    pub fn pending_verifications(&self) -> &[VerificationEntry] {
        &self.pending
    }

    pub fn is_verification_pending(&self, category: DetectorCategory, sensor_id: ObjectId) -> bool {
        self.pending
            .iter()
            .any(|p| p.category == category && p.sensor_id == sensor_id)
    }

    /// Earliest instant a deferred task is due
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Run every deferred task due at `now`; returns how many ran
    pub fn run_due_tasks(&mut self, now: Instant) -> usize {
        let tasks = self.scheduler.take_due(now);
        let count = tasks.len();
        if count > 0 {
            debug!(
                "Zone '{}': running {} deferred tasks, {} still queued",
                self.settings.name,
                count,
                self.scheduler.len()
            );
        }
        for task in tasks {
            match task {
                ZoneTask::StartActivation => {
                    self.start_activation();
                }
                ZoneTask::Verify { category, sensor_id } => {
                    self.verify(category, sensor_id);
                }
            }
        }
        count
    }

    /// Enable or disable a sensor entry. Disabling drops a pending verification.
    pub fn set_entry_enabled(&mut self, category: DetectorCategory, sensor_id: ObjectId, enabled: bool) -> bool {
        let Some(entry) = self.registry.get_mut(category, sensor_id) else {
            return false;
        };
        entry.enabled = enabled;
        info!("{} {} {}", category, sensor_id, if enabled { "enabled" } else { "disabled" });

        if !enabled {
            self.remove_pending(category, sensor_id);
        }
        self.refresh_category_state(category);
        if category.tracks_closure() {
            self.refresh_arm_state();
        }
        true
    }

    /// Blacklist and pending verifications as ordered sensor id lists.
    /// A sensor pending in several categories is listed once.
    pub fn attributes(&self) -> ZoneAttributes {
        let mut pending_verifications: Vec<ObjectId> = Vec::with_capacity(self.pending.len());
        for entry in &self.pending {
            if !pending_verifications.contains(&entry.sensor_id) {
                pending_verifications.push(entry.sensor_id);
            }
        }
        ZoneAttributes {
            blacklist: self.state.blacklist.clone(),
            pending_verifications,
        }
    }

    /// Restore persisted attributes. Each pending sensor is verified again
    /// in every category where its enabled entry supports verification,
    /// after that entry's delay. Ids without such an entry are dropped.
    pub fn restore_attributes(&mut self, attributes: ZoneAttributes) {
        self.update_blacklist(attributes.blacklist);

        for sensor_id in attributes.pending_verifications {
            let targets: Vec<(DetectorCategory, u64)> = DetectorCategory::ALL
                .into_iter()
                .filter(|category| category.supports_verification())
                .filter_map(|category| {
                    self.registry
                        .get(category, sensor_id)
                        .filter(|entry| entry.enabled)
                        .map(|entry| (category, entry.verification_delay_ms))
                })
                .collect();

            if targets.is_empty() {
                debug!("Dropping stale pending verification of {}", sensor_id);
            }
            for (category, delay_ms) in targets {
                self.schedule_verification(category, sensor_id, delay_ms);
            }
        }

        self.refresh_arm_state();
    }

    // --- field updates, each published on the event bus when it changes ---

    pub(crate) fn update_mode(&mut self, mode: ProtectionMode) {
        if self.state.mode != mode {
            self.state.mode = mode;
            self.publish(ZoneEventKind::ModeChanged(mode));
        }
    }

    pub(crate) fn update_arm_state(&mut self, arm_state: ArmState) {
        if self.state.arm_state != arm_state {
            self.state.arm_state = arm_state;
            self.publish(ZoneEventKind::ArmStateChanged(arm_state));
        }
    }

    pub(crate) fn update_alarm_state(&mut self, alarm_state: AlarmState, sensor: &str) {
        if self.state.alarm_state != alarm_state || self.state.alerting_sensor != sensor {
            self.state.alarm_state = alarm_state;
            self.state.alerting_sensor = sensor.to_string();
            self.publish(ZoneEventKind::AlarmStateChanged {
                state: alarm_state,
                sensor: sensor.to_string(),
            });
        }
    }

    pub(crate) fn update_options(&mut self, options: AlarmOptions) {
        if self.state.options != options {
            self.state.options = options;
            self.publish(ZoneEventKind::OptionsChanged(options));
        }
    }

    pub(crate) fn update_blacklist(&mut self, blacklist: Vec<ObjectId>) {
        if self.state.blacklist != blacklist {
            self.state.blacklist = blacklist;
            self.publish(ZoneEventKind::BlacklistChanged(self.state.blacklist.clone()));
        }
    }

    /// Alarm, alerting sensor, alarm switch and options back to defaults
    pub(crate) fn clear_alarm_fields(&mut self) {
        self.update_alarm_state(AlarmState::None, "");
        self.update_options(AlarmOptions::default());
        self.state.alarm_switch = false;
    }

    /// Recompute the aggregate state of a category: any enabled entry open
    pub(crate) fn refresh_category_state(&mut self, category: DetectorCategory) -> bool {
        let host = self.host.clone();
        let active = self
            .registry
            .enabled(category)
            .any(|entry| entry.is_open(host.as_ref()));
        if self.state.category_state(category) != active {
            self.state.set_category_state(category, active);
            self.publish(ZoneEventKind::CategoryState { category, active });
        }
        active
    }

    /// Keep the detailed state in line with mode, open doors/windows and a pending delay
    pub(crate) fn refresh_arm_state(&mut self) {
        if !self.state.mode.is_armed() {
            return;
        }
        let any_open = self.check_door_window_state(self.state.mode).any_open();
        let derived = ArmState::derive(self.state.mode, any_open, self.state.activation_pending);
        self.update_arm_state(derived);
    }

    pub(crate) fn remove_pending(&mut self, category: DetectorCategory, sensor_id: ObjectId) -> bool {
        let before = self.pending.len();
        self.pending
            .retain(|p| !(p.category == category && p.sensor_id == sensor_id));
        before != self.pending.len()
    }

    // --- side effects ---

    pub(crate) fn publish(&self, kind: ZoneEventKind) {
        self.bus.publish(&self.settings.name, kind);
    }

    pub(crate) fn protocol(&self, text: &str, kind: ProtocolKind) {
        let line = format!("{}: {}", self.settings.name, text);
        self.sink.emit_protocol_line(&line, kind);
        self.publish(ZoneEventKind::Protocol { kind, text: line });
    }

    pub(crate) fn notify(&self, notice: Notice, arg: &str) {
        self.sink.send_notification(&notice.template(), arg);
    }

    pub(crate) fn run_action(&self, action: Option<&ActionRef>, params: serde_json::Value) {
        if let Some(action) = action {
            self.sink.run_action(action, params);
        }
    }

    /// Mode action, or the disarmed action for `Disarmed`
    pub(crate) fn run_mode_action(&self, mode: ProtectionMode, sender_id: ObjectId) {
        let action = match self.settings.mode(mode) {
            Some(settings) => settings.action.as_ref(),
            None => self.settings.disarmed_action.as_ref(),
        };
        self.run_action(
            action,
            serde_json::json!({ "mode": mode.as_u8(), "sender": sender_id }),
        );
    }

    pub(crate) fn acknowledgement_tone(&self, mode: ProtectionMode) {
        self.run_action(
            self.settings.acknowledgement_tone.as_ref(),
            serde_json::json!({ "mode": mode.as_u8() }),
        );
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for zone tests

    use super::*;
    use crate::sensors::{Comparison, Condition, LiveValue, MemoryHost, Predicate, SensorEntry};

    pub const FRONT_DOOR: ObjectId = 100;
    pub const TERRACE_WINDOW: ObjectId = 101;
    pub const HALLWAY_MOTION: ObjectId = 200;
    pub const LIVING_GLASS: ObjectId = 300;
    pub const BASEMENT_WATER: ObjectId = 400;

    pub fn open_when_true(id: ObjectId) -> Condition {
        Condition::new(vec![Predicate::new(id, Comparison::Equal, LiveValue::Bool(true))])
    }

    pub fn door(id: ObjectId, designation: &str) -> SensorEntry {
        let mut entry = SensorEntry::new(id, designation, open_when_true(id));
        entry.full_protection_active = true;
        entry.hull_protection_active = true;
        entry.use_alarm_protocol = true;
        entry.use_notification = true;
        entry
    }

    pub fn detector(id: ObjectId, designation: &str) -> SensorEntry {
        let mut entry = SensorEntry::new(id, designation, open_when_true(id));
        entry.full_protection_active = true;
        entry.use_alarm_protocol = true;
        entry.use_notification = true;
        entry
    }

    /// Zone with every category populated and all sensors closed
    pub fn zone() -> (Zone, Arc<MemoryHost>) {
        let host = Arc::new(MemoryHost::new());
        for id in [FRONT_DOOR, TERRACE_WINDOW, HALLWAY_MOTION, LIVING_GLASS, BASEMENT_WATER] {
            host.set_value(id, LiveValue::Bool(false));
        }

        let mut registry = SensorRegistry::new();
        registry.insert(DetectorCategory::DoorWindow, door(FRONT_DOOR, "Front door")).unwrap();
        registry.insert(DetectorCategory::DoorWindow, door(TERRACE_WINDOW, "Terrace window")).unwrap();
        registry.insert(DetectorCategory::Motion, detector(HALLWAY_MOTION, "Hallway")).unwrap();
        registry.insert(DetectorCategory::GlassBreakage, detector(LIVING_GLASS, "Living room glass")).unwrap();
        registry.insert(DetectorCategory::Water, detector(BASEMENT_WATER, "Basement water")).unwrap();

        let mut settings = ZoneSettings::default();
        settings.name = "Home".to_string();
        settings.settle_delay_ms = 100;

        let zone = Zone::new(settings, registry, host.clone(), host.clone());
        (zone, host)
    }

    pub fn set(host: &MemoryHost, id: ObjectId, open: bool) -> bool {
        host.set_value(id, LiveValue::Bool(open))
    }
}
