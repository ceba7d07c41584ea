// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Arming state machine
//!
//! ```text
//!                select(mode), delay > 0
//!  Disarmed ───────────────────────────► DelayedArmed / DelayedPartialArmed
//!     ▲  │                                        │ start_activation
//!     │  │ select(mode), no delay                 ▼
//!     │  └──────────────────────────────► Armed / PartialArmed
//!     │                                           │
//!     └──── select(Disarmed), abort, reset ───────┘
//! ```
//!
//! Armed vs PartialArmed (and the delayed pair) only differ in whether a
//! monitored door/window is open; the zone keeps that in sync as contacts
//! report.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{DoorWindowReport, Zone, ACTIVATION_TIMER};
use crate::core::{AlarmState, ArmState, ObjectId, ProtectionMode, ZoneError, ZoneTask};
use crate::notification::{Notice, ProtocolKind};

/// Side effects requested together with a mode change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOptions {
    pub use_notification: bool,
    pub use_ack_tone: bool,
    pub use_action: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            use_notification: true,
            use_ack_tone: true,
            use_action: true,
        }
    }
}

impl SelectOptions {
    /// No notification, tone or action
    pub fn silent() -> Self {
        Self {
            use_notification: false,
            use_ack_tone: false,
            use_action: false,
        }
    }
}

impl Zone {
    /// Whether `mode` may be selected. Disarmed always may.
    pub fn check_operation_mode(&self, mode: ProtectionMode) -> bool {
        match self.mode_enabled(mode) {
            Ok(()) => true,
            Err(e) => {
                warn!("Zone '{}': {}", self.settings.name, e);
                false
            }
        }
    }

    fn mode_enabled(&self, mode: ProtectionMode) -> Result<(), ZoneError> {
        match self.settings.mode(mode) {
            Some(settings) if !settings.enabled => Err(ZoneError::mode_disabled(mode)),
            _ => Ok(()),
        }
    }

    pub(crate) fn maintenance_check(&self) -> Result<(), ZoneError> {
        if self.host.is_maintenance_active() {
            Err(ZoneError::MaintenanceSuppressed)
        } else {
            Ok(())
        }
    }

    pub fn select_protection_mode(
        &mut self,
        mode: ProtectionMode,
        sender_id: ObjectId,
        options: SelectOptions,
    ) -> bool {
        if !self.check_operation_mode(mode) {
            return false;
        }
        if let Err(e) = self.maintenance_check() {
            debug!("Zone '{}': ignoring mode change: {}", self.settings.name, e);
            return false;
        }

        if mode == ProtectionMode::Disarmed {
            self.disarm(sender_id, options);
            return true;
        }

        info!("Zone '{}': {} selected by {}", self.settings.name, mode.label(), sender_id);
        self.cancel_activation();
        self.update_mode(mode);
        self.clear_alarm_fields();
        self.update_blacklist(Vec::new());

        let delay = self.settings.activation_delay_secs;
        let success = if delay > 0 {
            self.delay_activation(mode, sender_id, options, delay);
            true
        } else {
            self.activate(mode, sender_id, options)
        };

        self.open_sensor_notice(mode);
        success
    }

    /// Completion of a delayed activation
    pub fn start_activation(&mut self) -> bool {
        let request = self.activation_request.take();
        self.scheduler.cancel(ACTIVATION_TIMER);

        if let Err(e) = self.maintenance_check() {
            debug!("Zone '{}': activation skipped: {}", self.settings.name, e);
            return false;
        }
        let mode = self.state.mode;
        if !mode.is_armed() || !self.check_operation_mode(mode) {
            return false;
        }

        let (sender_id, requested) = request.unwrap_or((0, SelectOptions::default()));
        let options = SelectOptions {
            use_ack_tone: true,
            ..requested
        };
        let success = self.activate(mode, sender_id, options);
        self.open_sensor_notice(mode);
        success
    }

    /// Manual alarm switch
    pub fn set_alarm(&mut self, state: bool) -> bool {
        if let Err(e) = self.maintenance_check() {
            debug!("Zone '{}': alarm switch ignored: {}", self.settings.name, e);
            return false;
        }

        if !state {
            self.protocol("Alarm switched off", ProtocolKind::State);
            if self.settings.alarm_switch.disarm_on_switch_off {
                return self.select_protection_mode(ProtectionMode::Disarmed, 0, SelectOptions::default());
            }
            self.clear_alarm_fields();
            return true;
        }

        let switch = self.settings.alarm_switch.clone();
        if !switch.options_on_switch_on.any() {
            debug!("Zone '{}': alarm switch has no options enabled", self.settings.name);
            return false;
        }

        warn!("Zone '{}': manual alarm '{}'", self.settings.name, switch.designation);
        self.state.alarm_switch = true;
        self.update_alarm_state(AlarmState::Alarm, &switch.designation);
        let mut options = self.state.options;
        options.apply(&switch.options_on_switch_on);
        self.update_options(options);
        self.protocol(&format!("Panic alarm: {}", switch.designation), ProtocolKind::Alarm);
        self.notify(Notice::Panic, &switch.designation);
        true
    }

    /// Back to defaults: disarmed, no alarm, empty blacklist
    pub fn reset_values(&mut self) {
        info!("Zone '{}': resetting values", self.settings.name);
        self.cancel_activation();
        self.update_blacklist(Vec::new());
        self.update_mode(ProtectionMode::Disarmed);
        self.update_arm_state(ArmState::Disarmed);
        self.clear_alarm_fields();
    }

    fn cancel_activation(&mut self) {
        self.scheduler.cancel(ACTIVATION_TIMER);
        self.activation_request = None;
        self.state.activation_pending = false;
    }

    fn disarm(&mut self, sender_id: ObjectId, options: SelectOptions) {
        info!("Zone '{}': disarmed by {}", self.settings.name, sender_id);
        self.cancel_activation();
        self.update_mode(ProtectionMode::Disarmed);
        self.update_arm_state(ArmState::Disarmed);
        self.clear_alarm_fields();
        self.update_blacklist(Vec::new());

        self.protocol(&format!("Disarmed (ID {})", sender_id), ProtocolKind::State);
        if options.use_notification {
            self.notify(Notice::Disarmed, &self.settings.name);
        }
        if options.use_ack_tone {
            self.acknowledgement_tone(ProtectionMode::Disarmed);
        }
        if options.use_action {
            self.run_mode_action(ProtectionMode::Disarmed, sender_id);
        }
    }

    fn delay_activation(&mut self, mode: ProtectionMode, sender_id: ObjectId, options: SelectOptions, delay: u64) {
        let report = self.check_door_window_state(mode);
        self.state.activation_pending = true;
        self.activation_request = Some((sender_id, options));
        self.update_arm_state(ArmState::derive(mode, report.any_open(), true));
        self.scheduler.schedule(
            ACTIVATION_TIMER,
            Instant::now(),
            Duration::from_secs(delay),
            ZoneTask::StartActivation,
        );

        info!("Zone '{}': {} will activate in {} seconds", self.settings.name, mode.label(), delay);
        self.protocol(
            &format!("{} will activate in {} seconds (ID {})", mode.label(), delay, sender_id),
            ProtocolKind::State,
        );
        if options.use_notification {
            self.notify(Notice::DelayedActivation(mode), &self.settings.name);
        }
        if options.use_action {
            self.run_mode_action(mode, sender_id);
        }
    }

    /// Closure check, then either abort or finalize the activation
    fn activate(&mut self, mode: ProtectionMode, sender_id: ObjectId, options: SelectOptions) -> bool {
        let report = self.check_door_window_state(mode);
        if !report.may_activate() {
            self.abort_activation(mode, sender_id, &report, options);
            return false;
        }

        self.state.activation_pending = false;
        self.update_blacklist(report.open_ids());
        self.update_arm_state(ArmState::derive(mode, report.any_open(), false));

        if report.any_open() {
            info!(
                "Zone '{}': {} activated with open door/window: {}",
                self.settings.name,
                mode.label(),
                report.describe_open()
            );
            self.protocol(
                &format!("{} activated with open door/window: {} (ID {})", mode.label(), report.describe_open(), sender_id),
                ProtocolKind::State,
            );
            if options.use_notification {
                self.notify(Notice::ActivatedWithOpenSensor(mode), &report.describe_open());
            }
        } else {
            info!("Zone '{}': {} activated", self.settings.name, mode.label());
            self.protocol(&format!("{} activated (ID {})", mode.label(), sender_id), ProtocolKind::State);
            if options.use_notification {
                self.notify(Notice::Activated(mode), &self.settings.name);
            }
        }

        if options.use_ack_tone {
            self.acknowledgement_tone(mode);
        }
        if options.use_action {
            self.run_mode_action(mode, sender_id);
        }
        true
    }

    fn abort_activation(
        &mut self,
        mode: ProtectionMode,
        sender_id: ObjectId,
        report: &DoorWindowReport,
        options: SelectOptions,
    ) {
        warn!(
            "Zone '{}': {} aborted, open: {}",
            self.settings.name,
            mode.label(),
            report.describe_blocking()
        );
        self.cancel_activation();
        self.update_mode(ProtectionMode::Disarmed);
        self.update_arm_state(ArmState::Disarmed);
        self.update_blacklist(Vec::new());

        self.protocol(
            &format!("Activation of {} aborted, open: {} (ID {})", mode.label(), report.describe_blocking(), sender_id),
            ProtocolKind::Event,
        );
        if options.use_notification {
            self.notify(Notice::ActivationAborted(mode), &report.describe_blocking());
        }
        if options.use_action {
            self.run_mode_action(ProtectionMode::Disarmed, sender_id);
        }
    }

    /// Wait for contacts to settle, then list the open ones. Changes no state.
    fn open_sensor_notice(&self, mode: ProtectionMode) {
        let enabled = self
            .settings
            .mode(mode)
            .map(|settings| settings.use_open_sensor_notice)
            .unwrap_or(false);
        if !enabled {
            return;
        }

        self.host.sleep(Duration::from_millis(self.settings.settle_delay_ms));
        let report = self.check_door_window_state(mode);
        for sensor in &report.open {
            self.notify(Notice::OpenSensor(mode), &sensor.designation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AlarmOptions;
    use crate::notification::ActionRef;
    use crate::sensors::DetectorCategory;
    use crate::zone::testing::*;

    const SENDER: ObjectId = 4242;

    fn template(notice: Notice) -> String {
        notice.template()
    }

    #[test]
    fn test_full_protection_all_closed() {
        let (mut zone, host) = zone();
        assert!(zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default()));

        assert_eq!(zone.state().mode, ProtectionMode::FullProtection);
        assert_eq!(zone.state().arm_state, ArmState::Armed);
        assert_eq!(host.protocol_kinds(), vec![ProtocolKind::State]);
        assert_eq!(
            host.notification_templates(),
            vec![template(Notice::Activated(ProtectionMode::FullProtection))]
        );
        assert!(zone.state().blacklist.is_empty());
    }

    #[test]
    fn test_open_door_requiring_closure_aborts() {
        let (mut zone, host) = zone();
        zone.registry
            .get_mut(DetectorCategory::DoorWindow, FRONT_DOOR)
            .unwrap()
            .check_full_protection_activation = true;
        zone.settings.disarmed_action = Some(ActionRef { id: 9, name: "lights off".into() });
        set(&host, FRONT_DOOR, true);

        assert!(!zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default()));

        assert_eq!(zone.state().mode, ProtectionMode::Disarmed);
        assert_eq!(zone.state().arm_state, ArmState::Disarmed);
        assert_eq!(host.protocol_kinds(), vec![ProtocolKind::Event]);
        assert_eq!(
            host.notifications(),
            vec![(
                template(Notice::ActivationAborted(ProtectionMode::FullProtection)),
                "Front door".to_string()
            )]
        );
        let actions = host.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].1["mode"], 0);
    }

    #[test]
    fn test_open_door_without_check_arms_partially_and_blacklists() {
        let (mut zone, host) = zone();
        set(&host, TERRACE_WINDOW, true);

        assert!(zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default()));

        assert_eq!(zone.state().arm_state, ArmState::PartialArmed);
        assert_eq!(zone.state().blacklist, vec![TERRACE_WINDOW]);
        assert_eq!(
            host.notifications(),
            vec![(
                template(Notice::ActivatedWithOpenSensor(ProtectionMode::FullProtection)),
                "Terrace window".to_string()
            )]
        );
    }

    #[test]
    fn test_arm_state_invariant_after_immediate_activation() {
        for (mode, window_open) in [
            (ProtectionMode::FullProtection, false),
            (ProtectionMode::FullProtection, true),
            (ProtectionMode::HullProtection, true),
            (ProtectionMode::PartialProtection, true),
        ] {
            let (mut zone, host) = zone();
            set(&host, TERRACE_WINDOW, window_open);
            assert!(zone.select_protection_mode(mode, SENDER, SelectOptions::silent()));

            let monitored_open = zone.check_door_window_state(mode).any_open();
            let expected = if monitored_open { ArmState::PartialArmed } else { ArmState::Armed };
            assert_eq!(zone.state().arm_state, expected, "{:?}", mode);
        }
    }

    #[test]
    fn test_disabled_mode_is_rejected() {
        let (mut zone, host) = zone();
        zone.settings.hull_protection.enabled = false;

        assert!(!zone.check_operation_mode(ProtectionMode::HullProtection));
        assert!(zone.check_operation_mode(ProtectionMode::Disarmed));
        assert!(!zone.select_protection_mode(ProtectionMode::HullProtection, SENDER, SelectOptions::default()));
        assert_eq!(zone.state().mode, ProtectionMode::Disarmed);
        assert!(host.protocol().is_empty());
    }

    #[test]
    fn test_maintenance_suppresses_mode_change() {
        let (mut zone, host) = zone();
        host.set_maintenance(true);
        assert!(!zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default()));
        assert_eq!(zone.state().arm_state, ArmState::Disarmed);
        assert!(host.protocol().is_empty());
        assert!(host.notifications().is_empty());
    }

    #[test]
    fn test_delayed_activation() {
        let (mut zone, host) = zone();
        zone.settings.activation_delay_secs = 30;
        set(&host, TERRACE_WINDOW, true);

        assert!(zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default()));
        assert_eq!(zone.state().arm_state, ArmState::DelayedPartialArmed);
        assert!(zone.state().activation_pending);
        assert!(zone.scheduler.is_scheduled(ACTIVATION_TIMER));
        assert_eq!(
            host.notification_templates(),
            vec![template(Notice::DelayedActivation(ProtectionMode::FullProtection))]
        );

        set(&host, TERRACE_WINDOW, false);
        assert_eq!(zone.run_due_tasks(Instant::now()), 0);
        assert_eq!(zone.run_due_tasks(Instant::now() + Duration::from_secs(31)), 1);

        assert_eq!(zone.state().arm_state, ArmState::Armed);
        assert!(!zone.state().activation_pending);
        assert_eq!(
            host.protocol_kinds(),
            vec![ProtocolKind::State, ProtocolKind::State]
        );
    }

    #[test]
    fn test_delayed_activation_aborts_when_door_opens() {
        let (mut zone, host) = zone();
        zone.settings.activation_delay_secs = 10;
        zone.registry
            .get_mut(DetectorCategory::DoorWindow, FRONT_DOOR)
            .unwrap()
            .check_full_protection_activation = true;

        assert!(zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default()));
        assert_eq!(zone.state().arm_state, ArmState::DelayedArmed);

        set(&host, FRONT_DOOR, true);
        assert!(!zone.start_activation());
        assert_eq!(zone.state().mode, ProtectionMode::Disarmed);
        assert_eq!(zone.state().arm_state, ArmState::Disarmed);
        assert!(!zone.scheduler.is_scheduled(ACTIVATION_TIMER));
        assert_eq!(host.protocol_kinds().last(), Some(&ProtocolKind::Event));
    }

    #[test]
    fn test_start_activation_forces_acknowledgement_tone() {
        let (mut zone, host) = zone();
        zone.settings.activation_delay_secs = 5;
        zone.settings.acknowledgement_tone = Some(ActionRef { id: 77, name: "beep".into() });

        let options = SelectOptions {
            use_ack_tone: false,
            ..SelectOptions::silent()
        };
        assert!(zone.select_protection_mode(ProtectionMode::HullProtection, SENDER, options));
        assert!(host.actions().is_empty());

        assert!(zone.start_activation());
        let actions = host.actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].0.id, 77);
    }

    #[test]
    fn test_disarm_cancels_pending_activation() {
        let (mut zone, _host) = zone();
        zone.settings.activation_delay_secs = 60;
        zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default());

        assert!(zone.select_protection_mode(ProtectionMode::Disarmed, SENDER, SelectOptions::default()));
        assert!(!zone.scheduler.is_scheduled(ACTIVATION_TIMER));
        assert_eq!(zone.run_due_tasks(Instant::now() + Duration::from_secs(120)), 0);
        assert_eq!(zone.state().arm_state, ArmState::Disarmed);
        assert!(!zone.start_activation());
    }

    #[test]
    fn test_disarm_clears_alarm_and_blacklist() {
        let (mut zone, host) = zone();
        set(&host, TERRACE_WINDOW, true);
        zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::silent());
        zone.set_alarm(true);
        assert_eq!(zone.state().alarm_state, AlarmState::Alarm);
        host.clear_records();

        assert!(zone.select_protection_mode(ProtectionMode::Disarmed, SENDER, SelectOptions::default()));
        let state = zone.state();
        assert_eq!(state.alarm_state, AlarmState::None);
        assert!(state.alerting_sensor.is_empty());
        assert_eq!(state.options, AlarmOptions::default());
        assert!(state.blacklist.is_empty());
        assert_eq!(host.protocol_kinds(), vec![ProtocolKind::State]);
        assert_eq!(host.notification_templates(), vec![template(Notice::Disarmed)]);
    }

    #[test]
    fn test_open_sensor_notice_after_settle_delay() {
        let (mut zone, host) = zone();
        zone.settings.full_protection.use_open_sensor_notice = true;
        set(&host, TERRACE_WINDOW, true);

        assert!(zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::default()));
        assert_eq!(host.sleeps(), vec![Duration::from_millis(100)]);
        assert_eq!(
            host.notifications().last(),
            Some(&(
                template(Notice::OpenSensor(ProtectionMode::FullProtection)),
                "Terrace window".to_string()
            ))
        );
    }

    #[test]
    fn test_manual_alarm_switch() {
        let (mut zone, host) = zone();
        assert!(zone.set_alarm(true));

        let state = zone.state();
        assert_eq!(state.alarm_state, AlarmState::Alarm);
        assert!(state.alarm_switch);
        assert_eq!(state.alerting_sensor, "Panic alarm");
        assert!(state.options.siren && state.options.light && state.options.panic);
        assert!(!state.options.call);
        assert_eq!(host.protocol_kinds(), vec![ProtocolKind::Alarm]);
        assert_eq!(host.notification_templates(), vec![template(Notice::Panic)]);
    }

    #[test]
    fn test_manual_alarm_without_options_does_nothing() {
        let (mut zone, host) = zone();
        zone.settings.alarm_switch.options_on_switch_on = AlarmOptions::default();
        assert!(!zone.set_alarm(true));
        assert_eq!(zone.state().alarm_state, AlarmState::None);
        assert!(host.protocol().is_empty());
    }

    #[test]
    fn test_switch_off_disarms_or_clears() {
        let (mut zone, _host) = zone();
        zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::silent());
        zone.set_alarm(true);
        assert!(zone.set_alarm(false));
        assert_eq!(zone.state().mode, ProtectionMode::Disarmed);
        assert_eq!(zone.state().alarm_state, AlarmState::None);

        let (mut zone, _host) = crate::zone::testing::zone();
        zone.settings.alarm_switch.disarm_on_switch_off = false;
        zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::silent());
        zone.set_alarm(true);
        assert!(zone.set_alarm(false));
        assert_eq!(zone.state().mode, ProtectionMode::FullProtection);
        assert_eq!(zone.state().arm_state, ArmState::Armed);
        assert_eq!(zone.state().alarm_state, AlarmState::None);
        assert!(!zone.state().alarm_switch);
        assert!(!zone.state().options.any());
    }

    #[test]
    fn test_reset_values() {
        let (mut zone, host) = zone();
        zone.settings.activation_delay_secs = 10;
        set(&host, TERRACE_WINDOW, true);
        zone.select_protection_mode(ProtectionMode::FullProtection, SENDER, SelectOptions::silent());
        zone.set_alarm(true);

        zone.reset_values();
        let state = zone.state();
        assert_eq!(state.mode, ProtectionMode::Disarmed);
        assert_eq!(state.arm_state, ArmState::Disarmed);
        assert_eq!(state.alarm_state, AlarmState::None);
        assert!(!state.options.any());
        assert!(state.blacklist.is_empty());
        assert!(!state.activation_pending);
        assert!(zone.next_due().is_none());
    }
}
