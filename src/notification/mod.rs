// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Notification module - protocol lines, notifications and actions

mod console;

pub use console::LogSink;

use serde::{Deserialize, Serialize};

use crate::core::{ObjectId, ProtectionMode};
use crate::sensors::DetectorCategory;

/// Kind of an alarm protocol line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolKind {
    Event,
    State,
    Alarm,
}

/// Reference to a host action (script, instance action, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
}

/// Notification templates sent by the zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Disarmed,
    Activated(ProtectionMode),
    ActivatedWithOpenSensor(ProtectionMode),
    DelayedActivation(ProtectionMode),
    ActivationAborted(ProtectionMode),
    OpenSensor(ProtectionMode),
    Alarm(DetectorCategory),
    Panic,
}

impl Notice {
    pub fn template(self) -> String {
        match self {
            Notice::Disarmed => "disarmed".to_string(),
            Notice::Activated(mode) => format!("{}_activated", mode.key()),
            Notice::ActivatedWithOpenSensor(mode) => format!("{}_activated_with_open_sensor", mode.key()),
            Notice::DelayedActivation(mode) => format!("{}_delayed_activation", mode.key()),
            Notice::ActivationAborted(mode) => format!("{}_activation_aborted", mode.key()),
            Notice::OpenSensor(mode) => format!("{}_open_sensor", mode.key()),
            Notice::Alarm(category) => format!("{}_alarm", category.key()),
            Notice::Panic => "panic_alarm".to_string(),
        }
    }
}

/// Outbound side effects of a zone, implemented by the host
pub trait NotificationSink: Send + Sync {
    fn emit_protocol_line(&self, text: &str, kind: ProtocolKind);

    fn send_notification(&self, template: &str, arg: &str);

    fn run_action(&self, action: &ActionRef, params: serde_json::Value);
}
