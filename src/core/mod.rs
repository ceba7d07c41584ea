// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Core module - zone state, errors, scheduling and the zone actor

mod engine;
mod error;
mod event_bus;
mod scheduler;

pub use engine::{ZoneActor, ZoneCommand, ZoneHandle};
pub use error::ZoneError;
pub use event_bus::{EventBus, ZoneEvent, ZoneEventKind};
pub use scheduler::{Scheduler, ZoneTask};

use serde::{Deserialize, Serialize};

use crate::sensors::DetectorCategory;

/// Host object identifier (variables, actions, instances)
pub type ObjectId = u32;

/// Protection mode selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionMode {
    #[default]
    Disarmed,
    FullProtection,
    HullProtection,
    PartialProtection,
}

impl ProtectionMode {
    /// Numeric value as exposed to the host (0..=3)
    pub fn as_u8(self) -> u8 {
        match self {
            ProtectionMode::Disarmed => 0,
            ProtectionMode::FullProtection => 1,
            ProtectionMode::HullProtection => 2,
            ProtectionMode::PartialProtection => 3,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ProtectionMode::Disarmed),
            1 => Some(ProtectionMode::FullProtection),
            2 => Some(ProtectionMode::HullProtection),
            3 => Some(ProtectionMode::PartialProtection),
            _ => None,
        }
    }

    pub fn is_armed(self) -> bool {
        self != ProtectionMode::Disarmed
    }

    /// Human readable name used in protocol lines
    pub fn label(self) -> &'static str {
        match self {
            ProtectionMode::Disarmed => "Disarmed",
            ProtectionMode::FullProtection => "Full protection",
            ProtectionMode::HullProtection => "Hull protection",
            ProtectionMode::PartialProtection => "Partial protection",
        }
    }

    /// Key used to build notification template names
    pub fn key(self) -> &'static str {
        match self {
            ProtectionMode::Disarmed => "disarmed",
            ProtectionMode::FullProtection => "full_protection",
            ProtectionMode::HullProtection => "hull_protection",
            ProtectionMode::PartialProtection => "partial_protection",
        }
    }
}

impl std::str::FromStr for ProtectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "0" | "disarmed" | "off" => Ok(ProtectionMode::Disarmed),
            "1" | "full" | "full_protection" => Ok(ProtectionMode::FullProtection),
            "2" | "hull" | "hull_protection" => Ok(ProtectionMode::HullProtection),
            "3" | "partial" | "partial_protection" => Ok(ProtectionMode::PartialProtection),
            other => Err(format!("unknown protection mode '{}'", other)),
        }
    }
}

/// Detailed arming state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArmState {
    #[default]
    Disarmed,
    Armed,
    DelayedArmed,
    PartialArmed,
    DelayedPartialArmed,
}

impl ArmState {
    pub fn as_u8(self) -> u8 {
        match self {
            ArmState::Disarmed => 0,
            ArmState::Armed => 1,
            ArmState::DelayedArmed => 2,
            ArmState::PartialArmed => 3,
            ArmState::DelayedPartialArmed => 4,
        }
    }

    /// Derive the detailed state from the mode, the door/window situation and a pending delay
    pub fn derive(mode: ProtectionMode, any_open: bool, delay_pending: bool) -> Self {
        match (mode.is_armed(), delay_pending, any_open) {
            (false, _, _) => ArmState::Disarmed,
            (true, true, false) => ArmState::DelayedArmed,
            (true, true, true) => ArmState::DelayedPartialArmed,
            (true, false, false) => ArmState::Armed,
            (true, false, true) => ArmState::PartialArmed,
        }
    }

    /// Only fully activated states may raise non-permanent alarms
    pub fn is_active(self) -> bool {
        matches!(self, ArmState::Armed | ArmState::PartialArmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlarmState {
    #[default]
    None,
    Alarm,
}

/// Alarm option switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AlarmOptions {
    #[serde(default)]
    pub siren: bool,
    #[serde(default)]
    pub light: bool,
    #[serde(default)]
    pub call: bool,
    #[serde(default)]
    pub panic: bool,
}

impl AlarmOptions {
    pub fn any(&self) -> bool {
        self.siren || self.light || self.call || self.panic
    }

    /// Switch on every option enabled in `other`, leaving the rest untouched
    pub fn apply(&mut self, other: &AlarmOptions) {
        self.siren |= other.siren;
        self.light |= other.light;
        self.call |= other.call;
        self.panic |= other.panic;
    }
}

/// All mutable fields of one alarm zone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneState {
    pub mode: ProtectionMode,
    pub arm_state: ArmState,
    pub alarm_state: AlarmState,
    pub alerting_sensor: String,
    pub alarm_switch: bool,
    pub options: AlarmOptions,
    /// Sensors that were open at arm time, in the order they were added
    pub blacklist: Vec<ObjectId>,
    pub activation_pending: bool,
    pub door_window_state: bool,
    pub motion_detector_state: bool,
    pub glass_breakage_state: bool,
    pub water_sensor_state: bool,
}

impl ZoneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blacklisted(&self, sensor_id: ObjectId) -> bool {
        self.blacklist.contains(&sensor_id)
    }

    /// Returns false if the sensor was already listed
    pub fn add_to_blacklist(&mut self, sensor_id: ObjectId) -> bool {
        if self.is_blacklisted(sensor_id) {
            return false;
        }
        self.blacklist.push(sensor_id);
        true
    }

    pub fn remove_from_blacklist(&mut self, sensor_id: ObjectId) -> bool {
        let before = self.blacklist.len();
        self.blacklist.retain(|id| *id != sensor_id);
        before != self.blacklist.len()
    }

    pub fn category_state(&self, category: DetectorCategory) -> bool {
        match category {
            DetectorCategory::DoorWindow => self.door_window_state,
            DetectorCategory::Motion => self.motion_detector_state,
            DetectorCategory::GlassBreakage => self.glass_breakage_state,
            DetectorCategory::Water => self.water_sensor_state,
        }
    }

    pub fn set_category_state(&mut self, category: DetectorCategory, active: bool) {
        match category {
            DetectorCategory::DoorWindow => self.door_window_state = active,
            DetectorCategory::Motion => self.motion_detector_state = active,
            DetectorCategory::GlassBreakage => self.glass_breakage_state = active,
            DetectorCategory::Water => self.water_sensor_state = active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_state_derivation() {
        use ProtectionMode::*;
        assert_eq!(ArmState::derive(Disarmed, true, true), ArmState::Disarmed);
        assert_eq!(ArmState::derive(FullProtection, false, false), ArmState::Armed);
        assert_eq!(ArmState::derive(HullProtection, true, false), ArmState::PartialArmed);
        assert_eq!(ArmState::derive(FullProtection, false, true), ArmState::DelayedArmed);
        assert_eq!(ArmState::derive(PartialProtection, true, true), ArmState::DelayedPartialArmed);
        assert_eq!(ArmState::DelayedPartialArmed.as_u8(), 4);
    }

    #[test]
    fn test_blacklist_keeps_order_without_duplicates() {
        let mut state = ZoneState::new();
        assert!(state.add_to_blacklist(20));
        assert!(state.add_to_blacklist(10));
        assert!(!state.add_to_blacklist(20));
        assert_eq!(state.blacklist, vec![20, 10]);

        assert!(state.remove_from_blacklist(20));
        assert!(!state.remove_from_blacklist(20));
        assert_eq!(state.blacklist, vec![10]);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("full".parse::<ProtectionMode>(), Ok(ProtectionMode::FullProtection));
        assert_eq!("3".parse::<ProtectionMode>(), Ok(ProtectionMode::PartialProtection));
        assert!("bogus".parse::<ProtectionMode>().is_err());
        assert_eq!(ProtectionMode::from_u8(2), Some(ProtectionMode::HullProtection));
        assert_eq!(ProtectionMode::from_u8(9), None);
    }
}
