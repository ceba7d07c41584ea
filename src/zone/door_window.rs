// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Door/window closure check performed before a mode becomes active

use serde::{Deserialize, Serialize};

use super::Zone;
use crate::core::{ObjectId, ProtectionMode};
use crate::sensors::DetectorCategory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSensor {
    pub sensor_id: ObjectId,
    pub designation: String,
}

/// Result of checking the door/window contacts monitored by one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorWindowReport {
    pub mode: ProtectionMode,
    /// Every monitored contact that is currently open
    pub open: Vec<OpenSensor>,
    /// Open contacts that must be closed before the mode may activate
    pub blocking: Vec<OpenSensor>,
}

impl DoorWindowReport {
    pub fn any_open(&self) -> bool {
        !self.open.is_empty()
    }

    pub fn may_activate(&self) -> bool {
        self.blocking.is_empty()
    }

    pub fn open_ids(&self) -> Vec<ObjectId> {
        self.open.iter().map(|s| s.sensor_id).collect()
    }

    pub fn describe_open(&self) -> String {
        join(&self.open)
    }

    pub fn describe_blocking(&self) -> String {
        join(&self.blocking)
    }
}

fn join(sensors: &[OpenSensor]) -> String {
    sensors
        .iter()
        .map(|s| s.designation.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Zone {
    /// Check the enabled door/window contacts active in `mode`. Has no side effects.
    pub fn check_door_window_state(&self, mode: ProtectionMode) -> DoorWindowReport {
        let mut report = DoorWindowReport {
            mode,
            open: Vec::new(),
            blocking: Vec::new(),
        };

        for entry in self.registry.enabled(DetectorCategory::DoorWindow) {
            if !entry.is_active_in(mode) || !entry.is_open(self.host.as_ref()) {
                continue;
            }
            let sensor = OpenSensor {
                sensor_id: entry.sensor_id,
                designation: entry.label(),
            };
            if entry.requires_closure_in(mode) {
                report.blocking.push(sensor.clone());
            }
            report.open.push(sensor);
        }

        report
    }
}
