// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Sensor traits and common types

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::core::ObjectId;

/// Detector categories monitored by a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorCategory {
    DoorWindow,
    Motion,
    GlassBreakage,
    Water,
}

impl DetectorCategory {
    pub const ALL: [DetectorCategory; 4] = [
        DetectorCategory::DoorWindow,
        DetectorCategory::Motion,
        DetectorCategory::GlassBreakage,
        DetectorCategory::Water,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DetectorCategory::DoorWindow => "Door/window sensor",
            DetectorCategory::Motion => "Motion detector",
            DetectorCategory::GlassBreakage => "Glass breakage detector",
            DetectorCategory::Water => "Water sensor",
        }
    }

    /// Key used in notification template names and config sections
    pub fn key(self) -> &'static str {
        match self {
            DetectorCategory::DoorWindow => "door_window",
            DetectorCategory::Motion => "motion",
            DetectorCategory::GlassBreakage => "glass_breakage",
            DetectorCategory::Water => "water",
        }
    }

    /// Motion detectors alert immediately, everything else may be verified first
    pub fn supports_verification(self) -> bool {
        self != DetectorCategory::Motion
    }

    /// Door/window contacts take part in closure checks and the blacklist
    pub fn tracks_closure(self) -> bool {
        self == DetectorCategory::DoorWindow
    }
}

impl fmt::Display for DetectorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed value of a host variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LiveValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl LiveValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LiveValue::Integer(v) => Some(*v as f64),
            LiveValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Typed comparison; values of unrelated types do not compare
    pub fn compare(&self, other: &LiveValue) -> Option<Ordering> {
        match (self, other) {
            (LiveValue::Bool(a), LiveValue::Bool(b)) => Some(a.cmp(b)),
            (LiveValue::Integer(a), LiveValue::Integer(b)) => Some(a.cmp(b)),
            (LiveValue::String(a), LiveValue::String(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            LiveValue::Bool(v) => *v,
            LiveValue::Integer(v) => *v != 0,
            LiveValue::Float(v) => *v != 0.0,
            LiveValue::String(v) => !v.is_empty(),
        }
    }
}

impl fmt::Display for LiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveValue::Bool(v) => write!(f, "{}", v),
            LiveValue::Integer(v) => write!(f, "{}", v),
            LiveValue::Float(v) => write!(f, "{}", v),
            LiveValue::String(v) => f.write_str(v),
        }
    }
}

/// Host platform access needed by the zone
pub trait SensorHost: Send + Sync {
    /// Current value of a host variable, `None` if it cannot be read
    fn live_value(&self, id: ObjectId) -> Option<LiveValue>;

    fn object_exists(&self, id: ObjectId) -> bool;

    fn is_maintenance_active(&self) -> bool;

    /// Blocking pause on the calling operation
    fn sleep(&self, duration: Duration);
}
