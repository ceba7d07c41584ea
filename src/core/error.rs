// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Zone error kinds
//!
//! None of these cross the zone boundary: public operations log them and
//! report `false` instead.

use thiserror::Error;

use super::{ObjectId, ProtectionMode};
use crate::sensors::DetectorCategory;

#[derive(Debug, Error, PartialEq)]
pub enum ZoneError {
    #[error("{0} is not enabled in the configuration")]
    ConfigurationDisabled(String),

    #[error("maintenance mode is active")]
    MaintenanceSuppressed,

    #[error("condition refers to missing object {0}")]
    MissingSensorReference(ObjectId),

    #[error("malformed condition payload: {0}")]
    MalformedConditionPayload(String),

    #[error("duplicate {category:?} entry for sensor {sensor_id}")]
    DuplicateSensor {
        category: DetectorCategory,
        sensor_id: ObjectId,
    },
}

impl ZoneError {
    pub fn mode_disabled(mode: ProtectionMode) -> Self {
        ZoneError::ConfigurationDisabled(mode.label().to_string())
    }
}

impl From<serde_json::Error> for ZoneError {
    fn from(e: serde_json::Error) -> Self {
        ZoneError::MalformedConditionPayload(e.to_string())
    }
}
