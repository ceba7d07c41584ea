// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Typed condition rules
//!
//! A condition is an AND over variable comparisons. The configuration
//! stores it as a JSON string, e.g.
//!
//! ```text
//! {"all": [{"variable_id": 12345, "comparison": "equal", "value": true}]}
//! ```
//!
//! which is parsed once when the sensor registry is built.

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LiveValue, SensorHost};
use crate::core::{ObjectId, ZoneError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl Comparison {
    fn matches(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Equal => ordering == Ordering::Equal,
            Comparison::NotEqual => ordering != Ordering::Equal,
            Comparison::Greater => ordering == Ordering::Greater,
            Comparison::GreaterOrEqual => ordering != Ordering::Less,
            Comparison::Less => ordering == Ordering::Less,
            Comparison::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

/// Single variable comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub variable_id: ObjectId,
    pub comparison: Comparison,
    pub value: LiveValue,
}

impl Predicate {
    pub fn new(variable_id: ObjectId, comparison: Comparison, value: LiveValue) -> Self {
        Self {
            variable_id,
            comparison,
            value,
        }
    }

    pub fn evaluate(&self, host: &dyn SensorHost) -> Result<bool, ZoneError> {
        if !host.object_exists(self.variable_id) {
            return Err(ZoneError::MissingSensorReference(self.variable_id));
        }
        let Some(current) = host.live_value(self.variable_id) else {
            return Err(ZoneError::MissingSensorReference(self.variable_id));
        };
        Ok(current
            .compare(&self.value)
            .map(|ordering| self.comparison.matches(ordering))
            .unwrap_or(false))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub all: Vec<Predicate>,
}

impl Condition {
    pub fn new(all: Vec<Predicate>) -> Self {
        Self { all }
    }

    /// Parse a stored payload; blank payloads yield an empty condition
    pub fn parse(payload: &str) -> Result<Self, ZoneError> {
        let payload = payload.trim();
        if payload.is_empty() || payload == "[]" || payload == "{}" {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(payload)?)
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// True iff every predicate passes. Missing objects count as not passing.
    /// An empty condition passes.
    pub fn evaluate(&self, host: &dyn SensorHost) -> bool {
        self.all.iter().all(|predicate| match predicate.evaluate(host) {
            Ok(passed) => passed,
            Err(e) => {
                debug!("Condition not passing: {}", e);
                false
            }
        })
    }
}
