// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Trigger rules evaluated against a sensor's own live value

use std::cmp::Ordering;
use serde::{Deserialize, Serialize};

use super::LiveValue;

/// How a value report is turned into a detection.
///
/// Variants without `repeat` (or with `repeat = false`) only fire when the
/// value actually changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerRule {
    OnChange,
    OnUpdate,
    OnLimitDrop {
        limit: LiveValue,
        #[serde(default)]
        repeat: bool,
    },
    OnLimitExceed {
        limit: LiveValue,
        #[serde(default)]
        repeat: bool,
    },
    OnSpecificValue {
        value: LiveValue,
        #[serde(default)]
        repeat: bool,
    },
}

impl TriggerRule {
    /// Whether this report counts as a detection
    pub fn fires(&self, current: &LiveValue, value_changed: bool) -> bool {
        match self {
            TriggerRule::OnChange => value_changed,
            TriggerRule::OnUpdate => true,
            TriggerRule::OnLimitDrop { repeat, .. }
            | TriggerRule::OnLimitExceed { repeat, .. }
            | TriggerRule::OnSpecificValue { repeat, .. } => {
                (*repeat || value_changed) && self.is_satisfied(current)
            }
        }
    }

    /// Level view of the rule, used for the aggregate category state
    pub fn is_satisfied(&self, current: &LiveValue) -> bool {
        match self {
            TriggerRule::OnChange | TriggerRule::OnUpdate => current.is_truthy(),
            TriggerRule::OnLimitDrop { limit, .. } => current.compare(limit) == Some(Ordering::Less),
            TriggerRule::OnLimitExceed { limit, .. } => {
                current.compare(limit) == Some(Ordering::Greater)
            }
            TriggerRule::OnSpecificValue { value, .. } => {
                current.compare(value) == Some(Ordering::Equal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_and_update() {
        let value = LiveValue::Bool(false);
        assert!(TriggerRule::OnChange.fires(&value, true));
        assert!(!TriggerRule::OnChange.fires(&value, false));
        assert!(TriggerRule::OnUpdate.fires(&value, false));
    }

    #[test]
    fn test_once_variants_need_a_change() {
        let rule = TriggerRule::OnSpecificValue {
            value: LiveValue::Bool(true),
            repeat: false,
        };
        assert!(rule.fires(&LiveValue::Bool(true), true));
        assert!(!rule.fires(&LiveValue::Bool(true), false));
        assert!(!rule.fires(&LiveValue::Bool(false), true));

        let repeating = TriggerRule::OnSpecificValue {
            value: LiveValue::Bool(true),
            repeat: true,
        };
        assert!(repeating.fires(&LiveValue::Bool(true), false));
    }

    #[test]
    fn test_limits() {
        let drop = TriggerRule::OnLimitDrop {
            limit: LiveValue::Integer(10),
            repeat: true,
        };
        assert!(drop.fires(&LiveValue::Float(9.5), false));
        assert!(!drop.fires(&LiveValue::Integer(10), false));

        let exceed = TriggerRule::OnLimitExceed {
            limit: LiveValue::Float(30.0),
            repeat: false,
        };
        assert!(exceed.fires(&LiveValue::Integer(31), true));
        assert!(!exceed.fires(&LiveValue::Integer(31), false));
        assert!(!exceed.fires(&LiveValue::String("31".into()), true));
    }

    #[test]
    fn test_tagged_deserialization() {
        let rule: TriggerRule =
            serde_json::from_str(r#"{"type":"on_limit_exceed","limit":25}"#).unwrap();
        assert_eq!(
            rule,
            TriggerRule::OnLimitExceed {
                limit: LiveValue::Integer(25),
                repeat: false
            }
        );
    }
}
