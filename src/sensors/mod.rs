// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Sensor module - host interface, condition rules and the sensor registry

mod condition;
mod memory;
mod registry;
mod simulator;
mod traits;
mod trigger;

pub use condition::{Comparison, Condition, Predicate};
pub use memory::MemoryHost;
pub use registry::{AlertingAction, SensorEntry, SensorEntryRecord, SensorRegistry};
pub use simulator::SensorSimulator;
pub use traits::{DetectorCategory, LiveValue, SensorHost};
pub use trigger::TriggerRule;
