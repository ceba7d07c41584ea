// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Alarmzone - Alarm Zone State Machine and Sensor Alert Engine
//!
//! One zone groups door/window contacts, motion detectors, glass breakage
//! sensors and water sensors under a protection mode:
//! - Full, hull and partial protection with optional delayed activation
//! - Door/window checks that abort, partially arm or blacklist on activation
//! - Typed condition trees and trigger rules per sensor entry
//! - Delayed verification of glass breakage and water alarms
//! - Protocol lines, notifications and host actions through one sink
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Zone Actor                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐  ┌───────────┐  ┌───────────┐  ┌────────────┐  │
//! │  │ Sensor  │→ │ Detection │→ │   Zone    │→ │Notification│  │
//! │  │Registry │  │ Evaluator │  │  State    │  │   Sink     │  │
//! │  └─────────┘  └───────────┘  └───────────┘  └────────────┘  │
//! │       ↑             ↓              ↓                        │
//! │  ┌─────────┐  ┌───────────┐  ┌─────────────────────────┐    │
//! │  │ Sensor  │  │ Scheduler │  │        Event Bus        │    │
//! │  │  Host   │  │           │  │                         │    │
//! │  └─────────┘  └───────────┘  └─────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod core;
pub mod sensors;
pub mod detection;
pub mod zone;
pub mod notification;
pub mod config;

// Re-exports for convenience
pub use config::Config;
pub use crate::core::{
    AlarmOptions, AlarmState, ArmState, EventBus, ObjectId, ProtectionMode, ZoneActor, ZoneError,
    ZoneEvent, ZoneEventKind, ZoneHandle, ZoneState,
};
pub use sensors::{DetectorCategory, MemoryHost, SensorHost, SensorRegistry, SensorSimulator};
pub use detection::VerificationEntry;
pub use zone::{SelectOptions, Zone, ZoneAttributes};
pub use notification::{LogSink, NotificationSink};

/// Alarmzone version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Alarmzone name
pub const NAME: &str = "Alarmzone";
