// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Event bus publishing zone field changes

use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::{AlarmOptions, AlarmState, ArmState, ObjectId, ProtectionMode};
use crate::notification::ProtocolKind;
use crate::sensors::DetectorCategory;

/// Event kinds in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ZoneEventKind {
    ModeChanged(ProtectionMode),
    ArmStateChanged(ArmState),
    AlarmStateChanged {
        state: AlarmState,
        sensor: String,
    },
    OptionsChanged(AlarmOptions),
    CategoryState {
        category: DetectorCategory,
        active: bool,
    },
    BlacklistChanged(Vec<ObjectId>),
    Protocol {
        kind: ProtocolKind,
        text: String,
    },
}

/// Event wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneEvent {
    pub id: u64,
    pub zone: String,
    pub timestamp: DateTime<Utc>,
    pub kind: ZoneEventKind,
}

/// Broadcast bus for zone observers
pub struct EventBus {
    event_tx: broadcast::Sender<ZoneEvent>,
    event_counter: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity);

        Self {
            event_tx,
            event_counter: AtomicU64::new(0),
        }
    }

    pub fn publish(&self, zone: &str, kind: ZoneEventKind) {
        let id = self.event_counter.fetch_add(1, Ordering::Relaxed);
        let event = ZoneEvent {
            id,
            zone: zone.to_string(),
            timestamp: Utc::now(),
            kind,
        };
        // No subscribers is not an error
        let _ = self.event_tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ZoneEvent> {
        self.event_tx.subscribe()
    }

    /// Number of events published so far
    pub fn published(&self) -> u64 {
        self.event_counter.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_subscriber() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        bus.publish("Home", ZoneEventKind::ModeChanged(ProtectionMode::FullProtection));
        bus.publish("Home", ZoneEventKind::ArmStateChanged(ArmState::Armed));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.id, 0);
        assert_eq!(first.zone, "Home");
        assert_eq!(first.kind, ZoneEventKind::ModeChanged(ProtectionMode::FullProtection));
        assert_eq!(rx.try_recv().unwrap().kind, ZoneEventKind::ArmStateChanged(ArmState::Armed));
        assert_eq!(bus.published(), 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        bus.publish("Home", ZoneEventKind::BlacklistChanged(vec![]));
        assert_eq!(bus.published(), 1);
    }
}
