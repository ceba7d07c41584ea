// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Sensor simulator for demo/testing
//!
//! Flips boolean sensor variables in a [`MemoryHost`] at random and forwards
//! each change to the zone actor, the way a real host would report them.

use std::sync::Arc;
use anyhow::Result;
use rand::prelude::*;
use rand::rngs::StdRng;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use super::{Comparison, Condition, DetectorCategory, LiveValue, MemoryHost, Predicate, SensorEntry, SensorRegistry};
use crate::core::{ObjectId, ZoneError, ZoneHandle};

/// Simulates open/close and detection events
pub struct SensorSimulator {
    host: Arc<MemoryHost>,
    sensors: Vec<ObjectId>,
    rng: StdRng,
    tick: Duration,
    change_probability: f64,
}

impl SensorSimulator {
    pub fn new(host: Arc<MemoryHost>, sensors: Vec<ObjectId>) -> Self {
        Self {
            host,
            sensors,
            rng: StdRng::from_entropy(),
            tick: Duration::from_secs(2),
            change_probability: 0.25,
        }
    }

    /// Deterministic simulator
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_change_probability(mut self, probability: f64) -> Self {
        self.change_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Every sensor variable a registry refers to, sorted
    pub fn sensors_of(registry: &SensorRegistry) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = DetectorCategory::ALL
            .iter()
            .flat_map(|c| registry.entries(*c).iter().map(|e| e.sensor_id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Put every simulated sensor in its resting state
    pub fn reset(&self) {
        for id in &self.sensors {
            self.host.set_value(*id, LiveValue::Bool(false));
        }
    }

    /// Possibly toggle one sensor; returns the sensor and its new value
    pub fn step(&mut self) -> Option<(ObjectId, bool)> {
        if self.sensors.is_empty() || !self.rng.gen_bool(self.change_probability) {
            return None;
        }

        let id = *self.sensors.choose(&mut self.rng)?;
        let open = !self.host.live_bool(id);
        self.host.set_value(id, LiveValue::Bool(open));
        Some((id, open))
    }

    /// Drive the zone until shutdown
    pub async fn run(mut self, zone: ZoneHandle, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        info!("Starting sensor simulator with {} sensors", self.sensors.len());
        self.reset();

        let mut ticker = interval(self.tick);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some((id, open)) = self.step() {
                        debug!("Simulated sensor {} -> {}", id, open);
                        match zone.report(id, true).await {
                            Ok(true) => info!("Simulated sensor {} raised an alarm", id),
                            Ok(false) => {}
                            Err(e) => {
                                warn!("Simulator stopping: {}", e);
                                break;
                            }
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Sensor simulator shutting down...");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Small house used when demo mode runs without configured sensors
    pub fn demo_registry() -> Result<SensorRegistry, ZoneError> {
        let mut registry = SensorRegistry::new();

        for (id, name) in [(1001, "Front door"), (1002, "Back door"), (1003, "Kitchen window")] {
            let mut entry = SensorEntry::new(id, name, open_when_true(id));
            entry.full_protection_active = true;
            entry.hull_protection_active = true;
            entry.check_full_protection_activation = true;
            entry.use_alarm_protocol = true;
            entry.use_notification = true;
            registry.insert(DetectorCategory::DoorWindow, entry)?;
        }

        let mut hallway = SensorEntry::new(2001, "Hallway", open_when_true(2001));
        hallway.full_protection_active = true;
        hallway.partial_protection_active = true;
        hallway.use_alarm_protocol = true;
        registry.insert(DetectorCategory::Motion, hallway)?;

        let mut glass = SensorEntry::new(3001, "Living room glass", open_when_true(3001));
        glass.full_protection_active = true;
        glass.hull_protection_active = true;
        glass.verification_delay_ms = 1_500;
        glass.use_alarm_protocol = true;
        registry.insert(DetectorCategory::GlassBreakage, glass)?;

        let mut water = SensorEntry::new(4001, "Basement water", open_when_true(4001));
        water.permanent_monitoring = true;
        water.use_alarm_protocol = true;
        water.use_notification = true;
        registry.insert(DetectorCategory::Water, water)?;

        Ok(registry)
    }
}

fn open_when_true(id: ObjectId) -> Condition {
    Condition::new(vec![Predicate::new(id, Comparison::Equal, LiveValue::Bool(true))])
}
