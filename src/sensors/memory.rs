// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! In-memory host used by the demo runner and the tests

use std::collections::HashMap;
use std::time::Duration;
use parking_lot::Mutex;
use tokio::runtime::{Handle, RuntimeFlavor};

use super::{LiveValue, SensorHost};
use crate::core::ObjectId;
use crate::notification::{ActionRef, NotificationSink, ProtocolKind};

#[derive(Default)]
struct HostState {
    values: HashMap<ObjectId, LiveValue>,
    maintenance: bool,
    protocol: Vec<(String, ProtocolKind)>,
    notifications: Vec<(String, String)>,
    actions: Vec<(ActionRef, serde_json::Value)>,
    sleeps: Vec<Duration>,
}

/// Host that keeps variables in a map and records every side effect.
/// `sleep` is recorded, not performed, unless `real_sleep` is set.
#[derive(Default)]
pub struct MemoryHost {
    state: Mutex<HostState>,
    real_sleep: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose `sleep` actually pauses the caller
    pub fn with_real_sleep() -> Self {
        Self {
            state: Mutex::new(HostState::default()),
            real_sleep: true,
        }
    }

    /// Set a variable; returns true if the value changed
    pub fn set_value(&self, id: ObjectId, value: LiveValue) -> bool {
        let mut state = self.state.lock();
        state.values.insert(id, value.clone()) != Some(value)
    }

    /// Truthiness of a variable; missing variables read as false
    pub fn live_bool(&self, id: ObjectId) -> bool {
        self.state
            .lock()
            .values
            .get(&id)
            .map(LiveValue::is_truthy)
            .unwrap_or(false)
    }

    pub fn remove_object(&self, id: ObjectId) {
        self.state.lock().values.remove(&id);
    }

    pub fn set_maintenance(&self, active: bool) {
        self.state.lock().maintenance = active;
    }

    pub fn protocol(&self) -> Vec<(String, ProtocolKind)> {
        self.state.lock().protocol.clone()
    }

    pub fn protocol_kinds(&self) -> Vec<ProtocolKind> {
        self.state.lock().protocol.iter().map(|(_, k)| *k).collect()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.state.lock().notifications.clone()
    }

    pub fn notification_templates(&self) -> Vec<String> {
        self.state.lock().notifications.iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn actions(&self) -> Vec<(ActionRef, serde_json::Value)> {
        self.state.lock().actions.clone()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().sleeps.clone()
    }

    /// Forget recorded side effects, keeping variables
    pub fn clear_records(&self) {
        let mut state = self.state.lock();
        state.protocol.clear();
        state.notifications.clear();
        state.actions.clear();
        state.sleeps.clear();
    }
}

impl SensorHost for MemoryHost {
    fn live_value(&self, id: ObjectId) -> Option<LiveValue> {
        self.state.lock().values.get(&id).cloned()
    }

    fn object_exists(&self, id: ObjectId) -> bool {
        self.state.lock().values.contains_key(&id)
    }

    fn is_maintenance_active(&self) -> bool {
        self.state.lock().maintenance
    }

    fn sleep(&self, duration: Duration) {
        self.state.lock().sleeps.push(duration);
        if !self.real_sleep {
            return;
        }

        // On a multi-threaded runtime, hand the worker's other tasks off while blocking
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| std::thread::sleep(duration));
            }
            _ => std::thread::sleep(duration),
        }
    }
}

impl NotificationSink for MemoryHost {
    fn emit_protocol_line(&self, text: &str, kind: ProtocolKind) {
        self.state.lock().protocol.push((text.to_string(), kind));
    }

    fn send_notification(&self, template: &str, arg: &str) {
        self.state
            .lock()
            .notifications
            .push((template.to_string(), arg.to_string()));
    }

    fn run_action(&self, action: &ActionRef, params: serde_json::Value) {
        self.state.lock().actions.push((action.clone(), params));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_value_reports_change() {
        let host = MemoryHost::new();
        assert!(host.set_value(1, LiveValue::Bool(false)));
        assert!(!host.set_value(1, LiveValue::Bool(false)));
        assert!(host.set_value(1, LiveValue::Bool(true)));
        assert!(host.object_exists(1));
        host.remove_object(1);
        assert!(!host.object_exists(1));
    }

    #[test]
    fn test_records_side_effects() {
        let host = MemoryHost::new();
        host.emit_protocol_line("armed", ProtocolKind::State);
        host.send_notification("disarmed", "Home");
        host.sleep(Duration::from_millis(5));
        assert_eq!(host.protocol_kinds(), vec![ProtocolKind::State]);
        assert_eq!(host.notification_templates(), vec!["disarmed".to_string()]);
        assert_eq!(host.sleeps(), vec![Duration::from_millis(5)]);

        host.clear_records();
        assert!(host.protocol().is_empty());
    }

    #[test]
    fn test_real_sleep_outside_runtime() {
        let host = MemoryHost::with_real_sleep();
        host.sleep(Duration::from_millis(5));
        assert_eq!(host.sleeps(), vec![Duration::from_millis(5)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_real_sleep_inside_multi_thread_runtime() {
        let host = MemoryHost::with_real_sleep();
        let started = std::time::Instant::now();
        host.sleep(Duration::from_millis(20));
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(host.sleeps().len(), 1);
    }
}
