// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! One-shot task scheduler for deferred zone work
//!
//! Tasks are keyed by name. Scheduling a name that is already queued
//! replaces the earlier task, and cancelling a name drops it. The owner
//! polls [`Scheduler::take_due`] with the current instant; nothing runs on
//! its own.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

use super::ObjectId;
use crate::sensors::DetectorCategory;

/// Deferred work items a zone can schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneTask {
    /// Completion of a delayed activation
    StartActivation,
    /// Re-check of a detector after its verification delay
    Verify {
        category: DetectorCategory,
        sensor_id: ObjectId,
    },
}

struct ScheduledTask {
    due: Instant,
    seq: u64,
    task: ZoneTask,
}

pub struct Scheduler {
    tasks: HashMap<String, ScheduledTask>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            seq: 0,
        }
    }

    pub fn schedule(&mut self, name: &str, now: Instant, delay: Duration, task: ZoneTask) {
        self.seq += 1;
        let replaced = self
            .tasks
            .insert(
                name.to_string(),
                ScheduledTask {
                    due: now + delay,
                    seq: self.seq,
                    task,
                },
            )
            .is_some();
        debug!("Scheduled task '{}' in {:?} (replaced: {})", name, delay, replaced);
    }

    pub fn cancel(&mut self, name: &str) -> bool {
        let removed = self.tasks.remove(name).is_some();
        if removed {
            debug!("Cancelled task '{}'", name);
        }
        removed
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Earliest due instant, if any task is queued
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.values().map(|t| t.due).min()
    }

    /// Remove and return every task due at `now`, oldest deadline first
    pub fn take_due(&mut self, now: Instant) -> Vec<ZoneTask> {
        let due_names: Vec<String> = self
            .tasks
            .iter()
            .filter(|(_, t)| t.due <= now)
            .map(|(name, _)| name.clone())
            .collect();

        let mut due: Vec<ScheduledTask> = due_names
            .iter()
            .filter_map(|name| self.tasks.remove(name))
            .collect();
        due.sort_by_key(|t| (t.due, t.seq));
        due.into_iter().map(|t| t.task).collect()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify(sensor_id: ObjectId) -> ZoneTask {
        ZoneTask::Verify {
            category: DetectorCategory::Water,
            sensor_id,
        }
    }

    #[test]
    fn test_take_due_orders_by_deadline() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();
        scheduler.schedule("b", now, Duration::from_millis(200), verify(2));
        scheduler.schedule("a", now, Duration::from_millis(100), verify(1));
        scheduler.schedule("c", now, Duration::from_secs(10), ZoneTask::StartActivation);

        assert_eq!(scheduler.next_due(), Some(now + Duration::from_millis(100)));
        assert!(scheduler.take_due(now).is_empty());

        let due = scheduler.take_due(now + Duration::from_millis(250));
        assert_eq!(due, vec![verify(1), verify(2)]);
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_reschedule_replaces_and_cancel_removes() {
        let mut scheduler = Scheduler::new();
        let now = Instant::now();
        scheduler.schedule("activation", now, Duration::from_secs(1), ZoneTask::StartActivation);
        scheduler.schedule("activation", now, Duration::from_secs(5), ZoneTask::StartActivation);
        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.take_due(now + Duration::from_secs(2)).is_empty());

        assert!(scheduler.cancel("activation"));
        assert!(!scheduler.cancel("activation"));
        assert_eq!(scheduler.len(), 0);
        assert_eq!(scheduler.next_due(), None);
    }
}
