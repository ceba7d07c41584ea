// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Zone actor - owns a [`Zone`] on a tokio task and serializes every operation
//!
//! Callers talk to the actor through a cloneable [`ZoneHandle`]. Commands are
//! processed one at a time, and deferred tasks (delayed activation, sensor
//! verification) fire from the same loop, so nothing ever touches the zone
//! concurrently.

use std::time::Instant;
use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use super::{ObjectId, ProtectionMode, ZoneState};
use crate::sensors::DetectorCategory;
use crate::zone::{SelectOptions, Zone, ZoneAttributes};

const COMMAND_QUEUE: usize = 64;

/// Requests accepted by the zone actor
#[derive(Debug)]
pub enum ZoneCommand {
    SelectMode {
        mode: ProtectionMode,
        sender_id: ObjectId,
        options: SelectOptions,
        reply: oneshot::Sender<bool>,
    },
    SetAlarm {
        on: bool,
        reply: oneshot::Sender<bool>,
    },
    Report {
        sensor_id: ObjectId,
        value_changed: bool,
        reply: oneshot::Sender<bool>,
    },
    SetEntryEnabled {
        category: DetectorCategory,
        sensor_id: ObjectId,
        enabled: bool,
        reply: oneshot::Sender<bool>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    State {
        reply: oneshot::Sender<ZoneState>,
    },
    Attributes {
        reply: oneshot::Sender<ZoneAttributes>,
    },
    Shutdown,
}

/// Task owning the zone
pub struct ZoneActor {
    zone: Zone,
    rx: mpsc::Receiver<ZoneCommand>,
}

impl ZoneActor {
    pub fn new(zone: Zone) -> (Self, ZoneHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        (Self { zone, rx }, ZoneHandle { tx })
    }

    /// Spawn the actor on the current runtime
    pub fn spawn(zone: Zone) -> (ZoneHandle, JoinHandle<Zone>) {
        let (actor, handle) = Self::new(zone);
        (handle, tokio::spawn(actor.run()))
    }

    /// Process commands and due tasks until shutdown. Returns the zone.
    pub async fn run(mut self) -> Zone {
        info!("Zone actor '{}' started", self.zone.name());

        loop {
            let next_due = self.zone.next_due();
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(ZoneCommand::Shutdown) | None => break,
                    Some(command) => self.handle(command),
                },
                _ = wait_until(next_due) => {
                    self.zone.run_due_tasks(Instant::now());
                }
            }
        }

        info!("Zone actor '{}' stopped", self.zone.name());
        self.zone
    }

    fn handle(&mut self, command: ZoneCommand) {
        // A dropped reply receiver only means the caller stopped waiting
        match command {
            ZoneCommand::SelectMode { mode, sender_id, options, reply } => {
                let _ = reply.send(self.zone.select_protection_mode(mode, sender_id, options));
            }
            ZoneCommand::SetAlarm { on, reply } => {
                let _ = reply.send(self.zone.set_alarm(on));
            }
            ZoneCommand::Report { sensor_id, value_changed, reply } => {
                let _ = reply.send(self.zone.report_value(sensor_id, value_changed));
            }
            ZoneCommand::SetEntryEnabled { category, sensor_id, enabled, reply } => {
                let _ = reply.send(self.zone.set_entry_enabled(category, sensor_id, enabled));
            }
            ZoneCommand::Reset { reply } => {
                self.zone.reset_values();
                let _ = reply.send(());
            }
            ZoneCommand::State { reply } => {
                let _ = reply.send(self.zone.state().clone());
            }
            ZoneCommand::Attributes { reply } => {
                let _ = reply.send(self.zone.attributes());
            }
            ZoneCommand::Shutdown => {}
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

/// Cloneable front end of a running [`ZoneActor`]
#[derive(Debug, Clone)]
pub struct ZoneHandle {
    tx: mpsc::Sender<ZoneCommand>,
}

impl ZoneHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> ZoneCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| anyhow!("zone actor stopped"))?;
        rx.await.map_err(|_| anyhow!("zone actor dropped the request"))
    }

    pub async fn select_protection_mode(
        &self,
        mode: ProtectionMode,
        sender_id: ObjectId,
        options: SelectOptions,
    ) -> Result<bool> {
        self.request(|reply| ZoneCommand::SelectMode { mode, sender_id, options, reply }).await
    }

    pub async fn set_alarm(&self, on: bool) -> Result<bool> {
        self.request(|reply| ZoneCommand::SetAlarm { on, reply }).await
    }

    /// Forward a value report of `sensor_id`; true if it raised an alarm
    pub async fn report(&self, sensor_id: ObjectId, value_changed: bool) -> Result<bool> {
        self.request(|reply| ZoneCommand::Report { sensor_id, value_changed, reply }).await
    }

    pub async fn set_entry_enabled(
        &self,
        category: DetectorCategory,
        sensor_id: ObjectId,
        enabled: bool,
    ) -> Result<bool> {
        self.request(|reply| ZoneCommand::SetEntryEnabled { category, sensor_id, enabled, reply })
            .await
    }

    pub async fn reset_values(&self) -> Result<()> {
        self.request(|reply| ZoneCommand::Reset { reply }).await
    }

    pub async fn state(&self) -> Result<ZoneState> {
        self.request(|reply| ZoneCommand::State { reply }).await
    }

    pub async fn attributes(&self) -> Result<ZoneAttributes> {
        self.request(|reply| ZoneCommand::Attributes { reply }).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(ZoneCommand::Shutdown)
            .await
            .map_err(|_| anyhow!("zone actor stopped"))
    }
}
