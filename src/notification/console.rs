// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Sink that writes every side effect to the tracing log

use tracing::{info, warn};

use super::{ActionRef, NotificationSink, ProtocolKind};

/// Logs protocol lines, notifications and actions; used by the headless runner
pub struct LogSink {
    zone: String,
}

impl LogSink {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: zone.to_string(),
        }
    }
}

impl NotificationSink for LogSink {
    fn emit_protocol_line(&self, text: &str, kind: ProtocolKind) {
        match kind {
            ProtocolKind::Alarm => warn!("[{}] ALARM: {}", self.zone, text),
            ProtocolKind::State => info!("[{}] state: {}", self.zone, text),
            ProtocolKind::Event => info!("[{}] event: {}", self.zone, text),
        }
    }

    fn send_notification(&self, template: &str, arg: &str) {
        info!("[{}] notification '{}' ({})", self.zone, template, arg);
    }

    fn run_action(&self, action: &ActionRef, params: serde_json::Value) {
        info!("[{}] action {} '{}' {}", self.zone, action.id, action.name, params);
    }
}
