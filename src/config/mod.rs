// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Configuration module

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::{AlarmOptions, ProtectionMode};
use crate::notification::ActionRef;
use crate::sensors::{DetectorCategory, SensorEntryRecord, SensorRegistry};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log level
    pub log_level: String,

    /// Enable demo mode (simulated sensor changes)
    pub demo_mode: bool,

    /// Zone settings
    pub zone: ZoneSettings,

    /// Sensor entries per detector category
    #[serde(default)]
    pub sensors: SensorLists,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Alarmzone".to_string(),
            log_level: "info".to_string(),
            demo_mode: false,
            zone: ZoneSettings::default(),
            sensors: SensorLists::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("alarmzone"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Build the sensor registry. Unusable records are logged and skipped.
    pub fn build_registry(&self) -> SensorRegistry {
        let mut registry = SensorRegistry::new();
        for category in DetectorCategory::ALL {
            registry.load(category, self.sensors.records(category));
        }
        registry
    }
}

/// Per protection mode settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModeSettings {
    /// Mode may be selected
    #[serde(default)]
    pub enabled: bool,

    /// After selecting the mode, notify about every open door/window
    #[serde(default)]
    pub use_open_sensor_notice: bool,

    /// Action run when the mode becomes active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionRef>,
}

/// Behaviour of the manual alarm switch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmSwitchSettings {
    /// Switching the alarm off disarms the zone
    pub disarm_on_switch_off: bool,

    /// Options switched on together with the alarm switch
    pub options_on_switch_on: AlarmOptions,

    /// Label shown as alerting sensor for a manual alarm
    pub designation: String,
}

impl Default for AlarmSwitchSettings {
    fn default() -> Self {
        Self {
            disarm_on_switch_off: true,
            options_on_switch_on: AlarmOptions {
                siren: true,
                light: true,
                call: false,
                panic: true,
            },
            designation: "Panic alarm".to_string(),
        }
    }
}

/// Zone configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    /// Zone designation used in protocol lines and notifications
    pub name: String,

    /// Delay before an armed mode becomes active, in seconds
    pub activation_delay_secs: u64,

    /// Pause before the open door/window notice, in milliseconds
    pub settle_delay_ms: u64,

    pub full_protection: ModeSettings,
    pub hull_protection: ModeSettings,
    pub partial_protection: ModeSettings,

    pub alarm_switch: AlarmSwitchSettings,

    /// Played on successful (de)activation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgement_tone: Option<ActionRef>,

    /// Action run when the zone is disarmed or an activation is aborted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disarmed_action: Option<ActionRef>,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            name: "Alarm zone".to_string(),
            full_protection: ModeSettings {
                enabled: true,
                ..Default::default()
            },
            hull_protection: ModeSettings {
                enabled: true,
                ..Default::default()
            },
            partial_protection: ModeSettings {
                enabled: true,
                ..Default::default()
            },
            activation_delay_secs: 0,
            settle_delay_ms: 500,
            alarm_switch: AlarmSwitchSettings::default(),
            acknowledgement_tone: None,
            disarmed_action: None,
        }
    }
}

impl ZoneSettings {
    /// Settings of an armed mode; `None` for Disarmed
    pub fn mode(&self, mode: ProtectionMode) -> Option<&ModeSettings> {
        match mode {
            ProtectionMode::Disarmed => None,
            ProtectionMode::FullProtection => Some(&self.full_protection),
            ProtectionMode::HullProtection => Some(&self.hull_protection),
            ProtectionMode::PartialProtection => Some(&self.partial_protection),
        }
    }
}

/// Raw sensor records per category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorLists {
    #[serde(default)]
    pub door_window: Vec<SensorEntryRecord>,
    #[serde(default)]
    pub motion: Vec<SensorEntryRecord>,
    #[serde(default)]
    pub glass_breakage: Vec<SensorEntryRecord>,
    #[serde(default)]
    pub water: Vec<SensorEntryRecord>,
}

impl SensorLists {
    pub fn records(&self, category: DetectorCategory) -> &[SensorEntryRecord] {
        match category {
            DetectorCategory::DoorWindow => &self.door_window,
            DetectorCategory::Motion => &self.motion,
            DetectorCategory::GlassBreakage => &self.glass_breakage,
            DetectorCategory::Water => &self.water,
        }
    }
}
