// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/alarmzone-rs

//! Alarmzone - Alarm Zone State Machine and Sensor Alert Engine
//!
//! Headless runner: loads the configuration, starts the zone actor and,
//! in demo mode, a simulator that opens and closes sensors at random.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use alarmzone::{
    Config, LogSink, MemoryHost, ProtectionMode, SelectOptions, SensorSimulator, Zone, ZoneActor,
    ZoneEventKind, VERSION,
};

/// Alarmzone - Alarm Zone State Machine and Sensor Alert Engine
#[derive(Parser, Debug)]
#[command(name = "alarmzone")]
#[command(author = "bad-antics")]
#[command(version = VERSION)]
#[command(about = "Alarm zone state machine with sensor alert evaluation")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Demo mode with simulated sensors
    #[arg(long)]
    demo: bool,

    /// Protection mode selected at startup (full, hull, partial)
    #[arg(long)]
    arm: Option<ProtectionMode>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Alarmzone v{} - Alarm Zone State Machine", VERSION);

    // Load or create configuration
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_create(&config_path)?;

    // Override with command line args
    if args.demo {
        config.demo_mode = true;
    }

    info!("Configuration loaded from {:?}", config_path);
    info!("Demo mode: {}", config.demo_mode);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_headless(config, args.arm))
}

/// Run the zone until Ctrl+C
async fn run_headless(config: Config, arm: Option<ProtectionMode>) -> Result<()> {
    let mut registry = config.build_registry();
    if registry.is_empty() && config.demo_mode {
        info!("No sensors configured, using the demo house");
        registry = SensorSimulator::demo_registry()?;
    }

    let host = Arc::new(MemoryHost::with_real_sleep());
    let sink = Arc::new(LogSink::new(&config.zone.name));
    let sensors = SensorSimulator::sensors_of(&registry);

    let zone = Zone::new(config.zone.clone(), registry, host.clone(), sink);
    let bus = zone.event_bus();
    let (handle, actor) = ZoneActor::spawn(zone);
    info!("Zone actor initialized");

    // Log every published field change
    let mut events = bus.subscribe();
    let event_log = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match &event.kind {
                ZoneEventKind::AlarmStateChanged { .. } => warn!("[{}] {:?}", event.zone, event.kind),
                _ => info!("[{}] {:?}", event.zone, event.kind),
            }
        }
    });

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let simulator = if config.demo_mode {
        let simulator = SensorSimulator::new(host.clone(), sensors);
        simulator.reset();
        Some(tokio::spawn(simulator.run(handle.clone(), shutdown_tx.subscribe())))
    } else {
        None
    };

    if let Some(mode) = arm {
        let accepted = handle
            .select_protection_mode(mode, 0, SelectOptions::default())
            .await?;
        info!("Startup selection of {}: {}", mode.label(), if accepted { "accepted" } else { "rejected" });
    }

    info!("Alarmzone running in headless mode");
    info!("   Press Ctrl+C to shutdown");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received, cleaning up...");

    // Ignore send errors: the simulator may already be gone
    let _ = shutdown_tx.send(());
    if let Some(simulator) = simulator {
        if let Err(e) = simulator.await? {
            warn!("Simulator ended with error: {}", e);
        }
    }

    handle.shutdown().await?;
    let zone = actor.await?;
    event_log.abort();

    info!(
        "Final state of '{}': {} / {:?}",
        zone.name(),
        zone.state().mode.label(),
        zone.state().arm_state
    );
    info!("Alarmzone shutdown complete");

    Ok(())
}
