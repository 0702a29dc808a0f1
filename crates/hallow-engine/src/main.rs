//! Scenario runner for the Hallow holy-site engine.
//!
//! Replays a scripted pilgrimage (players moving between holy sites,
//! praying with offerings, breaking altars) against an in-memory host and
//! logs every message, area crossing, and the final state of each site.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `HALLOW_CONFIG` (default `hallow-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Validate the offering and ritual catalog
//! 4. Load the scenario from `HALLOW_SCENARIO` (default `scenarios/pilgrimage.yaml`)
//! 5. Build the world and the holy-site subsystem
//! 6. Replay the scenario steps
//! 7. Log the summary and shut down

mod error;
mod replay;
mod scenario;

use std::path::{Path, PathBuf};

use hallow_core::{HallowConfig, LoggingConfig};
use hallow_rites::Catalog;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::replay::Replay;
use crate::scenario::Scenario;

const CONFIG_ENV: &str = "HALLOW_CONFIG";
const SCENARIO_ENV: &str = "HALLOW_SCENARIO";
const DEFAULT_CONFIG: &str = "hallow-config.yaml";
const DEFAULT_SCENARIO: &str = "scenarios/pilgrimage.yaml";

/// Application entry point for the scenario runner.
///
/// # Errors
///
/// Returns an error if configuration, the scenario, or the world fails to
/// load. Problems during replay are logged, not returned.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("hallow-engine starting");
    if !config_found {
        info!("Config file not found, using defaults");
    }
    info!(
        base_favor = config.prayer.base_favor,
        cooldown_hours = config.prayer.cooldown_hours,
        scan_interval_ms = config.tracker.scan_interval_ms,
        max_tier = config.tiers.max_tier,
        "Configuration loaded"
    );

    // 3. Validate the catalog.
    let load = Catalog::load(&config.catalog, config.tiers);
    if !load.issues.is_empty() {
        warn!(
            issues = load.issues.len(),
            "Catalog loaded with problems; affected domains have empty tables"
        );
    }

    // 4. Load the scenario.
    let scenario_path = env_path(SCENARIO_ENV, DEFAULT_SCENARIO);
    let scenario = Scenario::from_file(&scenario_path)?;
    info!(
        path = %scenario_path.display(),
        religions = scenario.religions.len(),
        players = scenario.players.len(),
        sites = scenario.sites.len(),
        steps = scenario.steps.len(),
        "Scenario loaded"
    );

    // 5. Build the world.
    let mut replay = Replay::build(&config, &load.catalog, &scenario)?;

    // 6. Replay.
    let summary = replay.run(&scenario.steps)?;

    // 7. Summarize and shut down.
    replay.finish(&summary);
    info!("hallow-engine shutdown complete");

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Load the configuration, falling back to defaults when the file is
/// missing. The flag reports whether a file was read.
fn load_config() -> Result<(HallowConfig, bool), EngineError> {
    let path = env_path(CONFIG_ENV, DEFAULT_CONFIG);
    if path.exists() {
        Ok((HallowConfig::from_file(&path)?, true))
    } else {
        let mut config = HallowConfig::default();
        config.logging.apply_env_overrides();
        Ok((config, false))
    }
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var).map_or_else(|| Path::new(default).to_path_buf(), PathBuf::from)
}
