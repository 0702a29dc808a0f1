//! Prayer, ritual, and area-presence engine for Hallow holy sites.
//!
//! This crate wires the rules in `hallow-rites` and the site store in
//! `hallow-world` to a host game through the traits in [`host`].
//!
//! # Modules
//!
//! - [`config`] -- `hallow-config.yaml` loading ([`HallowConfig`])
//! - [`destruction`] -- [`AltarDestructionHandler`]: deconsecrate on altar break
//! - [`events`] -- [`SiteAreaEvent`] and the synchronous [`EventBus`]
//! - [`host`] -- Host service traits and consumed event payloads
//! - [`local`] -- [`LocalHost`], in-memory host services
//! - [`prayer`] -- [`PrayerPipeline`], the standard steps, and
//!   [`AltarPrayerHandler`]
//! - [`subsystem`] -- [`HolySiteSubsystem`], the single event entry point
//! - [`tracker`] -- [`HolySiteAreaTracker`]: enter/exit detection

pub mod config;
pub mod destruction;
pub mod events;
pub mod host;
pub mod local;
pub mod prayer;
pub mod subsystem;
pub mod tracker;

pub use config::{
    ConfigError, HallowConfig, LoggingConfig, PrayerConfig, SitesConfig, TrackerConfig,
};
pub use destruction::{AltarDestructionHandler, DestructionOutcome};
pub use events::{EventBus, SiteAreaEvent};
pub use host::{AltarBroken, AltarUsed, HostError, HostServices};
pub use local::LocalHost;
pub use prayer::{
    AltarPrayerHandler, PipelineError, PrayerContext, PrayerPipeline, PrayerStep, StepError,
    StepFlow, UNEXPECTED_FAILURE,
};
pub use subsystem::{Dispatched, HolySiteSubsystem, HostEvent};
pub use tracker::{HolySiteAreaTracker, SiteTransition, transition};
