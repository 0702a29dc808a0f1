//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and scenario replay.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: hallow_core::ConfigError,
    },

    /// A scenario site could not be consecrated.
    #[error("world error: {source}")]
    World {
        /// The underlying registry error.
        #[from]
        source: hallow_world::WorldError,
    },

    /// The prayer pipeline could not be assembled.
    #[error("pipeline error: {source}")]
    Pipeline {
        /// The underlying pipeline error.
        #[from]
        source: hallow_core::PipelineError,
    },

    /// The scenario file is unreadable or refers to unknown names.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the scenario problem.
        message: String,
    },
}

impl EngineError {
    /// A scenario error with the given description.
    pub fn scenario(message: impl Into<String>) -> Self {
        Self::Scenario {
            message: message.into(),
        }
    }
}
