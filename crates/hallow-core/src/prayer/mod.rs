//! Prayer at an altar: the context, the step pipeline, the standard steps,
//! and the handler that drives them from altar-use events.

pub mod context;
pub mod handler;
pub mod pipeline;
pub mod steps;

pub use context::PrayerContext;
pub use handler::AltarPrayerHandler;
pub use pipeline::{
    PipelineError, PrayerPipeline, PrayerStep, StepError, StepFlow, UNEXPECTED_FAILURE,
};
