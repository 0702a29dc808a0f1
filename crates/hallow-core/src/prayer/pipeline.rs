//! Ordered prayer steps with uniform failure handling.
//!
//! A [`PrayerPipeline`] runs its [`PrayerStep`]s in registration order over a
//! shared [`PrayerContext`]. A step ends the run by returning
//! [`StepFlow::Stop`] (usually via [`PrayerContext::fail`] or
//! [`PrayerContext::succeed`]). A step error is caught here, exactly once per
//! run: the prayer is marked failed and finished, the error is logged, and no
//! later step runs. Errors never escape [`PrayerPipeline::execute`].

use std::collections::BTreeSet;
use std::fmt;

use hallow_rites::Catalog;
use hallow_types::{PrayerStage, SiteId};
use tracing::{debug, error};

use crate::config::PrayerConfig;
use crate::host::{HostError, HostServices};
use crate::prayer::context::PrayerContext;
use crate::prayer::steps;

/// Player-facing text for a prayer ended by a step error. The error itself
/// only goes to the log.
pub const UNEXPECTED_FAILURE: &str = "Something went wrong while praying. Please try again later.";

/// What the pipeline does after a step returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepFlow {
    /// Run the next step.
    Continue,
    /// End the run.
    Stop,
}

/// An unexpected failure inside a step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// A host service call failed.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The site resolved earlier in this prayer is no longer registered.
    #[error("holy site {0} vanished mid-prayer")]
    SiteVanished(SiteId),

    /// A step ran before the step that provides its input.
    #[error("step {step} ran without {missing}")]
    MissingPrerequisite {
        /// The step that could not run.
        step: &'static str,
        /// What it needed.
        missing: &'static str,
    },
}

/// Errors constructing a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Two steps share a name.
    #[error("prayer step {0} registered twice")]
    DuplicateStep(&'static str),
}

/// One unit of prayer processing.
pub trait PrayerStep {
    /// Stable step name, used in logs.
    fn name(&self) -> &'static str;

    /// Run the step against the context.
    fn run(
        &self,
        ctx: &mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> Result<StepFlow, StepError>;
}

/// An ordered, immutable list of prayer steps.
pub struct PrayerPipeline {
    steps: Vec<Box<dyn PrayerStep>>,
}

impl PrayerPipeline {
    /// Build a pipeline from steps in execution order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateStep`] if two steps share a name.
    pub fn new(steps: Vec<Box<dyn PrayerStep>>) -> Result<Self, PipelineError> {
        let mut names = BTreeSet::new();
        for step in &steps {
            if !names.insert(step.name()) {
                return Err(PipelineError::DuplicateStep(step.name()));
            }
        }
        Ok(Self { steps })
    }

    /// The standard prayer: resolve site, verify membership, check cooldown,
    /// evaluate the offering, attempt the ritual, apply rewards, play effects.
    pub fn standard(catalog: &Catalog, config: &PrayerConfig) -> Result<Self, PipelineError> {
        Self::new(steps::standard_steps(catalog, config))
    }

    /// Step names in execution order.
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order over `ctx` and hand the same context back.
    pub fn execute<'c>(
        &self,
        ctx: &'c mut PrayerContext,
        host: &mut HostServices<'_>,
    ) -> &'c mut PrayerContext {
        for step in &self.steps {
            if ctx.completed {
                break;
            }
            debug!(step = step.name(), player = %ctx.player.id, "Running prayer step");
            match step.run(ctx, host) {
                Ok(StepFlow::Continue) => {}
                Ok(StepFlow::Stop) => break,
                Err(err) => {
                    error!(
                        step = step.name(),
                        player = %ctx.player.id,
                        altar = %ctx.altar,
                        error = %err,
                        "Prayer step failed"
                    );
                    ctx.success = false;
                    ctx.completed = true;
                    ctx.stage = PrayerStage::Completed;
                    ctx.message = String::from(UNEXPECTED_FAILURE);
                    break;
                }
            }
        }
        ctx
    }
}

impl fmt::Debug for PrayerPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrayerPipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use hallow_types::{BlockPos, PlayerId, PlayerRef};
    use hallow_world::SiteRegistry;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::local::LocalHost;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    enum Behavior {
        Continue,
        Succeed,
        Fail,
        Error,
    }

    struct Recording {
        name: &'static str,
        behavior: Behavior,
        log: Log,
    }

    impl PrayerStep for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn run(
            &self,
            ctx: &mut PrayerContext,
            _host: &mut HostServices<'_>,
        ) -> Result<StepFlow, StepError> {
            self.log.borrow_mut().push(self.name);
            match self.behavior {
                Behavior::Continue => Ok(StepFlow::Continue),
                Behavior::Succeed => Ok(ctx.succeed("done")),
                Behavior::Fail => Ok(ctx.fail("refused")),
                Behavior::Error => Err(StepError::Host(HostError::Unavailable {
                    message: String::from("ledger offline"),
                })),
            }
        }
    }

    /// Counts error-level events.
    #[derive(Clone, Default)]
    struct ErrorCount(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for ErrorCount {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn step(name: &'static str, behavior: Behavior, log: &Log) -> Box<dyn PrayerStep> {
        Box::new(Recording {
            name,
            behavior,
            log: Rc::clone(log),
        })
    }

    fn ctx() -> PrayerContext {
        PrayerContext::new(
            PlayerRef {
                id: PlayerId::new(),
                name: String::from("Aldric"),
            },
            BlockPos::new(0, 64, 0),
            None,
            0.0,
        )
    }

    fn run(pipeline: &PrayerPipeline, ctx: &mut PrayerContext) {
        let mut host = LocalHost::new();
        let mut sites = SiteRegistry::new();
        let (mut services, _, _) = host.parts(&mut sites);
        pipeline.execute(ctx, &mut services);
    }

    #[test]
    fn runs_every_step_once_in_order() {
        let log = Log::default();
        let pipeline = PrayerPipeline::new(vec![
            step("a", Behavior::Continue, &log),
            step("b", Behavior::Continue, &log),
            step("c", Behavior::Continue, &log),
        ])
        .unwrap();
        let mut c = ctx();
        run(&pipeline, &mut c);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert!(!c.completed);
    }

    #[test]
    fn completion_stops_later_steps() {
        let log = Log::default();
        let pipeline = PrayerPipeline::new(vec![
            step("a", Behavior::Continue, &log),
            step("b", Behavior::Succeed, &log),
            step("c", Behavior::Continue, &log),
        ])
        .unwrap();
        let mut c = ctx();
        run(&pipeline, &mut c);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert!(c.success && c.completed);
    }

    #[test]
    fn failure_stops_later_steps() {
        let log = Log::default();
        let pipeline = PrayerPipeline::new(vec![
            step("a", Behavior::Fail, &log),
            step("b", Behavior::Continue, &log),
        ])
        .unwrap();
        let mut c = ctx();
        run(&pipeline, &mut c);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert!(!c.success && c.completed);
        assert_eq!(c.message, "refused");
    }

    #[test]
    fn step_error_is_caught_and_marks_failure() {
        let log = Log::default();
        let pipeline = PrayerPipeline::new(vec![
            step("a", Behavior::Continue, &log),
            step("b", Behavior::Error, &log),
            step("c", Behavior::Continue, &log),
        ])
        .unwrap();
        let errors = ErrorCount::default();
        let subscriber = tracing_subscriber::registry().with(errors.clone());

        let mut c = ctx();
        tracing::subscriber::with_default(subscriber, || run(&pipeline, &mut c));

        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert!(!c.success);
        assert!(c.completed);
        assert_eq!(c.stage, PrayerStage::Completed);
        assert_eq!(errors.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn step_error_detail_stays_out_of_player_message() {
        let log = Log::default();
        let pipeline = PrayerPipeline::new(vec![step("b", Behavior::Error, &log)]).unwrap();
        let mut c = ctx();
        run(&pipeline, &mut c);
        assert_eq!(c.message, UNEXPECTED_FAILURE);
        assert!(!c.message.contains("ledger offline"));
    }

    #[test]
    fn already_completed_context_runs_nothing() {
        let log = Log::default();
        let pipeline = PrayerPipeline::new(vec![step("a", Behavior::Continue, &log)]).unwrap();
        let mut c = ctx();
        c.completed = true;
        run(&pipeline, &mut c);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn empty_pipeline_leaves_context_unchanged() {
        let pipeline = PrayerPipeline::new(Vec::new()).unwrap();
        assert!(pipeline.is_empty());
        let before = ctx();
        let mut after = before.clone();
        run(&pipeline, &mut after);
        assert_eq!(before, after);
    }

    #[test]
    fn duplicate_step_names_are_rejected() {
        let log = Log::default();
        let err = PrayerPipeline::new(vec![
            step("a", Behavior::Continue, &log),
            step("a", Behavior::Continue, &log),
        ])
        .unwrap_err();
        assert_eq!(err, PipelineError::DuplicateStep("a"));
    }

    #[test]
    fn standard_pipeline_step_order() {
        let pipeline =
            PrayerPipeline::standard(&Catalog::default(), &PrayerConfig::default()).unwrap();
        assert_eq!(
            pipeline.step_names(),
            vec![
                "resolve-site",
                "verify-membership",
                "check-cooldown",
                "evaluate-offering",
                "attempt-ritual",
                "apply-rewards",
                "play-effects",
            ]
        );
    }
}
