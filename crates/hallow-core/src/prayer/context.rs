//! Mutable state threaded through one prayer.

use hallow_rites::RitualAttemptResult;
use hallow_types::{
    BlockPos, HeldItem, HolySite, Offering, PlayerRef, PrayerStage, Religion, SiteId,
};

use crate::prayer::pipeline::StepFlow;

/// Everything one prayer reads, decides, and reports.
///
/// Inputs are set by [`AltarPrayerHandler`](crate::prayer::AltarPrayerHandler)
/// before the pipeline runs; intermediates are filled in by the steps that own
/// them; outputs are read back once the pipeline returns.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerContext {
    // Inputs
    /// The praying player.
    pub player: PlayerRef,
    /// Position of the altar used.
    pub altar: BlockPos,
    /// What the player held when praying, if anything.
    pub held_item: Option<HeldItem>,
    /// World time (total hours) of the prayer.
    pub world_hours: f64,
    /// World time of this player's previous successful prayer.
    pub last_prayer_hours: Option<f64>,

    // Intermediates
    /// How far the prayer got.
    pub stage: PrayerStage,
    /// The site owning the altar.
    pub site_id: Option<SiteId>,
    /// The player's religion, once verified against the site.
    pub religion: Option<Religion>,
    /// The accepted offering, when the held item was one.
    pub offering: Option<Offering>,
    /// Outcome of the ritual contribution, when one was attempted.
    pub ritual: Option<RitualAttemptResult>,
    /// Copy of the site with the ritual contribution applied. Written back to
    /// the site directory only once rewards have been granted.
    pub staged_site: Option<HolySite>,
    /// Whether the held item was taken from the player.
    pub offering_consumed: bool,

    // Outputs
    /// Whether the prayer succeeded.
    pub success: bool,
    /// Whether a step declared the prayer finished.
    pub completed: bool,
    /// Player-facing result text.
    pub message: String,
    /// Total favor granted to the player.
    pub favor_awarded: u32,
    /// Total prestige granted to the religion.
    pub prestige_awarded: u32,
}

impl PrayerContext {
    /// A fresh context for `player` praying at `altar`.
    pub const fn new(
        player: PlayerRef,
        altar: BlockPos,
        held_item: Option<HeldItem>,
        world_hours: f64,
    ) -> Self {
        Self {
            player,
            altar,
            held_item,
            world_hours,
            last_prayer_hours: None,
            stage: PrayerStage::Started,
            site_id: None,
            religion: None,
            offering: None,
            ritual: None,
            staged_site: None,
            offering_consumed: false,
            success: false,
            completed: false,
            message: String::new(),
            favor_awarded: 0,
            prestige_awarded: 0,
        }
    }

    /// End the prayer as a failure with `message`.
    pub fn fail(&mut self, message: impl Into<String>) -> StepFlow {
        self.success = false;
        self.finish(message)
    }

    /// End the prayer as a success with `message`.
    pub fn succeed(&mut self, message: impl Into<String>) -> StepFlow {
        self.success = true;
        self.finish(message)
    }

    fn finish(&mut self, message: impl Into<String>) -> StepFlow {
        self.completed = true;
        self.stage = PrayerStage::Completed;
        self.message = message.into();
        StepFlow::Stop
    }
}
