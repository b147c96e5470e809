//! Round state machine for the minigame automation.
//!
//! The driver sequences capture, classification, and reaction through an
//! explicit state enum advanced by `step()`. Each poll-loop boundary
//! checks the abort flag; an interruption during a sleep takes effect at
//! the next tick, never mid-action.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info};

use crate::capture::RegionSampler;
use crate::config::BotConfig;
use crate::driver::runner::StopRule;
use crate::driver::sensors::Perception;
use crate::input::backend::InputDriver;
use crate::input::dispatcher::ActionDispatcher;

/// Driver phases. Exactly one instance exists, owned by the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    /// Initial startup delay (alt-tab grace period)
    Entering,
    /// Checking whether the player is inside the trigger zone
    CheckZone,
    /// Pressing the walk-back key until back inside the zone
    WalkingBack,
    /// Detecting and reacting to one pattern
    Playing,
    /// Waiting for the completion marker to cycle present then absent
    AwaitMarkerCycle,
    /// Claiming the end-of-session rewards
    Rewards,
    /// Bookkeeping and stop-rule check between rounds
    RoundDone,
    /// Finished; no further transitions
    Terminal,
}

impl std::fmt::Display for BotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotState::Entering => write!(f, "Entering"),
            BotState::CheckZone => write!(f, "Checking trigger zone"),
            BotState::WalkingBack => write!(f, "Walking back"),
            BotState::Playing => write!(f, "Playing"),
            BotState::AwaitMarkerCycle => write!(f, "Waiting for marker cycle"),
            BotState::Rewards => write!(f, "Claiming rewards"),
            BotState::RoundDone => write!(f, "Round done"),
            BotState::Terminal => write!(f, "Terminal"),
        }
    }
}

/// Outcome of waiting for a marker cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerWait {
    /// The marker appeared and disappeared; a new pattern is ready.
    Completed,
    /// The rewards screen appeared during the wait.
    RewardsInterrupted,
    /// The user requested a stop.
    Aborted,
}

/// Session counters, mutated only by the driver and reported at the end.
pub struct SessionStats {
    pub rounds_completed: u32,
    pub total_patterns: u32,
    /// Patterns reacted to in the round currently in progress
    pub round_patterns: u32,
    started: Instant,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            rounds_completed: 0,
            total_patterns: 0,
            round_patterns: 0,
            started: Instant::now(),
        }
    }

    fn record_pattern(&mut self) {
        self.round_patterns += 1;
    }

    fn end_round(&mut self) {
        self.total_patterns += self.round_patterns;
        self.round_patterns = 0;
        self.rounds_completed += 1;
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs the aggregate session report.
    pub fn log_report(&self) {
        let elapsed = self.elapsed().as_secs_f32();
        info!("=== session complete ===");
        info!("rounds completed: {}", self.rounds_completed);
        info!("total patterns:   {}", self.total_patterns);
        info!("total time:       {elapsed:.1}s");
        if self.rounds_completed > 0 {
            info!(
                "average per round: {:.1}s",
                elapsed / self.rounds_completed as f32
            );
        }
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Automation context holding the state machine and its collaborators.
pub struct BotContext<S, I> {
    pub state: BotState,
    pub config: BotConfig,
    pub perception: Perception<S>,
    pub dispatcher: ActionDispatcher<I>,
    pub stats: SessionStats,
    stop: StopRule,
    abort: Arc<AtomicBool>,
}

impl<S: RegionSampler, I: InputDriver> BotContext<S, I> {
    pub fn new(
        config: BotConfig,
        sampler: S,
        input: I,
        stop: StopRule,
        abort: Arc<AtomicBool>,
    ) -> Self {
        Self {
            state: BotState::Entering,
            config,
            perception: Perception::new(sampler),
            dispatcher: ActionDispatcher::new(input),
            stats: SessionStats::new(),
            stop,
            abort,
        }
    }

    fn abort_requested(&self) -> bool {
        self.abort.load(Ordering::SeqCst)
    }

    fn poll_sleep(&self) {
        std::thread::sleep(Duration::from_millis(self.config.timing.poll_interval_ms));
    }

    /// Advances the state machine by one step.
    ///
    /// Returns `Ok(true)` while the run should continue, `Ok(false)` once
    /// the terminal state is reached. Capture and input errors propagate;
    /// this tool is operator-supervised, so a dead backend ends the run.
    pub fn step(&mut self) -> Result<bool> {
        if self.abort_requested() {
            info!("stop requested, ending session");
            self.state = BotState::Terminal;
            return Ok(false);
        }

        match self.state {
            BotState::Entering => {
                info!(
                    "starting in {:.1}s, switch to the game window",
                    self.config.timing.startup_delay_ms as f32 / 1000.0
                );
                std::thread::sleep(Duration::from_millis(self.config.timing.startup_delay_ms));
                self.state = BotState::CheckZone;
                Ok(true)
            }

            BotState::CheckZone => {
                if self.perception.outside_zone(&self.config)? {
                    info!("outside trigger zone, walking back");
                    self.state = BotState::WalkingBack;
                } else {
                    self.state = BotState::Playing;
                }
                Ok(true)
            }

            BotState::WalkingBack => {
                while self.perception.outside_zone(&self.config)? {
                    if self.abort_requested() {
                        self.state = BotState::Terminal;
                        return Ok(false);
                    }
                    self.dispatcher.walk_backward(&self.config)?;
                    std::thread::sleep(Duration::from_millis(self.config.timing.walk_cadence_ms));
                }
                info!("inside trigger zone");
                self.state = BotState::Playing;
                Ok(true)
            }

            BotState::Playing => {
                if self.stop.time_expired(self.stats.elapsed()) {
                    info!("time limit reached");
                    self.state = BotState::Terminal;
                    return Ok(false);
                }

                // Rewards can appear between any two patterns, and must
                // never be mistaken for an unreadable pattern, so this
                // check comes before sampling the pattern region.
                if self.perception.rewards_visible(&self.config)? {
                    self.state = BotState::Rewards;
                    return Ok(true);
                }

                let (elements, raw) = self.perception.read_pattern(&self.config)?;
                debug!("pixel counts: {}", raw.summary());
                info!(
                    "pattern {}: reacting to {:?}",
                    self.stats.round_patterns + 1,
                    elements.names()
                );
                self.dispatcher.react(&elements, &self.config)?;
                self.stats.record_pattern();

                self.state = BotState::AwaitMarkerCycle;
                Ok(true)
            }

            BotState::AwaitMarkerCycle => {
                match self.wait_for_marker_cycle()? {
                    MarkerWait::Completed => self.state = BotState::Playing,
                    MarkerWait::RewardsInterrupted => {
                        info!("rewards screen appeared during marker wait");
                        self.state = BotState::Rewards;
                    }
                    MarkerWait::Aborted => {
                        self.state = BotState::Terminal;
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            BotState::Rewards => {
                info!(
                    "claiming rewards after {} patterns",
                    self.stats.round_patterns
                );
                self.dispatcher.claim_rewards(&self.config)?;
                self.state = BotState::RoundDone;
                Ok(true)
            }

            BotState::RoundDone => {
                self.stats.end_round();
                info!(
                    "round {} completed ({} patterns total)",
                    self.stats.rounds_completed, self.stats.total_patterns
                );

                if self.stop.satisfied(self.stats.rounds_completed, self.stats.elapsed()) {
                    self.state = BotState::Terminal;
                    return Ok(false);
                }

                std::thread::sleep(Duration::from_millis(
                    self.config.timing.inter_round_delay_ms,
                ));
                self.state = BotState::CheckZone;
                Ok(true)
            }

            BotState::Terminal => Ok(false),
        }
    }

    /// Waits for the marker to transition present then absent.
    ///
    /// Every tick checks the rewards watcher first and returns early if
    /// the rewards screen appeared, regardless of marker state. The wait
    /// is edge-triggered; a marker already showing when the wait starts
    /// skips straight to waiting for it to clear.
    pub fn wait_for_marker_cycle(&mut self) -> Result<MarkerWait> {
        // Wait for the marker to appear (reaction accepted).
        loop {
            if self.abort_requested() {
                return Ok(MarkerWait::Aborted);
            }
            if self.perception.rewards_visible(&self.config)? {
                return Ok(MarkerWait::RewardsInterrupted);
            }
            if self.perception.marker_present(&self.config)? {
                break;
            }
            self.poll_sleep();
        }

        // Wait for it to clear (next pattern ready).
        loop {
            if self.abort_requested() {
                return Ok(MarkerWait::Aborted);
            }
            if self.perception.rewards_visible(&self.config)? {
                return Ok(MarkerWait::RewardsInterrupted);
            }
            if !self.perception.marker_present(&self.config)? {
                return Ok(MarkerWait::Completed);
            }
            self.poll_sleep();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Region;
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::collections::VecDeque;

    /// Sampler returning scripted images per region; an exhausted queue
    /// yields a black image (everything classifies as absent).
    #[derive(Default)]
    struct FakeSampler {
        queues: HashMap<Region, VecDeque<RgbaImage>>,
    }

    impl FakeSampler {
        fn push(&mut self, region: Region, image: RgbaImage) {
            self.queues.entry(region).or_default().push_back(image);
        }

        fn remaining(&self, region: Region) -> usize {
            self.queues.get(&region).map_or(0, |q| q.len())
        }
    }

    impl RegionSampler for FakeSampler {
        fn sample(&mut self, region: &Region) -> Result<RgbaImage> {
            Ok(self
                .queues
                .get_mut(region)
                .and_then(|q| q.pop_front())
                .unwrap_or_else(|| RgbaImage::new(region.width.min(16), region.height.min(16))))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Event {
        Key(char),
        Move(i32, i32),
        Click,
    }

    #[derive(Default)]
    struct RecordingInput {
        events: Vec<Event>,
    }

    impl InputDriver for RecordingInput {
        fn press_key(&mut self, key: char) -> Result<()> {
            self.events.push(Event::Key(key));
            Ok(())
        }

        fn move_mouse(&mut self, x: i32, y: i32) -> Result<()> {
            self.events.push(Event::Move(x, y));
            Ok(())
        }

        fn click(&mut self) -> Result<()> {
            self.events.push(Event::Click);
            Ok(())
        }
    }

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    fn white_marker() -> RgbaImage {
        solid(20, 20, [255, 255, 255]) // 400 white pixels > 50
    }

    fn dark_marker() -> RgbaImage {
        solid(20, 20, [0, 0, 0])
    }

    fn green_pattern() -> RgbaImage {
        solid(40, 40, [0, 255, 0]) // 1600 green pixels > 1000
    }

    fn rewards_panel() -> RgbaImage {
        solid(50, 50, [0, 255, 0]) // 2500 green pixels > 1500
    }

    fn zone_bar() -> RgbaImage {
        solid(30, 30, [0, 100, 255]) // cyan-blue, 900 pixels > 100
    }

    fn fast_config() -> BotConfig {
        let mut config = BotConfig::default();
        config.timing.startup_delay_ms = 0;
        config.timing.poll_interval_ms = 0;
        config.timing.pre_press_delay_ms = 0;
        config.timing.key_delay_ms = 0;
        config.timing.walk_cadence_ms = 0;
        config.timing.inter_round_delay_ms = 0;
        config.timing.claim_settle_ms = 0;
        config
    }

    fn context(
        sampler: FakeSampler,
        stop: StopRule,
    ) -> BotContext<FakeSampler, RecordingInput> {
        BotContext::new(
            fast_config(),
            sampler,
            RecordingInput::default(),
            stop,
            Arc::new(AtomicBool::new(false)),
        )
    }

    #[test]
    fn test_marker_cycle_completes_on_present_then_absent_edge() {
        let config = fast_config();
        let mut sampler = FakeSampler::default();
        for img in [
            dark_marker(),
            dark_marker(),
            white_marker(),
            white_marker(),
            dark_marker(),
        ] {
            sampler.push(config.marker_region, img);
        }

        let mut ctx = context(sampler, StopRule::Unlimited);
        let result = ctx.wait_for_marker_cycle().unwrap();
        assert_eq!(result, MarkerWait::Completed);
        assert_eq!(
            ctx.perception_remaining(ctx.config.marker_region),
            0,
            "the wait must consume exactly the scripted sequence"
        );
    }

    #[test]
    fn test_marker_cycle_preempted_by_rewards() {
        let config = fast_config();
        let mut sampler = FakeSampler::default();
        // Marker is present, but rewards wins the tick.
        sampler.push(config.marker_region, white_marker());
        sampler.push(config.rewards_region, rewards_panel());

        let mut ctx = context(sampler, StopRule::Unlimited);
        let result = ctx.wait_for_marker_cycle().unwrap();
        assert_eq!(result, MarkerWait::RewardsInterrupted);
        assert_eq!(
            ctx.perception_remaining(ctx.config.marker_region),
            1,
            "rewards check precedes the marker sample"
        );
    }

    #[test]
    fn test_abort_flag_ends_marker_wait() {
        let abort = Arc::new(AtomicBool::new(true));
        let mut ctx = BotContext::new(
            fast_config(),
            FakeSampler::default(),
            RecordingInput::default(),
            StopRule::Unlimited,
            abort,
        );
        assert_eq!(ctx.wait_for_marker_cycle().unwrap(), MarkerWait::Aborted);
    }

    #[test]
    fn test_walk_back_until_inside_zone() {
        let config = fast_config();
        let mut sampler = FakeSampler::default();
        // Outside for two polls of the walk loop, then inside. The first
        // zone sample is consumed by CheckZone.
        for img in [zone_bar(), zone_bar(), zone_bar()] {
            sampler.push(config.zone_region, img);
        }

        let mut ctx = context(sampler, StopRule::Unlimited);
        ctx.state = BotState::CheckZone;
        assert!(ctx.step().unwrap());
        assert_eq!(ctx.state, BotState::WalkingBack);
        assert!(ctx.step().unwrap());
        assert_eq!(ctx.state, BotState::Playing);

        let walk_presses = ctx
            .dispatcher_events()
            .iter()
            .filter(|e| **e == Event::Key('s'))
            .count();
        assert_eq!(walk_presses, 2);
    }

    #[test]
    fn test_full_round_with_reward_preemption() {
        let config = fast_config();
        let mut sampler = FakeSampler::default();

        // Three pattern cycles. Zone region defaults to black (inside).
        for _ in 0..3 {
            sampler.push(config.pattern_region, green_pattern());
            sampler.push(config.marker_region, white_marker());
            sampler.push(config.marker_region, dark_marker());
        }
        // Rewards samples: one per Playing entry (3), two per marker wait
        // (3 waits x 2 ticks), then the fourth Playing entry sees the panel.
        for _ in 0..9 {
            sampler.push(config.rewards_region, dark_marker());
        }
        sampler.push(config.rewards_region, rewards_panel());

        let mut ctx = context(sampler, StopRule::Rounds(1));
        while ctx.step().unwrap() {}

        assert_eq!(ctx.state, BotState::Terminal);
        assert_eq!(ctx.stats.rounds_completed, 1);
        assert_eq!(ctx.stats.total_patterns, 3);

        let events = ctx.dispatcher_events();
        let green_presses = events.iter().filter(|e| **e == Event::Key('q')).count();
        let clicks = events.iter().filter(|e| **e == Event::Click).count();
        assert_eq!(green_presses, 3, "one green reaction per pattern");
        assert_eq!(clicks, 2, "claim and exit clicks exactly once");
    }

    #[test]
    fn test_round_limit_stops_after_configured_rounds() {
        let stop = StopRule::Rounds(2);
        assert!(!stop.satisfied(1, Duration::ZERO));
        assert!(stop.satisfied(2, Duration::ZERO));
        assert!(StopRule::Unlimited.satisfied(u32::MAX, Duration::ZERO) == false);
        assert!(StopRule::Duration(Duration::from_secs(1)).satisfied(0, Duration::from_secs(2)));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(format!("{}", BotState::Playing), "Playing");
        assert_eq!(
            format!("{}", BotState::AwaitMarkerCycle),
            "Waiting for marker cycle"
        );
    }

    // Test-only accessors so assertions can reach into the fakes.
    impl BotContext<FakeSampler, RecordingInput> {
        fn perception_remaining(&self, region: Region) -> usize {
            self.perception.sampler_ref().remaining(region)
        }

        fn dispatcher_events(&self) -> &[Event] {
            &self.dispatcher.input_ref().events
        }
    }
}
