//! # TRACKSIDE Frame Loop
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. BEGIN FRAME                                                      │
//! │    └─ Measure dt (clamped after a stall)                            │
//! │                                                                     │
//! │ 2. INPUT                                                            │
//! │    ├─ Advance the router clock (double-click window)                │
//! │    └─ Drain queued input events, dispatch each into the tree        │
//! │                                                                     │
//! │ 3. UPDATE                                                           │
//! │    ├─ Advance bounds/alpha animations                               │
//! │    └─ widget.update in paint order (domain queues drained here)     │
//! │                                                                     │
//! │ 4. DRAW (only when something changed)                               │
//! │    ├─ Layout dirty subtrees                                         │
//! │    ├─ Depth-first draw with accumulated alpha                       │
//! │    └─ Split commands into batches                                   │
//! │                                                                     │
//! │ 5. END FRAME                                                        │
//! │    └─ Record timing                                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input may be produced on any thread through [`FrameLoop::input_sender`];
//! it only reaches the tree between frames.

use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use trackside_ui::{
    CommandDrawer, Compositor, DispatchOutcome, DrawStats, InputEvent, InputRouter, NodeTree,
    TextureResolver,
};

use crate::config::TracksideConfig;

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Maximum allowed frame time before warning.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Longest dt handed to animations after a stall.
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Configuration for the frame loop.
#[derive(Clone, Debug)]
pub struct FrameLoopConfig {
    /// Enable frame timing logs.
    pub enable_timing_logs: bool,
    /// Target frames per second.
    pub target_fps: u32,
}

impl FrameLoopConfig {
    /// Time budget of one frame.
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            enable_timing_logs: false,
            target_fps: 60,
        }
    }
}

impl From<&TracksideConfig> for FrameLoopConfig {
    fn from(config: &TracksideConfig) -> Self {
        Self {
            enable_timing_logs: config.frame.timing_logs,
            target_fps: config.frame.target_fps,
        }
    }
}

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Input dispatch time in microseconds.
    pub input_us: u64,
    /// Update pass time in microseconds.
    pub update_us: u64,
    /// Layout and draw time in microseconds.
    pub draw_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Input events processed this frame.
    pub events_processed: u32,
    /// Whether the compositor ran.
    pub drawn: bool,
    /// Compositor counters (zero when nothing was drawn).
    pub draw: DrawStats,
}

/// Drives one node tree: input, update and draw, once per frame.
pub struct FrameLoop {
    /// The screen.
    tree: NodeTree,
    /// Pointer and keyboard routing.
    router: InputRouter,
    /// Draw traversal.
    compositor: Compositor,
    /// Producer side for host input.
    input_tx: Sender<InputEvent>,
    /// Drained at the start of every frame.
    input_rx: Receiver<InputEvent>,
    /// Non-ignored outcomes of the last frame's input.
    outcomes: Vec<DispatchOutcome>,
    /// Configuration.
    config: FrameLoopConfig,
    /// Frame counter.
    frame_count: u64,
    /// Last frame start time.
    last_frame_time: Instant,
    /// Accumulated frame statistics.
    stats_accumulator: FrameStatsAccumulator,
}

impl FrameLoop {
    /// Creates a frame loop around an existing tree and router.
    #[must_use]
    pub fn new(tree: NodeTree, router: InputRouter, config: FrameLoopConfig) -> Self {
        let (input_tx, input_rx) = unbounded();
        Self {
            tree,
            router,
            compositor: Compositor::new(),
            input_tx,
            input_rx,
            outcomes: Vec::new(),
            config,
            frame_count: 0,
            last_frame_time: Instant::now(),
            stats_accumulator: FrameStatsAccumulator::new(),
        }
    }

    /// Creates an empty screen sized and tuned from configuration.
    #[must_use]
    pub fn from_config(config: &TracksideConfig) -> Self {
        let tree = NodeTree::with_animation(config.viewport_rect(), config.animation_config());
        let router = InputRouter::new(config.router_config());
        Self::new(tree, router, FrameLoopConfig::from(config))
    }

    /// The node tree.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable access to the node tree, for building the screen.
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// The input router.
    #[must_use]
    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    /// Sender for input produced on other threads.
    #[must_use]
    pub fn input_sender(&self) -> Sender<InputEvent> {
        self.input_tx.clone()
    }

    /// Dispatches one event immediately, outside the frame cycle.
    pub fn dispatch(&mut self, event: &InputEvent) -> DispatchOutcome {
        self.router.dispatch(&mut self.tree, event)
    }

    /// Outcomes of the last frame's queued input, ignored events excluded.
    #[must_use]
    pub fn outcomes(&self) -> &[DispatchOutcome] {
        &self.outcomes
    }

    /// Runs one frame timed against the wall clock.
    pub fn run_frame<R: TextureResolver>(&mut self, drawer: &mut CommandDrawer<R>) -> FrameStats {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.step(delta.as_secs_f32(), drawer)
    }

    /// Runs one frame with an explicit dt in seconds.
    ///
    /// The drawer's batches are only rebuilt when the tree changed; otherwise
    /// the previous frame's batches stay valid.
    pub fn step<R: TextureResolver>(
        &mut self,
        dt: f32,
        drawer: &mut CommandDrawer<R>,
    ) -> FrameStats {
        let elapsed = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        // Clamp delta time so a stall does not skip every animation to its end.
        // The router keeps real time for double clicks.
        let dt = elapsed.min(MAX_DELTA_TIME);
        let frame_start = Instant::now();
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        let input_start = Instant::now();
        self.router.tick(elapsed);
        self.outcomes.clear();
        while let Ok(event) = self.input_rx.try_recv() {
            let outcome = self.router.dispatch(&mut self.tree, &event);
            if outcome != DispatchOutcome::Ignored {
                self.outcomes.push(outcome);
            }
            stats.events_processed += 1;
        }
        stats.input_us = elapsed_us(input_start);

        let update_start = Instant::now();
        self.tree.update(dt);
        stats.update_us = elapsed_us(update_start);

        if self.tree.needs_redraw() || self.tree.needs_layout() {
            let draw_start = Instant::now();
            drawer.begin_frame();
            stats.draw = self.compositor.draw(&mut self.tree, drawer);
            drawer.end_frame();
            stats.drawn = true;
            stats.draw_us = elapsed_us(draw_start);
        }

        stats.total_us = elapsed_us(frame_start);
        self.end_frame(stats);
        stats
    }

    /// Records timing and advances the frame counter.
    fn end_frame(&mut self, stats: FrameStats) {
        self.frame_count += 1;
        self.stats_accumulator.record(stats);

        if self.config.enable_timing_logs
            && stats.total_us > duration_us(MAX_FRAME_TIME)
        {
            tracing::warn!(
                frame = self.frame_count,
                total_ms = stats.total_us as f64 / 1000.0,
                budget_ms = self.config.frame_budget().as_secs_f64() * 1000.0,
                "frame exceeded budget"
            );
        }
    }

    /// Returns the current frame count.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats_accumulator
    }

    /// Number of draw passes run so far.
    #[must_use]
    pub fn frames_drawn(&self) -> u64 {
        self.compositor.frames()
    }
}

fn elapsed_us(start: Instant) -> u64 {
    duration_us(start.elapsed())
}

fn duration_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Frames in which the compositor ran.
    pub frames_drawn: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of input times.
    pub input_us_sum: u64,
    /// Sum of update times.
    pub update_us_sum: u64,
    /// Sum of draw times.
    pub draw_us_sum: u64,
    /// Input events processed.
    pub events_processed: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            frames_drawn: 0,
            total_us_sum: 0,
            input_us_sum: 0,
            update_us_sum: 0,
            draw_us_sum: 0,
            events_processed: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.frames_drawn += u64::from(stats.drawn);
        self.total_us_sum += stats.total_us;
        self.input_us_sum += stats.input_us;
        self.update_us_sum += stats.update_us;
        self.draw_us_sum += stats.draw_us;
        self.events_processed += u64::from(stats.events_processed);
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        if stats.total_us > duration_us(TARGET_FRAME_TIME) {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        self.average_ms(self.total_us_sum)
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the percentage of frames over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    fn average_ms(&self, sum_us: u64) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (sum_us as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Prints a summary of the statistics.
    pub fn print_summary(&self) {
        let min_ms = if self.frames_recorded == 0 {
            0.0
        } else {
            self.min_frame_us as f64 / 1000.0
        };
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ─────────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!("│ Frames Drawn:       {}", self.frames_drawn);
        println!("│ Average Frame:      {:.3} ms ({:.1} FPS)", self.avg_frame_ms(), self.avg_fps());
        println!("│ Min Frame:          {min_ms:.3} ms");
        println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BUDGET ─────────────────────────────────────────────────────────┐");
        println!(
            "│ Target:             {:.3} ms (60 FPS)",
            TARGET_FRAME_TIME.as_secs_f64() * 1000.0
        );
        println!(
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("└──────────────────────────────────────────────────────────────────┘");

        if self.frames_recorded > 0 {
            println!();
            println!("┌─ BREAKDOWN ──────────────────────────────────────────────────────┐");
            println!("│ Input:              {:.3} ms", self.average_ms(self.input_us_sum));
            println!("│ Update:             {:.3} ms", self.average_ms(self.update_us_sum));
            println!("│ Draw:               {:.3} ms", self.average_ms(self.draw_us_sum));
            println!("│ Events:             {}", self.events_processed);
            println!("└──────────────────────────────────────────────────────────────────┘");
        }
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
