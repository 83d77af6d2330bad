//! Time-based replay of historical bars.
//!
//! The engine advances a fractional bar cursor by `speed * elapsed seconds`
//! on every scheduled frame. It never sleeps or spawns; the host drives it
//! through a [`FrameScheduler`].

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Playback speed in bars per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReplaySpeed {
    Half,
    #[default]
    X1,
    X2,
    X4,
    X8,
    X10,
}

impl ReplaySpeed {
    pub fn multiplier(&self) -> f64 {
        match self {
            ReplaySpeed::Half => 0.5,
            ReplaySpeed::X1 => 1.0,
            ReplaySpeed::X2 => 2.0,
            ReplaySpeed::X4 => 4.0,
            ReplaySpeed::X8 => 8.0,
            ReplaySpeed::X10 => 10.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReplaySpeed::Half => "0.5x",
            ReplaySpeed::X1 => "1x",
            ReplaySpeed::X2 => "2x",
            ReplaySpeed::X4 => "4x",
            ReplaySpeed::X8 => "8x",
            ReplaySpeed::X10 => "10x",
        }
    }

    pub fn all() -> &'static [ReplaySpeed] {
        &[
            ReplaySpeed::Half,
            ReplaySpeed::X1,
            ReplaySpeed::X2,
            ReplaySpeed::X4,
            ReplaySpeed::X8,
            ReplaySpeed::X10,
        ]
    }
}

/// Token for one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host hook: run one callback before the next repaint, cancellable.
pub trait FrameScheduler {
    fn schedule(&mut self) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

/// Scheduler backed by egui repaint requests.
///
/// egui cannot retract a repaint request, so cancelling only forgets the
/// live handle; the engine ignores frames it no longer waits for.
#[derive(Debug, Default)]
pub struct EguiScheduler {
    ctx: Option<egui::Context>,
    next_id: u64,
    live: Option<FrameHandle>,
}

impl EguiScheduler {
    pub fn attach(&mut self, ctx: &egui::Context) {
        if self.ctx.is_none() {
            self.ctx = Some(ctx.clone());
        }
    }

    pub fn live(&self) -> Option<FrameHandle> {
        self.live
    }
}

impl FrameScheduler for EguiScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.live = Some(handle);
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.live == Some(handle) {
            self.live = None;
        }
    }
}

/// Playback state visible to the render loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReplayState {
    pub is_playing: bool,
    pub speed: ReplaySpeed,
    /// Fractional bar index in `[0, N - 1]`
    pub cursor: f64,
}

/// Result of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No tick was pending
    Idle,
    Advanced,
    /// The cursor reached the last bar and playback stopped
    Finished,
}

/// Replay driver over a series of `total` bars.
pub struct ReplayEngine<S: FrameScheduler> {
    state: ReplayState,
    total: usize,
    last_tick: Option<Instant>,
    pending: Option<FrameHandle>,
    scheduler: S,
}

impl<S: FrameScheduler + Default> Default for ReplayEngine<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: FrameScheduler> ReplayEngine<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            state: ReplayState::default(),
            total: 0,
            last_tick: None,
            pending: None,
            scheduler,
        }
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn cursor(&self) -> f64 {
        self.state.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn speed(&self) -> ReplaySpeed {
        self.state.speed
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn max_cursor(&self) -> f64 {
        self.total.saturating_sub(1) as f64
    }

    /// Update the series length. An empty series stops playback.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        if total == 0 {
            self.stop();
        }
        self.state.cursor = self.state.cursor.clamp(0.0, self.max_cursor());
    }

    /// Start playback. A cursor parked on the last bar rewinds to the first.
    pub fn play(&mut self, now: Instant) {
        if self.total == 0 || self.state.is_playing {
            return;
        }
        if self.state.cursor >= self.max_cursor() {
            self.state.cursor = 0.0;
        }
        self.state.is_playing = true;
        self.last_tick = Some(now);
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.schedule());
        }
        info!(cursor = self.state.cursor, speed = self.state.speed.label(), "replay started");
    }

    /// Stop playback and cancel the pending tick. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        self.last_tick = None;
        if self.state.is_playing {
            self.state.is_playing = false;
            info!(cursor = self.state.cursor, "replay stopped");
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.state.is_playing {
            self.stop();
        } else {
            self.play(now);
        }
    }

    /// Change speed without resetting elapsed-time accounting
    pub fn set_speed(&mut self, speed: ReplaySpeed) {
        self.state.speed = speed;
    }

    /// Seek to `cursor`, clamped to the series. Does not pause.
    pub fn set_cursor(&mut self, cursor: f64) {
        self.state.cursor = if cursor.is_finite() {
            cursor.clamp(0.0, self.max_cursor())
        } else {
            0.0
        };
        debug!(cursor = self.state.cursor, "replay seek");
    }

    /// Move to the whole bar `delta` bars away
    pub fn step(&mut self, delta: i64) {
        self.set_cursor(self.state.cursor.floor() + delta as f64);
    }

    pub fn step_forward(&mut self) {
        self.step(1);
    }

    pub fn step_backward(&mut self) {
        self.step(-1);
    }

    /// Run the pending frame callback, if any.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if !self.state.is_playing || self.pending.take().is_none() {
            return TickOutcome::Idle;
        }
        let elapsed = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f64())
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        let max = self.max_cursor();
        self.state.cursor += self.state.speed.multiplier() * elapsed;
        if self.state.cursor >= max {
            self.state.cursor = max;
            self.stop();
            return TickOutcome::Finished;
        }

        self.pending = Some(self.scheduler.schedule());
        TickOutcome::Advanced
    }
}
