//! The lifecycle controller.
//!
//! An [`Engine`] owns one surface, one particle field and the run state, and
//! reacts to the host's trigger signals:
//!
//! | Signal | Call |
//! |--------|------|
//! | element mounted | [`Engine::new`] |
//! | pointer enters | [`Engine::start`] |
//! | pointer leaves | [`Engine::stop`] |
//! | element or window resized | [`Engine::resize`] |
//! | requested frame fires | [`Engine::on_frame`] |
//! | timer fires | [`Engine::on_timeout`] |
//! | element removed | [`Engine::unmount`] (or drop) |
//!
//! # States
//!
//! ```text
//!            start()                      on_frame(tick)
//! Stopped ------------> Running { tick } ---------------+
//!    ^                     |     ^                      |
//!    |       stop()        |     +--- advance, render --+
//!    +---------------------+          request next frame
//!    schedules a deferred clear
//! ```
//!
//! Only the frame handle stored in `Running` is honored; a frame delivered
//! after `stop()` or under an older handle is ignored, so there is never more
//! than one tick loop. The clear scheduled by `stop()` is canceled by the next
//! `start()`, so a pointer that leaves and quickly returns never sees the
//! surface flash empty.

use crate::config::FieldConfig;
use crate::field::ParticleField;
use crate::render::{render, Style};
use crate::scheduler::{FrameHandle, Scheduler, TimerHandle};
use crate::spawn::SpawnContext;
use crate::step::advance;
use crate::surface::{DrawContext, Surface};

/// Whether the tick loop is active.
///
/// The frame handle exists exactly while running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running { tick: FrameHandle },
}

/// A particle field mounted on a host surface.
pub struct Engine<S: Surface, H: Scheduler> {
    surface: S,
    scheduler: H,
    config: FieldConfig,
    style: Style,
    spawn: SpawnContext,
    field: ParticleField,
    state: RunState,
    pending_clear: Option<TimerHandle>,
    frames: u64,
}

impl<S: Surface, H: Scheduler> Engine<S, H> {
    /// Mount an engine on `surface`.
    ///
    /// The population is seeded for the surface's current size right away; the
    /// engine starts out stopped.
    pub fn new(surface: S, scheduler: H, config: FieldConfig) -> Self {
        let mut engine = Self {
            surface,
            scheduler,
            style: Style::from_config(&config),
            spawn: SpawnContext::new(config.seed),
            config,
            field: ParticleField::empty(),
            state: RunState::Stopped,
            pending_clear: None,
            frames: 0,
        };
        engine.reseed();
        engine
    }

    /// The surface size is known or has changed.
    ///
    /// Resizes the surface and replaces the whole population with a fresh one
    /// at the configured density. The run state is unchanged: a running engine
    /// keeps ticking on the new field, a stopped one stays stopped.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.surface.set_size(width, height);
        self.reseed();
    }

    /// Begin ticking. Does nothing if already running.
    ///
    /// Cancels a pending post-stop clear, re-measures the surface and reseeds,
    /// then asks the scheduler for the first frame. Without a drawing context
    /// the engine stays stopped.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        if let Some(timer) = self.pending_clear.take() {
            self.scheduler.clear_timeout(timer);
        }

        if self.surface.context().is_none() {
            log::warn!("particle field has no drawing context; not starting");
            return;
        }

        self.reseed();
        self.frames = 0;
        let tick = self.scheduler.request_frame();
        self.state = RunState::Running { tick };
        log::debug!("particle field started with {} particles", self.field.len());
    }

    /// Stop ticking. Does nothing if already stopped.
    ///
    /// The outstanding frame request is withdrawn immediately; the surface is
    /// cleared once the configured grace period passes, unless `start()` is
    /// called first.
    pub fn stop(&mut self) {
        let RunState::Running { tick } = self.state else {
            return;
        };

        self.scheduler.cancel_frame(tick);
        self.state = RunState::Stopped;
        self.pending_clear = Some(self.scheduler.set_timeout(self.config.clear_delay()));
        log::debug!("particle field stopped after {} frames", self.frames);
    }

    /// A requested animation frame fired.
    ///
    /// Advances and redraws the field, then requests the next frame. Handles
    /// other than the current tick are ignored.
    pub fn on_frame(&mut self, handle: FrameHandle) {
        if self.state != (RunState::Running { tick: handle }) {
            return;
        }

        let Some(ctx) = self.surface.context() else {
            log::warn!("particle field lost its drawing context; stopping");
            self.state = RunState::Stopped;
            return;
        };

        advance(&mut self.field);
        render(ctx, &self.field, &self.style);
        self.frames += 1;

        let tick = self.scheduler.request_frame();
        self.state = RunState::Running { tick };
    }

    /// A timer fired.
    ///
    /// Wipes the surface if `handle` is the deferred clear scheduled by the last
    /// `stop()` and the engine has not been restarted since.
    pub fn on_timeout(&mut self, handle: TimerHandle) {
        if self.pending_clear != Some(handle) {
            return;
        }
        self.pending_clear = None;

        if self.is_running() {
            return;
        }
        if let Some(ctx) = self.surface.context() {
            ctx.clear();
        }
    }

    /// The host element is going away.
    ///
    /// Cancels the tick and any pending clear unconditionally, leaving nothing
    /// scheduled. Safe to call more than once; dropping the engine does the same.
    pub fn unmount(&mut self) {
        if let RunState::Running { tick } = self.state {
            self.scheduler.cancel_frame(tick);
            self.state = RunState::Stopped;
        }
        if let Some(timer) = self.pending_clear.take() {
            self.scheduler.clear_timeout(timer);
        }
    }

    /// Replace the configuration and reseed with it.
    ///
    /// A new seed restarts the random sequence; otherwise the current one
    /// continues.
    pub fn set_config(&mut self, config: FieldConfig) {
        if config.seed.is_some() && config.seed != self.config.seed {
            self.spawn = SpawnContext::new(config.seed);
        }
        self.style = Style::from_config(&config);
        self.config = config;
        self.reseed();
    }

    fn reseed(&mut self) {
        let (width, height) = self.surface.size();
        self.field = ParticleField::initialize(width, height, &self.config, &mut self.spawn);
        log::debug!(
            "particle field seeded {} particles for {}x{}",
            self.field.len(),
            width,
            height
        );
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// True while a post-stop clear is waiting to fire.
    #[inline]
    pub fn has_pending_clear(&self) -> bool {
        self.pending_clear.is_some()
    }

    /// Frames rendered since the last `start()`.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &H {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut H {
        &mut self.scheduler
    }
}

impl<S: Surface, H: Scheduler> Drop for Engine<S, H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;
    use crate::surface::{DisplayList, DrawCommand};
    use std::time::{Duration, Instant};

    fn engine(width: u32, height: u32) -> Engine<DisplayList, FrameQueue> {
        Engine::new(
            DisplayList::new(width, height),
            FrameQueue::new(Instant::now()),
            FieldConfig::new().with_seed(11),
        )
    }

    fn pump_frame(engine: &mut Engine<DisplayList, FrameQueue>) -> bool {
        match engine.scheduler_mut().take_frame() {
            Some(frame) => {
                engine.on_frame(frame);
                true
            }
            None => false,
        }
    }

    fn pump_timers(engine: &mut Engine<DisplayList, FrameQueue>, delta: Duration) {
        engine.scheduler_mut().advance(delta);
        for timer in engine.scheduler_mut().take_expired() {
            engine.on_timeout(timer);
        }
    }

    #[test]
    fn test_new_is_stopped_and_seeded() {
        let engine = engine(400, 300);
        assert_eq!(engine.state(), RunState::Stopped);
        assert_eq!(engine.field().len(), 10);
        assert!(engine.scheduler().is_idle());
    }

    #[test]
    fn test_start_requests_one_frame() {
        let mut engine = engine(400, 300);
        engine.start();
        assert!(engine.is_running());
        assert_eq!(engine.scheduler().pending_frames(), 1);

        assert!(pump_frame(&mut engine));
        assert_eq!(engine.frames(), 1);
        assert_eq!(engine.scheduler().pending_frames(), 1);
        assert_eq!(engine.surface().commands()[0], DrawCommand::Clear);
    }

    #[test]
    fn test_stale_frame_is_ignored() {
        let mut engine = engine(400, 300);
        engine.start();
        let tick = engine.scheduler_mut().take_frame().unwrap();
        engine.on_frame(tick);
        engine.on_frame(tick);
        assert_eq!(engine.frames(), 1);
        assert_eq!(engine.scheduler().pending_frames(), 1);
        assert_ne!(engine.state(), RunState::Running { tick });
    }

    #[test]
    fn test_stop_when_stopped_schedules_nothing() {
        let mut engine = engine(400, 300);
        engine.stop();
        assert!(engine.scheduler().is_idle());
        assert!(!engine.has_pending_clear());
    }

    #[test]
    fn test_timeout_for_other_timer_is_ignored() {
        let mut engine = engine(400, 300);
        engine.start();
        pump_frame(&mut engine);
        engine.stop();
        let before = engine.surface().commands().len();
        engine.on_timeout(TimerHandle(9999));
        assert_eq!(engine.surface().commands().len(), before);
        assert!(engine.has_pending_clear());
    }

    #[test]
    fn test_stop_clears_after_delay() {
        let mut engine = engine(400, 300);
        engine.start();
        pump_frame(&mut engine);
        engine.stop();
        assert!(!engine.scheduler().has_frame());

        let before = engine.surface().commands().len();
        pump_timers(&mut engine, Duration::from_millis(299));
        assert_eq!(engine.surface().commands().len(), before);

        pump_timers(&mut engine, Duration::from_millis(1));
        assert_eq!(engine.surface().commands().last(), Some(&DrawCommand::Clear));
        assert!(engine.scheduler().is_idle());
    }

    #[test]
    fn test_resize_while_running_keeps_running() {
        let mut engine = engine(400, 300);
        engine.start();
        engine.resize(800, 300);
        assert!(engine.is_running());
        assert_eq!(engine.field().len(), 21);
        assert_eq!(engine.scheduler().pending_frames(), 1);
        assert!(pump_frame(&mut engine));
    }

    #[test]
    fn test_resize_while_stopped_does_not_start() {
        let mut engine = engine(400, 300);
        engine.resize(0, 0);
        assert!(!engine.is_running());
        assert!(engine.field().is_empty());
        assert!(engine.scheduler().is_idle());
    }

    #[test]
    fn test_detached_surface_never_ticks() {
        let mut engine = Engine::new(
            DisplayList::detached(400, 300),
            FrameQueue::new(Instant::now()),
            FieldConfig::default(),
        );
        engine.start();
        assert!(!engine.is_running());
        assert!(engine.scheduler().is_idle());
    }

    #[test]
    fn test_context_lost_while_running_stops() {
        let mut engine = engine(400, 300);
        engine.start();
        assert!(pump_frame(&mut engine));

        engine.surface_mut().set_attached(false);
        assert!(pump_frame(&mut engine));
        assert_eq!(engine.state(), RunState::Stopped);
        assert_eq!(engine.frames(), 1);
        assert!(engine.scheduler().is_idle());
        assert!(!engine.has_pending_clear());
    }

    #[test]
    fn test_set_config_reseeds() {
        let mut engine = engine(400, 300);
        engine.set_config(FieldConfig::new().with_density_divisor(1000));
        assert_eq!(engine.field().len(), 120);
    }

    #[test]
    fn test_unmount_cancels_everything() {
        let mut engine = engine(400, 300);
        engine.start();
        engine.unmount();
        assert!(!engine.is_running());
        assert!(engine.scheduler().is_idle());

        engine.start();
        engine.stop();
        assert!(engine.has_pending_clear());
        engine.unmount();
        assert!(engine.scheduler().is_idle());
    }
}
