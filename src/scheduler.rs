//! Host scheduling: animation frames and one-shot timers.
//!
//! The engine never sleeps or spawns threads. It asks the host for "call me on
//! the next display refresh" and "call me after this delay", and the host
//! calls back into [`Engine::on_frame`](crate::Engine::on_frame) and
//! [`Engine::on_timeout`](crate::Engine::on_timeout) on the same thread. This is
//! the `requestAnimationFrame` / `setTimeout` pair of a browser, expressed as a
//! trait.
//!
//! [`FrameQueue`] is a ready-made implementation driven by an explicit clock,
//! usable both from a real event loop and from tests.
//!
//! ```ignore
//! // Once per display refresh:
//! queue.set_now(Instant::now());
//! for timer in queue.take_expired() {
//!     engine.on_timeout(timer);
//! }
//! if let Some(frame) = engine.scheduler_mut().take_frame() {
//!     engine.on_frame(frame);
//! }
//! ```

use std::time::{Duration, Instant};

/// Identifies one requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Identifies one pending timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// The host's frame and timer services.
///
/// Canceling a handle that already fired or was never issued is a no-op.
pub trait Scheduler {
    /// Ask for one callback at the next display refresh.
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a frame request.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Ask for one callback after `delay`.
    fn set_timeout(&mut self, delay: Duration) -> TimerHandle;

    /// Withdraw a timer.
    fn clear_timeout(&mut self, handle: TimerHandle);
}

impl<T: Scheduler + ?Sized> Scheduler for &mut T {
    fn request_frame(&mut self) -> FrameHandle {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        (**self).cancel_frame(handle)
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerHandle {
        (**self).set_timeout(delay)
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        (**self).clear_timeout(handle)
    }
}

/// A single-threaded scheduler with an explicit clock.
///
/// Frame requests are collected until the host's next refresh drains them with
/// [`take_frame`](FrameQueue::take_frame). Timers fire once the clock, advanced
/// with [`set_now`](FrameQueue::set_now), reaches their deadline.
#[derive(Debug)]
pub struct FrameQueue {
    now: Instant,
    next_id: u64,
    frames: Vec<FrameHandle>,
    timers: Vec<(TimerHandle, Instant)>,
}

impl FrameQueue {
    /// A queue whose clock starts at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            now,
            next_id: 1,
            frames: Vec::new(),
            timers: Vec::new(),
        }
    }

    /// Current clock value.
    #[inline]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Move the clock. Going backwards is ignored.
    pub fn set_now(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.now += delta;
    }

    /// Remove and return the oldest outstanding frame request.
    pub fn take_frame(&mut self) -> Option<FrameHandle> {
        if self.frames.is_empty() {
            None
        } else {
            Some(self.frames.remove(0))
        }
    }

    /// Remove and return every timer whose deadline has passed, earliest first.
    pub fn take_expired(&mut self) -> Vec<TimerHandle> {
        let now = self.now;
        let mut expired: Vec<(TimerHandle, Instant)> = Vec::new();
        self.timers.retain(|&(handle, deadline)| {
            if deadline <= now {
                expired.push((handle, deadline));
                false
            } else {
                true
            }
        });
        expired.sort_by_key(|&(_, deadline)| deadline);
        expired.into_iter().map(|(handle, _)| handle).collect()
    }

    /// True if a frame has been requested and not yet taken.
    pub fn has_frame(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Number of outstanding frame requests.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Earliest timer deadline, for hosts that sleep between events.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|&(_, deadline)| deadline).min()
    }

    /// True when nothing is waiting to run.
    pub fn is_idle(&self) -> bool {
        self.frames.is_empty() && self.timers.is_empty()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Scheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id());
        self.frames.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|&h| h != handle);
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle(self.next_id());
        self.timers.push((handle, self.now + delay));
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.retain(|&(h, _)| h != handle);
    }
}
