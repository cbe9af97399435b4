//! # cardfield
//!
//! A hover-card particle field: a handful of slowly drifting points that bounce
//! off the edges of a rectangle, with a line drawn between every pair closer
//! than a threshold and faded by distance.
//!
//! The engine is frame-driven and single-threaded. It draws through a small
//! [`Surface`] trait and asks a host [`Scheduler`] for animation frames and
//! timers, so it can sit behind a browser canvas, a desktop window, or a test.
//!
//! ## Quick Start
//!
//! ```ignore
//! use cardfield::prelude::*;
//! use std::time::Instant;
//!
//! let mut engine = Engine::new(
//!     RasterSurface::new(400, 300),
//!     FrameQueue::new(Instant::now()),
//!     FieldConfig::default(),
//! );
//!
//! engine.start();                       // pointer entered the card
//! if let Some(frame) = engine.scheduler_mut().take_frame() {
//!     engine.on_frame(frame);           // once per display refresh
//! }
//! engine.stop();                        // pointer left; clears after 300 ms
//! ```
//!
//! ## Core Concepts
//!
//! | Piece | Module | Role |
//! |-------|--------|------|
//! | [`Particle`], [`ParticleField`] | [`field`] | population sized by surface area |
//! | [`advance()`] | [`step`] | move and bounce, once per tick |
//! | [`render()`] | [`render`](mod@render) | clear, discs, then distance-faded links |
//! | [`Engine`] | [`lifecycle`] | start/stop/resize and the deferred clear |
//!
//! ## Density
//!
//! The particle count is `floor(width * height / density_divisor)` with a
//! default divisor of 11000, recomputed every time the surface is resized or the
//! engine is started. Connection search is all-pairs, which stays cheap at
//! those densities.

pub mod config;
mod error;
pub mod field;
pub mod lifecycle;
mod particle;
mod raster;
pub mod render;
pub mod scheduler;
mod spawn;
pub mod step;
pub mod surface;

pub use config::FieldConfig;
pub use error::{ConfigError, RasterError};
pub use field::{particle_count, ParticleField};
pub use glam::{Vec2, Vec4};
pub use lifecycle::{Engine, RunState};
pub use particle::Particle;
pub use raster::RasterSurface;
pub use render::{connection_opacity, connections, render, Connection, Style};
pub use scheduler::{FrameHandle, FrameQueue, Scheduler, TimerHandle};
pub use spawn::SpawnContext;
pub use step::advance;
pub use surface::{DisplayList, DrawCommand, DrawContext, Surface};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use cardfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::FieldConfig;
    pub use crate::lifecycle::{Engine, RunState};
    pub use crate::raster::RasterSurface;
    pub use crate::scheduler::{FrameQueue, Scheduler};
    pub use crate::surface::{DisplayList, DrawContext, Surface};
    pub use crate::{Vec2, Vec4};
}
