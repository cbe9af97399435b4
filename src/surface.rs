//! Drawing surface abstraction.
//!
//! The engine draws through the three primitives a 2D canvas context offers:
//! clearing, filled circles, and stroked lines. A [`Surface`] owns one such
//! context and reports its pixel size; it may have no context at all (e.g. the
//! host has not attached one yet), in which case the engine draws nothing and
//! refuses to start ticking.
//!
//! Two surfaces ship with the crate: [`RasterSurface`](crate::RasterSurface), a
//! software canvas, and [`DisplayList`], which records commands for hosts that
//! replay them onto their own canvas API.

use glam::{Vec2, Vec4};

/// The immediate-mode drawing primitives the renderer needs.
///
/// Colors are straight (non-premultiplied) RGBA in `0.0..=1.0`.
pub trait DrawContext {
    /// Reset every pixel of the surface to transparent.
    fn clear(&mut self);

    /// Fill a disc.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4);

    /// Stroke a straight segment.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Vec4, width: f32);
}

/// A drawable rectangle owned by the host.
pub trait Surface {
    type Context: DrawContext;

    /// Current size in pixels as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Match the pixel size to the host element. Previous contents may be lost.
    fn set_size(&mut self, width: u32, height: u32);

    /// The drawing context, or `None` when drawing is unavailable.
    fn context(&mut self) -> Option<&mut Self::Context>;
}

/// A single recorded drawing call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Vec4,
    },
    StrokeLine {
        from: Vec2,
        to: Vec2,
        color: Vec4,
        width: f32,
    },
}

/// A surface that records drawing calls instead of rasterizing them.
///
/// Commands accumulate until [`take`](DisplayList::take) drains them. The list
/// never trims itself: a host driving a running engine must `take` once per
/// frame and replay the batch onto its own canvas, or memory grows with every
/// tick. A detached list models a missing context.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    width: u32,
    height: u32,
    attached: bool,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    /// A recording surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            attached: true,
            commands: Vec::new(),
        }
    }

    /// A surface of the given size with no drawing context.
    pub fn detached(width: u32, height: u32) -> Self {
        Self {
            attached: false,
            ..Self::new(width, height)
        }
    }

    /// Attach or detach the drawing context, as when the host element's
    /// canvas goes away and comes back.
    pub fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Commands recorded since the most recent `Clear`, or all of them if none.
    pub fn last_frame(&self) -> &[DrawCommand] {
        match self.commands.iter().rposition(|c| *c == DrawCommand::Clear) {
            Some(i) => &self.commands[i + 1..],
            None => &self.commands,
        }
    }
}

impl DrawContext for DisplayList {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Vec4) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Vec4, width: f32) {
        self.commands.push(DrawCommand::StrokeLine {
            from,
            to,
            color,
            width,
        });
    }
}

impl Surface for DisplayList {
    type Context = Self;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn context(&mut self) -> Option<&mut Self> {
        if self.attached {
            Some(self)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut list = DisplayList::new(10, 10);
        let ctx = list.context().unwrap();
        ctx.clear();
        ctx.fill_circle(Vec2::ONE, 2.0, Vec4::ONE);
        ctx.stroke_line(Vec2::ZERO, Vec2::ONE, Vec4::ONE, 1.0);

        let commands = list.take();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0], DrawCommand::Clear);
        assert!(matches!(commands[1], DrawCommand::FillCircle { radius, .. } if radius == 2.0));
        assert!(list.commands().is_empty());
    }

    #[test]
    fn test_last_frame() {
        let mut list = DisplayList::new(10, 10);
        list.clear();
        list.fill_circle(Vec2::ONE, 1.0, Vec4::ONE);
        list.clear();
        list.fill_circle(Vec2::ZERO, 1.0, Vec4::ONE);
        assert_eq!(list.last_frame().len(), 1);
    }

    #[test]
    fn test_detached_has_no_context() {
        let mut list = DisplayList::detached(20, 30);
        assert_eq!(list.size(), (20, 30));
        assert!(list.context().is_none());
    }
}
