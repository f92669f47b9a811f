//! The abstract 2D drawing surface that effects render onto.

use ambient_protocol::{Colour, DrawCall};

/// Anything that can receive the draw calls of a frame.
///
/// Surfaces own their size. The engine only ever asks for it, it never decides it.
pub trait Surface {
    /// The current width and height.
    fn dimensions(&self) -> (u32, u32);

    /// Clear a rectangle back to full transparency.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    /// Draw a filled circle. The colour's alpha channel is the fill's opacity.
    fn fill_circle(&mut self, centre: (f32, f32), radius: f32, colour: Colour);
}

/// A surface that just remembers the draw calls that were made on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    /// Width of the viewport.
    width: u32,
    /// Height of the viewport.
    height: u32,
    /// Every draw call since the surface was created or last drained.
    calls: Vec<DrawCall>,
}

impl Recorder {
    /// Instantiate
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
        }
    }

    /// The viewport changed size.
    pub const fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// The draw calls made so far.
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Take the draw calls made so far, leaving the recorder empty.
    pub fn drain(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Surface for Recorder {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.calls.push(DrawCall::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_circle(&mut self, centre: (f32, f32), radius: f32, colour: Colour) {
        self.calls.push(DrawCall::FillCircle {
            centre,
            radius,
            colour,
        });
    }
}
