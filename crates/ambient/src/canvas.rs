//! A software raster for drawing effects in a terminal.
//!
//! Each terminal cell holds 2 vertically stacked "pixels" using the UTF8 half-block trick: ▀▄
//! So a canvas for an 80x24 terminal is 80x48 pixels.

use ambient_protocol::{Colour, Pixel};
use palette::blend::Blend as _;

use crate::surface::Surface;

/// A fully transparent pixel.
const TRANSPARENT: Colour = (0.0, 0.0, 0.0, 0.0);

/// The largest width or height of a canvas, in pixels. Bigger sizes are clamped to this.
pub const MAX_CANVAS_SIDE: u32 = 4096;

/// `Canvas`
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Width in pixels.
    width: u32,
    /// Height in pixels. Twice the number of terminal rows.
    height: u32,
    /// Row-major RGBA pixels.
    pixels: Vec<palette::Srgba>,
}

impl Canvas {
    /// A blank canvas with the given size in pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        };
        canvas.resize(width, height);
        canvas
    }

    /// A blank canvas that covers a terminal of the given size in cells.
    #[must_use]
    pub fn for_terminal(columns: u16, rows: u16) -> Self {
        Self::new(columns.into(), u32::from(rows) * 2)
    }

    /// Change the size of the canvas. All its contents are lost. Each side is clamped to
    /// [`MAX_CANVAS_SIDE`].
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
            tracing::warn!(
                "Canvas of {width}x{height} is too big, clamping each side to {MAX_CANVAS_SIDE}"
            );
        }
        self.width = width.min(MAX_CANVAS_SIDE);
        self.height = height.min(MAX_CANVAS_SIDE);
        let length = usize::try_from(u64::from(self.width) * u64::from(self.height)).unwrap_or(0);
        self.pixels = vec![Self::to_palette(TRANSPARENT); length];
    }

    /// The colour of a single pixel.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Colour> {
        let index = self.index(x, y)?;
        self.pixels.get(index).map(|pixel| pixel.into_components())
    }

    /// All the pixels that aren't fully transparent.
    #[must_use]
    pub fn pixels(&self) -> Vec<Pixel> {
        let mut output = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let Some(colour) = self.get(x, y) else {
                    continue;
                };
                if colour.3 <= 0.0 {
                    continue;
                }
                output.push(Pixel::builder().coordinates((x, y)).color(colour).build());
            }
        }
        output
    }

    /// Position in the pixel buffer.
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = u64::from(y) * u64::from(self.width) + u64::from(x);
        usize::try_from(index).ok()
    }

    /// Convert our simple tuple into something that the `palette` crate can blend.
    fn to_palette(colour: Colour) -> palette::Srgba {
        palette::Srgba::from_components(colour)
    }

    /// The range of whole pixels that overlap `start..end`, clamped to `0..limit`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::as_conversions,
        reason = "The values are clamped to the canvas before casting"
    )]
    fn pixel_span(start: f32, end: f32, limit: u32) -> std::ops::Range<u32> {
        if !start.is_finite() || !end.is_finite() {
            return 0..0;
        }
        let max = f64::from(limit);
        let first = f64::from(start).floor().clamp(0.0, max) as u32;
        let last = f64::from(end).ceil().clamp(0.0, max) as u32;
        first..last
    }
}

impl Surface for Canvas {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let columns = Self::pixel_span(x, x + width, self.width);
        let rows = Self::pixel_span(y, y + height, self.height);
        for row in rows {
            for column in columns.clone() {
                if let Some(index) = self.index(column, row) {
                    if let Some(pixel) = self.pixels.get_mut(index) {
                        *pixel = Self::to_palette(TRANSPARENT);
                    }
                }
            }
        }
    }

    /// Cover every pixel whose centre is within the circle. Tiny circles still cover the pixel
    /// that their centre is in. Overlapping colours are combined with a screen blend, so that
    /// embers brighten each other rather than hiding each other.
    fn fill_circle(&mut self, centre: (f32, f32), radius: f32, colour: Colour) {
        if !radius.is_finite() || colour.3 <= 0.0 {
            return;
        }
        let radius = radius.max(0.0);
        let source = Self::to_palette(colour);

        let columns = Self::pixel_span(centre.0 - radius, centre.0 + radius, self.width);
        let rows = Self::pixel_span(centre.1 - radius, centre.1 + radius, self.height);
        let centre_pixel = (centre.0.floor(), centre.1.floor());

        for row in rows {
            for column in columns.clone() {
                #[expect(
                    clippy::cast_precision_loss,
                    clippy::as_conversions,
                    reason = "Canvas sizes are far below the precision limits of f32"
                )]
                let (column_f32, row_f32) = (column as f32, row as f32);

                #[expect(
                    clippy::float_cmp,
                    reason = "Both sides are whole numbers produced by `floor()`"
                )]
                let is_centre_pixel = column_f32 == centre_pixel.0 && row_f32 == centre_pixel.1;
                let dx = column_f32 + 0.5 - centre.0;
                let dy = row_f32 + 0.5 - centre.1;
                let is_inside = dx.hypot(dy) <= radius;
                if !is_inside && !is_centre_pixel {
                    continue;
                }

                if let Some(index) = self.index(column, row) {
                    if let Some(pixel) = self.pixels.get_mut(index) {
                        *pixel = source.screen(*pixel);
                    }
                }
            }
        }
    }
}
