//! These are all the types needed to drive an Ambient effect from the outside, and to consume the
//! frames that it produces.

#![expect(clippy::pub_use, reason = "This seems to come from the `bon` crate")]

/// An RGBA colour. Each channel is between 0.0 and 1.0.
pub type Colour = (f32, f32, f32, f32);

/// A single draw call against an abstract 2D drawing surface.
///
/// A frame is an ordered list of these. Replaying them in order onto a blank surface reproduces
/// the frame.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DrawCall {
    /// Clear a rectangle back to full transparency.
    ClearRect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width of the cleared area.
        width: f32,
        /// Height of the cleared area.
        height: f32,
    },
    /// A filled circle. The alpha channel of the colour is the fill's opacity.
    FillCircle {
        /// Centre of the circle. [0, 0] is in the top-left.
        centre: (f32, f32),
        /// Radius of the circle.
        radius: f32,
        /// Fill colour.
        colour: Colour,
    },
}

/// Output that renders pixels in the terminal.
#[derive(serde::Serialize, serde::Deserialize, bon::Builder, Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct Pixel {
    /// The coordinates of the pixel. [0, 0] is in the top-left. The y-axis is twice as long as the
    /// number of rows in the terminal because 2 "pixels" can fit in a single TTY cell using the
    /// UTF8 half-block trick: ▀▄▀▄
    pub coordinates: (u32, u32),
    /// An optional colour for the pixel. If `None` (or `null` in the case of JSON) is used then
    /// the default foreground colour is used.
    pub color: Option<Colour>,
}

/// The various kinds of messages that can be sent to a running effect.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum InputMessages {
    /// The pointer moved. Every one of these spawns a new batch of particles.
    PointerMove {
        /// Horizontal position of the pointer.
        x: f32,
        /// Vertical position of the pointer.
        y: f32,
    },
    /// Sent whenever the viewport resizes.
    Resize {
        /// The width of the new viewport.
        width: u16,
        /// The height of the new viewport.
        height: u16,
    },
    /// Stop the effect. No more frames are produced after this.
    Stop,
}

/// All the message kinds that a running effect can send out.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum OutputMessages {
    /// A complete frame as a list of draw calls.
    OutputDrawCalls(Vec<DrawCall>),

    /// A complete frame rasterised into terminal pixels. Empty pixels are not included.
    OutputPixels(Vec<Pixel>),

    /// A line of text, used for the guest log and the kitchen ticker.
    OutputText {
        /// The text to display.
        text: String,
        /// The coordinates. [0, 0] is in the top-left.
        coordinates: (u32, u32),
        /// An optional colour for the text's foreground.
        fg: Option<Colour>,
    },
}
