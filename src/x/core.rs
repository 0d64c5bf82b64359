//! Core types for interfacing with the X server.
//!
//! This module defines the types exchanged between the rendering core and
//! an [`XConn`] implementation: resource IDs, the description of the
//! server's visual, font metrics, and the error type.

use core::ops::{Deref, DerefMut};
use std::fmt::{self, Display};

use thiserror::Error;
use strum::EnumIs;

#[doc(inline)]
pub use super::traits::XConn;

//* ========== X RESOURCE THINGS ========== *//

/// General constant for expressing None when passing X IDs.
pub const XID_NONE: Xid = Xid::zero();

/// Wrapper type to represent IDs used by the X server.
///
/// This is used by the server to identify all sorts
/// of resources, including windows, pixmaps, graphics
/// contexts and fonts.
///
/// ```rust
/// use toaru_render::x::Xid;
///
/// let id = Xid::from(69);
/// let val = id.val();
///
/// assert_eq!(val, 69);
/// ```
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash, Default)]
pub struct Xid(pub(crate) u32);

impl Xid {
    /// Return an Xid set to 0.
    pub const fn zero() -> Self {
        Xid(0)
    }

    /// Returns the internal value of the Xid.
    pub const fn val(&self) -> u32 {
        self.0
    }

    /// Whether this Xid refers to no resource at all.
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Xid {
    fn from(f: u32) -> Xid {
        Xid(f)
    }
}

impl Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Xid({})", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &u32 {
        &self.0
    }
}

impl DerefMut for Xid {
    fn deref_mut(&mut self) -> &mut u32 {
        &mut self.0
    }
}

/// An X server ID for a given window.
pub type XWindowID = Xid;

/// An X server ID for a pixmap (including depth-1 bitmaps).
pub type XPixmap = Xid;

/// An X server ID for a graphics context.
pub type XGcontext = Xid;

/// An X server ID for a core font.
pub type XFont = Xid;

//* ========== VISUALS ========== *//

/// The class of the visual used for decorations.
///
/// Only the classes the renderer knows how to fill are
/// represented; anything else is rejected at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum VisualClass {
    /// Pixels encode their color directly through channel masks.
    TrueColor,
    /// Pixels index into a writable colormap.
    PseudoColor,
    /// Pixels index into a read-only colormap.
    StaticColor,
}

/// Byte or bit ordering used by the server for image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
pub enum ImageOrder {
    /// Least significant byte (or bit) first.
    LsbFirst,
    /// Most significant byte (or bit) first.
    MsbFirst,
}

/// Everything the renderer needs to know about the server's
/// default visual to produce image data it will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualInfo {
    /// The depth of the visual.
    pub depth: u8,
    /// The class of the visual.
    pub class: VisualClass,
    /// The red channel mask (TrueColor only).
    pub red_mask: u32,
    /// The green channel mask (TrueColor only).
    pub green_mask: u32,
    /// The blue channel mask (TrueColor only).
    pub blue_mask: u32,
    /// Bits per pixel of ZPixmap images at this depth.
    pub bits_per_pixel: u8,
    /// Scanline padding, in bits, of ZPixmap images at this depth.
    pub scanline_pad: u8,
    /// Byte order of image data.
    pub byte_order: ImageOrder,
    /// Bit order of bitmap (depth 1) data.
    pub bitmap_bit_order: ImageOrder,
    /// Scanline padding, in bits, of bitmap data.
    pub bitmap_pad: u8,
}

impl VisualInfo {
    /// The 24-bit TrueColor visual found on almost every modern server.
    pub const fn truecolor_24() -> Self {
        Self {
            depth: 24,
            class: VisualClass::TrueColor,
            red_mask: 0xff0000,
            green_mask: 0x00ff00,
            blue_mask: 0x0000ff,
            bits_per_pixel: 32,
            scanline_pad: 32,
            byte_order: ImageOrder::LsbFirst,
            bitmap_bit_order: ImageOrder::LsbFirst,
            bitmap_pad: 32,
        }
    }

    /// Number of bytes in one scanline of a ZPixmap `width` pixels wide.
    pub fn bytes_per_line(&self, width: usize) -> usize {
        pad_line(width * self.bits_per_pixel as usize, self.scanline_pad)
    }

    /// Number of bytes in one scanline of a bitmap `width` pixels wide.
    pub fn bitmap_bytes_per_line(&self, width: usize) -> usize {
        pad_line(width, self.bitmap_pad)
    }
}

#[inline]
fn pad_line(bits: usize, pad: u8) -> usize {
    let pad = (pad.max(8)) as usize;
    bits.div_ceil(pad) * pad / 8
}

//* ========== FONTS ========== *//

/// Metrics of a core font opened on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontInfo {
    /// The server-side font ID.
    pub fid: XFont,
    /// Distance from the baseline to the top of the tallest glyph.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the lowest glyph.
    pub descent: i32,
}

//* ========== ERRORS ========== *//

/// An error returned by an [`XConn`] implementation.
#[non_exhaustive]
#[derive(Debug, Clone, Error)]
pub enum XError {
    /// An error when establishing a connection with the server.
    #[error("X connection error: {0}")]
    Connection(String),

    /// An error caused by a malformed protocol request.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No screens were found on the server.
    #[error("Could not find screens from X server")]
    NoScreens,

    /// The default visual is not one the renderer supports.
    #[error("Unsupported visual: {0}")]
    UnsupportedVisual(String),

    /// The server refused to allocate a color.
    #[error("Could not allocate color: {0}")]
    Color(String),

    /// The server could not open a font.
    #[error("Could not open font: {0}")]
    Font(String),

    /// An internal server error.
    #[error("X server error: {0}")]
    ServerError(String),

    /// The request could not be fulfilled by the X server.
    #[error("Could not complete specified request: {0}")]
    RequestError(&'static str),

    /// Some error not tracked by this crate.
    #[error("{0}")]
    OtherError(String),
}

/// The result type returned by [`XConn`] methods.
pub type Result<T> = ::core::result::Result<T, XError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_line_padding() {
        let vis = VisualInfo::truecolor_24();
        assert_eq!(vis.bytes_per_line(3), 12);

        let vis16 = VisualInfo {
            bits_per_pixel: 16,
            ..vis
        };
        // 3 px * 16 bits = 48 bits, padded to 64
        assert_eq!(vis16.bytes_per_line(3), 8);

        // 7 px bitmap padded to 32 bits
        assert_eq!(vis.bitmap_bytes_per_line(7), 4);
    }
}
