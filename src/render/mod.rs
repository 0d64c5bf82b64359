//! The rendering core.
//!
//! Everything in here works on a canonical 32-bit pixel layout
//! (see [`ALPHA_OFFSET`] and friends). A [`RenderInstance`] owns
//! the connection and converts finished pixel buffers into the
//! server's native layout right before they are uploaded.
//!
//! The pieces, leaf first:
//!
//! - [`color`]: interned, reference-counted server colors.
//! - [`mask`]: 1-bit stencils for button glyphs.
//! - [`font`]: core fonts, measurement and (shadowed) text.
//! - [`image`]: the content-addressed RGBA image cache, resizing and
//!   alpha compositing.
//! - [`gradient`]: background synthesis for a [`Surface`].
//! - [`appearance`]: the [`Appearance`] compositor tying it all together.

pub mod appearance;
pub mod color;
pub mod font;
pub mod gradient;
pub mod image;
pub mod instance;
pub mod mask;

#[doc(inline)]
pub use appearance::{
    Appearance, Bevel, Gradient, ImageLayer, Justify, LineArt, MaskLayer, Relief, RgbaLayer,
    Surface, TextLayer, TextureLayer,
};
#[doc(inline)]
pub use color::{parse_color_spec, Color, ColorTable};
#[doc(inline)]
pub use font::{Font, FontDescription, FontSlant, FontWeight, TextShadow};
#[doc(inline)]
pub use image::{draw_rgba, resize_image, Image, ImageCache, ImagePic};
#[doc(inline)]
pub use instance::{Format, RenderInstance};
#[doc(inline)]
pub use mask::{parse_xbm, PixmapMask};

/// Bit offset of the alpha channel in a canonical pixel.
pub const ALPHA_OFFSET: u32 = 24;
/// Bit offset of the red channel in a canonical pixel.
pub const RED_OFFSET: u32 = 16;
/// Bit offset of the green channel in a canonical pixel.
pub const GREEN_OFFSET: u32 = 8;
/// Bit offset of the blue channel in a canonical pixel.
pub const BLUE_OFFSET: u32 = 0;

/// An 8-bit per channel RGB triple.
pub type Rgb = (u8, u8, u8);

/// Packs channels into a canonical pixel.
#[inline]
pub const fn pack(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (a as u32) << ALPHA_OFFSET
        | (r as u32) << RED_OFFSET
        | (g as u32) << GREEN_OFFSET
        | (b as u32) << BLUE_OFFSET
}

/// Packs an opaque RGB triple into a canonical pixel.
#[inline]
pub const fn pack_rgb(rgb: Rgb) -> u32 {
    pack(rgb.0, rgb.1, rgb.2, 0xff)
}

/// Splits a canonical pixel into `(r, g, b, a)`.
#[inline]
pub const fn unpack(pixel: u32) -> (u8, u8, u8, u8) {
    (
        (pixel >> RED_OFFSET) as u8,
        (pixel >> GREEN_OFFSET) as u8,
        (pixel >> BLUE_OFFSET) as u8,
        (pixel >> ALPHA_OFFSET) as u8,
    )
}

/// A rectangle in pixel coordinates.
///
/// Width and height may be zero or negative after insetting,
/// in which case the rectangle is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl Rect {
    /// Creates a new rect.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the rect covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Shrinks the rect by the given margins.
    pub const fn inset(&self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: self.x + left,
            y: self.y + top,
            width: self.width - left - right,
            height: self.height - top - bottom,
        }
    }
}

/// Converts a pixel coordinate to the 16 bits the protocol carries.
pub(crate) fn coord(v: i32) -> crate::Result<i16> {
    i16::try_from(v).map_err(|_| crate::RenderError::Paint(format!("coordinate {} out of range", v)))
}
