//! Interned, reference-counted display colors.
//!
//! Every color the renderer uses is allocated on the server through
//! a [`ColorTable`]. The table interns colors by their RGB triple, so
//! two handles to the same triple always share one server pixel.
//!
//! A [`Color`] is a cheap `Rc` handle. The table keeps one handle of
//! its own for each entry; when a released handle was the last one
//! outside the table, the entry is evicted and the server pixel freed.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use super::{pack_rgb, Rgb};
use crate::x::{XConn, XGcontext};
use crate::{RenderError, Result};

#[derive(Debug)]
struct ColorData {
    r: u8,
    g: u8,
    b: u8,
    pixel: u32,
    gc: Cell<Option<XGcontext>>,
}

/// A color allocated on the display server.
///
/// Obtained from [`RenderInstance::acquire_color`][1] or
/// [`RenderInstance::parse_color`][2], and returned with
/// [`RenderInstance::release_color`][3].
///
/// [1]: crate::render::RenderInstance::acquire_color
/// [2]: crate::render::RenderInstance::parse_color
/// [3]: crate::render::RenderInstance::release_color
#[derive(Clone)]
pub struct Color(Rc<ColorData>);

impl Color {
    fn new(r: u8, g: u8, b: u8, pixel: u32) -> Self {
        Self(Rc::new(ColorData {
            r,
            g,
            b,
            pixel,
            gc: Cell::new(None),
        }))
    }

    /// A color that was never allocated on a server.
    #[cfg(test)]
    pub(crate) fn unmanaged(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, pack_rgb((r, g, b)))
    }

    /// The red channel.
    pub fn r(&self) -> u8 {
        self.0.r
    }

    /// The green channel.
    pub fn g(&self) -> u8 {
        self.0.g
    }

    /// The blue channel.
    pub fn b(&self) -> u8 {
        self.0.b
    }

    /// All three channels.
    pub fn rgb(&self) -> Rgb {
        (self.0.r, self.0.g, self.0.b)
    }

    /// The server pixel value.
    pub fn pixel(&self) -> u32 {
        self.0.pixel
    }

    /// The color as an opaque canonical pixel.
    pub fn pixel32(&self) -> u32 {
        pack_rgb(self.rgb())
    }

    /// The bevel highlight for this color.
    pub fn lightened(&self) -> Rgb {
        lighten(self.rgb())
    }

    /// The bevel shadow for this color.
    pub fn darkened(&self) -> Rgb {
        darken(self.rgb())
    }

    /// Whether two handles refer to the same interned color.
    pub fn ptr_eq(a: &Color, b: &Color) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Color(#{:02x}{:02x}{:02x}, pixel {:#x})",
            self.0.r, self.0.g, self.0.b, self.0.pixel
        )
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        self.rgb() == other.rgb()
    }
}

impl Eq for Color {}

/// `c + c/2`, saturating.
#[inline]
pub const fn lighten_channel(c: u8) -> u8 {
    let v = c as u32 + (c as u32 >> 1);
    if v > 0xff { 0xff } else { v as u8 }
}

/// `c/2 + c/4`.
#[inline]
pub const fn darken_channel(c: u8) -> u8 {
    (c >> 1) + (c >> 2)
}

/// Lightens every channel of a triple.
pub const fn lighten(rgb: Rgb) -> Rgb {
    (lighten_channel(rgb.0), lighten_channel(rgb.1), lighten_channel(rgb.2))
}

/// Darkens every channel of a triple.
pub const fn darken(rgb: Rgb) -> Rgb {
    (darken_channel(rgb.0), darken_channel(rgb.1), darken_channel(rgb.2))
}

/// The table of every color currently allocated on the server.
#[derive(Debug, Default)]
pub struct ColorTable {
    table: HashMap<Rgb, Color>,
}

impl ColorTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the color `(r, g, b)`, allocating it if
    /// it is not already interned.
    pub fn acquire<X: XConn>(&mut self, conn: &X, r: u8, g: u8, b: u8) -> Result<Color> {
        if let Some(color) = self.table.get(&(r, g, b)) {
            return Ok(color.clone());
        }

        let pixel = conn.alloc_color(r, g, b).map_err(|e| {
            warn!("could not allocate color ({}, {}, {}): {}", r, g, b, e);
            RenderError::ColorAlloc(r, g, b)
        })?;
        trace!("allocated color ({}, {}, {}) as pixel {:#x}", r, g, b, pixel);

        let color = Color::new(r, g, b, pixel);
        self.table.insert((r, g, b), color.clone());
        Ok(color)
    }

    /// Returns a handle, freeing the server color if it was the last
    /// one outside the table.
    ///
    /// Handles that are not interned here (already evicted by
    /// [`clear`](Self::clear)) are simply dropped.
    pub fn release<X: XConn>(&mut self, conn: &X, color: Color) -> Result<()> {
        let key = color.rgb();
        let interned = match self.table.get(&key) {
            Some(c) if Color::ptr_eq(c, &color) => c,
            _ => return Ok(()),
        };
        drop(color);

        if Rc::strong_count(&interned.0) > 1 {
            return Ok(());
        }

        if let Some(color) = self.table.remove(&key) {
            Self::free_color(conn, &color)?;
        }
        Ok(())
    }

    /// Returns the drawing context for `color`, creating it on first use.
    pub fn gc<X: XConn>(&self, conn: &X, color: &Color) -> Result<XGcontext> {
        if let Some(gc) = color.0.gc.get() {
            return Ok(gc);
        }
        let gc = conn.create_gc(color.pixel())?;
        color.0.gc.set(Some(gc));
        Ok(gc)
    }

    /// The number of interned colors.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no colors are interned.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Frees every interned color, live handles or not.
    pub fn clear<X: XConn>(&mut self, conn: &X) -> Result<()> {
        if !self.table.is_empty() {
            debug!("freeing {} interned colors", self.table.len());
        }
        let mut freed = Ok(());
        for (_, color) in self.table.drain() {
            freed = freed.and(Self::free_color(conn, &color));
        }
        freed
    }

    fn free_color<X: XConn>(conn: &X, color: &Color) -> Result<()> {
        trace!("freeing color {:?}", color);
        let gc = match color.0.gc.take() {
            Some(gc) => conn.free_gc(gc),
            None => Ok(()),
        };
        let pixel = conn.free_color(color.pixel());
        gc.and(pixel)?;
        Ok(())
    }
}

/// Parses a numeric color specification.
///
/// Accepted forms are `#rgb`, `#rrggbb`, `#rrrgggbbb`, `#rrrrggggbbbb`
/// and `rgb:r/g/b` with one to four hex digits per channel. In the
/// `#` forms the digits given are the most significant bits of each
/// channel; in the `rgb:` form they are scaled to the full range.
///
/// Returns `None` for anything else, including color names.
pub fn parse_color_spec(spec: &str) -> Option<Rgb> {
    let spec = spec.trim();

    if let Some(hex) = spec.strip_prefix('#') {
        let len = hex.len();
        if !matches!(len, 3 | 6 | 9 | 12) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let digits = len / 3;
        let channel = |i: usize| -> Option<u8> {
            let v = u16::from_str_radix(&hex[i * digits..(i + 1) * digits], 16).ok()?;
            // left-align into 16 bits, then keep the top 8
            Some(((v << (16 - 4 * digits as u32)) >> 8) as u8)
        };
        return Some((channel(0)?, channel(1)?, channel(2)?));
    }

    if let Some(rest) = spec.strip_prefix("rgb:") {
        let mut parts = rest.split('/');
        let mut channel = || -> Option<u8> {
            let part = parts.next()?;
            if part.is_empty() || part.len() > 4 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let v = u32::from_str_radix(part, 16).ok()?;
            let max = (1u32 << (4 * part.len())) - 1;
            Some((v * 0xffff / max >> 8) as u8)
        };
        let rgb = (channel()?, channel()?, channel()?);
        if parts.next().is_some() {
            return None;
        }
        return Some(rgb);
    }

    None
}
