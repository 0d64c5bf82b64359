//! 1-bit stencils used to draw button glyphs and menu bullets.
//!
//! Mask bits are kept the way XBM files store them: rows of
//! LSB-first bits, each row padded to a whole byte. A set bit
//! is drawn in the foreground color, an unset bit leaves the
//! background alone.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::color::Color;
use super::instance::RenderInstance;
use super::{coord, Rect};
use crate::x::{XConn, XPixmap};
use crate::{RenderError, Result};

/// A bitmap mask uploaded to the server as a stencil.
#[derive(Debug, PartialEq, Eq)]
pub struct PixmapMask {
    width: u16,
    height: u16,
    data: Vec<u8>,
    stencil: XPixmap,
}

/// The number of bytes in one row of mask bits.
#[inline]
pub(crate) fn row_bytes(width: u16) -> usize {
    (width as usize).div_ceil(8)
}

impl PixmapMask {
    /// Creates a mask from rows of LSB-first bits.
    pub fn new<X: XConn>(inst: &RenderInstance<X>, width: u16, height: u16, bits: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::MaskLoad(format!(
                "mask has no area ({}x{})",
                width, height
            )));
        }
        let len = row_bytes(width) * height as usize;
        if bits.len() < len {
            return Err(RenderError::MaskLoad(format!(
                "{} bytes of bits for a {}x{} mask",
                bits.len(),
                width,
                height
            )));
        }
        let data = bits[..len].to_vec();
        let stencil = inst.conn().create_bitmap(width, height, &data)?;
        Ok(Self {
            width,
            height,
            data,
            stencil,
        })
    }

    /// Creates a mask from the text of an XBM file.
    pub fn from_xbm<X: XConn>(inst: &RenderInstance<X>, text: &str) -> Result<Self> {
        let (width, height, bits) = parse_xbm(text)?;
        Self::new(inst, width, height, &bits)
    }

    /// Reads and uploads an XBM file.
    pub fn load<X: XConn, P: AsRef<Path>>(inst: &RenderInstance<X>, path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| RenderError::MaskLoad(format!("{}: {}", path.display(), e)))?;
        let mask = Self::from_xbm(inst, &text)
            .map_err(|e| RenderError::MaskLoad(format!("{}: {}", path.display(), e)))?;
        debug!("loaded {}x{} mask from {}", mask.width, mask.height, path.display());
        Ok(mask)
    }

    /// Duplicates the mask with a stencil of its own.
    pub fn copy<X: XConn>(&self, inst: &RenderInstance<X>) -> Result<Self> {
        Self::new(inst, self.width, self.height, &self.data)
    }

    /// Frees the server-side stencil.
    pub fn free<X: XConn>(self, inst: &RenderInstance<X>) -> Result<()> {
        inst.conn().free_pixmap(self.stencil)?;
        Ok(())
    }

    /// Fills the set bits of the mask with `color`, centred in `area`.
    ///
    /// A mask larger than the area is pinned to the area's top-left
    /// corner rather than pushed out of it.
    pub fn draw<X: XConn>(
        &self,
        inst: &RenderInstance<X>,
        drawable: XPixmap,
        color: &Color,
        area: Rect,
    ) -> Result<()> {
        let (x, y) = self.origin(area);

        let gc = inst.color_gc(color)?;
        inst.conn().fill_masked(
            drawable,
            gc,
            self.stencil,
            coord(x)?,
            coord(y)?,
            self.width,
            self.height,
        )?;
        Ok(())
    }

    /// Where the mask's top-left corner goes when centred in `area`.
    pub(crate) fn origin(&self, area: Rect) -> (i32, i32) {
        let x = area.x + ((area.width - self.width as i32) / 2).max(0);
        let y = area.y + ((area.height - self.height as i32) / 2).max(0);
        (x, y)
    }

    /// Width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The mask bits.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The server-side stencil.
    pub fn stencil(&self) -> XPixmap {
        self.stencil
    }

    /// Whether the bit at `(x, y)` is set.
    pub fn is_set(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y as usize * row_bytes(self.width) + x as usize / 8];
        byte >> (x % 8) & 1 == 1
    }
}

/// Parses the text of an XBM file into `(width, height, bits)`.
///
/// Only the `_width` and `_height` defines and the bits array are
/// read; hotspot defines are ignored.
pub fn parse_xbm(text: &str) -> Result<(u16, u16, Vec<u8>)> {
    let bad = |msg: &str| RenderError::MaskLoad(msg.into());

    let mut width = None;
    let mut height = None;
    for line in text.lines() {
        let mut words = line.split_whitespace();
        if words.next() != Some("#define") {
            continue;
        }
        let (Some(name), Some(value)) = (words.next(), words.next()) else {
            continue;
        };
        if name.ends_with("_width") {
            width = value.parse::<u16>().ok();
        } else if name.ends_with("_height") {
            height = value.parse::<u16>().ok();
        }
    }
    let width = width.ok_or_else(|| bad("missing or invalid width"))?;
    let height = height.ok_or_else(|| bad("missing or invalid height"))?;

    let start = text.find('{').ok_or_else(|| bad("missing bits array"))?;
    let end = text[start..]
        .find('}')
        .map(|i| start + i)
        .ok_or_else(|| bad("unterminated bits array"))?;

    let mut bits = Vec::new();
    for token in text[start + 1..end].split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let hex = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .ok_or_else(|| RenderError::MaskLoad(format!("bad byte {:?}", token)))?;
        let byte = u8::from_str_radix(hex, 16)
            .map_err(|_| RenderError::MaskLoad(format!("bad byte {:?}", token)))?;
        bits.push(byte);
    }

    let len = row_bytes(width) * height as usize;
    if bits.len() < len {
        return Err(RenderError::MaskLoad(format!(
            "{} bytes of bits for a {}x{} mask",
            bits.len(),
            width,
            height
        )));
    }
    bits.truncate(len);
    Ok((width, height, bits))
}
