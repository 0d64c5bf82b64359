//! Core fonts: opening, measuring and drawing text.
//!
//! Fonts are described by a [`FontDescription`], which is turned into
//! an XLFD pattern and handed to the server. Metrics are read once at
//! open time and cached in the shared [`Font`] handle.

use std::fmt;
use std::rc::Rc;

use strum::*;
use tracing::{debug, warn};

use super::appearance::{Justify, TextLayer};
use super::instance::RenderInstance;
use super::{coord, pack_rgb, unpack, Rect};
use crate::x::{FontInfo, XConn, XFont, XPixmap};
use crate::{RenderError, Result};

/// The family a font falls back to when its own cannot be opened.
pub const FALLBACK_FAMILY: &str = "sans";

/// Appended to text that had to be cut short to fit.
pub const ELLIPSIS: &str = "...";

/// Space left free on each side of drawn text.
const TEXT_MARGIN: i32 = 2;

/// The weight of a font.
#[derive(AsRefStr, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[strum(ascii_case_insensitive)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    #[strum(serialize = "normal")]
    Normal,
    /// Bold weight.
    #[strum(serialize = "bold")]
    Bold,
}

/// The slant of a font.
#[derive(AsRefStr, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[strum(ascii_case_insensitive)]
pub enum FontSlant {
    /// Upright.
    #[default]
    #[strum(serialize = "normal")]
    Normal,
    /// Italic.
    #[strum(serialize = "italic")]
    Italic,
    /// Oblique.
    #[strum(serialize = "oblique")]
    Oblique,
}

/// Everything needed to open a font.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontDescription {
    /// The font family, e.g. `"dejavu sans"`.
    pub family: String,
    /// Size in points.
    pub size: u32,
    /// Weight.
    pub weight: FontWeight,
    /// Slant.
    pub slant: FontSlant,
    /// Whether text drawn in this font has a drop shadow.
    pub shadow: bool,
    /// Distance of the shadow from the text, in both directions.
    pub shadow_offset: i32,
    /// Shadow strength from -100 (white) to 100 (black).
    pub shadow_tint: i32,
}

impl Default for FontDescription {
    fn default() -> Self {
        Self {
            family: FALLBACK_FAMILY.into(),
            size: 8,
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
            shadow: false,
            shadow_offset: 1,
            shadow_tint: 50,
        }
    }
}

impl FontDescription {
    /// Creates a description with no shadow.
    pub fn new<S: Into<String>>(family: S, size: u32, weight: FontWeight, slant: FontSlant) -> Self {
        Self {
            family: family.into(),
            size,
            weight,
            slant,
            ..Self::default()
        }
    }

    /// The XLFD pattern the server is asked for.
    pub fn xlfd(&self) -> String {
        let weight = match self.weight {
            FontWeight::Normal => "medium",
            FontWeight::Bold => "bold",
        };
        let slant = match self.slant {
            FontSlant::Normal => "r",
            FontSlant::Italic => "i",
            FontSlant::Oblique => "o",
        };
        format!(
            "-*-*{}*-{}-{}-normal--*-{}-*-*-*-*-iso10646-1",
            self.family.to_lowercase(),
            weight,
            slant,
            self.size * 10,
        )
    }

    /// The shadow text in this font should be drawn with, if any.
    ///
    /// A positive tint gives a black shadow, a negative tint a white
    /// one, at `|tint|` percent opacity.
    pub fn text_shadow(&self) -> Option<TextShadow> {
        if !self.shadow || self.shadow_tint == 0 {
            return None;
        }
        let tint = self.shadow_tint.clamp(-100, 100);
        let color = if tint > 0 { (0, 0, 0) } else { (255, 255, 255) };
        Some(TextShadow {
            color,
            alpha: (tint.unsigned_abs() * 255 / 100) as u8,
            offset: self.shadow_offset,
        })
    }

    fn shadow_margin(&self) -> i32 {
        if self.shadow {
            self.shadow_offset.abs()
        } else {
            0
        }
    }
}

/// A drop shadow drawn under text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextShadow {
    /// The shadow color.
    pub color: (u8, u8, u8),
    /// Opacity of the shadow over the background.
    pub alpha: u8,
    /// Offset of the shadow in both directions.
    pub offset: i32,
}

struct FontData {
    desc: FontDescription,
    info: FontInfo,
}

/// An open core font.
///
/// Handles are cheap to clone and share one server font. The font is
/// closed by [`close`](Self::close) on the last handle.
#[derive(Clone)]
pub struct Font(Rc<FontData>);

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.0.desc.family)
            .field("size", &self.0.desc.size)
            .field("fid", &self.0.info.fid)
            .finish()
    }
}

impl Font {
    /// Opens a font, retrying once with the fallback family.
    pub fn open<X: XConn>(inst: &RenderInstance<X>, desc: &FontDescription) -> Result<Self> {
        let info = match inst.conn().open_font(&desc.xlfd()) {
            Ok(info) => info,
            Err(e) if desc.family != FALLBACK_FAMILY => {
                warn!("could not open font {:?}: {}, trying {}", desc.family, e, FALLBACK_FAMILY);
                let fallback = FontDescription {
                    family: FALLBACK_FAMILY.into(),
                    ..desc.clone()
                };
                inst.conn()
                    .open_font(&fallback.xlfd())
                    .map_err(|e| RenderError::FontOpen(format!("{}: {}", desc.family, e)))?
            }
            Err(e) => return Err(RenderError::FontOpen(format!("{}: {}", desc.family, e))),
        };
        debug!("opened font {} (ascent {}, descent {})", desc.xlfd(), info.ascent, info.descent);

        Ok(Self(Rc::new(FontData {
            desc: desc.clone(),
            info,
        })))
    }

    /// The description the font was opened from.
    pub fn description(&self) -> &FontDescription {
        &self.0.desc
    }

    /// The server-side font ID.
    pub fn fid(&self) -> XFont {
        self.0.info.fid
    }

    /// Pixels above the baseline.
    pub fn ascent(&self) -> i32 {
        self.0.info.ascent
    }

    /// Pixels below the baseline.
    pub fn descent(&self) -> i32 {
        self.0.info.descent
    }

    /// The line height, including the shadow offset if the font has one.
    pub fn height(&self) -> i32 {
        self.0.info.ascent + self.0.info.descent + self.0.desc.shadow_margin()
    }

    /// The space `text` needs, margins and shadow included.
    pub fn measure_string<X: XConn>(&self, inst: &RenderInstance<X>, text: &str) -> Result<(i32, i32)> {
        let width = inst.conn().text_width(self.fid(), text)?;
        Ok((width + self.0.desc.shadow_margin() + TEXT_MARGIN * 2, self.height()))
    }

    /// Whether two handles share one server font.
    pub fn ptr_eq(a: &Font, b: &Font) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Drops a handle, closing the server font if it was the last one.
    pub fn close<X: XConn>(self, inst: &RenderInstance<X>) -> Result<()> {
        if let Ok(data) = Rc::try_unwrap(self.0) {
            inst.conn().close_font(data.info.fid)?;
            debug!("closed font {}", data.desc.family);
        }
        Ok(())
    }

    /// Cuts `text` down to the longest prefix that, with an ellipsis,
    /// fits in `width` pixels.
    fn ellipsize<X: XConn>(&self, inst: &RenderInstance<X>, text: &str, width: i32) -> Result<String> {
        let conn = inst.conn();
        if conn.text_width(self.fid(), text)? <= width {
            return Ok(text.to_string());
        }

        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let candidate = |n: usize| format!("{}{}", &text[..bounds[n]], ELLIPSIS);

        if conn.text_width(self.fid(), ELLIPSIS)? > width {
            return Ok(String::new());
        }

        // widths grow with the prefix, so search for the longest fit
        let (mut lo, mut hi) = (0, bounds.len());
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if conn.text_width(self.fid(), &candidate(mid))? <= width {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(candidate(lo))
    }
}

/// Draws a text layer into `drawable`, inside `area`.
///
/// `background` is the already rendered pixel buffer of the drawable,
/// `bg_width` pixels wide; the shadow color is blended over it.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_text<X: XConn>(
    inst: &RenderInstance<X>,
    drawable: XPixmap,
    layer: &TextLayer,
    background: &[u32],
    bg_width: usize,
    bg_height: usize,
    area: Rect,
) -> Result<()> {
    let font = &layer.font;
    let x = area.x + TEXT_MARGIN;
    let w = area.width - TEXT_MARGIN * 2;
    if w <= 0 || area.height <= 0 || layer.string.is_empty() {
        return Ok(());
    }

    let offset = layer.shadow.map(|s| s.offset).unwrap_or(0);
    let text = font.ellipsize(inst, &layer.string, w - offset.abs())?;
    if text.is_empty() {
        return Ok(());
    }

    let mw = inst.conn().text_width(font.fid(), &text)?;
    let x = match layer.justify {
        Justify::Left => x,
        Justify::Right => x + (w - mw),
        Justify::Center => x + (w - mw) / 2,
    };
    let y = area.y + (area.height - font.height()) / 2 + font.ascent();

    if let Some(shadow) = layer.shadow {
        if shadow.alpha > 0 {
            let (r, g, b) = blend_over(shadow, background, bg_width, bg_height, area);
            let color = inst.acquire_color(r, g, b)?;
            let drawn = inst.color_gc(&color).and_then(|gc| {
                inst.conn()
                    .draw_text(
                        drawable,
                        gc,
                        font.fid(),
                        coord(x + shadow.offset)?,
                        coord(y + shadow.offset)?,
                        &text,
                    )
                    .map_err(RenderError::from)
            });
            inst.release_color(color)?;
            drawn?;
        }
    }

    let gc = inst.color_gc(&layer.color)?;
    inst.conn()
        .draw_text(drawable, gc, font.fid(), coord(x)?, coord(y)?, &text)?;
    trace!("drew {:?} at ({}, {})", text, x, y);
    Ok(())
}

/// The shadow color blended over the background at the centre of `area`.
fn blend_over(shadow: TextShadow, background: &[u32], w: usize, h: usize, area: Rect) -> (u8, u8, u8) {
    if w == 0 || h == 0 {
        return shadow.color;
    }
    let cx = (area.x + area.width / 2).clamp(0, w as i32 - 1) as usize;
    let cy = (area.y + area.height / 2).clamp(0, h as i32 - 1) as usize;
    let (br, bg, bb, _) = unpack(
        background
            .get(cy * w + cx)
            .copied()
            .unwrap_or(pack_rgb((0, 0, 0))),
    );

    let a = shadow.alpha as i32;
    let blend = |f: u8, b: u8| (b as i32 + (f as i32 - b as i32) * a / 255) as u8;
    (
        blend(shadow.color.0, br),
        blend(shadow.color.1, bg),
        blend(shadow.color.2, bb),
    )
}
