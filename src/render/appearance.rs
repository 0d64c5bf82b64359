//! The appearance compositor.
//!
//! An [`Appearance`] is one paintable visual state of a decoration
//! widget: a [`Surface`] describing the background, followed by an
//! ordered list of [`TextureLayer`]s drawn on top of it.
//!
//! Painting happens in two stages. The background and every pixel
//! layer (RGBA and cached images) are composited into a canonical
//! pixel buffer first, then the buffer is transferred to a fresh
//! server pixmap and the server-side layers (text, lines and masks)
//! are drawn into that. The pixmap finally becomes the background
//! of the target window.

use std::rc::Rc;

use custom_debug_derive::Debug as CustomDebug;
use strum::*;
use tracing::{debug, warn};
#[cfg(debug_assertions)]
use tracing::instrument;

use super::color::Color;
use super::font::{self, Font, TextShadow};
use super::gradient;
use super::image::{draw_rgba, Image};
use super::instance::RenderInstance;
use super::mask::PixmapMask;
use super::{coord, Rect};
use crate::x::{XConn, XPixmap, XWindowID};
use crate::{RenderError, Result};

/// How a surface fills its background.
#[derive(AsRefStr, Display, EnumString, EnumIs, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Gradient {
    /// A single color.
    #[default]
    Solid,
    /// The pixels of the parent appearance underneath.
    #[strum(serialize = "parentrelative")]
    ParentRelative,
    /// Left to right.
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    #[strum(serialize = "crossdiagonal")]
    CrossDiagonal,
    /// Out from the vertical centre line and back.
    #[strum(serialize = "mirrorhorizontal")]
    MirrorHorizontal,
    /// Out from the corners towards the centre.
    Pyramid,
    /// Two vertical halves with a step between them.
    #[strum(serialize = "splitvertical")]
    SplitVertical,
}

/// Whether a surface has a bevel, and which way it faces.
#[derive(AsRefStr, Display, EnumString, EnumIs, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Relief {
    /// No bevel.
    #[default]
    Flat,
    /// Lit from the top-left.
    Raised,
    /// Lit from the bottom-right.
    Sunken,
}

/// The width of a bevel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bevel {
    /// Drawn on the outermost pixels.
    #[default]
    One,
    /// Drawn one pixel in.
    Two,
}

/// Horizontal placement of text.
#[derive(AsRefStr, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum Justify {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    #[strum(serialize = "center", serialize = "centre")]
    Center,
    /// Flush right.
    Right,
}

/// The background of an appearance.
///
/// Unset colors render as black. The bevel colors of a solid surface
/// are derived from `primary` and acquired the first time the surface
/// is painted with a relief.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    /// The fill.
    pub grad: Gradient,
    /// The bevel direction.
    pub relief: Relief,
    /// The bevel width; ignored when flat.
    pub bevel: Bevel,
    /// Whether a flat surface has a 1px border.
    pub border: bool,
    /// Whether every other row is overwritten with `interlace_color`.
    pub interlaced: bool,
    /// The start color of the fill.
    pub primary: Option<Color>,
    /// The end color of the fill.
    pub secondary: Option<Color>,
    /// The border color.
    pub border_color: Option<Color>,
    /// The color of interlaced rows.
    pub interlace_color: Option<Color>,
    /// The top color of a split gradient.
    pub split_primary: Option<Color>,
    /// The bottom color of a split gradient.
    pub split_secondary: Option<Color>,
    /// The highlight edge of a solid bevel.
    pub bevel_light: Option<Color>,
    /// The shadow edge of a solid bevel.
    pub bevel_dark: Option<Color>,
    /// Strength of the highlight in 1/256ths, replacing the default formula.
    pub bevel_light_adjust: Option<u16>,
    /// Strength of the shadow in 1/256ths, replacing the default formula.
    pub bevel_dark_adjust: Option<u16>,
    /// Horizontal offset into the parent, for parent-relative surfaces.
    pub parent_x: i32,
    /// Vertical offset into the parent, for parent-relative surfaces.
    pub parent_y: i32,
}

impl Surface {
    /// A solid, flat surface of one color.
    pub fn solid(color: Color) -> Self {
        Self {
            primary: Some(color),
            ..Self::default()
        }
    }

    fn colors_mut(&mut self) -> impl Iterator<Item = &mut Option<Color>> {
        [
            &mut self.primary,
            &mut self.secondary,
            &mut self.border_color,
            &mut self.interlace_color,
            &mut self.split_primary,
            &mut self.split_secondary,
            &mut self.bevel_light,
            &mut self.bevel_dark,
        ]
        .into_iter()
    }

    /// Whether the surface draws anything along its edges.
    fn has_edge(&self) -> bool {
        self.relief != Relief::Flat || self.border
    }

    /// Space taken up along each edge by the bevel or border.
    pub fn margins(&self) -> (i32, i32, i32, i32) {
        let m = match (self.grad, self.relief, self.bevel) {
            (Gradient::ParentRelative, _, _) => 0,
            (_, Relief::Flat, _) => self.border as i32,
            (_, _, Bevel::One) => 1,
            (_, _, Bevel::Two) => 2,
        };
        (m, m, m, m)
    }

    /// Re-acquires every color, giving a surface that owns its own handles.
    pub fn copy<X: XConn>(&self, inst: &RenderInstance<X>) -> Result<Self> {
        let mut new = self.clone();
        for color in new.colors_mut() {
            if let Some(c) = color {
                *color = Some(inst.acquire_color(c.r(), c.g(), c.b())?);
            }
        }
        Ok(new)
    }

    /// Releases every color the surface holds.
    ///
    /// Every color is released even if one fails; the first error is
    /// returned.
    pub fn free<X: XConn>(self, inst: &RenderInstance<X>) -> Result<()> {
        let Surface {
            primary,
            secondary,
            border_color,
            interlace_color,
            split_primary,
            split_secondary,
            bevel_light,
            bevel_dark,
            ..
        } = self;
        let mut freed = Ok(());
        for color in [
            primary,
            secondary,
            border_color,
            interlace_color,
            split_primary,
            split_secondary,
            bevel_light,
            bevel_dark,
        ]
        .into_iter()
        .flatten()
        {
            freed = freed.and(inst.release_color(color));
        }
        freed
    }
}

/// A string drawn with a core font.
#[derive(Debug, Clone)]
pub struct TextLayer {
    /// The font.
    pub font: Font,
    /// Horizontal placement in the available area.
    pub justify: Justify,
    /// The text color.
    pub color: Color,
    /// An optional drop shadow.
    pub shadow: Option<TextShadow>,
    /// The text itself.
    pub string: String,
}

/// A single line, in appearance coordinates.
#[derive(Debug, Clone)]
pub struct LineArt {
    /// The line color.
    pub color: Color,
    /// Start x.
    pub x1: i32,
    /// Start y.
    pub y1: i32,
    /// End x.
    pub x2: i32,
    /// End y.
    pub y2: i32,
}

/// A bitmap glyph filled with one color.
#[derive(Debug, Clone)]
pub struct MaskLayer {
    /// The fill color.
    pub color: Color,
    /// The glyph.
    pub mask: Rc<PixmapMask>,
}

/// A raw RGBA picture, resized on the fly to fit.
#[derive(CustomDebug, Clone)]
pub struct RgbaLayer {
    /// Width of the picture.
    pub width: usize,
    /// Height of the picture.
    pub height: usize,
    /// Overall opacity.
    pub alpha: u8,
    /// Canonical pixels.
    #[debug(skip)]
    pub data: Rc<[u32]>,
}

/// A picture drawn through the image cache.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    /// The image.
    pub image: Image,
    /// Overall opacity.
    pub alpha: u8,
}

/// One layer drawn over a surface.
#[derive(Debug, Clone, Default, EnumIs)]
pub enum TextureLayer {
    /// Nothing.
    #[default]
    None,
    /// Text.
    Text(TextLayer),
    /// A line.
    LineArt(LineArt),
    /// A bitmap glyph.
    Mask(MaskLayer),
    /// A raw RGBA picture.
    Rgba(RgbaLayer),
    /// A cached image.
    Image(ImageLayer),
}

impl TextureLayer {
    /// Whether the layer is composited into the pixel buffer rather
    /// than drawn on the server.
    pub fn is_pixel_layer(&self) -> bool {
        matches!(self, TextureLayer::Rgba(_) | TextureLayer::Image(_))
    }

    fn copy<X: XConn>(&self, inst: &RenderInstance<X>) -> Result<Self> {
        let dup = |c: &Color| inst.acquire_color(c.r(), c.g(), c.b());
        Ok(match self {
            TextureLayer::Text(t) => TextureLayer::Text(TextLayer {
                color: dup(&t.color)?,
                ..t.clone()
            }),
            TextureLayer::LineArt(l) => TextureLayer::LineArt(LineArt {
                color: dup(&l.color)?,
                ..l.clone()
            }),
            TextureLayer::Mask(m) => TextureLayer::Mask(MaskLayer {
                color: dup(&m.color)?,
                mask: m.mask.clone(),
            }),
            other => other.clone(),
        })
    }

    fn free<X: XConn>(self, inst: &RenderInstance<X>) -> Result<()> {
        match self {
            TextureLayer::Text(t) => inst.release_color(t.color).and(t.font.close(inst)),
            TextureLayer::LineArt(l) => inst.release_color(l.color),
            TextureLayer::Mask(m) => {
                let color = inst.release_color(m.color);
                match Rc::try_unwrap(m.mask) {
                    Ok(mask) => color.and(mask.free(inst)),
                    Err(_) => color,
                }
            }
            TextureLayer::None | TextureLayer::Rgba(_) | TextureLayer::Image(_) => Ok(()),
        }
    }
}

/// A surface plus its texture layers, and the result of the last paint.
#[derive(CustomDebug)]
pub struct Appearance {
    /// The background.
    pub surface: Surface,
    /// Layers drawn over the background, first to last.
    pub texture: Vec<TextureLayer>,
    #[debug(skip)]
    pixels: Vec<u32>,
    width: usize,
    height: usize,
    pixmap: Option<XPixmap>,
}

impl Appearance {
    /// Creates an appearance with `layers` empty texture layers.
    pub fn new(surface: Surface, layers: usize) -> Self {
        Self {
            surface,
            texture: vec![TextureLayer::None; layers],
            pixels: Vec::new(),
            width: 0,
            height: 0,
            pixmap: None,
        }
    }

    /// Space taken up along each edge, as `(left, top, right, bottom)`.
    pub fn margins(&self) -> (i32, i32, i32, i32) {
        self.surface.margins()
    }

    /// The pixels of the last paint.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// The size of the last paint; zero if never painted.
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Whether the appearance has been painted at least once.
    pub fn is_painted(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// The pixmap currently set as some window's background.
    pub fn pixmap(&self) -> Option<XPixmap> {
        self.pixmap
    }

    /// The smallest size that fits every layer inside the margins.
    pub fn min_size<X: XConn>(&self, inst: &RenderInstance<X>) -> Result<(i32, i32)> {
        let (mut w, mut h) = (0, 0);
        for layer in &self.texture {
            let (lw, lh) = match layer {
                TextureLayer::None | TextureLayer::Image(_) => (0, 0),
                TextureLayer::Text(t) => t.font.measure_string(inst, &t.string)?,
                TextureLayer::LineArt(l) => (l.x1.max(l.x2) + 1, l.y1.max(l.y2) + 1),
                TextureLayer::Mask(m) => (m.mask.width() as i32, m.mask.height() as i32),
                TextureLayer::Rgba(r) => (r.width as i32, r.height as i32),
            };
            w = w.max(lw);
            h = h.max(lh);
        }
        let (l, t, r, b) = self.margins();
        Ok((w + l + r, h + t + b))
    }

    /// Renders the background and every pixel layer into the pixel
    /// buffer, without touching the server.
    ///
    /// `parent` must be given, and painted, for a parent-relative surface.
    pub fn paint_pixels(&mut self, width: usize, height: usize, parent: Option<&Appearance>) -> Result<()> {
        self.pixels = match self.surface.grad {
            Gradient::ParentRelative => self.render_parent_relative(width, height, parent)?,
            _ => gradient::render(&self.surface, width, height),
        };
        self.width = width;
        self.height = height;

        let pixel_layers = self.texture.iter().any(TextureLayer::is_pixel_layer);
        let server_layers = self
            .texture
            .iter()
            .any(|layer| !layer.is_none() && !layer.is_pixel_layer());
        if pixel_layers && server_layers {
            return Err(RenderError::Paint(
                "rgba layers cannot share an appearance with text, line or mask layers".into(),
            ));
        }

        let area = self.inner_area();
        for layer in &self.texture {
            match layer {
                TextureLayer::Rgba(rgba) => draw_rgba(
                    &mut self.pixels,
                    width,
                    height,
                    &rgba.data,
                    rgba.width,
                    rgba.height,
                    rgba.alpha,
                    area,
                )?,
                TextureLayer::Image(img) => {
                    img.image.draw(&mut self.pixels, width, height, img.alpha, area)?
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn inner_area(&self) -> Rect {
        let (l, t, r, b) = self.margins();
        Rect::new(0, 0, self.width as i32, self.height as i32).inset(l, t, r, b)
    }

    fn render_parent_relative(
        &self,
        width: usize,
        height: usize,
        parent: Option<&Appearance>,
    ) -> Result<Vec<u32>> {
        let parent = parent.ok_or(RenderError::ParentNotPainted)?;
        if !parent.is_painted() {
            return Err(RenderError::ParentNotPainted);
        }
        let (pw, ph) = (parent.width, parent.height);
        let (px, py) = (self.surface.parent_x, self.surface.parent_y);

        // covering the whole parent with edges of our own: render with
        // the parent's relief, bevel and border so only one set is drawn
        if px == 0
            && py == 0
            && pw == width
            && ph == height
            && self.surface.has_edge()
            && parent.surface.has_edge()
        {
            trace!("re-rendering parent surface at {}x{}", width, height);
            return Ok(gradient::render(&parent.surface, width, height));
        }

        let mut out = vec![0u32; width * height];
        if px < 0 || py < 0 {
            return Ok(out);
        }
        let (px, py) = (px as usize, py as usize);
        let cw = width.min(pw.saturating_sub(px));
        let ch = height.min(ph.saturating_sub(py));
        for y in 0..ch {
            let src = (py + y) * pw + px;
            out[y * width..y * width + cw].copy_from_slice(&parent.pixels[src..src + cw]);
        }
        Ok(out)
    }

    /// Acquires the bevel colors of a solid surface if it needs them.
    fn prepare_bevel<X: XConn>(&mut self, inst: &RenderInstance<X>) -> Result<()> {
        let s = &mut self.surface;
        if s.grad != Gradient::Solid || s.relief == Relief::Flat {
            return Ok(());
        }
        let primary = s.primary.as_ref().map(Color::rgb).unwrap_or((0, 0, 0));
        if s.bevel_light.is_none() {
            let (r, g, b) = gradient::bevel_light(s, primary);
            s.bevel_light = Some(inst.acquire_color(r, g, b)?);
        }
        if s.bevel_dark.is_none() {
            let (r, g, b) = gradient::bevel_dark(s, primary);
            s.bevel_dark = Some(inst.acquire_color(r, g, b)?);
        }
        Ok(())
    }

    /// Paints the appearance at `width`x`height` and makes it the
    /// background of `window`.
    ///
    /// Every call renders from scratch. The pixmap of the previous
    /// paint is freed once the window has the new one.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "appearance", level = "trace", skip(self, inst, parent))
    )]
    pub fn paint<X: XConn>(
        &mut self,
        inst: &RenderInstance<X>,
        window: XWindowID,
        width: usize,
        height: usize,
        parent: Option<&Appearance>,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        if width > u16::MAX as usize || height > u16::MAX as usize {
            return Err(RenderError::Paint(format!("{}x{} is too large", width, height)));
        }

        self.prepare_bevel(inst)?;
        self.paint_pixels(width, height, parent)?;

        let pixmap = inst
            .conn()
            .create_pixmap(width as u16, height as u16, inst.depth())?;
        if let Err(e) = self.draw_on_server(inst, pixmap) {
            if let Err(free) = inst.conn().free_pixmap(pixmap) {
                warn!("could not free unused pixmap: {}", free);
            }
            return Err(e);
        }

        if let Err(e) = inst.conn().set_window_background(window, pixmap) {
            if let Err(free) = inst.conn().free_pixmap(pixmap) {
                warn!("could not free unused pixmap: {}", free);
            }
            return Err(e.into());
        }
        if let Some(old) = self.pixmap.replace(pixmap) {
            inst.conn().free_pixmap(old)?;
        }
        debug!("painted {}x{} appearance on window {}", width, height, window);
        Ok(())
    }

    fn draw_on_server<X: XConn>(&self, inst: &RenderInstance<X>, pixmap: XPixmap) -> Result<()> {
        inst.transfer(&self.pixels, self.width, self.height, pixmap)?;

        let area = self.inner_area();
        for layer in &self.texture {
            match layer {
                TextureLayer::Text(text) => font::draw_text(
                    inst,
                    pixmap,
                    text,
                    &self.pixels,
                    self.width,
                    self.height,
                    area,
                )?,
                TextureLayer::LineArt(line) => {
                    let gc = inst.color_gc(&line.color)?;
                    inst.conn().draw_line(
                        pixmap,
                        gc,
                        (coord(line.x1)?, coord(line.y1)?),
                        (coord(line.x2)?, coord(line.y2)?),
                    )?;
                }
                TextureLayer::Mask(m) => m.mask.draw(inst, pixmap, &m.color, area)?,
                TextureLayer::None | TextureLayer::Rgba(_) | TextureLayer::Image(_) => {}
            }
        }
        Ok(())
    }

    /// Copies the appearance, re-acquiring every color.
    ///
    /// The copy starts out unpainted.
    pub fn copy<X: XConn>(&self, inst: &RenderInstance<X>) -> Result<Self> {
        let texture = self
            .texture
            .iter()
            .map(|layer| layer.copy(inst))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            surface: self.surface.copy(inst)?,
            texture,
            pixels: Vec::new(),
            width: 0,
            height: 0,
            pixmap: None,
        })
    }

    /// Releases every color, font, mask and pixmap the appearance holds.
    ///
    /// Keeps going past a failed release and returns the first error.
    pub fn free<X: XConn>(self, inst: &RenderInstance<X>) -> Result<()> {
        let mut freed = self.surface.free(inst);
        for layer in self.texture {
            freed = freed.and(layer.free(inst));
        }
        if let Some(pixmap) = self.pixmap {
            freed = freed.and(inst.conn().free_pixmap(pixmap).map_err(RenderError::from));
        }
        freed
    }
}
