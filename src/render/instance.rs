//! The render instance: a connection plus the process-wide tables.
//!
//! A [`RenderInstance`] is created once per connection and lives until
//! the connection is closed. It owns the [`ColorTable`] and the
//! [`ImageCache`], and knows how to convert canonical pixel buffers
//! to and from the server's native image layout.

use std::cell::RefCell;
use std::fmt;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::{debug, warn};
#[cfg(debug_assertions)]
use tracing::instrument;

use super::color::{parse_color_spec, Color, ColorTable};
use super::image::ImageCache;
use super::{pack, unpack};
use crate::config::ThemeConfig;
use crate::x::{ImageOrder, VisualClass, VisualInfo, XConn, XGcontext, XPixmap};
use crate::{RenderError, Result};

/// How canonical channels map onto a TrueColor pixel.
///
/// A channel is stored as `(c >> shift) << offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Format {
    /// Bit offset of red in a server pixel.
    pub red_offset: u32,
    /// Bit offset of green in a server pixel.
    pub green_offset: u32,
    /// Bit offset of blue in a server pixel.
    pub blue_offset: u32,
    /// Bits of red dropped from the canonical 8.
    pub red_shift: u32,
    /// Bits of green dropped from the canonical 8.
    pub green_shift: u32,
    /// Bits of blue dropped from the canonical 8.
    pub blue_shift: u32,
    /// The visual's red mask.
    pub red_mask: u32,
    /// The visual's green mask.
    pub green_mask: u32,
    /// The visual's blue mask.
    pub blue_mask: u32,
}

impl Format {
    /// Derives the channel layout from a visual's masks.
    pub fn from_visual(visual: &VisualInfo) -> Self {
        let offset = |mask: u32| if mask == 0 { 0 } else { mask.trailing_zeros() };
        let shift = |mask: u32| 8u32.saturating_sub(mask.count_ones());

        Self {
            red_offset: offset(visual.red_mask),
            green_offset: offset(visual.green_mask),
            blue_offset: offset(visual.blue_mask),
            red_shift: shift(visual.red_mask),
            green_shift: shift(visual.green_mask),
            blue_shift: shift(visual.blue_mask),
            red_mask: visual.red_mask,
            green_mask: visual.green_mask,
            blue_mask: visual.blue_mask,
        }
    }

    /// Encodes a canonical pixel as a server pixel.
    #[inline]
    pub fn encode(&self, pixel: u32) -> u32 {
        let (r, g, b, _) = unpack(pixel);
        ((r as u32) >> self.red_shift) << self.red_offset
            | ((g as u32) >> self.green_shift) << self.green_offset
            | ((b as u32) >> self.blue_shift) << self.blue_offset
    }

    /// Decodes a server pixel into an opaque canonical pixel.
    #[inline]
    pub fn decode(&self, value: u32) -> u32 {
        let r = ((value & self.red_mask) >> self.red_offset) << self.red_shift;
        let g = ((value & self.green_mask) >> self.green_offset) << self.green_shift;
        let b = ((value & self.blue_mask) >> self.blue_offset) << self.blue_shift;
        pack(r as u8, g as u8, b as u8, 0xff)
    }
}

/// A small color cube used to dither down to colormapped visuals.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColorCube {
    /// Levels per channel, a power of two.
    bpc: u32,
    /// Server pixels, indexed `r * bpc * bpc + g * bpc + b`.
    pixels: Vec<u32>,
}

impl ColorCube {
    fn bits(&self) -> u32 {
        self.bpc.trailing_zeros()
    }

    fn pick(&self, r: u8, g: u8, b: u8) -> u32 {
        let bits = self.bits();
        let idx = |c: u8| (c as u32) >> (8 - bits);
        let i = (idx(r) * self.bpc + idx(g)) * self.bpc + idx(b);
        self.pixels[i as usize]
    }

    fn level(&self, i: u32) -> u8 {
        (i * 255 / (self.bpc - 1)) as u8
    }

    fn reverse(&self, value: u32) -> u32 {
        match self.pixels.iter().position(|p| *p == value) {
            Some(i) => {
                let i = i as u32;
                let bpc = self.bpc;
                pack(
                    self.level(i / (bpc * bpc)),
                    self.level(i / bpc % bpc),
                    self.level(i % bpc),
                    0xff,
                )
            }
            None => pack(0, 0, 0, 0xff),
        }
    }
}

/// The render instance, tying a connection to its color table
/// and image cache.
///
/// # Usage
///
/// ```no_run
/// use toaru_render::{RenderInstance, ThemeConfig};
/// use toaru_render::x::X11RBConn;
///
/// let conn = X11RBConn::new().expect("could not connect");
/// let inst = RenderInstance::new(conn, &ThemeConfig::new()).expect("no instance");
///
/// let red = inst.parse_color("#ff0000").expect("no red");
/// inst.release_color(red).expect("could not release");
/// ```
pub struct RenderInstance<X: XConn> {
    conn: X,
    visual: VisualInfo,
    format: Format,
    colors: RefCell<ColorTable>,
    images: ImageCache,
    cube: Option<ColorCube>,
}

impl<X: XConn> fmt::Debug for RenderInstance<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderInstance")
            .field("visual", &self.visual)
            .field("format", &self.format)
            .field("colors", &self.colors.borrow().len())
            .field("images", &self.images)
            .finish()
    }
}

impl<X: XConn> RenderInstance<X> {
    /// Creates a new instance over an initialized connection.
    ///
    /// On colormapped visuals this allocates the dithering color cube.
    pub fn new(conn: X, config: &ThemeConfig) -> Result<Self> {
        let visual = conn.visual();
        let format = Format::from_visual(&visual);
        debug!("render format {:?} for visual {:?}", format, visual);

        let cube = match visual.class {
            VisualClass::TrueColor => None,
            VisualClass::PseudoColor | VisualClass::StaticColor => {
                Some(Self::alloc_cube(&conn, visual.depth)?)
            }
        };

        Ok(Self {
            conn,
            visual,
            format,
            colors: RefCell::new(ColorTable::new()),
            images: ImageCache::new(config.max_resized()),
            cube,
        })
    }

    fn alloc_cube(conn: &X, depth: u8) -> Result<ColorCube> {
        let bpc = (1u32 << (depth / 3)) >> 1;
        let bpc = bpc.max(2);
        let mut cube = ColorCube {
            bpc,
            pixels: Vec::with_capacity((bpc * bpc * bpc) as usize),
        };

        for i in 0..bpc * bpc * bpc {
            let (r, g, b) = (
                cube.level(i / (bpc * bpc)),
                cube.level(i / bpc % bpc),
                cube.level(i % bpc),
            );
            let pixel = match conn.alloc_color(r, g, b) {
                Ok(pixel) => pixel,
                Err(e) => {
                    warn!("color cube entry ({}, {}, {}) unavailable: {}", r, g, b, e);
                    0
                }
            };
            cube.pixels.push(pixel);
        }
        debug!("allocated {}-level color cube", bpc);
        Ok(cube)
    }

    /// The underlying connection.
    pub fn conn(&self) -> &X {
        &self.conn
    }

    /// The visual images are produced for.
    pub fn visual(&self) -> &VisualInfo {
        &self.visual
    }

    /// The channel layout of server pixels.
    pub fn format(&self) -> &Format {
        &self.format
    }

    /// The depth of pixmaps created for painting.
    pub fn depth(&self) -> u8 {
        self.visual.depth
    }

    /// The image cache shared by every appearance on this instance.
    pub fn image_cache(&self) -> &ImageCache {
        &self.images
    }

    //* Colors

    /// Returns a handle to the color `(r, g, b)`.
    pub fn acquire_color(&self, r: u8, g: u8, b: u8) -> Result<Color> {
        self.colors.borrow_mut().acquire(&self.conn, r, g, b)
    }

    /// Parses a color specification or name and acquires it.
    ///
    /// See [`parse_color_spec`] for the numeric forms; anything else
    /// is looked up in the server's color database.
    pub fn parse_color(&self, spec: &str) -> Result<Color> {
        let (r, g, b) = match parse_color_spec(spec) {
            Some(rgb) => rgb,
            None => {
                let name = spec.trim();
                if name.is_empty() || name.starts_with('#') || name.starts_with("rgb:") {
                    return Err(RenderError::InvalidColor(spec.into()));
                }
                self.conn
                    .lookup_color(name)
                    .map_err(|_| RenderError::InvalidColor(spec.into()))?
            }
        };
        self.acquire_color(r, g, b)
    }

    /// Returns a color handle, freeing the server color with the last one.
    pub fn release_color(&self, color: Color) -> Result<()> {
        self.colors.borrow_mut().release(&self.conn, color)
    }

    /// The drawing context for a color.
    pub fn color_gc(&self, color: &Color) -> Result<XGcontext> {
        self.colors.borrow().gc(&self.conn, color)
    }

    /// The number of distinct colors currently allocated.
    pub fn live_colors(&self) -> usize {
        self.colors.borrow().len()
    }

    //* Image conversion

    /// Converts canonical pixels to ZPixmap data for this visual.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "render", level = "trace", skip(self, pixels))
    )]
    pub fn reduce_depth(&self, pixels: &[u32], width: usize, height: usize) -> Result<Vec<u8>> {
        if pixels.len() < width * height {
            return Err(RenderError::InvalidImage(format!(
                "{} pixels for a {}x{} image",
                pixels.len(),
                width,
                height
            )));
        }

        let stride = self.visual.bytes_per_line(width);
        let bpp = self.visual.bits_per_pixel;
        let msb = self.visual.byte_order.is_msb_first();
        let mut out = vec![0u8; stride * height];

        for (row, line) in pixels.chunks(width.max(1)).take(height).zip(out.chunks_mut(stride)) {
            for (x, &pixel) in row.iter().enumerate() {
                let value = self.server_pixel(pixel);
                match bpp {
                    32 => {
                        let dst = &mut line[x * 4..x * 4 + 4];
                        if msb {
                            BigEndian::write_u32(dst, value)
                        } else {
                            LittleEndian::write_u32(dst, value)
                        }
                    }
                    24 => {
                        let dst = &mut line[x * 3..x * 3 + 3];
                        if msb {
                            BigEndian::write_u24(dst, value)
                        } else {
                            LittleEndian::write_u24(dst, value)
                        }
                    }
                    16 => {
                        let dst = &mut line[x * 2..x * 2 + 2];
                        if msb {
                            BigEndian::write_u16(dst, value as u16)
                        } else {
                            LittleEndian::write_u16(dst, value as u16)
                        }
                    }
                    8 => line[x] = value as u8,
                    other => {
                        return Err(RenderError::Paint(format!(
                            "unsupported bits per pixel {}",
                            other
                        )))
                    }
                }
            }
        }
        Ok(out)
    }

    /// Converts ZPixmap data for this visual back to canonical pixels.
    ///
    /// Every pixel comes back opaque.
    pub fn increase_depth(&self, data: &[u8], width: usize, height: usize) -> Result<Vec<u32>> {
        let stride = self.visual.bytes_per_line(width);
        if data.len() < stride * height {
            return Err(RenderError::InvalidImage(format!(
                "{} bytes for a {}x{} image",
                data.len(),
                width,
                height
            )));
        }

        let bpp = self.visual.bits_per_pixel;
        let msb = self.visual.byte_order.is_msb_first();
        let mut out = Vec::with_capacity(width * height);

        for line in data.chunks(stride.max(1)).take(height) {
            for x in 0..width {
                let value = match bpp {
                    32 => {
                        let src = &line[x * 4..x * 4 + 4];
                        if msb { BigEndian::read_u32(src) } else { LittleEndian::read_u32(src) }
                    }
                    24 => {
                        let src = &line[x * 3..x * 3 + 3];
                        if msb { BigEndian::read_u24(src) } else { LittleEndian::read_u24(src) }
                    }
                    16 => {
                        let src = &line[x * 2..x * 2 + 2];
                        (if msb { BigEndian::read_u16(src) } else { LittleEndian::read_u16(src) }) as u32
                    }
                    8 => line[x] as u32,
                    other => {
                        return Err(RenderError::Paint(format!(
                            "unsupported bits per pixel {}",
                            other
                        )))
                    }
                };
                out.push(self.canonical_pixel(value));
            }
        }
        Ok(out)
    }

    fn server_pixel(&self, pixel: u32) -> u32 {
        match &self.cube {
            Some(cube) => {
                let (r, g, b, _) = unpack(pixel);
                cube.pick(r, g, b)
            }
            None => self.format.encode(pixel),
        }
    }

    fn canonical_pixel(&self, value: u32) -> u32 {
        match &self.cube {
            Some(cube) => cube.reverse(value),
            None => self.format.decode(value),
        }
    }

    /// Uploads a canonical pixel buffer into `pixmap`.
    pub fn transfer(&self, pixels: &[u32], width: usize, height: usize, pixmap: XPixmap) -> Result<()> {
        let data = self.reduce_depth(pixels, width, height)?;
        self.conn
            .put_image(pixmap, width as u16, height as u16, &data)?;
        Ok(())
    }

    /// Reads a pixmap back as canonical RGBA.
    ///
    /// If a 1-bpp `mask` is given, pixels whose mask bit is unset
    /// come back fully transparent.
    pub fn pixmap_to_rgba(
        &self,
        pixmap: XPixmap,
        mask: Option<XPixmap>,
        width: usize,
        height: usize,
    ) -> Result<Vec<u32>> {
        let (depth, data) = self
            .conn
            .get_image(pixmap, width as u16, height as u16)?;
        if depth != self.visual.depth {
            return Err(RenderError::InvalidImage(format!(
                "pixmap depth {} does not match visual depth {}",
                depth, self.visual.depth
            )));
        }
        let mut pixels = self.increase_depth(&data, width, height)?;

        if let Some(mask) = mask {
            let (_, bits) = self
                .conn
                .get_image(mask, width as u16, height as u16)?;
            let stride = self.visual.bitmap_bytes_per_line(width);
            if bits.len() < stride * height {
                return Err(RenderError::InvalidImage("short mask data".into()));
            }
            for y in 0..height {
                for x in 0..width {
                    let byte = bits[y * stride + x / 8];
                    let set = match self.visual.bitmap_bit_order {
                        ImageOrder::LsbFirst => byte >> (x % 8) & 1,
                        ImageOrder::MsbFirst => byte >> (7 - x % 8) & 1,
                    };
                    if set == 0 {
                        pixels[y * width + x] &= 0x00ffffff;
                    }
                }
            }
        }
        Ok(pixels)
    }

    /// Tears the instance down, freeing the color cube and every
    /// interned color, and hands the connection back.
    pub fn close(self) -> Result<X> {
        self.colors.borrow_mut().clear(&self.conn)?;
        if let Some(cube) = &self.cube {
            for pixel in &cube.pixels {
                self.conn.free_color(*pixel)?;
            }
        }
        self.conn.flush()?;
        debug!("render instance closed");
        Ok(self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pack_rgb;
    use crate::x::dummy::DummyConn;
    use crate::x::VisualInfo;

    fn instance(visual: VisualInfo) -> RenderInstance<DummyConn> {
        RenderInstance::new(DummyConn::with_visual(visual), &ThemeConfig::new()).unwrap()
    }

    #[test]
    fn test_format_from_rgb565() {
        let vis = VisualInfo {
            depth: 16,
            red_mask: 0xf800,
            green_mask: 0x07e0,
            blue_mask: 0x001f,
            bits_per_pixel: 16,
            ..VisualInfo::truecolor_24()
        };
        let f = Format::from_visual(&vis);
        assert_eq!((f.red_offset, f.green_offset, f.blue_offset), (11, 5, 0));
        assert_eq!((f.red_shift, f.green_shift, f.blue_shift), (3, 2, 3));
        assert_eq!(f.encode(pack_rgb((0xff, 0xff, 0xff))), 0xffff);
    }

    #[test]
    fn test_reduce_depth_32_lsb() {
        let inst = instance(VisualInfo::truecolor_24());
        let data = inst.reduce_depth(&[pack_rgb((0x11, 0x22, 0x33))], 1, 1).unwrap();
        assert_eq!(data, vec![0x33, 0x22, 0x11, 0x00]);
    }

    #[test]
    fn test_reduce_depth_pads_scanlines() {
        let vis = VisualInfo {
            depth: 16,
            red_mask: 0xf800,
            green_mask: 0x07e0,
            blue_mask: 0x001f,
            bits_per_pixel: 16,
            byte_order: ImageOrder::MsbFirst,
            ..VisualInfo::truecolor_24()
        };
        let inst = instance(vis);
        let pixels = vec![pack_rgb((0xff, 0, 0)); 3 * 2];
        let data = inst.reduce_depth(&pixels, 3, 2).unwrap();

        // 3 px * 2 bytes padded to 8 bytes per line
        assert_eq!(data.len(), 16);
        assert_eq!(&data[0..2], &[0xf8, 0x00]);
        assert_eq!(&data[6..8], &[0, 0]);
        assert_eq!(&data[8..10], &[0xf8, 0x00]);
    }

    #[test]
    fn test_depth_round_trip_24bpp() {
        let vis = VisualInfo {
            bits_per_pixel: 24,
            scanline_pad: 32,
            ..VisualInfo::truecolor_24()
        };
        let inst = instance(vis);
        let pixels = vec![
            pack_rgb((1, 2, 3)),
            pack_rgb((4, 5, 6)),
            pack_rgb((7, 8, 9)),
        ];
        let data = inst.reduce_depth(&pixels, 3, 1).unwrap();
        assert_eq!(data.len(), 12);
        assert_eq!(inst.increase_depth(&data, 3, 1).unwrap(), pixels);
    }

    #[test]
    fn test_pseudocolor_cube() {
        let vis = VisualInfo {
            depth: 8,
            class: VisualClass::PseudoColor,
            red_mask: 0,
            green_mask: 0,
            blue_mask: 0,
            bits_per_pixel: 8,
            ..VisualInfo::truecolor_24()
        };
        let inst = instance(vis);
        // 2 levels per channel
        assert_eq!(inst.conn().colors_allocated(), 8);

        let data = inst
            .reduce_depth(&[pack_rgb((0xff, 0xff, 0xff)), pack_rgb((0, 0, 0))], 2, 1)
            .unwrap();
        let back = inst.increase_depth(&data, 2, 1).unwrap();
        assert_eq!(back, vec![pack_rgb((0xff, 0xff, 0xff)), pack_rgb((0, 0, 0))]);

        let conn = inst.close().unwrap();
        assert_eq!(conn.colors_freed(), 8);
    }

    #[test]
    fn test_pixmap_to_rgba_with_mask() {
        let inst = instance(VisualInfo::truecolor_24());
        let conn = inst.conn();

        let pixmap = conn.create_pixmap(2, 1, 24).unwrap();
        inst.transfer(&[pack_rgb((9, 9, 9)), pack_rgb((8, 8, 8))], 2, 1, pixmap)
            .unwrap();
        let mask = conn.create_bitmap(2, 1, &[0b01]).unwrap();

        let rgba = inst.pixmap_to_rgba(pixmap, Some(mask), 2, 1).unwrap();
        assert_eq!(rgba[0], pack_rgb((9, 9, 9)));
        assert_eq!(rgba[1], 0x00080808);
    }

    #[test]
    fn test_parse_color_named_and_invalid() {
        let inst = instance(VisualInfo::truecolor_24());
        inst.conn().add_named_color("slate grey", (0x70, 0x80, 0x90));

        let c = inst.parse_color("slate grey").unwrap();
        assert_eq!(c.rgb(), (0x70, 0x80, 0x90));

        assert!(matches!(inst.parse_color("#12"), Err(RenderError::InvalidColor(_))));
        assert!(matches!(inst.parse_color("no such"), Err(RenderError::InvalidColor(_))));
    }

    #[test]
    fn test_close_frees_live_colors() {
        let inst = instance(VisualInfo::truecolor_24());
        let _a = inst.acquire_color(1, 1, 1).unwrap();
        let _b = inst.acquire_color(2, 2, 2).unwrap();
        let conn = inst.close().unwrap();
        assert_eq!(conn.colors_freed(), 2);
    }
}
