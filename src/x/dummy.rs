#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::x::core::{
    FontInfo, ImageOrder, Result, VisualClass, VisualInfo, XConn, XError, XFont, XGcontext,
    XPixmap, XWindowID, Xid,
};

const ROOT: u32 = 0x100;

/// Fixed metrics reported for every font.
pub const FONT_ASCENT: i32 = 9;
pub const FONT_DESCENT: i32 = 3;
pub const CHAR_WIDTH: i32 = 6;

/// A piece of text drawn through the dummy connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextOp {
    pub drawable: XPixmap,
    pub pixel: u32,
    pub font: XFont,
    pub x: i16,
    pub y: i16,
    pub text: String,
}

#[derive(Debug, Clone)]
struct Drawable {
    width: u16,
    height: u16,
    depth: u8,
    data: Vec<u8>,
}

/// A dummy connection implementing XConn that does not
/// interface with the X server at all, and should only be
/// used for testing.
///
/// `DummyConn` keeps every pixmap it creates in memory, laid out
/// exactly as the server would, so image data can be read back.
/// Lines and masked fills are rasterized into that memory; text
/// is only recorded.
#[derive(Debug)]
pub struct DummyConn {
    visual: VisualInfo,
    next_id: Cell<u32>,
    drawables: RefCell<HashMap<u32, Drawable>>,
    gcs: RefCell<HashMap<u32, u32>>,
    named: RefCell<HashMap<String, (u8, u8, u8)>>,
    backgrounds: RefCell<HashMap<u32, XPixmap>>,
    text: RefCell<Vec<TextOp>>,
    fonts: RefCell<Vec<String>>,
    open_fonts: RefCell<HashSet<u32>>,
    refused_fonts: RefCell<Vec<String>>,
    fail_colors: Cell<bool>,
    fail_fonts: Cell<bool>,
    fail_color_frees: Cell<bool>,
    fail_backgrounds: Cell<bool>,
    next_index: Cell<u32>,
    colors_allocated: Cell<usize>,
    colors_freed: Cell<usize>,
    gcs_created: Cell<usize>,
    gcs_freed: Cell<usize>,
    pixmaps_created: Cell<usize>,
    pixmaps_freed: Cell<usize>,
    fonts_closed: Cell<usize>,
}

impl DummyConn {
    /// Creates a new DummyConn with a 24-bit TrueColor visual.
    pub fn new() -> Self {
        Self::with_visual(VisualInfo::truecolor_24())
    }

    /// Creates a new DummyConn reporting the given visual.
    pub fn with_visual(visual: VisualInfo) -> Self {
        Self {
            visual,
            next_id: Cell::new(0x200000),
            drawables: RefCell::new(HashMap::new()),
            gcs: RefCell::new(HashMap::new()),
            named: RefCell::new(HashMap::new()),
            backgrounds: RefCell::new(HashMap::new()),
            text: RefCell::new(Vec::new()),
            fonts: RefCell::new(Vec::new()),
            open_fonts: RefCell::new(HashSet::new()),
            refused_fonts: RefCell::new(Vec::new()),
            fail_colors: Cell::new(false),
            fail_fonts: Cell::new(false),
            fail_color_frees: Cell::new(false),
            fail_backgrounds: Cell::new(false),
            next_index: Cell::new(0),
            colors_allocated: Cell::new(0),
            colors_freed: Cell::new(0),
            gcs_created: Cell::new(0),
            gcs_freed: Cell::new(0),
            pixmaps_created: Cell::new(0),
            pixmaps_freed: Cell::new(0),
            fonts_closed: Cell::new(0),
        }
    }

    fn id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    //* test controls

    /// Makes every subsequent color allocation fail (or succeed again).
    pub fn fail_colors(&self, fail: bool) {
        self.fail_colors.set(fail)
    }

    /// Makes every subsequent font open fail (or succeed again).
    pub fn fail_fonts(&self, fail: bool) {
        self.fail_fonts.set(fail)
    }

    /// Makes every subsequent color free report an error.
    ///
    /// The color is still counted as freed.
    pub fn fail_color_frees(&self, fail: bool) {
        self.fail_color_frees.set(fail)
    }

    /// Makes every subsequent window background change fail.
    pub fn fail_backgrounds(&self, fail: bool) {
        self.fail_backgrounds.set(fail)
    }

    /// Refuses to open any font whose pattern contains `needle`.
    pub fn refuse_font(&self, needle: &str) {
        self.refused_fonts.borrow_mut().push(needle.into())
    }

    /// Adds an entry to the server's color name database.
    pub fn add_named_color(&self, name: &str, rgb: (u8, u8, u8)) {
        self.named.borrow_mut().insert(name.to_lowercase(), rgb);
    }

    //* inspection

    pub fn colors_allocated(&self) -> usize {
        self.colors_allocated.get()
    }

    pub fn colors_freed(&self) -> usize {
        self.colors_freed.get()
    }

    pub fn gcs_created(&self) -> usize {
        self.gcs_created.get()
    }

    pub fn gcs_freed(&self) -> usize {
        self.gcs_freed.get()
    }

    pub fn pixmaps_created(&self) -> usize {
        self.pixmaps_created.get()
    }

    pub fn pixmaps_freed(&self) -> usize {
        self.pixmaps_freed.get()
    }

    /// The number of pixmaps and bitmaps still alive.
    pub fn live_pixmaps(&self) -> usize {
        self.drawables.borrow().len()
    }

    /// Every font pattern successfully opened, in order.
    pub fn fonts_opened(&self) -> Vec<String> {
        self.fonts.borrow().clone()
    }

    pub fn fonts_closed(&self) -> usize {
        self.fonts_closed.get()
    }

    /// Every piece of text drawn so far.
    pub fn text_ops(&self) -> Vec<TextOp> {
        self.text.borrow().clone()
    }

    /// The pixmap last set as `window`'s background.
    pub fn background(&self, window: XWindowID) -> Option<XPixmap> {
        self.backgrounds.borrow().get(&window.val()).copied()
    }

    /// Whether `pixmap` exists and has not been freed.
    pub fn pixmap_alive(&self, pixmap: XPixmap) -> bool {
        self.drawables.borrow().contains_key(&pixmap.val())
    }

    //* rasterization helpers

    fn put_pixel(&self, d: &mut Drawable, x: i32, y: i32, value: u32) {
        if x < 0 || y < 0 || x >= d.width as i32 || y >= d.height as i32 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if d.depth == 1 {
            let stride = self.visual.bitmap_bytes_per_line(d.width as usize);
            let bit = match self.visual.bitmap_bit_order {
                ImageOrder::LsbFirst => x % 8,
                ImageOrder::MsbFirst => 7 - x % 8,
            };
            let byte = &mut d.data[y * stride + x / 8];
            if value & 1 == 1 {
                *byte |= 1 << bit;
            } else {
                *byte &= !(1 << bit);
            }
            return;
        }

        let stride = self.visual.bytes_per_line(d.width as usize);
        let bytes = self.visual.bits_per_pixel as usize / 8;
        let start = y * stride + x * bytes;
        let dst = &mut d.data[start..start + bytes];
        for (i, b) in dst.iter_mut().enumerate() {
            let shift = match self.visual.byte_order {
                ImageOrder::LsbFirst => i * 8,
                ImageOrder::MsbFirst => (bytes - 1 - i) * 8,
            };
            *b = (value >> shift) as u8;
        }
    }

    fn bit_set(&self, d: &Drawable, x: usize, y: usize) -> bool {
        let stride = self.visual.bitmap_bytes_per_line(d.width as usize);
        let byte = d.data[y * stride + x / 8];
        match self.visual.bitmap_bit_order {
            ImageOrder::LsbFirst => byte >> (x % 8) & 1 == 1,
            ImageOrder::MsbFirst => byte >> (7 - x % 8) & 1 == 1,
        }
    }

    fn gc_pixel(&self, gc: XGcontext) -> Result<u32> {
        self.gcs
            .borrow()
            .get(&gc.val())
            .copied()
            .ok_or(XError::RequestError("no such graphics context"))
    }

    fn new_drawable(&self, width: u16, height: u16, depth: u8) -> XPixmap {
        let stride = if depth == 1 {
            self.visual.bitmap_bytes_per_line(width as usize)
        } else {
            self.visual.bytes_per_line(width as usize)
        };
        let id = self.id();
        self.drawables.borrow_mut().insert(
            id,
            Drawable {
                width,
                height,
                depth,
                data: vec![0; stride * height as usize],
            },
        );
        self.pixmaps_created.set(self.pixmaps_created.get() + 1);
        Xid(id)
    }
}

impl Default for DummyConn {
    fn default() -> Self {
        Self::new()
    }
}

impl XConn for DummyConn {
    fn root(&self) -> XWindowID {
        Xid(ROOT)
    }

    fn visual(&self) -> VisualInfo {
        self.visual
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn alloc_color(&self, r: u8, g: u8, b: u8) -> Result<u32> {
        if self.fail_colors.get() {
            return Err(XError::Color(format!("({}, {}, {})", r, g, b)));
        }
        self.colors_allocated.set(self.colors_allocated.get() + 1);
        match self.visual.class {
            VisualClass::TrueColor => {
                let chan = |c: u8, mask: u32| {
                    if mask == 0 {
                        return 0;
                    }
                    let bits = mask.count_ones().min(8);
                    ((c as u32) >> (8 - bits)) << mask.trailing_zeros()
                };
                Ok(chan(r, self.visual.red_mask)
                    | chan(g, self.visual.green_mask)
                    | chan(b, self.visual.blue_mask))
            }
            _ => {
                let idx = self.next_index.get();
                self.next_index.set(idx + 1);
                Ok(idx)
            }
        }
    }

    fn free_color(&self, _pixel: u32) -> Result<()> {
        self.colors_freed.set(self.colors_freed.get() + 1);
        if self.fail_color_frees.get() {
            return Err(XError::RequestError("color free refused"));
        }
        Ok(())
    }

    fn lookup_color(&self, name: &str) -> Result<(u8, u8, u8)> {
        self.named
            .borrow()
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| XError::Color(name.into()))
    }

    fn create_gc(&self, foreground: u32) -> Result<XGcontext> {
        let id = self.id();
        self.gcs.borrow_mut().insert(id, foreground);
        self.gcs_created.set(self.gcs_created.get() + 1);
        Ok(Xid(id))
    }

    fn free_gc(&self, gc: XGcontext) -> Result<()> {
        self.gcs
            .borrow_mut()
            .remove(&gc.val())
            .ok_or(XError::RequestError("freeing unknown graphics context"))?;
        self.gcs_freed.set(self.gcs_freed.get() + 1);
        Ok(())
    }

    fn create_pixmap(&self, width: u16, height: u16, depth: u8) -> Result<XPixmap> {
        if width == 0 || height == 0 {
            return Err(XError::Protocol("zero-sized pixmap".into()));
        }
        Ok(self.new_drawable(width, height, depth))
    }

    fn free_pixmap(&self, pixmap: XPixmap) -> Result<()> {
        self.drawables
            .borrow_mut()
            .remove(&pixmap.val())
            .ok_or(XError::RequestError("freeing unknown pixmap"))?;
        self.pixmaps_freed.set(self.pixmaps_freed.get() + 1);
        Ok(())
    }

    fn put_image(&self, pixmap: XPixmap, width: u16, height: u16, data: &[u8]) -> Result<()> {
        let mut drawables = self.drawables.borrow_mut();
        let d = drawables
            .get_mut(&pixmap.val())
            .ok_or(XError::RequestError("put_image on unknown pixmap"))?;
        if d.width != width || d.height != height {
            return Err(XError::Protocol(format!(
                "image {}x{} does not cover pixmap {}x{}",
                width, height, d.width, d.height
            )));
        }
        if data.len() != d.data.len() {
            return Err(XError::Protocol(format!(
                "expected {} bytes of image data, got {}",
                d.data.len(),
                data.len()
            )));
        }
        d.data.copy_from_slice(data);
        Ok(())
    }

    fn get_image(&self, drawable: XPixmap, width: u16, height: u16) -> Result<(u8, Vec<u8>)> {
        let drawables = self.drawables.borrow();
        let d = drawables
            .get(&drawable.val())
            .ok_or(XError::RequestError("get_image on unknown drawable"))?;
        if width > d.width || height > d.height {
            return Err(XError::Protocol("get_image outside drawable".into()));
        }
        Ok((d.depth, d.data.clone()))
    }

    fn create_bitmap(&self, width: u16, height: u16, bits: &[u8]) -> Result<XPixmap> {
        let src_stride = (width as usize).div_ceil(8);
        if bits.len() < src_stride * height as usize {
            return Err(XError::Protocol("short bitmap data".into()));
        }
        let pixmap = self.create_pixmap(width, height, 1)?;
        let mut drawables = self.drawables.borrow_mut();
        if let Some(d) = drawables.get_mut(&pixmap.val()) {
            for y in 0..height as usize {
                for x in 0..width as usize {
                    let set = bits[y * src_stride + x / 8] >> (x % 8) & 1;
                    self.put_pixel(d, x as i32, y as i32, set as u32);
                }
            }
        }
        Ok(pixmap)
    }

    fn draw_line(&self, drawable: XPixmap, gc: XGcontext, from: (i16, i16), to: (i16, i16)) -> Result<()> {
        let pixel = self.gc_pixel(gc)?;
        let mut drawables = self.drawables.borrow_mut();
        let d = drawables
            .get_mut(&drawable.val())
            .ok_or(XError::RequestError("draw_line on unknown drawable"))?;

        let (mut x, mut y) = (from.0 as i32, from.1 as i32);
        let (x1, y1) = (to.0 as i32, to.1 as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put_pixel(d, x, y, pixel);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    fn fill_masked(
        &self,
        drawable: XPixmap,
        gc: XGcontext,
        stencil: XPixmap,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<()> {
        let pixel = self.gc_pixel(gc)?;
        let mut drawables = self.drawables.borrow_mut();
        let mask = drawables
            .get(&stencil.val())
            .cloned()
            .ok_or(XError::RequestError("fill_masked with unknown stencil"))?;
        let d = drawables
            .get_mut(&drawable.val())
            .ok_or(XError::RequestError("fill_masked on unknown drawable"))?;

        for my in 0..height.min(mask.height) as usize {
            for mx in 0..width.min(mask.width) as usize {
                if self.bit_set(&mask, mx, my) {
                    self.put_pixel(d, x as i32 + mx as i32, y as i32 + my as i32, pixel);
                }
            }
        }
        Ok(())
    }

    fn open_font(&self, pattern: &str) -> Result<FontInfo> {
        let refused = self
            .refused_fonts
            .borrow()
            .iter()
            .any(|needle| pattern.contains(needle.as_str()));
        if self.fail_fonts.get() || refused {
            return Err(XError::Font(pattern.into()));
        }
        let id = self.id();
        self.fonts.borrow_mut().push(pattern.into());
        self.open_fonts.borrow_mut().insert(id);
        Ok(FontInfo {
            fid: Xid(id),
            ascent: FONT_ASCENT,
            descent: FONT_DESCENT,
        })
    }

    fn close_font(&self, font: XFont) -> Result<()> {
        if !self.open_fonts.borrow_mut().remove(&font.val()) {
            return Err(XError::RequestError("closing unknown font"));
        }
        self.fonts_closed.set(self.fonts_closed.get() + 1);
        Ok(())
    }

    fn text_width(&self, _font: XFont, text: &str) -> Result<i32> {
        Ok(text.chars().count() as i32 * CHAR_WIDTH)
    }

    fn draw_text(
        &self,
        drawable: XPixmap,
        gc: XGcontext,
        font: XFont,
        x: i16,
        y: i16,
        text: &str,
    ) -> Result<()> {
        let pixel = self.gc_pixel(gc)?;
        if !self.drawables.borrow().contains_key(&drawable.val()) {
            return Err(XError::RequestError("draw_text on unknown drawable"));
        }
        self.text.borrow_mut().push(TextOp {
            drawable,
            pixel,
            font,
            x,
            y,
            text: text.into(),
        });
        Ok(())
    }

    fn set_window_background(&self, window: XWindowID, pixmap: XPixmap) -> Result<()> {
        if self.fail_backgrounds.get() {
            return Err(XError::RequestError("background change refused"));
        }
        if !self.pixmap_alive(pixmap) {
            return Err(XError::RequestError("background pixmap does not exist"));
        }
        self.backgrounds.borrow_mut().insert(window.val(), pixmap);
        Ok(())
    }
}
