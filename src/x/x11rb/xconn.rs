//! Implementation of the XConn trait for X11RBConn.
//!
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    self, CapStyle, ChangeGCAux, ChangeWindowAttributesAux, ConnectionExt as XConnectionExt,
    CoordMode, CreateGCAux, ImageFormat,
};

use tracing::instrument;
use tracing::warn;

use super::convert::{char2b, text_items16};
use super::X11RBConn;
use crate::x::{
    core::{
        FontInfo, ImageOrder, Result, VisualInfo, XError, XFont, XGcontext, XPixmap,
        XWindowID, Xid,
    },
    traits::XConn,
    Initialized,
};

impl XConn for X11RBConn<Initialized> {
    fn root(&self) -> XWindowID {
        self.root
    }

    fn visual(&self) -> VisualInfo {
        // always set by init()
        self.visual.unwrap_or_else(VisualInfo::truecolor_24)
    }

    fn flush(&self) -> Result<()> {
        self.conn.flush()?;
        Ok(())
    }

    //* Colors

    fn alloc_color(&self, r: u8, g: u8, b: u8) -> Result<u32> {
        trace!("Allocating color ({}, {}, {})", r, g, b);

        // scale each channel to 16 bits, 0xab -> 0xabab
        let scale = |c: u8| (c as u16) << 8 | c as u16;
        let reply = self
            .conn
            .alloc_color(self.colormap, scale(r), scale(g), scale(b))?
            .reply()
            .map_err(|e| XError::Color(e.to_string()))?;

        Ok(reply.pixel)
    }

    fn free_color(&self, pixel: u32) -> Result<()> {
        trace!("Freeing color pixel {:#x}", pixel);
        self.conn.free_colors(self.colormap, 0, &[pixel])?;
        Ok(())
    }

    fn lookup_color(&self, name: &str) -> Result<(u8, u8, u8)> {
        let reply = self
            .conn
            .lookup_color(self.colormap, name.as_bytes())?
            .reply()
            .map_err(|_| XError::Color(format!("unknown color name '{}'", name)))?;

        Ok((
            (reply.exact_red >> 8) as u8,
            (reply.exact_green >> 8) as u8,
            (reply.exact_blue >> 8) as u8,
        ))
    }

    //* Graphics contexts

    fn create_gc(&self, foreground: u32) -> Result<XGcontext> {
        let gc = self.conn.generate_id()?;
        self.conn.create_gc(
            gc,
            *self.root,
            &CreateGCAux::new()
                .foreground(foreground)
                .cap_style(CapStyle::PROJECTING),
        )?;
        Ok(Xid(gc))
    }

    fn free_gc(&self, gc: XGcontext) -> Result<()> {
        self.conn.free_gc(*gc)?;
        Ok(())
    }

    //* Pixmaps and images

    fn create_pixmap(&self, width: u16, height: u16, depth: u8) -> Result<XPixmap> {
        let pixmap = self.conn.generate_id()?;
        self.conn
            .create_pixmap(depth, pixmap, *self.root, width, height)?;
        Ok(Xid(pixmap))
    }

    fn free_pixmap(&self, pixmap: XPixmap) -> Result<()> {
        self.conn.free_pixmap(*pixmap)?;
        Ok(())
    }

    #[cfg_attr(
        debug_assertions,
        instrument(target = "xconn", level = "trace", skip(self, data))
    )]
    fn put_image(&self, pixmap: XPixmap, width: u16, height: u16, data: &[u8]) -> Result<()> {
        let depth = self.visual().depth;
        self.conn.put_image(
            ImageFormat::Z_PIXMAP,
            *pixmap,
            *self.image_gc,
            width,
            height,
            0,
            0,
            0,
            depth,
            data,
        )?;
        Ok(())
    }

    fn get_image(&self, drawable: XPixmap, width: u16, height: u16) -> Result<(u8, Vec<u8>)> {
        let reply = self
            .conn
            .get_image(ImageFormat::Z_PIXMAP, *drawable, 0, 0, width, height, !0)?
            .reply()?;
        Ok((reply.depth, reply.data))
    }

    fn create_bitmap(&self, width: u16, height: u16, bits: &[u8]) -> Result<XPixmap> {
        let vis = self.visual();
        let src_stride = (width as usize).div_ceil(8);
        let dst_stride = vis.bitmap_bytes_per_line(width as usize);

        if bits.len() < src_stride * height as usize {
            return Err(XError::RequestError("bitmap data shorter than its dimensions"))
        }

        // repad each row to the server's bitmap pad, flipping bit order if needed
        let mut data = vec![0u8; dst_stride * height as usize];
        for (src, dst) in bits
            .chunks(src_stride)
            .zip(data.chunks_mut(dst_stride))
            .take(height as usize)
        {
            for (i, byte) in src.iter().enumerate() {
                dst[i] = match vis.bitmap_bit_order {
                    ImageOrder::LsbFirst => *byte,
                    ImageOrder::MsbFirst => byte.reverse_bits(),
                };
            }
        }

        let pixmap = self.conn.generate_id()?;
        self.conn.create_pixmap(1, pixmap, *self.root, width, height)?;
        let gc = self.bitmap_gc(Xid(pixmap))?;
        self.conn.put_image(
            ImageFormat::XY_PIXMAP,
            pixmap,
            *gc,
            width,
            height,
            0,
            0,
            0,
            1,
            &data,
        )?;
        Ok(Xid(pixmap))
    }

    //* Drawing

    fn draw_line(&self, drawable: XPixmap, gc: XGcontext, from: (i16, i16), to: (i16, i16)) -> Result<()> {
        self.conn.poly_line(
            CoordMode::ORIGIN,
            *drawable,
            *gc,
            &[
                xproto::Point { x: from.0, y: from.1 },
                xproto::Point { x: to.0, y: to.1 },
            ],
        )?;
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
        self.conn.change_gc(
            *gc,
            &ChangeGCAux::new()
                .clip_mask(*stencil)
                .clip_x_origin(x as i32)
                .clip_y_origin(y as i32),
        )?;
        self.conn.poly_fill_rectangle(
            *drawable,
            *gc,
            &[xproto::Rectangle { x, y, width, height }],
        )?;
        // unset the clip region
        self.conn.change_gc(
            *gc,
            &ChangeGCAux::new()
                .clip_mask(x11rb::NONE)
                .clip_x_origin(0)
                .clip_y_origin(0),
        )?;
        Ok(())
    }

    //* Fonts

    fn open_font(&self, pattern: &str) -> Result<FontInfo> {
        trace!("Opening font {}", pattern);
        let fid = self.conn.generate_id()?;
        self.conn
            .open_font(fid, pattern.as_bytes())?
            .check()
            .map_err(|_| XError::Font(pattern.into()))?;

        let reply = match self.conn.query_font(fid)?.reply() {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Could not query font {}: {}", pattern, e);
                self.conn.close_font(fid)?;
                return Err(XError::Font(pattern.into()))
            }
        };

        Ok(FontInfo {
            fid: Xid(fid),
            ascent: reply.font_ascent as i32,
            descent: reply.font_descent as i32,
        })
    }

    fn close_font(&self, font: XFont) -> Result<()> {
        self.conn.close_font(*font)?;
        Ok(())
    }

    fn text_width(&self, font: XFont, text: &str) -> Result<i32> {
        if text.is_empty() {
            return Ok(0)
        }
        let reply = self
            .conn
            .query_text_extents(*font, &char2b(text))?
            .reply()?;
        Ok(reply.overall_width)
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
        self.conn.change_gc(*gc, &ChangeGCAux::new().font(*font))?;
        self.conn
            .poly_text16(*drawable, *gc, x, y, &text_items16(text))?;
        Ok(())
    }

    //* Windows

    fn set_window_background(&self, window: XWindowID, pixmap: XPixmap) -> Result<()> {
        self.conn.change_window_attributes(
            *window,
            &ChangeWindowAttributesAux::new().background_pixmap(*pixmap),
        )?;
        self.conn.clear_area(false, *window, 0, 0, 0, 0)?;
        Ok(())
    }
}
