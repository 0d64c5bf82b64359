//! The trait that defines the interface to the X server.
//!
//! The rendering core needs very little from the server: colors,
//! graphics contexts, pixmaps and image uploads, core fonts, and a
//! way to set a window's background. [`XConn`] collects exactly those
//! requests, so the core never sees the backing library.
//!
//! ```text
//!       RenderInstance
//!             |
//!           XConn
//!             |
//!   ----------|----------
//!   |                   |
//! X11RBConn         DummyConn
//! (x11rb)          (tests only)
//! ```
use super::core::{
    FontInfo, Result, VisualInfo, XFont, XGcontext, XPixmap, XWindowID,
};

/// A trait used to define the interface between the renderer and the X server.
///
/// Its methods are designed to provide as thin a layer as possible,
/// often mapping directly to X server protocol requests, with type
/// conversion to present dependency-agnostic types.
///
/// All methods take `&self`: implementations are expected to use
/// interior mutability for any state they keep, matching the
/// single-threaded ownership model of the rest of the crate.
///
/// # Image Data
///
/// `put_image` and `get_image` exchange ZPixmap data laid out
/// according to [`VisualInfo`]: `bits_per_pixel`, `scanline_pad` and
/// `byte_order` describe every byte. Converting to and from that
/// layout is the job of the [`RenderInstance`][1], not the connection.
///
/// # Implementors
///
/// This crate provides [`X11RBConn`][2], backed by `x11rb`.
///
/// [1]: crate::render::RenderInstance
/// [2]: crate::x::x11rb::X11RBConn
pub trait XConn {
    //* General X server operations

    /// Returns the ID of the root window.
    fn root(&self) -> XWindowID;

    /// Returns a description of the visual used for drawing.
    fn visual(&self) -> VisualInfo;

    /// Flushes all pending requests to the server.
    fn flush(&self) -> Result<()>;

    //* Colors

    /// Allocates a read-only color cell and returns its pixel value.
    fn alloc_color(&self, r: u8, g: u8, b: u8) -> Result<u32>;

    /// Frees a color previously returned by `alloc_color`.
    fn free_color(&self, pixel: u32) -> Result<()>;

    /// Looks up a named color (e.g. `"slate grey"`) in the server's
    /// color database.
    fn lookup_color(&self, name: &str) -> Result<(u8, u8, u8)>;

    //* Graphics contexts

    /// Creates a graphics context on the root window with the given
    /// foreground pixel.
    fn create_gc(&self, foreground: u32) -> Result<XGcontext>;

    /// Frees a graphics context.
    fn free_gc(&self, gc: XGcontext) -> Result<()>;

    //* Pixmaps and images

    /// Creates a pixmap of the given size and depth.
    fn create_pixmap(&self, width: u16, height: u16, depth: u8) -> Result<XPixmap>;

    /// Frees a pixmap.
    fn free_pixmap(&self, pixmap: XPixmap) -> Result<()>;

    /// Uploads ZPixmap data covering the whole of `pixmap`.
    fn put_image(&self, pixmap: XPixmap, width: u16, height: u16, data: &[u8]) -> Result<()>;

    /// Downloads ZPixmap data from a drawable, returning its depth and bytes.
    fn get_image(&self, drawable: XPixmap, width: u16, height: u16) -> Result<(u8, Vec<u8>)>;

    /// Creates a depth-1 pixmap from LSB-first rows of bits, each row
    /// padded to a whole byte.
    fn create_bitmap(&self, width: u16, height: u16, bits: &[u8]) -> Result<XPixmap>;

    //* Drawing

    /// Draws a line with the given graphics context.
    fn draw_line(&self, drawable: XPixmap, gc: XGcontext, from: (i16, i16), to: (i16, i16)) -> Result<()>;

    /// Fills a rectangle with the given graphics context, clipped
    /// through `stencil` placed at the rectangle's origin.
    fn fill_masked(
        &self,
        drawable: XPixmap,
        gc: XGcontext,
        stencil: XPixmap,
        x: i16,
        y: i16,
        width: u16,
        height: u16,
    ) -> Result<()>;

    //* Fonts

    /// Opens a core font by XLFD name or pattern.
    fn open_font(&self, pattern: &str) -> Result<FontInfo>;

    /// Closes a font.
    fn close_font(&self, font: XFont) -> Result<()>;

    /// Returns the width in pixels of `text` drawn with `font`.
    fn text_width(&self, font: XFont, text: &str) -> Result<i32>;

    /// Draws `text` with its baseline starting at `(x, y)`.
    fn draw_text(
        &self,
        drawable: XPixmap,
        gc: XGcontext,
        font: XFont,
        x: i16,
        y: i16,
        text: &str,
    ) -> Result<()>;

    //* Windows

    /// Sets the background of `window` to `pixmap` and clears the
    /// window so it is redrawn with it.
    fn set_window_background(&self, window: XWindowID, pixmap: XPixmap) -> Result<()>;
}
