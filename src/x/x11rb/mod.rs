use core::marker::PhantomData;

use std::cell::Cell;

use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ConnectionExt as XConnectionExt, CreateGCAux, Screen, Visualtype,
};
use x11rb::rust_connection::RustConnection;

use tracing::debug;

use super::{
    core::{Result, VisualInfo, XError, XGcontext, XPixmap, XWindowID, Xid},
    ConnStatus, Initialized, Uninitialized,
};

mod convert;
mod xconn;

/// A connection to an X server, backed by the x11rb library.
///
/// This is a very simple connection to the X server
/// and is completely synchronous, despite the async capabilities
/// of the underlying library.
///
/// It implements [XConn][1] and thus can be used by a
/// [RenderInstance][2].
///
/// # Usage
///
/// ```no_run
/// use toaru_render::x::X11RBConn;
///
/// let conn = X11RBConn::connect().expect("Connection error");
/// let conn = conn.init().expect("Could not initialize");
/// ```
///
/// [1]: crate::x::XConn
/// [2]: crate::render::RenderInstance
pub struct X11RBConn<S: ConnStatus> {
    conn: RustConnection,
    root: XWindowID,
    idx: usize,
    colormap: u32,
    visual: Option<VisualInfo>,
    /// GC used for uploading images at the root depth.
    image_gc: XGcontext,
    /// GC used for uploading depth-1 bitmaps, created on first use.
    bitmap_gc: Cell<XGcontext>,
    _marker: PhantomData<S>,
}

impl<S: ConnStatus> std::fmt::Debug for X11RBConn<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X11RBConn")
            .field("root", &self.root)
            .field("idx", &self.idx)
            .field("visual", &self.visual)
            .finish()
    }
}

impl X11RBConn<Uninitialized> {
    /// Connect to the X server and allocate a new Connection.
    pub fn connect() -> Result<Self> {
        let (conn, idx) = x11rb::connect(None)?;
        debug!("Connected to x server, got preferred screen {}", idx);

        Ok(Self {
            conn,
            root: Xid(0),
            idx,
            colormap: 0,
            visual: None,
            image_gc: Xid(0),
            bitmap_gc: Cell::new(Xid(0)),
            _marker: PhantomData,
        })
    }

    /// Initializes the connection.
    ///
    /// It does the following:
    ///
    /// - Looks up the root window and default colormap.
    /// - Finds the root visual and the image formats for its depth.
    /// - Creates the graphics context used for image uploads.
    #[must_use =
        "this consumes the connection and returns an initialized one"]
    pub fn init(self) -> Result<X11RBConn<Initialized>> {
        let screen = self
            .conn
            .setup()
            .roots
            .get(self.idx)
            .ok_or(XError::NoScreens)?
            .clone();

        let visual = self.visual_info(&screen)?;
        debug!("Got visual {:?}", visual);

        let image_gc = Xid(self.conn.generate_id()?);
        self.conn
            .create_gc(*image_gc, screen.root, &CreateGCAux::new())?
            .check()?;

        Ok(X11RBConn {
            conn: self.conn,
            root: Xid(screen.root),
            idx: self.idx,
            colormap: screen.default_colormap,
            visual: Some(visual),
            image_gc,
            bitmap_gc: self.bitmap_gc,
            _marker: PhantomData,
        })
    }

    fn visual_info(&self, screen: &Screen) -> Result<VisualInfo> {
        let setup = self.conn.setup();

        let vtype: &Visualtype = screen
            .allowed_depths
            .iter()
            .filter(|d| d.depth == screen.root_depth)
            .flat_map(|d| d.visuals.iter())
            .find(|v| v.visual_id == screen.root_visual)
            .ok_or_else(|| XError::UnsupportedVisual("root visual not found".into()))?;

        let format = setup
            .pixmap_formats
            .iter()
            .find(|f| f.depth == screen.root_depth)
            .ok_or_else(|| {
                XError::UnsupportedVisual(format!("no pixmap format for depth {}", screen.root_depth))
            })?;

        Ok(VisualInfo {
            depth: screen.root_depth,
            class: convert::visual_class(vtype.class)?,
            red_mask: vtype.red_mask,
            green_mask: vtype.green_mask,
            blue_mask: vtype.blue_mask,
            bits_per_pixel: format.bits_per_pixel,
            scanline_pad: format.scanline_pad,
            byte_order: convert::image_order(setup.image_byte_order),
            bitmap_bit_order: convert::image_order(setup.bitmap_format_bit_order),
            bitmap_pad: setup.bitmap_format_scanline_pad,
        })
    }
}

impl X11RBConn<Initialized> {
    /// Connects to the X server and initializes the connection in one go.
    pub fn new() -> Result<Self> {
        X11RBConn::connect()?.init()
    }

    /// Returns the underlying x11rb connection.
    pub fn conn(&self) -> &RustConnection {
        &self.conn
    }

    /// Returns the GC used for depth-1 uploads, creating it if needed.
    pub(crate) fn bitmap_gc(&self, bitmap: XPixmap) -> Result<XGcontext> {
        let gc = self.bitmap_gc.get();
        if !gc.is_none() {
            return Ok(gc)
        }
        trace!("creating bitmap gc");
        let gc = Xid(self.conn.generate_id()?);
        self.conn
            .create_gc(*gc, *bitmap, &CreateGCAux::new().foreground(1).background(0))?
            .check()?;
        self.bitmap_gc.set(gc);
        Ok(gc)
    }
}
