//! Types and traits providing a unified interface with the X server.
//!
//! This module provides the renderer's interface to the X server.
//! The core of this module is the [`XConn`] trait, which defines the
//! requests the rendering core makes: color allocation, pixmap and
//! image transfer, core font text, and window backgrounds.
//!
//! For a concrete implementation, the [`x11rb`] submodule provides
//! [`X11RBConn`].
//!
//! ## Connection Object Initialization
//!
//! `X11RBConn` has two states: uninitialized, and initialized,
//! marked in its type constructor. An uninitialized connection has only
//! established a connection to the server, and has not yet looked up
//! the visual and image formats required for it to be able to safely
//! call any of its methods. Thus, `XConn` is only implemented for
//! initialized connections, and users will have to call the `init`
//! method for a connection object to be usable.

pub mod core;
pub mod traits;

/// Implementation of `XConn` backed by the `x11rb` library.
pub mod x11rb;

#[doc(inline)]
pub use self::core::{
    FontInfo, ImageOrder, Result, VisualClass, VisualInfo, XError, XFont, XGcontext,
    XPixmap, XWindowID, Xid, XID_NONE,
};
#[doc(inline)]
pub use self::traits::XConn;

#[doc(inline)]
pub use self::x11rb::X11RBConn;
#[doc(inline)]
pub use status::ConnStatus;
pub(crate) use status::{Initialized, Uninitialized};

/* since the dummy connection is used for testing
higher-level code and does not actually interact with
an actual X server, keep this enabled for standard testing */
#[cfg(test)]
pub(crate) mod dummy;

pub mod status {
    //! Types for representing connection status.
    //!
    //! This module contains the [`ConnStatus`] sealed trait,
    //! as well as its two implementors, [`Initialized`] and
    //! [`Uninitialized`]. These are used to mark the state of
    //! the connection object, and act as guards to only
    //! expose [`XConn`](crate::x::XConn) methods when safe
    //! to do so.
    mod private {
        pub trait Sealed {}
    }

    /// A trait defining marker types `Uninitialized` and `Initialized`.
    pub trait ConnStatus: private::Sealed {}

    /// A marker struct indicating a connection is uninitialized.
    ///
    /// Uninitialized connections do not expose any methods.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Uninitialized;

    impl ConnStatus for Uninitialized {}
    impl private::Sealed for Uninitialized {}

    /// A marker type indicating a connection is initialized and can be used.
    ///
    /// Initialized connections expose all available methods.
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Initialized;

    impl ConnStatus for Initialized {}
    impl private::Sealed for Initialized {}
}

// backend-agnostic conversion implementations

use std::string::FromUtf8Error;

impl From<FromUtf8Error> for XError {
    fn from(e: FromUtf8Error) -> XError {
        XError::OtherError(format!("Invalid UTF8 data: {}", e))
    }
}
