//! # Toaru Render - Theme-driven window decorations
//!
//! This crate contains the pieces a window manager needs to turn a textual
//! theme description into painted window decorations: titlebars, labels,
//! buttons, handles, grips, menus and on-screen displays.
//!
//! It does not manage windows itself. A frame engine owns the decoration
//! windows, decides which visual state each widget is in, and asks this
//! crate to paint the matching [`Appearance`] into a window.
//!
//! ## Design
//!
//! The crate is split into three layers, each built on the one below it:
//!
//! - [`x`], the interface to the display server. Everything that talks to
//!   the X server goes through the [`XConn`] trait, which has a production
//!   implementation backed by `x11rb`.
//!
//! - [`render`], the rendering core. A [`RenderInstance`] owns the
//!   connection together with the process-wide color table and image cache.
//!   On top of it sit the gradient rasterizer, bitmap masks, fonts, the RGBA
//!   image cache, and the [`Appearance`] compositor that ties them together.
//!
//! - [`theme`], the theme record and its loader. A [`ThemeLoader`] reads a
//!   `themerc` resource database and populates a [`Theme`]: fonts,
//!   dimensions, colors, masks and every named appearance.
//!
//! ```text
//!         ThemeLoader
//!             |
//!           Theme
//!             |
//!   ----------|----------
//!   |         |         |
//! Color     Appearance  Image
//!   |         |         |
//!   ----------|----------
//!             |
//!       RenderInstance
//!             |
//!           XConn
//! ```
//!
//! ## Ownership and Threads
//!
//! Everything in this crate is single threaded. Shared resources such as
//! colors, fonts and images are reference counted with [`std::rc::Rc`], and
//! the process-wide tables live behind [`std::cell::RefCell`]s inside the
//! `RenderInstance`. None of these types are `Send`.
//!
//! Server-side resources are released explicitly through the instance that
//! created them (see [`RenderInstance::release_color`] and
//! [`Theme::destroy`]), since releasing them needs the connection.

#![warn(
    missing_debug_implementations,
    missing_copy_implementations,
    missing_docs
)]

#[macro_use]
mod log;

pub mod config;
pub mod render;
pub mod theme;
pub mod x;

#[doc(inline)]
pub use crate::config::ThemeConfig;
#[doc(inline)]
pub use crate::render::{Appearance, Color, RenderInstance};
#[doc(inline)]
pub use crate::theme::{Theme, ThemeLoader};
#[doc(inline)]
pub use crate::x::{XConn, XError};

use thiserror::Error;

/// Everything that could possibly go wrong while rendering or loading a theme.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RenderError {
    /// The display server could not allocate a color.
    #[error("could not allocate color ({0}, {1}, {2})")]
    ColorAlloc(u8, u8, u8),

    /// A color specification could not be parsed.
    #[error("invalid color specification: {0}")]
    InvalidColor(String),

    /// A bitmap mask could not be read or parsed.
    #[error("could not load mask: {0}")]
    MaskLoad(String),

    /// A font could not be opened.
    #[error("could not open font: {0}")]
    FontOpen(String),

    /// A theme could not be found or did not parse.
    #[error("could not load theme: {0}")]
    ThemeLoad(String),

    /// A parent-relative surface was painted before its parent.
    #[error("parent of a parent-relative surface has not been painted")]
    ParentNotPainted,

    /// An image buffer did not match its stated dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// A paint request could not be carried out.
    #[error("paint error: {0}")]
    Paint(String),

    /// The loader configuration is invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// An error with the underlying X connection.
    #[error("platform error: {0}")]
    Platform(#[from] XError),
}

/// The general result type used by this crate.
pub type Result<T> = ::core::result::Result<T, RenderError>;
