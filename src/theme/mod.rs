//! The theme record and its loader.
//!
//! A [`Theme`] is the fully resolved result of reading a theme file:
//! fonts, dimensions, colors, bitmap masks, and one [`Appearance`] for
//! every visual state of every decoration widget. Themes are built by
//! a [`ThemeLoader`] and never changed in place; switching themes means
//! destroying the old one and loading a new one.
//!
//! Appearances are named by [`AppearanceId`]. A frame engine picks the
//! id matching a widget's state (see [`Theme::button`] for titlebar
//! buttons) and asks the theme to [paint](Theme::paint) it.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};
#[cfg(debug_assertions)]
use tracing::instrument;

use crate::render::{Appearance, Color, Font, Image, Justify, PixmapMask, RenderInstance, TextureLayer};
use crate::x::{XConn, XWindowID};
use crate::{RenderError, Result};

pub mod buttons;
pub mod defaults;
pub mod ids;
pub mod loader;
pub mod parse;
pub mod resource;

#[doc(inline)]
pub use buttons::{ButtonKind, ButtonLook, ButtonState};
#[doc(inline)]
pub use ids::{AppearanceId, ColorId, MaskId, MenuTextKind};
#[doc(inline)]
pub use loader::{FontOverrides, LoaderState, ThemeLoader};
#[doc(inline)]
pub use resource::class_name;

/// The fonts of a theme.
#[derive(Debug, Clone)]
pub struct Fonts {
    /// Titles of focused windows.
    pub active: Font,
    /// Titles of unfocused windows.
    pub inactive: Font,
    /// Menu titles.
    pub menu_title: Font,
    /// Menu items.
    pub menu_item: Font,
    /// On-screen displays.
    pub osd: Font,
}

impl Fonts {
    fn close<X: XConn>(self, inst: &RenderInstance<X>) -> Result<()> {
        let mut closed = Ok(());
        for font in [self.active, self.inactive, self.menu_title, self.menu_item, self.osd] {
            closed = closed.and(font.close(inst));
        }
        closed
    }
}

/// The sizes a theme sets or implies, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    /// Horizontal padding inside the titlebar.
    pub padding_x: i32,
    /// Vertical padding inside the titlebar.
    pub padding_y: i32,
    /// Height of the bottom handle.
    pub handle_height: i32,
    /// Width of the frame border.
    pub border_width: i32,
    /// Width of the menu border.
    pub menu_border_width: i32,
    /// Width of the on-screen display border.
    pub osd_border_width: i32,
    /// Horizontal padding around the client.
    pub client_padding_x: i32,
    /// Vertical padding around the client.
    pub client_padding_y: i32,
    /// Horizontal overlap of a submenu with its parent.
    pub menu_overlap_x: i32,
    /// Vertical overlap of a submenu with its parent.
    pub menu_overlap_y: i32,
    /// Thickness of menu separators.
    pub menu_sep_width: i32,
    /// Horizontal space around menu separators.
    pub menu_sep_padding_x: i32,
    /// Vertical space around menu separators.
    pub menu_sep_padding_y: i32,

    /// The taller of the two window title fonts.
    pub win_font_height: i32,
    /// Height of the title label.
    pub label_height: i32,
    /// Height of the titlebar.
    pub title_height: i32,
    /// Width and height of titlebar buttons.
    pub button_size: i32,
    /// Width of the resize grips.
    pub grip_width: i32,
    /// Height of the menu title font.
    pub menu_title_font_height: i32,
    /// Height of the menu title label.
    pub menu_title_label_height: i32,
    /// Height of the menu title.
    pub menu_title_height: i32,
    /// Height of the menu item font.
    pub menu_font_height: i32,
}

/// A fully loaded theme.
#[derive(Debug)]
pub struct Theme {
    pub(crate) name: String,
    pub(crate) dir: Option<PathBuf>,
    pub(crate) fonts: Fonts,
    pub(crate) dims: Dimensions,
    pub(crate) title_justify: Justify,
    pub(crate) menu_title_justify: Justify,
    pub(crate) colors: HashMap<ColorId, Color>,
    pub(crate) masks: HashMap<MaskId, Rc<PixmapMask>>,
    pub(crate) appearances: IndexMap<AppearanceId, RefCell<Appearance>>,
    pub(crate) parents: HashMap<AppearanceId, AppearanceId>,
    pub(crate) default_icon: Image,
}

impl Theme {
    /// The name the theme was loaded as.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory holding the theme file, if it was read from disk.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// The theme's fonts.
    pub fn fonts(&self) -> &Fonts {
        &self.fonts
    }

    /// The theme's dimensions.
    pub fn dims(&self) -> &Dimensions {
        &self.dims
    }

    /// How window titles are placed in their label.
    pub fn title_justify(&self) -> Justify {
        self.title_justify
    }

    /// How menu titles are placed.
    pub fn menu_title_justify(&self) -> Justify {
        self.menu_title_justify
    }

    /// A named color.
    pub fn color(&self, id: ColorId) -> Option<&Color> {
        self.colors.get(&id)
    }

    /// A named mask.
    pub fn mask(&self, id: MaskId) -> Option<&Rc<PixmapMask>> {
        self.masks.get(&id)
    }

    /// The icon shown for windows without one of their own.
    pub fn default_icon(&self) -> &Image {
        &self.default_icon
    }

    /// Every appearance id the theme holds, in creation order.
    pub fn appearance_ids(&self) -> impl Iterator<Item = AppearanceId> + '_ {
        self.appearances.keys().copied()
    }

    /// A named appearance.
    ///
    /// # Panics
    ///
    /// Panics if the appearance is being painted.
    pub fn appearance(&self, id: AppearanceId) -> Option<Ref<'_, Appearance>> {
        self.appearances.get(&id).map(RefCell::borrow)
    }

    /// A named appearance, for changing its layers.
    ///
    /// # Panics
    ///
    /// Panics if the appearance is borrowed elsewhere.
    pub fn appearance_mut(&self, id: AppearanceId) -> Option<RefMut<'_, Appearance>> {
        self.appearances.get(&id).map(RefCell::borrow_mut)
    }

    /// The appearance a parent-relative appearance is painted over.
    pub fn parent(&self, id: AppearanceId) -> Option<AppearanceId> {
        self.parents.get(&id).copied()
    }

    /// Makes `parent` the appearance `child` is painted over, with
    /// `child` placed at `(x, y)` inside it.
    pub fn set_parent(&mut self, child: AppearanceId, parent: AppearanceId, x: i32, y: i32) -> Result<()> {
        if child == parent {
            return Err(RenderError::Paint(format!("{:?} cannot be its own parent", child)));
        }
        if !self.appearances.contains_key(&parent) {
            return Err(RenderError::Paint(format!("no appearance {:?}", parent)));
        }
        let app = self
            .appearances
            .get_mut(&child)
            .ok_or_else(|| RenderError::Paint(format!("no appearance {:?}", child)))?
            .get_mut();
        app.surface.parent_x = x;
        app.surface.parent_y = y;
        self.parents.insert(child, parent);
        Ok(())
    }

    /// Sets the string of the first text layer of an appearance.
    ///
    /// Returns whether the appearance has a text layer.
    pub fn set_text(&self, id: AppearanceId, text: &str) -> bool {
        let Some(mut app) = self.appearance_mut(id) else {
            return false;
        };
        match app.texture.iter_mut().find(|layer| layer.is_text()) {
            Some(TextureLayer::Text(layer)) => {
                layer.string = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// The appearance for a titlebar button in `state`.
    pub fn button(&self, kind: ButtonKind, state: ButtonState) -> AppearanceId {
        AppearanceId::Button {
            kind,
            focused: state.contains(ButtonState::FOCUSED),
            look: ButtonLook::lookup(kind, state),
        }
    }

    /// Paints the appearance `id` into `window`.
    ///
    /// A parent-relative appearance is painted over its parent, which
    /// must have been painted already.
    #[cfg_attr(
        debug_assertions,
        instrument(target = "theme", level = "trace", skip(self, inst))
    )]
    pub fn paint<X: XConn>(
        &self,
        inst: &RenderInstance<X>,
        id: AppearanceId,
        window: XWindowID,
        width: usize,
        height: usize,
    ) -> Result<()> {
        let cell = self
            .appearances
            .get(&id)
            .ok_or_else(|| RenderError::Paint(format!("no appearance {:?}", id)))?;
        let mut app = cell
            .try_borrow_mut()
            .map_err(|_| RenderError::Paint(format!("{:?} is already being painted", id)))?;

        if !app.surface.grad.is_parent_relative() {
            return app.paint(inst, window, width, height, None);
        }

        let parent = match self.parent(id) {
            Some(pid) => {
                let parent = self.appearances.get(&pid).ok_or(RenderError::ParentNotPainted)?;
                Some(parent.try_borrow().map_err(|_| {
                    RenderError::Paint(format!("parent {:?} is being painted", pid))
                })?)
            }
            None => None,
        };
        app.paint(inst, window, width, height, parent.as_deref())
    }

    /// Releases every resource the theme holds.
    ///
    /// A failed release does not stop the rest; the first error is
    /// returned once everything has been let go.
    pub fn destroy<X: XConn>(self, inst: &RenderInstance<X>) -> Result<()> {
        let Theme {
            name,
            fonts,
            colors,
            masks,
            appearances,
            default_icon,
            ..
        } = self;

        let mut freed = Ok(());
        for (_, app) in appearances {
            freed = freed.and(app.into_inner().free(inst));
        }
        // appearances hold clones of the masks, so these are the last handles
        for (_, mask) in masks {
            if let Ok(mask) = Rc::try_unwrap(mask) {
                freed = freed.and(mask.free(inst));
            }
        }
        for (_, color) in colors {
            freed = freed.and(inst.release_color(color));
        }
        freed = freed.and(fonts.close(inst));
        drop(default_icon);

        match &freed {
            Ok(()) => debug!("destroyed theme {}", name),
            Err(e) => warn!("destroyed theme {} with errors: {}", name, e),
        }
        freed
    }
}
