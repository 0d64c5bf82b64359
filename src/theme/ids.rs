//! Names for every color, mask and appearance a theme holds, along
//! with the rules for resolving each from a theme file.
//!
//! Every field is looked up under one or more resource names. When
//! none of them is set, the field falls back to another field of the
//! same theme, or to a built-in default.

use strum::*;

use super::buttons::{ButtonKind, ButtonLook};
use crate::render::Rgb;

fn focus(focused: bool) -> &'static str {
    if focused {
        "active"
    } else {
        "inactive"
    }
}

/// The resource names of a button field, most specific first: the
/// button kind's own key, then the key shared by every kind. The plain
/// toggled look also answers to `toggled.<field>`.
fn button_keys(kind: ButtonKind, focused: bool, look: ButtonLook, field: &str) -> Vec<String> {
    let base = format!("window.{}.button", focus(focused));
    let mut keys = Vec::with_capacity(4);
    for prefix in [format!("{}.{}", base, kind), base] {
        keys.push(format!("{}.{}.{}", prefix, look, field));
        if look == ButtonLook::Toggled {
            keys.push(format!("{}.toggled.{}", prefix, field));
        }
    }
    keys
}

/// What a color falls back to when the theme does not set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFallback {
    /// Share another color of the theme.
    Inherit(ColorId),
    /// Allocate a fixed color.
    Literal(Rgb),
}

/// A named color of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorId {
    /// The border around frames.
    FrameBorder {
        /// Active or inactive frames.
        focused: bool,
    },
    /// The line between the titlebar and the client.
    TitleSeparator {
        /// Active or inactive frames.
        focused: bool,
    },
    /// The padding around the client window.
    ClientPadding {
        /// Active or inactive frames.
        focused: bool,
    },
    /// Window title text.
    LabelText {
        /// Active or inactive frames.
        focused: bool,
    },
    /// Button glyphs.
    ButtonImage {
        /// The kind of button.
        kind: ButtonKind,
        /// Active or inactive frames.
        focused: bool,
        /// The button look the color is for.
        look: ButtonLook,
    },
    /// The border around menus.
    MenuBorder,
    /// Menu title text.
    MenuTitleText,
    /// Menu item text.
    MenuItemText,
    /// Text of the selected menu item.
    MenuItemActiveText,
    /// Text of disabled menu items.
    MenuItemDisabledText,
    /// Text of a disabled menu item under the pointer.
    MenuItemActiveDisabledText,
    /// Menu separator lines.
    MenuSeparator,
    /// Submenu bullets.
    MenuBullet,
    /// The submenu bullet of the selected item.
    MenuBulletSelected,
    /// The border around on-screen displays.
    OsdBorder,
    /// On-screen display text.
    OsdText,
}

/// The order colors are resolved in; every color comes after the
/// colors it may inherit from.
pub(crate) fn color_order() -> Vec<ColorId> {
    use ColorId::*;

    let mut order = Vec::new();
    for focused in [true, false] {
        order.push(FrameBorder { focused });
    }
    for focused in [true, false] {
        order.extend([
            TitleSeparator { focused },
            ClientPadding { focused },
            LabelText { focused },
        ]);
    }
    for focused in [true, false] {
        for kind in ButtonKind::iter() {
            order.extend(looks_of(kind).map(|look| ButtonImage { kind, focused, look }));
        }
    }
    order.extend([
        MenuBorder,
        MenuTitleText,
        MenuItemText,
        MenuItemActiveText,
        MenuItemDisabledText,
        MenuItemActiveDisabledText,
        MenuSeparator,
        MenuBullet,
        MenuBulletSelected,
        OsdBorder,
        OsdText,
    ]);
    order
}

impl ColorId {
    /// The resource names the color is read from, most specific first.
    pub fn keys(&self) -> Vec<String> {
        use ColorId::*;

        match *self {
            FrameBorder { focused: true } => {
                vec!["window.active.border.color".into(), "border.color".into()]
            }
            FrameBorder { focused: false } => vec!["window.inactive.border.color".into()],
            TitleSeparator { focused } => {
                vec![format!("window.{}.title.separator.color", focus(focused))]
            }
            ClientPadding { focused } => vec![format!("window.{}.client.color", focus(focused))],
            LabelText { focused } => vec![format!("window.{}.label.text.color", focus(focused))],
            ButtonImage { kind, focused, look } => button_keys(kind, focused, look, "image.color"),
            MenuBorder => vec!["menu.border.color".into()],
            MenuTitleText => vec!["menu.title.text.color".into()],
            MenuItemText => vec!["menu.items.text.color".into()],
            MenuItemActiveText => vec!["menu.items.active.text.color".into()],
            MenuItemDisabledText => vec!["menu.items.disabled.text.color".into()],
            MenuItemActiveDisabledText => vec!["menu.items.active.disabled.text.color".into()],
            MenuSeparator => vec!["menu.separator.color".into()],
            MenuBullet => vec!["menu.bullet.image.color".into()],
            MenuBulletSelected => vec!["menu.bullet.selected.image.color".into()],
            OsdBorder => vec!["osd.border.color".into()],
            OsdText => vec!["osd.label.text.color".into()],
        }
    }

    /// What the color falls back to when none of its keys are set.
    pub fn fallback(&self) -> ColorFallback {
        use ColorFallback::*;
        use ColorId::*;

        const BLACK: Rgb = (0, 0, 0);
        match *self {
            FrameBorder { focused: true } => Literal(BLACK),
            FrameBorder { focused: false } => Inherit(FrameBorder { focused: true }),
            TitleSeparator { focused } => Inherit(FrameBorder { focused }),
            ClientPadding { .. } => Literal((0xff, 0xff, 0xff)),
            LabelText { focused: true } => Literal(BLACK),
            LabelText { focused: false } => Inherit(LabelText { focused: true }),
            ButtonImage { kind, focused, look } => match look.fallback() {
                Some(look) => Inherit(ButtonImage { kind, focused, look }),
                None => Literal(BLACK),
            },
            MenuBorder | OsdBorder => Inherit(FrameBorder { focused: true }),
            MenuTitleText | MenuItemText | MenuItemActiveText | MenuItemDisabledText => {
                Literal(BLACK)
            }
            MenuItemActiveDisabledText => Inherit(MenuItemDisabledText),
            MenuSeparator | MenuBullet => Inherit(MenuItemText),
            MenuBulletSelected => Inherit(MenuItemActiveText),
            OsdText => Inherit(LabelText { focused: true }),
        }
    }
}

/// What a mask falls back to when the theme has no bitmap for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskFallback {
    /// Copy another mask of the theme.
    Copy(MaskId),
    /// Use the built-in glyph.
    Builtin,
}

/// A named bitmap mask of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskId {
    /// The glyph of a button kind in one look.
    Button(ButtonKind, ButtonLook),
    /// The submenu bullet.
    Bullet,
}

/// Button looks in resolution order; every look comes after the
/// looks it may fall back to.
pub(crate) const LOOK_ORDER: [ButtonLook; 7] = [
    ButtonLook::Unpressed,
    ButtonLook::Disabled,
    ButtonLook::Pressed,
    ButtonLook::Hover,
    ButtonLook::Toggled,
    ButtonLook::ToggledPressed,
    ButtonLook::ToggledHover,
];

/// The looks a button kind has.
pub(crate) fn looks_of(kind: ButtonKind) -> impl Iterator<Item = ButtonLook> {
    LOOK_ORDER
        .into_iter()
        .filter(move |look| kind.has_toggle() || !look.is_toggled())
}

/// The order masks are resolved in.
pub(crate) fn mask_order() -> Vec<MaskId> {
    let mut order: Vec<_> = ButtonKind::iter()
        .flat_map(|kind| looks_of(kind).map(move |look| MaskId::Button(kind, look)))
        .collect();
    order.push(MaskId::Bullet);
    order
}

impl MaskId {
    /// The name of the bitmap file, e.g. `max_toggled_hover.xbm`.
    pub fn file_name(&self) -> String {
        match self {
            MaskId::Button(kind, look) => format!("{}{}.xbm", kind, look.file_suffix()),
            MaskId::Bullet => "bullet.xbm".into(),
        }
    }

    /// What the mask falls back to when its file is missing.
    pub fn fallback(&self) -> MaskFallback {
        match *self {
            MaskId::Button(kind, look) => match look.mask_fallback() {
                Some(look) => MaskFallback::Copy(MaskId::Button(kind, look)),
                None => MaskFallback::Builtin,
            },
            MaskId::Bullet => MaskFallback::Builtin,
        }
    }
}

/// The text layers of menus.
#[derive(AsRefStr, Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum MenuTextKind {
    /// The menu title.
    Title,
    /// A normal item.
    Normal,
    /// The item under the pointer.
    Selected,
    /// A disabled item.
    Disabled,
    /// A disabled item under the pointer.
    DisabledSelected,
}

/// Where an appearance's surface comes from when the theme does not
/// describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFallback {
    /// A flat black surface.
    Default,
    /// A copy of another appearance's surface.
    Copy(AppearanceId),
    /// Always parent-relative; never read from the theme.
    ParentRelative,
}

/// A named appearance of a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppearanceId {
    /// The titlebar background.
    Title {
        /// Active or inactive frames.
        focused: bool,
    },
    /// The window title.
    Label {
        /// Active or inactive frames.
        focused: bool,
    },
    /// The bottom handle.
    Handle {
        /// Active or inactive frames.
        focused: bool,
    },
    /// The resize grips at either end of the handle.
    Grip {
        /// Active or inactive frames.
        focused: bool,
    },
    /// A titlebar button.
    Button {
        /// The kind of button.
        kind: ButtonKind,
        /// Active or inactive frames.
        focused: bool,
        /// The look, see [`ButtonLook::lookup`].
        look: ButtonLook,
    },
    /// The menu background.
    Menu,
    /// The menu title background.
    MenuTitle,
    /// The background of the item under the pointer.
    MenuSelected,
    /// The background of a normal item.
    MenuNormal,
    /// The background of a disabled item.
    MenuDisabled,
    /// The background of a disabled item under the pointer.
    MenuDisabledSelected,
    /// Menu text.
    MenuText(MenuTextKind),
    /// A submenu bullet.
    MenuBullet {
        /// Whether the item is under the pointer.
        selected: bool,
    },
    /// The on-screen display background.
    OsdBackground,
    /// On-screen display text.
    OsdLabel,
    /// A highlighted on-screen display element.
    OsdHilight,
    /// An unhighlighted on-screen display element.
    OsdUnhilight,
    /// A transparent background.
    Clear,
    /// Text on a transparent background.
    ClearText,
    /// The window icon.
    Icon,
}

/// The order appearances are created in; every appearance comes after
/// the appearances its surface may be copied from.
pub(crate) fn appearance_order() -> Vec<AppearanceId> {
    use AppearanceId::*;

    let mut order = Vec::new();
    for focused in [true, false] {
        order.extend([
            Title { focused },
            Label { focused },
            Handle { focused },
            Grip { focused },
        ]);
        for kind in ButtonKind::iter() {
            order.extend(looks_of(kind).map(|look| Button { kind, focused, look }));
        }
    }
    order.extend([
        Menu,
        MenuTitle,
        MenuSelected,
        MenuNormal,
        MenuDisabled,
        MenuDisabledSelected,
    ]);
    order.extend(MenuTextKind::iter().map(MenuText));
    order.extend([
        MenuBullet { selected: false },
        MenuBullet { selected: true },
        OsdBackground,
        OsdLabel,
        OsdHilight,
        OsdUnhilight,
        Clear,
        ClearText,
        Icon,
    ]);
    order
}

impl AppearanceId {
    /// The resource names of the appearance's style, most specific
    /// first. Colors are read under the same names with `.color`,
    /// `.colorTo` and friends appended.
    pub fn keys(&self) -> Vec<String> {
        use AppearanceId::*;

        match *self {
            Title { focused } => vec![format!("window.{}.title.bg", focus(focused))],
            Label { focused } => vec![format!("window.{}.label.bg", focus(focused))],
            Handle { focused } => vec![format!("window.{}.handle.bg", focus(focused))],
            Grip { focused } => vec![format!("window.{}.grip.bg", focus(focused))],
            Button { kind, focused, look } => button_keys(kind, focused, look, "bg"),
            Menu => vec!["menu.items.bg".into()],
            MenuTitle => vec!["menu.title.bg".into()],
            MenuSelected => vec!["menu.items.active.bg".into()],
            OsdBackground => vec!["osd.bg".into()],
            OsdLabel => vec!["osd.label.bg".into()],
            _ => Vec::new(),
        }
    }

    /// Whether the theme may make the appearance parent-relative.
    pub fn allows_parent_relative(&self) -> bool {
        use AppearanceId::*;

        matches!(
            self,
            Label { .. } | Button { .. } | MenuSelected | OsdLabel
        )
    }

    /// Where the surface comes from when the theme does not set it.
    ///
    /// The highlighted OSD surfaces are resolved by the loader, since
    /// they depend on what the labels turned out to be.
    pub fn fallback(&self) -> SurfaceFallback {
        use AppearanceId::*;
        use SurfaceFallback::*;

        match *self {
            Grip { focused } => Copy(Handle { focused }),
            Button { kind, focused, look } => match look.fallback() {
                Some(look) => Copy(Button { kind, focused, look }),
                None => Default,
            },
            MenuDisabledSelected => Copy(MenuSelected),
            OsdBackground => Copy(Title { focused: true }),
            OsdLabel => Copy(Label { focused: true }),
            OsdHilight => Copy(Label { focused: true }),
            OsdUnhilight => Copy(Label { focused: false }),
            MenuNormal | MenuDisabled | MenuText(_) | MenuBullet { .. } | Clear | ClearText | Icon => {
                ParentRelative
            }
            Title { .. } | Label { .. } | Handle { .. } | Menu | MenuTitle | MenuSelected => Default,
        }
    }

    /// The appearance a parent-relative surface is painted over, unless
    /// the frame engine sets another.
    pub fn default_parent(&self) -> Option<AppearanceId> {
        use AppearanceId::*;

        match *self {
            Label { focused } | Button { focused, .. } => Some(Title { focused }),
            MenuNormal
            | MenuDisabled
            | MenuBullet { selected: false }
            | MenuText(MenuTextKind::Normal)
            | MenuText(MenuTextKind::Disabled) => Some(Menu),
            MenuText(MenuTextKind::Title) => Some(MenuTitle),
            MenuText(MenuTextKind::Selected) | MenuBullet { selected: true } => Some(MenuSelected),
            MenuText(MenuTextKind::DisabledSelected) => Some(MenuDisabledSelected),
            OsdLabel => Some(OsdBackground),
            Clear | ClearText | Icon => Some(Title { focused: true }),
            _ => None,
        }
    }
}
