//! Titlebar buttons and the state table that picks their look.

use bitflags::bitflags;
use strum::*;

/// The kind of a titlebar button.
#[derive(AsRefStr, Display, EnumIter, EnumString, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[strum(serialize_all = "lowercase")]
pub enum ButtonKind {
    /// Maximize, toggled while maximized.
    Max,
    /// Close.
    Close,
    /// Send to all desktops, toggled while on all desktops.
    Desk,
    /// Shade, toggled while shaded.
    Shade,
    /// Iconify.
    Iconify,
}

impl ButtonKind {
    /// Whether the button has toggled looks of its own.
    pub const fn has_toggle(self) -> bool {
        matches!(self, ButtonKind::Max | ButtonKind::Desk | ButtonKind::Shade)
    }
}

bitflags! {
    /// The state of a button as seen by the frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ButtonState: u8 {
        /// The button can be used.
        const ENABLED = 1 << 0;
        /// The pointer is over the button.
        const HOVERED = 1 << 1;
        /// The button is held down.
        const PRESSED = 1 << 2;
        /// The button's action is in effect (e.g. the window is maximized).
        const TOGGLED = 1 << 3;
        /// The window owning the button has focus.
        const FOCUSED = 1 << 4;
    }
}

/// One of the seven looks a button can take.
#[derive(AsRefStr, Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonLook {
    /// Resting.
    #[strum(serialize = "unpressed")]
    Unpressed,
    /// Held down.
    #[strum(serialize = "pressed")]
    Pressed,
    /// Unusable.
    #[strum(serialize = "disabled")]
    Disabled,
    /// Under the pointer.
    #[strum(serialize = "hover")]
    Hover,
    /// Toggled and resting.
    #[strum(serialize = "toggled.unpressed")]
    Toggled,
    /// Toggled and held down.
    #[strum(serialize = "toggled.pressed")]
    ToggledPressed,
    /// Toggled and under the pointer.
    #[strum(serialize = "toggled.hover")]
    ToggledHover,
}

use ButtonLook::*;

/// Looks indexed by the `ENABLED | HOVERED | PRESSED | TOGGLED` bits.
///
/// Disabled wins over everything, pressed wins over hovered.
const LOOKS: [ButtonLook; 16] = [
    /* ----  */ Disabled,
    /* E---  */ Unpressed,
    /* -H--  */ Disabled,
    /* EH--  */ Hover,
    /* --P-  */ Disabled,
    /* E-P-  */ Pressed,
    /* -HP-  */ Disabled,
    /* EHP-  */ Pressed,
    /* ---T  */ Disabled,
    /* E--T  */ Toggled,
    /* -H-T  */ Disabled,
    /* EH-T  */ ToggledHover,
    /* --PT  */ Disabled,
    /* E-PT  */ ToggledPressed,
    /* -HPT  */ Disabled,
    /* EHPT  */ ToggledPressed,
];

impl ButtonLook {
    /// The look of a button of `kind` in `state`.
    pub fn lookup(kind: ButtonKind, state: ButtonState) -> Self {
        let look = LOOKS[(state.bits() & 0b1111) as usize];
        if kind.has_toggle() {
            look
        } else {
            look.untoggled()
        }
    }

    /// The matching look without the toggle.
    pub const fn untoggled(self) -> Self {
        match self {
            Toggled => Unpressed,
            ToggledHover => Hover,
            ToggledPressed => Pressed,
            other => other,
        }
    }

    /// Whether this is one of the toggled looks.
    pub const fn is_toggled(self) -> bool {
        matches!(self, Toggled | ToggledHover | ToggledPressed)
    }

    /// The look whose background and image color this one inherits
    /// when the theme does not set them.
    pub const fn fallback(self) -> Option<Self> {
        match self {
            Unpressed | Disabled => None,
            Pressed | Hover => Some(Unpressed),
            Toggled => Some(Pressed),
            ToggledHover => Some(Toggled),
            ToggledPressed => Some(Pressed),
        }
    }

    /// The look whose bitmap this one copies when the theme has none.
    pub const fn mask_fallback(self) -> Option<Self> {
        match self {
            Unpressed | Toggled => None,
            Pressed | Hover | Disabled => Some(Unpressed),
            ToggledHover | ToggledPressed => Some(Toggled),
        }
    }

    /// Appended to the button kind to name its bitmap file.
    pub const fn file_suffix(self) -> &'static str {
        match self {
            Unpressed => "",
            Pressed => "_pressed",
            Disabled => "_disabled",
            Hover => "_hover",
            Toggled => "_toggled",
            ToggledPressed => "_toggled_pressed",
            ToggledHover => "_toggled_hover",
        }
    }
}
