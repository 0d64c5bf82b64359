//! Built-in glyphs and the default window icon, used when a theme
//! does not provide its own.

use super::buttons::ButtonKind;
use crate::render::pack;

/// Width and height of the built-in button glyphs.
pub const BUTTON_GLYPH_SIZE: u16 = 6;

/// Width of the built-in submenu bullet.
pub const BULLET_WIDTH: u16 = 4;
/// Height of the built-in submenu bullet.
pub const BULLET_HEIGHT: u16 = 7;

/// Width and height of the default window icon.
pub const ICON_SIZE: usize = 16;

const MAX: [u8; 6] = [0x3f, 0x3f, 0x21, 0x21, 0x21, 0x3f];
const MAX_TOGGLED: [u8; 6] = [0x3e, 0x22, 0x2f, 0x29, 0x39, 0x0f];
const ICONIFY: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x3f, 0x3f];
const DESK: [u8; 6] = [0x33, 0x33, 0x00, 0x00, 0x33, 0x33];
const DESK_TOGGLED: [u8; 6] = [0x00, 0x1e, 0x1a, 0x16, 0x1e, 0x00];
const SHADE: [u8; 6] = [0x3f, 0x3f, 0x00, 0x00, 0x00, 0x00];
const SHADE_TOGGLED: [u8; 6] = [0x3f, 0x3f, 0x00, 0x0c, 0x1e, 0x3f];
const CLOSE: [u8; 6] = [0x33, 0x3f, 0x1e, 0x1e, 0x3f, 0x33];

/// The submenu bullet, a small right-pointing triangle.
pub const BULLET: [u8; 7] = [0x01, 0x03, 0x07, 0x0f, 0x07, 0x03, 0x01];

/// The built-in glyph for a button, LSB-first, one byte per row.
///
/// Kinds without toggled looks ignore `toggled`.
pub fn button_bits(kind: ButtonKind, toggled: bool) -> &'static [u8; 6] {
    match (kind, toggled) {
        (ButtonKind::Max, false) => &MAX,
        (ButtonKind::Max, true) => &MAX_TOGGLED,
        (ButtonKind::Desk, false) => &DESK,
        (ButtonKind::Desk, true) => &DESK_TOGGLED,
        (ButtonKind::Shade, false) => &SHADE,
        (ButtonKind::Shade, true) => &SHADE_TOGGLED,
        (ButtonKind::Close, _) => &CLOSE,
        (ButtonKind::Iconify, _) => &ICONIFY,
    }
}

/// The default window icon as ARGB bytes, row by row.
#[rustfmt::skip]
const ICON_ARGB: [u8; ICON_SIZE * ICON_SIZE * 4] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30,
    0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30,
    0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30,
    0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4,
    0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x3c, 0x6e, 0xb4, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0,
    0xff, 0xf0, 0xf0, 0xf0, 0xff, 0xf0, 0xf0, 0xf0, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30,
    0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30,
    0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30,
    0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0xff, 0x30, 0x30, 0x30, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// The default window icon, repacked into canonical pixels.
pub fn default_icon() -> Vec<u32> {
    ICON_ARGB
        .chunks_exact(4)
        .map(|p| pack(p[1], p[2], p[3], p[0]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::unpack;
    use strum::IntoEnumIterator;

    #[test]
    fn test_glyphs_fit_six_bits() {
        for kind in ButtonKind::iter() {
            for toggled in [false, true] {
                assert!(button_bits(kind, toggled).iter().all(|row| row & !0x3f == 0));
            }
        }
        assert!(BULLET.iter().all(|row| row & !0x0f == 0));
    }

    #[test]
    fn test_untoggled_only_kinds() {
        assert_eq!(button_bits(ButtonKind::Close, true), button_bits(ButtonKind::Close, false));
        assert_ne!(button_bits(ButtonKind::Max, true), button_bits(ButtonKind::Max, false));
    }

    #[test]
    fn test_default_icon_repacked() {
        let icon = default_icon();
        assert_eq!(icon.len(), ICON_SIZE * ICON_SIZE);
        // transparent rim, opaque frame, blue titlebar, light body
        assert_eq!(unpack(icon[0]).3, 0);
        assert_eq!(unpack(icon[ICON_SIZE + 1]), (0x30, 0x30, 0x30, 0xff));
        assert_eq!(unpack(icon[3 * ICON_SIZE + 5]), (0x3c, 0x6e, 0xb4, 0xff));
        assert_eq!(unpack(icon[10 * ICON_SIZE + 5]), (0xf0, 0xf0, 0xf0, 0xff));
    }
}
