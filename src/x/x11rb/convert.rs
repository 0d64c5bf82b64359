//! Conversions between x11rb and renderer types.

use x11rb::errors;
use x11rb::protocol::xproto;

use crate::x::core::{ImageOrder, Result, VisualClass, XError};

pub(super) fn visual_class(class: xproto::VisualClass) -> Result<VisualClass> {
    if class == xproto::VisualClass::TRUE_COLOR {
        Ok(VisualClass::TrueColor)
    } else if class == xproto::VisualClass::PSEUDO_COLOR {
        Ok(VisualClass::PseudoColor)
    } else if class == xproto::VisualClass::STATIC_COLOR {
        Ok(VisualClass::StaticColor)
    } else {
        Err(XError::UnsupportedVisual(format!("visual class {:?}", class)))
    }
}

pub(super) fn image_order(order: xproto::ImageOrder) -> ImageOrder {
    if order == xproto::ImageOrder::MSB_FIRST {
        ImageOrder::MsbFirst
    } else {
        ImageOrder::LsbFirst
    }
}

/// Packs a UTF-8 string into 16-bit glyph indices, replacing
/// anything outside the basic multilingual plane.
pub(super) fn char2b(text: &str) -> Vec<xproto::Char2b> {
    text.chars()
        .map(|c| {
            let c = u32::from(c);
            let c = if c > 0xffff { u32::from('?') } else { c };
            xproto::Char2b {
                byte1: (c >> 8) as u8,
                byte2: c as u8,
            }
        })
        .collect()
}

/// Encodes text as a list of TEXTITEM16s for PolyText16.
///
/// Each item holds at most 254 glyphs.
pub(super) fn text_items16(text: &str) -> Vec<u8> {
    let glyphs = char2b(text);
    let mut items = Vec::with_capacity(glyphs.len() * 2 + 2 * (glyphs.len() / 254 + 1));

    for chunk in glyphs.chunks(254) {
        items.push(chunk.len() as u8);
        items.push(0); // delta
        for g in chunk {
            items.push(g.byte1);
            items.push(g.byte2);
        }
    }
    items
}

impl From<errors::ConnectionError> for XError {
    fn from(e: errors::ConnectionError) -> XError {
        use errors::ConnectionError::*;
        match e {
            UnknownError | InsufficientMemory | FdPassingFailed => {
                XError::Connection(e.to_string())
            }
            IoError(e) => XError::Connection(e.to_string()),
            other => XError::Protocol(other.to_string()),
        }
    }
}

impl From<errors::ConnectError> for XError {
    fn from(e: errors::ConnectError) -> XError {
        XError::Connection(e.to_string())
    }
}

impl From<errors::ReplyError> for XError {
    fn from(e: errors::ReplyError) -> XError {
        match e {
            errors::ReplyError::ConnectionError(e) => e.into(),
            errors::ReplyError::X11Error(e) => XError::ServerError(format!("{:?}", e.error_kind)),
        }
    }
}

impl From<errors::ReplyOrIdError> for XError {
    fn from(e: errors::ReplyOrIdError) -> XError {
        if let errors::ReplyOrIdError::ConnectionError(e) = e {
            e.into()
        } else {
            XError::ServerError(e.to_string())
        }
    }
}
