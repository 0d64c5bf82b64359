//! Parsers for the values found in theme files.

use std::str::FromStr;

use crate::render::{Bevel, FontDescription, FontSlant, FontWeight, Gradient, Justify, Relief};

/// The part of a surface described by an appearance's style string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Style {
    /// The fill.
    pub grad: Gradient,
    /// The bevel direction.
    pub relief: Relief,
    /// The bevel width.
    pub bevel: Bevel,
    /// Whether a border is drawn.
    pub border: bool,
    /// Whether the surface is interlaced.
    pub interlaced: bool,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            grad: Gradient::Solid,
            relief: Relief::Raised,
            bevel: Bevel::One,
            border: false,
            interlaced: false,
        }
    }
}

/// Parses an appearance style such as `"raised gradient vertical bevel2"`.
///
/// Words may come in any order and are not case sensitive. A gradient
/// direction only counts together with the word `gradient`; without
/// a direction a gradient is diagonal. Without `flat` or `sunken` the
/// surface is raised. Unknown words are ignored.
pub fn parse_style(text: &str) -> Style {
    let mut style = Style::default();
    let mut gradient = false;
    let mut parent_relative = false;
    let mut direction = None;

    for word in text.split_whitespace() {
        let word = word.to_lowercase();
        match word.as_str() {
            "gradient" => gradient = true,
            "solid" => {}
            "parentrelative" => parent_relative = true,
            "bevel1" => style.bevel = Bevel::One,
            "bevel2" => style.bevel = Bevel::Two,
            "border" => style.border = true,
            "interlaced" => style.interlaced = true,
            other => {
                if let Ok(relief) = Relief::from_str(other) {
                    style.relief = relief;
                } else if let Ok(grad) = Gradient::from_str(other) {
                    direction = Some(grad);
                } else {
                    trace!("ignoring style word {:?}", other);
                }
            }
        }
    }

    style.grad = if parent_relative {
        Gradient::ParentRelative
    } else if gradient {
        match direction {
            Some(Gradient::Solid) | Some(Gradient::ParentRelative) | None => Gradient::Diagonal,
            Some(dir) => dir,
        }
    } else {
        Gradient::Solid
    };
    style
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a font description on top of `base`.
///
/// The value is a list of `:`-separated fields. `key=value` fields
/// set one property: `name` (or `family`), `size`, `weight`, `slant`,
/// `shadow`, `shadowoffset` and `shadowtint`. A bare leading field is
/// a family, optionally followed by `-<size>`; other bare fields may
/// name a weight or slant.
pub fn parse_font(value: &str, base: &FontDescription) -> FontDescription {
    let mut desc = base.clone();

    for (i, field) in value.split(':').map(str::trim).enumerate() {
        if field.is_empty() {
            continue;
        }
        if let Some((key, val)) = field.split_once('=') {
            let val = val.trim();
            match key.trim().to_lowercase().as_str() {
                "name" | "family" => desc.family = val.to_string(),
                "size" => desc.size = val.parse().unwrap_or(desc.size),
                "weight" => desc.weight = val.parse().unwrap_or(desc.weight),
                "slant" => desc.slant = val.parse().unwrap_or(desc.slant),
                "shadow" => desc.shadow = parse_bool(val).unwrap_or(desc.shadow),
                "shadowoffset" => desc.shadow_offset = val.parse().unwrap_or(desc.shadow_offset),
                "shadowtint" => {
                    desc.shadow_tint = val
                        .parse::<i32>()
                        .map(|t| t.clamp(-100, 100))
                        .unwrap_or(desc.shadow_tint)
                }
                other => {
                    trace!("ignoring font field {:?}", other);
                }
            }
        } else if let Ok(weight) = FontWeight::from_str(field) {
            desc.weight = weight;
        } else if let Ok(slant) = FontSlant::from_str(field) {
            desc.slant = slant;
        } else if i == 0 {
            match field.rsplit_once('-') {
                Some((family, size)) if size.parse::<u32>().is_ok() => {
                    desc.family = family.trim().to_string();
                    desc.size = size.parse().unwrap_or(desc.size);
                }
                _ => desc.family = field.to_string(),
            }
        }
    }
    desc
}

/// Parses a justification, defaulting to left.
pub fn parse_justify(value: Option<&str>) -> Justify {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_defaults_to_raised_solid() {
        assert_eq!(parse_style(""), Style::default());
        assert_eq!(parse_style("solid").relief, Relief::Raised);
    }

    #[test]
    fn test_style_composition() {
        let s = parse_style("Sunken Gradient SplitVertical Bevel2 interlaced");
        assert_eq!(s.grad, Gradient::SplitVertical);
        assert_eq!(s.relief, Relief::Sunken);
        assert_eq!(s.bevel, Bevel::Two);
        assert!(s.interlaced);
        assert!(!s.border);

        let s = parse_style("flat border solid");
        assert_eq!((s.grad, s.relief, s.border), (Gradient::Solid, Relief::Flat, true));
    }

    #[test]
    fn test_style_gradient_rules() {
        assert_eq!(parse_style("raised gradient").grad, Gradient::Diagonal);
        assert_eq!(parse_style("vertical").grad, Gradient::Solid);
        assert_eq!(parse_style("gradient crossdiagonal").grad, Gradient::CrossDiagonal);
        assert_eq!(parse_style("parentrelative").grad, Gradient::ParentRelative);
        assert_eq!(parse_style("ParentRelative gradient vertical").grad, Gradient::ParentRelative);
    }

    #[test]
    fn test_font_fields() {
        let base = FontDescription::default();
        let d = parse_font("name=DejaVu Sans:size=10:weight=bold:slant=italic", &base);
        assert_eq!(d.family, "DejaVu Sans");
        assert_eq!(d.size, 10);
        assert_eq!(d.weight, FontWeight::Bold);
        assert_eq!(d.slant, FontSlant::Italic);

        let d = parse_font("shadow=y:shadowtint=-300:shadowoffset=2", &base);
        assert!(d.shadow);
        assert_eq!(d.shadow_tint, -100);
        assert_eq!(d.shadow_offset, 2);
        assert_eq!(d.family, base.family);
    }

    #[test]
    fn test_font_bare_fields() {
        let base = FontDescription::default();
        let d = parse_font("Terminus-12:bold", &base);
        assert_eq!((d.family.as_str(), d.size, d.weight), ("Terminus", 12, FontWeight::Bold));

        let d = parse_font("DejaVu Sans Mono", &base);
        assert_eq!((d.family.as_str(), d.size), ("DejaVu Sans Mono", 8));

        let d = parse_font("size=huge", &base);
        assert_eq!(d.size, 8);
    }

    #[test]
    fn test_justify() {
        assert_eq!(parse_justify(Some("right")), Justify::Right);
        assert_eq!(parse_justify(Some("sideways")), Justify::Left);
        assert_eq!(parse_justify(None), Justify::Left);
    }
}
