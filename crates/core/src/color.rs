//! CSS-style colour strings.
//!
//! Data points carry colours the way a 2-D canvas would accept them
//! (`#fff`, `#336699`, `rgba(255, 255, 255, 0.5)`, `white`). They are parsed
//! into straight (non-premultiplied) RGBA8.

use thiserror::Error;

/// Straight-alpha RGBA8 colour.
pub type Rgba = image::Rgba<u8>;

/// Errors produced while parsing a colour string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The string was empty after trimming.
    #[error("empty colour string")]
    Empty,
    /// A `#` colour with an unsupported number of digits or a non-hex digit.
    #[error("invalid hex colour `{0}`")]
    InvalidHex(String),
    /// An `rgb(...)`/`rgba(...)` form that could not be parsed.
    #[error("invalid functional colour `{0}`")]
    InvalidFunctional(String),
    /// A bare word that is not a known colour name.
    #[error("unknown colour name `{0}`")]
    UnknownName(String),
}

const NAMED: &[(&str, [u8; 4])] = &[
    ("transparent", [0, 0, 0, 0]),
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("orange", [255, 165, 0, 255]),
];

/// Parse a colour string.
pub fn parse_color(input: &str) -> Result<Rgba, ColorParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ColorParseError::Empty);
    }

    if let Some(hex) = input.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ColorParseError::InvalidHex(input.to_string()));
    }

    let lower = input.to_ascii_lowercase();
    if lower.starts_with("rgb") {
        return parse_functional(&lower)
            .ok_or_else(|| ColorParseError::InvalidFunctional(input.to_string()));
    }

    NAMED
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, rgba)| image::Rgba(*rgba))
        .ok_or_else(|| ColorParseError::UnknownName(input.to_string()))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some(image::Rgba([nibble(0)?, nibble(1)?, nibble(2)?, 255])),
        4 => Some(image::Rgba([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?])),
        6 => Some(image::Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(image::Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn parse_functional(lower: &str) -> Option<Rgba> {
    let (name, rest) = lower.split_once('(')?;
    let body = rest.strip_suffix(')')?;
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();

    let channel = |s: &str| -> Option<u8> {
        let value: f32 = s.parse().ok()?;
        Some(value.clamp(0.0, 255.0).round() as u8)
    };

    match (name.trim(), parts.as_slice()) {
        ("rgb", [r, g, b]) => Some(image::Rgba([channel(r)?, channel(g)?, channel(b)?, 255])),
        ("rgba", [r, g, b, a]) => {
            let alpha: f32 = a.parse().ok()?;
            let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
            Some(image::Rgba([channel(r)?, channel(g)?, channel(b)?, alpha]))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        assert_eq!(parse_color("#ffffff").unwrap(), image::Rgba([255, 255, 255, 255]));
        assert_eq!(parse_color("#eee").unwrap(), image::Rgba([238, 238, 238, 255]));
        assert_eq!(parse_color("#00000080").unwrap(), image::Rgba([0, 0, 0, 128]));
        assert!(matches!(parse_color("#12345"), Err(ColorParseError::InvalidHex(_))));
        assert!(matches!(parse_color("#gggggg"), Err(ColorParseError::InvalidHex(_))));
    }

    #[test]
    fn parses_functional_forms() {
        assert_eq!(
            parse_color("rgba(255, 255, 255, 0.5)").unwrap(),
            image::Rgba([255, 255, 255, 128])
        );
        assert_eq!(parse_color("rgb(10,20,30)").unwrap(), image::Rgba([10, 20, 30, 255]));
        assert!(parse_color("rgba(1, 2, 3)").is_err());
    }

    #[test]
    fn parses_names() {
        assert_eq!(parse_color("White").unwrap(), image::Rgba([255, 255, 255, 255]));
        assert_eq!(parse_color("transparent").unwrap()[3], 0);
        assert!(matches!(parse_color("chartreuse-ish"), Err(ColorParseError::UnknownName(_))));
        assert_eq!(parse_color("  "), Err(ColorParseError::Empty));
    }
}
