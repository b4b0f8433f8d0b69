//! Accent color parsing and variant derivation.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

const HOVER_OFFSET: i16 = 20;
const DARK_OFFSET: i16 = -30;
const LIGHT_OFFSET: i16 = 50;

/// Parse `#RGB` or `#RRGGBB` values into RGB channels.
pub fn parse_hex_rgb(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1].repeat(2), 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2].repeat(2), 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3].repeat(2), 16).ok()?;
            Some((r, g, b))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// The four accent shades written to the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorVariants {
    pub base: String,
    pub hover: String,
    pub dark: String,
    pub light: String,
}

impl ColorVariants {
    /// Derive the shades from `main_color`. An unparseable color is passed
    /// through unchanged as every variant.
    #[must_use]
    pub fn derive(main_color: &str) -> Self {
        let Some(rgb) = parse_hex_rgb(main_color) else {
            return Self {
                base: main_color.to_owned(),
                hover: main_color.to_owned(),
                dark: main_color.to_owned(),
                light: main_color.to_owned(),
            };
        };
        Self {
            base: main_color.to_owned(),
            hover: shift(rgb, HOVER_OFFSET),
            dark: shift(rgb, DARK_OFFSET),
            light: shift(rgb, LIGHT_OFFSET),
        }
    }
}

fn shift((r, g, b): (u8, u8, u8), offset: i16) -> String {
    let channel = |c: u8| (i16::from(c) + offset).clamp(0, 255);
    format!("rgb({},{},{})", channel(r), channel(g), channel(b))
}
