//! Accent-color propagation from site settings to CSS custom properties.

pub mod color;
pub mod css;

pub use color::{ColorVariants, parse_hex_rgb};
pub use css::{StyleMap, ThemeSink, apply_main_color, spawn_theme_projection};
