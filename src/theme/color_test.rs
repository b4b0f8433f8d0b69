use super::*;

#[test]
fn parse_hex_rgb_supports_short_and_long_forms() {
    assert_eq!(parse_hex_rgb("#ABC"), Some((170, 187, 204)));
    assert_eq!(parse_hex_rgb("  #a1B2c3 "), Some((161, 178, 195)));
}

#[test]
fn parse_hex_rgb_rejects_invalid_inputs() {
    assert_eq!(parse_hex_rgb("AABBCC"), None);
    assert_eq!(parse_hex_rgb("#12"), None);
    assert_eq!(parse_hex_rgb("#abcd"), None);
    assert_eq!(parse_hex_rgb("#12GG34"), None);
    assert_eq!(parse_hex_rgb("#+f+f+f"), None);
    assert_eq!(parse_hex_rgb("#é1"), None);
}

#[test]
fn derive_brand_blue() {
    let variants = ColorVariants::derive("#3B82F6");
    assert_eq!(variants.base, "#3B82F6");
    assert_eq!(variants.hover, "rgb(79,150,255)");
    assert_eq!(variants.dark, "rgb(29,100,216)");
    assert_eq!(variants.light, "rgb(109,180,255)");
    assert_eq!(ColorVariants::derive("#3B82F6"), variants);
}

#[test]
fn derive_clamps_at_both_ends() {
    let black = ColorVariants::derive("#000");
    assert_eq!(black.dark, "rgb(0,0,0)");
    assert_eq!(black.hover, "rgb(20,20,20)");

    let white = ColorVariants::derive("#FFFFFF");
    assert_eq!(white.light, "rgb(255,255,255)");
    assert_eq!(white.dark, "rgb(225,225,225)");
}

#[test]
fn derive_passes_invalid_colors_through() {
    let variants = ColorVariants::derive("teal");
    assert_eq!(variants.base, "teal");
    assert_eq!(variants.hover, "teal");
    assert_eq!(variants.dark, "teal");
    assert_eq!(variants.light, "teal");
}
