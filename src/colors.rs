//! Named colors and HSV convenience constructors.
//!
//! The name table is a plain static mapping resolved at construction time.
//! Lookups are case-insensitive and treat `-`, `_` and spaces alike, so
//! `"Warm White"`, `"warm-white"` and `"warm_white"` all resolve.

use crate::color::Color;
use crate::types::OverflowPolicy;

/// Strip turned off.
pub const BLACK: Color = Color::from_parts([0, 0, 0], [0, 0, 0], OverflowPolicy::Wrap);

/// Full brightness on every channel.
pub const WHITE: Color = Color::from_parts([255, 255, 255], [0, 0, 255], OverflowPolicy::Wrap);

static NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("lime", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("cyan", [0, 255, 255]),
    ("aqua", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("fuchsia", [255, 0, 255]),
    ("orange", [255, 165, 0]),
    ("purple", [128, 0, 128]),
    ("violet", [238, 130, 238]),
    ("pink", [255, 192, 203]),
    ("hot_pink", [255, 105, 180]),
    ("gold", [255, 215, 0]),
    ("amber", [255, 191, 0]),
    ("teal", [0, 128, 128]),
    ("navy", [0, 0, 128]),
    ("indigo", [75, 0, 130]),
    ("crimson", [220, 20, 60]),
    ("coral", [255, 127, 80]),
    ("salmon", [250, 128, 114]),
    ("turquoise", [64, 224, 208]),
    ("chartreuse", [127, 255, 0]),
    ("sky_blue", [135, 206, 235]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("silver", [192, 192, 192]),
    ("warm_white", [255, 244, 229]),
    ("cool_white", [244, 253, 255]),
];

/// Looks up the RGB triple registered for `name`.
pub fn lookup(name: &str) -> Option<[u8; 3]> {
    let wanted = normalize(name);
    NAMED_COLORS
        .iter()
        .find(|(known, _)| *known == wanted)
        .map(|(_, rgb)| *rgb)
}

/// Iterates over every registered name.
pub fn names() -> impl Iterator<Item = &'static str> {
    NAMED_COLORS.iter().map(|(name, _)| *name)
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Creates a color from 8-bit HSV components.
#[inline]
pub fn hsv(hue: i32, saturation: i32, value: i32) -> Color {
    Color::from_hsv(hue, saturation, value)
}

/// Creates a color from hue only (full saturation and value).
#[inline]
pub fn hue(hue: i32) -> Color {
    hsv(hue, 255, 255)
}
