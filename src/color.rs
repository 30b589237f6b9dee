//! Dual-representation pixel color.
//!
//! A [`Color`] stores every value twice, once as RGB and once as HSV, each
//! channel on a 0..=255 scale. The two encodings are kept in lockstep: every
//! write recomputes the whole opposite encoding from the freshly stored
//! channels, and every stored channel (written or derived) passes through the
//! color's [`OverflowPolicy`].

use crate::colors;
use crate::types::{BlinkenResult, Error, OverflowPolicy};
use palette::convert::FromColorUnclamped;
use palette::{Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// Keeps `x / 255 * 255` style round trips from truncating one step low.
const TRUNCATION_EPSILON: f64 = 1e-9;

/// A pixel color with synchronized RGB and HSV encodings.
///
/// Equality compares the RGB triple only; HSV is derived.
#[derive(Debug, Clone, Copy)]
pub struct Color {
    rgb: [i32; 3],
    hsv: [i32; 3],
    policy: OverflowPolicy,
}

impl Color {
    pub(crate) const fn from_parts(rgb: [i32; 3], hsv: [i32; 3], policy: OverflowPolicy) -> Self {
        Self { rgb, hsv, policy }
    }

    /// Creates a color from RGB channels using the default overflow policy.
    pub fn from_rgb(red: i32, green: i32, blue: i32) -> Self {
        Self::from_rgb_with(red, green, blue, OverflowPolicy::default())
    }

    /// Creates a color from RGB channels using `policy`.
    pub fn from_rgb_with(red: i32, green: i32, blue: i32, policy: OverflowPolicy) -> Self {
        let mut color = Self::from_parts([0; 3], [0; 3], policy);
        color.set_rgb(red, green, blue);
        color
    }

    /// Creates a color from HSV channels using the default overflow policy.
    pub fn from_hsv(hue: i32, saturation: i32, value: i32) -> Self {
        Self::from_hsv_with(hue, saturation, value, OverflowPolicy::default())
    }

    /// Creates a color from HSV channels using `policy`.
    pub fn from_hsv_with(hue: i32, saturation: i32, value: i32, policy: OverflowPolicy) -> Self {
        let mut color = Self::from_parts([0; 3], [0; 3], policy);
        color.set_hsv(hue, saturation, value);
        color
    }

    /// Creates a color from a packed `0xRRGGBB` integer.
    ///
    /// # Errors
    /// `InvalidColorSpec` if bits above the low 24 are set.
    pub fn from_packed(packed: u32) -> BlinkenResult<Self> {
        if packed > 0x00FF_FFFF {
            return Err(Error::invalid_color(format!(
                "packed color {packed:#x} does not fit in 24 bits"
            )));
        }
        Ok(Self::from_rgb(
            ((packed >> 16) & 0xFF) as i32,
            ((packed >> 8) & 0xFF) as i32,
            (packed & 0xFF) as i32,
        ))
    }

    /// Creates a color from the named-color table.
    ///
    /// # Errors
    /// `InvalidColorSpec` if the name is not registered.
    pub fn from_name(name: &str) -> BlinkenResult<Self> {
        let [r, g, b] = colors::lookup(name)
            .ok_or_else(|| Error::invalid_color(format!("unknown color name '{name}'")))?;
        Ok(Self::from_rgb(r as i32, g as i32, b as i32))
    }

    /// Red channel.
    #[inline]
    pub fn red(&self) -> i32 {
        self.rgb[0]
    }

    /// Green channel.
    #[inline]
    pub fn green(&self) -> i32 {
        self.rgb[1]
    }

    /// Blue channel.
    #[inline]
    pub fn blue(&self) -> i32 {
        self.rgb[2]
    }

    /// Hue channel; 0..=255 covers the full wheel.
    #[inline]
    pub fn hue(&self) -> i32 {
        self.hsv[0]
    }

    /// Saturation channel.
    #[inline]
    pub fn saturation(&self) -> i32 {
        self.hsv[1]
    }

    /// Value (brightness) channel.
    #[inline]
    pub fn value(&self) -> i32 {
        self.hsv[2]
    }

    /// Returns `(red, green, blue)`.
    #[inline]
    pub fn rgb(&self) -> (i32, i32, i32) {
        (self.rgb[0], self.rgb[1], self.rgb[2])
    }

    /// Returns `(hue, saturation, value)`.
    #[inline]
    pub fn hsv(&self) -> (i32, i32, i32) {
        (self.hsv[0], self.hsv[1], self.hsv[2])
    }

    /// Overflow policy applied to future writes.
    #[inline]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Replaces the overflow policy. Stored channels are not reconverted.
    pub fn set_policy(&mut self, policy: OverflowPolicy) {
        self.policy = policy;
    }

    /// Builder form of [`Color::set_policy`].
    pub fn with_policy(mut self, policy: OverflowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Writes all three RGB channels and rederives HSV.
    pub fn set_rgb(&mut self, red: i32, green: i32, blue: i32) {
        let policy = self.policy;
        self.rgb = [red, green, blue].map(|c| policy.apply(c));
        self.hsv = rgb_to_hsv(self.rgb).map(|c| policy.apply(c));
    }

    /// Writes all three HSV channels and rederives RGB.
    pub fn set_hsv(&mut self, hue: i32, saturation: i32, value: i32) {
        let policy = self.policy;
        self.hsv = [hue, saturation, value].map(|c| policy.apply(c));
        self.rgb = hsv_to_rgb(self.hsv).map(|c| policy.apply(c));
    }

    /// Writes the red channel and rederives HSV.
    pub fn set_red(&mut self, red: i32) {
        self.set_rgb(red, self.rgb[1], self.rgb[2]);
    }

    /// Writes the green channel and rederives HSV.
    pub fn set_green(&mut self, green: i32) {
        self.set_rgb(self.rgb[0], green, self.rgb[2]);
    }

    /// Writes the blue channel and rederives HSV.
    pub fn set_blue(&mut self, blue: i32) {
        self.set_rgb(self.rgb[0], self.rgb[1], blue);
    }

    /// Writes the hue channel and rederives RGB.
    pub fn set_hue(&mut self, hue: i32) {
        self.set_hsv(hue, self.hsv[1], self.hsv[2]);
    }

    /// Writes the saturation channel and rederives RGB.
    pub fn set_saturation(&mut self, saturation: i32) {
        self.set_hsv(self.hsv[0], saturation, self.hsv[2]);
    }

    /// Writes the value channel and rederives RGB.
    pub fn set_value(&mut self, value: i32) {
        self.set_hsv(self.hsv[0], self.hsv[1], value);
    }

    /// True when every RGB channel is zero.
    #[inline]
    pub fn is_off(&self) -> bool {
        self.rgb == [0, 0, 0]
    }

    /// RGB channels saturated into the 8-bit range, in (r, g, b) order.
    pub fn to_rgb8(&self) -> [u8; 3] {
        self.rgb.map(|c| c.clamp(0, 255) as u8)
    }

    /// Packs the 8-bit RGB channels as `0xRRGGBB`.
    pub fn to_packed(&self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }
}

impl Default for Color {
    fn default() -> Self {
        colors::BLACK
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.rgb == other.rgb
    }
}

impl Eq for Color {}

fn truncate(unit: f64) -> i32 {
    (unit * 255.0 + TRUNCATION_EPSILON) as i32
}

fn rgb_to_hsv(rgb: [i32; 3]) -> [i32; 3] {
    let [r, g, b] = rgb.map(|c| c as f64 / 255.0);
    let hsv: Hsv<palette::encoding::Srgb, f64> = Hsv::from_color_unclamped(Srgb::new(r, g, b));
    let hue = hsv.hue.into_positive_degrees() / 360.0;
    [truncate(hue), truncate(hsv.saturation), truncate(hsv.value)]
}

fn hsv_to_rgb(hsv: [i32; 3]) -> [i32; 3] {
    let [h, s, v] = hsv.map(|c| c as f64 / 255.0);
    let rgb = Srgb::<f64>::from_color_unclamped(Hsv::<palette::encoding::Srgb, f64>::new(
        h * 360.0,
        s,
        v,
    ));
    [truncate(rgb.red), truncate(rgb.green), truncate(rgb.blue)]
}

/// Declarative color description carrying exactly one source.
///
/// This is the form colors take in configuration files:
/// `{"rgb": [255, 0, 0]}`, `{"hsv": [0, 255, 255]}`, `{"packed": 16711680}`
/// or `{"name": "red"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<[i32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsv: Option<[i32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ColorSpec {
    /// Spec with an RGB source.
    pub fn rgb(red: i32, green: i32, blue: i32) -> Self {
        Self {
            rgb: Some([red, green, blue]),
            ..Self::default()
        }
    }

    /// Spec with an HSV source.
    pub fn hsv(hue: i32, saturation: i32, value: i32) -> Self {
        Self {
            hsv: Some([hue, saturation, value]),
            ..Self::default()
        }
    }

    /// Spec with a packed `0xRRGGBB` source.
    pub fn packed(packed: u32) -> Self {
        Self {
            packed: Some(packed),
            ..Self::default()
        }
    }

    /// Spec naming an entry of the color table.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Builds the described color under `policy`.
    ///
    /// # Errors
    /// `InvalidColorSpec` when no source or more than one source is given,
    /// the packed value exceeds 24 bits, or the name is unknown.
    pub fn resolve(&self, policy: OverflowPolicy) -> BlinkenResult<Color> {
        let sources = [
            self.rgb.is_some(),
            self.hsv.is_some(),
            self.packed.is_some(),
            self.name.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count();

        match sources {
            0 => return Err(Error::invalid_color("no color provided")),
            1 => {}
            n => {
                return Err(Error::invalid_color(format!(
                    "expected exactly one color source, got {n}"
                )));
            }
        }

        if let Some([r, g, b]) = self.rgb {
            return Ok(Color::from_rgb_with(r, g, b, policy));
        }
        if let Some([h, s, v]) = self.hsv {
            return Ok(Color::from_hsv_with(h, s, v, policy));
        }
        let color = match (self.packed, self.name.as_deref()) {
            (Some(packed), _) => Color::from_packed(packed)?,
            (_, Some(name)) => Color::from_name(name)?,
            _ => return Err(Error::invalid_color("no color provided")),
        };
        let (r, g, b) = color.rgb();
        Ok(Color::from_rgb_with(r, g, b, policy))
    }
}

impl TryFrom<&ColorSpec> for Color {
    type Error = Error;

    fn try_from(spec: &ColorSpec) -> Result<Self, Self::Error> {
        spec.resolve(OverflowPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_convert_exactly() {
        assert_eq!(Color::from_rgb(255, 0, 0).hsv(), (0, 255, 255));
        assert_eq!(Color::from_rgb(0, 255, 0).hsv(), (85, 255, 255));
        assert_eq!(Color::from_hsv(0, 255, 255).rgb(), (255, 0, 0));
        assert_eq!(Color::from_hsv(85, 255, 255).rgb(), (0, 255, 0));
    }

    #[test]
    fn gray_has_zero_hue_and_saturation() {
        let gray = Color::from_rgb(128, 128, 128);
        assert_eq!(gray.hsv(), (0, 0, 128));
    }

    #[test]
    fn set_hue_rederives_rgb() {
        let mut color = Color::from_rgb(255, 0, 0);
        color.set_hue(85);
        assert_eq!(color.rgb(), (0, 255, 0));
        assert_eq!(color.hsv(), (85, 255, 255));
    }

    #[test]
    fn set_red_rederives_hsv() {
        let mut color = Color::from_rgb(0, 0, 0);
        color.set_red(255);
        assert_eq!(color.hsv(), (0, 255, 255));
    }

    #[test]
    fn wrap_policy_applies_to_written_channel() {
        let color = Color::from_rgb_with(260, 0, 0, OverflowPolicy::Wrap);
        assert_eq!(color.red(), 5);
    }

    #[test]
    fn clamp_policy_applies_to_written_channel() {
        let color = Color::from_rgb_with(260, 0, 0, OverflowPolicy::Clamp);
        assert_eq!(color.red(), 255);
    }

    #[test]
    fn changing_policy_does_not_reconvert() {
        let mut color = Color::from_rgb_with(600, 0, 0, OverflowPolicy::Wrap);
        assert_eq!(color.red(), 345);
        color.set_policy(OverflowPolicy::Clamp);
        assert_eq!(color.red(), 345);
        color.set_green(0);
        assert_eq!(color.red(), 255);
    }

    #[test]
    fn equality_ignores_policy() {
        let a = Color::from_rgb_with(10, 20, 30, OverflowPolicy::Clamp);
        let b = Color::from_rgb_with(10, 20, 30, OverflowPolicy::Wrap);
        assert_eq!(a, b);
    }

    #[test]
    fn packed_round_trip() {
        let color = Color::from_packed(0x12_34_56).unwrap();
        assert_eq!(color.rgb(), (0x12, 0x34, 0x56));
        assert_eq!(color.to_packed(), 0x12_34_56);
    }

    #[test]
    fn packed_rejects_wide_values() {
        assert!(matches!(
            Color::from_packed(0x0100_0000),
            Err(Error::InvalidColorSpec(_))
        ));
    }

    #[test]
    fn spec_requires_exactly_one_source() {
        let empty = ColorSpec::default();
        assert!(matches!(
            empty.resolve(OverflowPolicy::Wrap),
            Err(Error::InvalidColorSpec(_))
        ));

        let both = ColorSpec {
            rgb: Some([1, 2, 3]),
            name: Some("red".into()),
            ..ColorSpec::default()
        };
        assert!(matches!(
            both.resolve(OverflowPolicy::Wrap),
            Err(Error::InvalidColorSpec(_))
        ));
    }

    #[test]
    fn spec_resolves_under_given_policy() {
        let color = ColorSpec::rgb(300, 0, 0).resolve(OverflowPolicy::Clamp).unwrap();
        assert_eq!(color.red(), 255);
        assert!(matches!(color.policy(), OverflowPolicy::Clamp));
    }

    #[test]
    fn to_rgb8_saturates_over_range_channels() {
        let color = Color::from_rgb_with(600, 0, 0, OverflowPolicy::Wrap);
        assert_eq!(color.to_rgb8(), [255, 0, 0]);
    }
}
