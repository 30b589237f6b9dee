//! Strand and animation configuration.
//!
//! Configuration is plain data, deserialized with serde and validated before
//! use:
//!
//! ```json
//! {
//!   "pixel_count": 60,
//!   "tick_interval_ms": 50,
//!   "overflow": "clamp",
//!   "animation": { "kind": "rainbow_sparkle", "probability": 0.05, "decay_rate": 0.9 }
//! }
//! ```

use crate::animations::{self, MultiSparkle, Transform};
use crate::color::{Color, ColorSpec};
use crate::transition::{
    Transition, fill, hue_rotate, identity, phased, rainbow, rotate_hue, unchanged, with_policy,
};
use crate::types::{BlinkenResult, Error, OverflowPolicy};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_step_length() -> usize {
    1
}

fn default_spacing() -> usize {
    3
}

fn default_probability() -> f64 {
    0.1
}

fn default_decay_rate() -> f64 {
    0.95
}

/// Complete strand configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrandConfig {
    /// Number of pixels driven. Must be positive.
    pub pixel_count: usize,

    /// Delay between ticks in milliseconds. Must be positive.
    pub tick_interval_ms: u64,

    /// Overflow policy for every color the animation creates.
    #[serde(default)]
    pub overflow: OverflowPolicy,

    pub animation: AnimationConfig,
}

impl StrandConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(text: &str) -> BlinkenResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| Error::serde(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> BlinkenResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::serde(e.to_string()))
    }

    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// # Errors
    /// `InvalidConfiguration` for a non-positive pixel count or interval or
    /// an out-of-range animation parameter; `InvalidColorSpec` for a bad
    /// color.
    pub fn validate(&self) -> BlinkenResult<()> {
        if self.pixel_count == 0 {
            return Err(Error::invalid_config("pixel_count must be positive"));
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::invalid_config("tick_interval_ms must be positive"));
        }
        self.animation.validate(self.overflow)
    }
}

/// The animation to install, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnimationConfig {
    /// Every pixel one color.
    Solid { color: ColorSpec },

    /// Static hue wheel along the strand.
    Rainbow,

    /// Hue wheel along the strand, every pixel rotating in place.
    RainbowCycle,

    /// Current frame with every hue rotating by one per tick.
    HueRotate,

    /// One traveling dot.
    PixelChase {
        color: ColorSpec,
        #[serde(default = "default_step_length")]
        step_length: usize,
        #[serde(default)]
        rotate_hue: bool,
    },

    /// One traveling dot cycling through the hue wheel.
    RainbowChase {
        #[serde(default = "default_step_length")]
        step_length: usize,
    },

    /// Every `spacing`-th pixel lit, marching along the strand.
    TheaterChase {
        color: ColorSpec,
        #[serde(default = "default_spacing")]
        spacing: usize,
    },

    /// Theater chase whose lights cycle through the hue wheel.
    RainbowTheaterChase {
        #[serde(default = "default_spacing")]
        spacing: usize,
    },

    /// Paints one more pixel per tick until the strand is covered.
    ColorWipe { color: ColorSpec },

    /// White sparkles.
    Sparkle {
        #[serde(default = "default_probability")]
        probability: f64,
        #[serde(default = "default_decay_rate")]
        decay_rate: f64,
    },

    /// Sparkles in random hues.
    RainbowSparkle {
        #[serde(default = "default_probability")]
        probability: f64,
        #[serde(default = "default_decay_rate")]
        decay_rate: f64,
    },

    /// Sparkles popping to a fixed color.
    ColorSparkle {
        color: ColorSpec,
        #[serde(default = "default_probability")]
        probability: f64,
        #[serde(default = "default_decay_rate")]
        decay_rate: f64,
    },
}

fn check_step_length(name: &str, value: usize) -> BlinkenResult<()> {
    if value == 0 {
        return Err(Error::invalid_config(format!("{name} must be at least 1")));
    }
    Ok(())
}

fn check_sparkle(probability: f64, decay_rate: f64) -> BlinkenResult<()> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(Error::invalid_config(format!(
            "probability must be in [0, 1], got {probability}"
        )));
    }
    if !(decay_rate > 0.0 && decay_rate <= 1.0) {
        return Err(Error::invalid_config(format!(
            "decay_rate must be in (0, 1], got {decay_rate}"
        )));
    }
    Ok(())
}

impl AnimationConfig {
    /// Checks every parameter without building anything.
    pub fn validate(&self, policy: OverflowPolicy) -> BlinkenResult<()> {
        match self {
            AnimationConfig::Solid { color } | AnimationConfig::ColorWipe { color } => {
                color.resolve(policy).map(drop)
            }
            AnimationConfig::Rainbow | AnimationConfig::RainbowCycle | AnimationConfig::HueRotate => {
                Ok(())
            }
            AnimationConfig::PixelChase {
                color, step_length, ..
            } => {
                check_step_length("step_length", *step_length)?;
                color.resolve(policy).map(drop)
            }
            AnimationConfig::RainbowChase { step_length } => {
                check_step_length("step_length", *step_length)
            }
            AnimationConfig::TheaterChase { color, spacing } => {
                check_step_length("spacing", *spacing)?;
                color.resolve(policy).map(drop)
            }
            AnimationConfig::RainbowTheaterChase { spacing } => check_step_length("spacing", *spacing),
            AnimationConfig::Sparkle {
                probability,
                decay_rate,
            }
            | AnimationConfig::RainbowSparkle {
                probability,
                decay_rate,
            } => check_sparkle(*probability, *decay_rate),
            AnimationConfig::ColorSparkle {
                color,
                probability,
                decay_rate,
            } => {
                check_sparkle(*probability, *decay_rate)?;
                color.resolve(policy).map(drop)
            }
        }
    }

    /// Builds the configured transition for a strand of `pixel_count` pixels.
    ///
    /// Every color the transition produces carries `policy`.
    pub fn build(
        &self,
        pixel_count: usize,
        policy: OverflowPolicy,
    ) -> BlinkenResult<Box<dyn Transition + Send>> {
        self.validate(policy)?;

        let transition: Box<dyn Transition + Send> = match self {
            AnimationConfig::Solid { color } => Box::new(fill(color.resolve(policy)?)),
            AnimationConfig::Rainbow => Box::new(phased(rainbow(), identity())),
            AnimationConfig::RainbowCycle => Box::new(animations::rainbow_cycle()),
            AnimationConfig::HueRotate => Box::new(hue_rotate()),
            AnimationConfig::PixelChase {
                color,
                step_length,
                rotate_hue: rotate,
            } => {
                let transform: Transform = if *rotate { rotate_hue } else { unchanged };
                Box::new(animations::pixel_chase(
                    color.resolve(policy)?,
                    transform,
                    *step_length,
                )?)
            }
            AnimationConfig::RainbowChase { step_length } => {
                Box::new(animations::rainbow_chase(*step_length)?)
            }
            AnimationConfig::TheaterChase { color, spacing } => {
                Box::new(animations::theater_chase(color.resolve(policy)?, *spacing)?)
            }
            AnimationConfig::RainbowTheaterChase { spacing } => {
                Box::new(animations::rainbow_theater_chase(*spacing)?)
            }
            AnimationConfig::ColorWipe { color } => {
                Box::new(animations::color_wipe(color.resolve(policy)?))
            }
            AnimationConfig::Sparkle {
                probability,
                decay_rate,
            } => Box::new(animations::sparkle(pixel_count, *probability, *decay_rate)?),
            AnimationConfig::RainbowSparkle {
                probability,
                decay_rate,
            } => Box::new(animations::rainbow_sparkle(
                pixel_count,
                *probability,
                *decay_rate,
            )?),
            AnimationConfig::ColorSparkle {
                color,
                probability,
                decay_rate,
            } => {
                let pop_color: Color = color.resolve(policy)?;
                Box::new(MultiSparkle::new(
                    pixel_count,
                    *probability,
                    *decay_rate,
                    move |_: usize, _: &[Color], _: &[u32], _: &mut dyn RngCore| pop_color,
                )?)
            }
        };
        Ok(Box::new(with_policy(transition, policy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sparkle_with_defaults() {
        let config = StrandConfig::from_json(
            r#"{"pixel_count": 10, "tick_interval_ms": 20, "animation": {"kind": "sparkle"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.animation,
            AnimationConfig::Sparkle {
                probability: 0.1,
                decay_rate: 0.95
            }
        );
        assert!(matches!(config.overflow, OverflowPolicy::Wrap));
    }

    #[test]
    fn parses_overflow_selector() {
        let config = StrandConfig::from_json(
            r#"{"pixel_count": 1, "tick_interval_ms": 1, "overflow": "clamp", "animation": {"kind": "rainbow"}}"#,
        )
        .unwrap();
        assert!(matches!(config.overflow, OverflowPolicy::Clamp));
    }

    #[test]
    fn rejects_zero_pixel_count() {
        let result = StrandConfig::from_json(
            r#"{"pixel_count": 0, "tick_interval_ms": 20, "animation": {"kind": "rainbow"}}"#,
        );
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        let result = StrandConfig::from_json("{ not json");
        assert!(matches!(result, Err(Error::Serde(_))));
    }

    #[test]
    fn rejects_unknown_color_name() {
        let animation = AnimationConfig::Solid {
            color: ColorSpec::named("octarine"),
        };
        assert!(matches!(
            animation.validate(OverflowPolicy::Wrap),
            Err(Error::InvalidColorSpec(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_sparkle_parameters() {
        let too_likely = AnimationConfig::Sparkle {
            probability: 1.5,
            decay_rate: 0.5,
        };
        assert!(too_likely.validate(OverflowPolicy::Wrap).is_err());

        let no_decay = AnimationConfig::RainbowSparkle {
            probability: 0.5,
            decay_rate: 0.0,
        };
        assert!(no_decay.validate(OverflowPolicy::Wrap).is_err());
    }

    #[test]
    fn parses_wipe_and_rainbow_marquee() {
        let wipe: AnimationConfig =
            serde_json::from_str(r#"{"kind": "color_wipe", "color": {"name": "teal"}}"#).unwrap();
        assert_eq!(
            wipe,
            AnimationConfig::ColorWipe {
                color: ColorSpec::named("teal")
            }
        );
        assert!(wipe.build(5, OverflowPolicy::Wrap).is_ok());

        let marquee: AnimationConfig =
            serde_json::from_str(r#"{"kind": "rainbow_theater_chase"}"#).unwrap();
        assert_eq!(marquee, AnimationConfig::RainbowTheaterChase { spacing: 3 });
        assert!(
            AnimationConfig::RainbowTheaterChase { spacing: 0 }
                .validate(OverflowPolicy::Wrap)
                .is_err()
        );
    }

    #[test]
    fn built_animation_carries_policy() {
        let mut transition = AnimationConfig::Sparkle {
            probability: 1.0,
            decay_rate: 0.5,
        }
        .build(2, OverflowPolicy::Clamp)
        .unwrap();
        let frame = [Color::from_rgb(0, 0, 0); 2];
        let popped = transition.next_color(0, &frame, crate::types::Phase::Step).unwrap();
        assert_eq!(popped.rgb(), (255, 255, 255));
        assert!(matches!(popped.policy(), OverflowPolicy::Clamp));
    }

    #[test]
    fn rejects_zero_step_length() {
        let animation = AnimationConfig::RainbowChase { step_length: 0 };
        assert!(matches!(
            animation.build(4, OverflowPolicy::Wrap),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
