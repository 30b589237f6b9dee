#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Color`**: A pixel color held as synchronized RGB and HSV channels (0-255 each)
//! - **`OverflowPolicy`**: How out-of-range channel writes resolve (`Clamp`, `Wrap` or `Custom`)
//! - **`ColorSpec`**: Declarative "exactly one source" color description used by configuration
//! - **`Transition`**: Computes one pixel of the next frame from the whole previous frame
//! - **`Phase`**: Whether a transition is establishing its starting frame or stepping
//! - **`Strand`**: Owns the frame buffer and active transition, ticks and forwards frames
//! - **`PixelSink`**: Trait to implement for your LED hardware
//! - **`CancellationToken`**: Stops a run loop between ticks and wakes its wait
//! - **`StrandConfig`**: Serde-deserializable strand and animation settings
//!
//! Colors are stored as integer channels. When implementing `PixelSink` for
//! your hardware, pixels arrive as `[u8; 3]` in (r, g, b) order.

pub mod types;
pub mod color;
pub mod colors;
pub mod transition;
pub mod animations;
pub mod sink;
pub mod cancel;
pub mod strand;
pub mod config;

pub use animations::{
    Chase, ColorWipe, MultiSparkle, PopFn, chase, color_wipe, pixel_chase, rainbow_chase,
    rainbow_cycle, rainbow_sparkle, rainbow_theater_chase, sparkle, theater_chase,
};
pub use cancel::CancellationToken;
pub use color::{Color, ColorSpec};
pub use colors::{BLACK, WHITE};
pub use config::{AnimationConfig, StrandConfig};
pub use sink::PixelSink;
pub use strand::{RunSummary, Strand};
pub use transition::{
    ExponentialDecay, Transition, WithPolicy, fill, first_pixel, from_fn, hue_rotate, identity,
    phased, rainbow, render_frame, with_policy,
};
pub use types::{BlinkenResult, Error, IterationCount, OverflowPolicy, Phase};

