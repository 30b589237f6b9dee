//! Core types shared by the color model, transitions and the strand.

use serde::{Deserialize, Serialize};

/// Result alias used throughout the crate.
pub type BlinkenResult<T> = Result<T, Error>;

/// Everything that can go wrong while building colors, configuring a strand
/// or running an animation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Color construction input was missing, contradictory or unknown.
    #[error("invalid color spec: {0}")]
    InvalidColorSpec(String),

    /// Pixel count, tick interval or an animation parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A transition function failed during an Initialize or Step pass.
    #[error("transition function error: {0}")]
    TransitionFunction(String),

    /// Configuration text could not be parsed.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl Error {
    pub fn invalid_color(msg: impl Into<String>) -> Self {
        Self::InvalidColorSpec(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn transition(msg: impl Into<String>) -> Self {
        Self::TransitionFunction(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Which pass a transition function is being evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// One-time pass run when the transition is installed. Establishes the
    /// starting frame.
    Initialize,

    /// Regular per-tick evolution of the previous frame.
    Step,
}

impl Phase {
    #[inline]
    pub fn is_initializing(self) -> bool {
        self == Phase::Initialize
    }
}

/// How many ticks a run loop should execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IterationCount {
    /// Run a specific number of ticks.
    Finite(u64),

    /// Run until cancelled.
    Unbounded,
}

impl Default for IterationCount {
    fn default() -> Self {
        IterationCount::Unbounded
    }
}

impl IterationCount {
    /// Returns true once `completed` ticks satisfy this count.
    #[inline]
    pub fn is_exhausted(self, completed: u64) -> bool {
        match self {
            IterationCount::Finite(n) => completed >= n,
            IterationCount::Unbounded => false,
        }
    }
}

/// Rule for resolving a channel value outside 0..=255.
///
/// Applied to every channel write, both the channel being set and every
/// channel of the derived encoding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Values above 255 become 255.
    Clamp,

    /// Values above 255 have 255 subtracted exactly once, so 260 becomes 5
    /// but 600 stays over range at 345.
    Wrap,

    /// Caller supplied rule.
    #[serde(skip)]
    Custom(fn(i32) -> i32),
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        OverflowPolicy::Wrap
    }
}

impl OverflowPolicy {
    /// Resolves a single channel value.
    #[inline]
    pub fn apply(self, channel: i32) -> i32 {
        match self {
            OverflowPolicy::Clamp => channel.min(255),
            OverflowPolicy::Wrap => {
                if channel <= 255 {
                    channel
                } else {
                    channel - 255
                }
            }
            OverflowPolicy::Custom(rule) => rule(channel),
        }
    }
}
