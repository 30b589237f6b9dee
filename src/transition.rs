//! Per-pixel transition functions and the primitive combinators.
//!
//! A [`Transition`] computes one pixel of the next frame from the complete
//! previous frame. It is called once per pixel per pass, first for a single
//! [`Phase::Initialize`] pass when it is installed on a strand and then for a
//! [`Phase::Step`] pass on every tick.

use crate::color::Color;
use crate::colors::BLACK;
use crate::types::{BlinkenResult, Error, OverflowPolicy, Phase};

/// Computes the next color of a single pixel.
///
/// Implementations may carry private state (timers, counters, RNGs). State
/// that depends on the frame must be reset when called with
/// [`Phase::Initialize`].
pub trait Transition {
    /// Returns the color for `index` given the previous `frame`.
    ///
    /// `frame` is never the buffer being written, so reading any neighbour
    /// always observes the previous tick's value.
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color>;
}

/// Runs one full pass of `transition` over `previous`, writing into `next`.
///
/// `next` is cleared first. On error the pass is abandoned and `next` holds a
/// partial frame that must not be committed.
pub fn render_frame<T: Transition + ?Sized>(
    transition: &mut T,
    previous: &[Color],
    phase: Phase,
    next: &mut Vec<Color>,
) -> BlinkenResult<()> {
    next.clear();
    for index in 0..previous.len() {
        next.push(transition.next_color(index, previous, phase)?);
    }
    Ok(())
}

impl<T: Transition + ?Sized> Transition for Box<T> {
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        (**self).next_color(index, frame, phase)
    }
}

/// Reads `frame[index]`, reporting an out-of-range index as a transition error.
pub(crate) fn pixel_at(frame: &[Color], index: usize) -> BlinkenResult<Color> {
    frame.get(index).copied().ok_or_else(|| {
        Error::transition(format!(
            "pixel {index} out of range for a frame of {} pixels",
            frame.len()
        ))
    })
}

/// Adapter turning a closure into a [`Transition`].
pub struct FromFn<F> {
    f: F,
}

/// Wraps `f` as a transition.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(usize, &[Color], Phase) -> BlinkenResult<Color>,
{
    FromFn { f }
}

impl<F> Transition for FromFn<F>
where
    F: FnMut(usize, &[Color], Phase) -> BlinkenResult<Color>,
{
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        (self.f)(index, frame, phase)
    }
}

/// Every pixel becomes the same color in both phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill(pub Color);

/// Transition painting every pixel `color` in both phases.
pub fn fill(color: Color) -> Fill {
    Fill(color)
}

impl Transition for Fill {
    fn next_color(&mut self, _index: usize, _frame: &[Color], _phase: Phase) -> BlinkenResult<Color> {
        Ok(self.0)
    }
}

/// Leaves every pixel unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

/// Transition that leaves the frame unchanged.
pub fn identity() -> Identity {
    Identity
}

impl Transition for Identity {
    fn next_color(&mut self, index: usize, frame: &[Color], _phase: Phase) -> BlinkenResult<Color> {
        pixel_at(frame, index)
    }
}

/// Advances each pixel's hue by one step per tick.
///
/// Has no starting frame of its own: the Initialize pass keeps whatever the
/// strand was showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HueRotate;

/// Transition rotating every hue by one step per tick.
pub fn hue_rotate() -> HueRotate {
    HueRotate
}

impl Transition for HueRotate {
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        let pixel = pixel_at(frame, index)?;
        Ok(match phase {
            Phase::Initialize => pixel,
            Phase::Step => rotate_hue(pixel),
        })
    }
}

/// Returns `color` with its hue incremented by one, 255 wrapping to 0.
///
/// The wrap is fixed at 256 and independent of the overflow policy.
pub fn rotate_hue(color: Color) -> Color {
    let (h, s, v) = color.hsv();
    let h = if h < 255 { h + 1 } else { 0 };
    Color::from_hsv_with(h, s, v, color.policy())
}

/// Pixel transform that returns its input.
#[inline]
pub fn unchanged(color: Color) -> Color {
    color
}

/// Spreads the hue wheel along the strand: pixel `i` gets hue `i mod 256`
/// at full saturation and value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rainbow {
    pub policy: OverflowPolicy,
}

/// Hue-wheel initializer using the default overflow policy.
pub fn rainbow() -> Rainbow {
    Rainbow::default()
}

impl Transition for Rainbow {
    fn next_color(&mut self, index: usize, _frame: &[Color], _phase: Phase) -> BlinkenResult<Color> {
        Ok(Color::from_hsv_with((index % 256) as i32, 255, 255, self.policy))
    }
}

/// Lights pixel 0 with a color and turns every other pixel off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstPixel(pub Color);

/// Initializer lighting only pixel 0.
pub fn first_pixel(color: Color) -> FirstPixel {
    FirstPixel(color)
}

impl Transition for FirstPixel {
    fn next_color(&mut self, index: usize, _frame: &[Color], _phase: Phase) -> BlinkenResult<Color> {
        Ok(if index == 0 {
            self.0
        } else {
            BLACK.with_policy(self.0.policy())
        })
    }
}

/// Uses one transition for the Initialize pass and another for every Step.
#[derive(Debug, Clone, Copy)]
pub struct Phased<I, S> {
    init: I,
    step: S,
}

/// Combines an Initialize transition with a Step transition.
pub fn phased<I: Transition, S: Transition>(init: I, step: S) -> Phased<I, S> {
    Phased { init, step }
}

impl<I: Transition, S: Transition> Transition for Phased<I, S> {
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        match phase {
            Phase::Initialize => self.init.next_color(index, frame, phase),
            Phase::Step => self.step.next_color(index, frame, phase),
        }
    }
}

/// Tags every color produced by `inner` with a fixed overflow policy.
///
/// Channels are not reconverted. The policy governs every later write to the
/// pixel, such as a hue rotation or a decay step on the next tick.
#[derive(Debug, Clone, Copy)]
pub struct WithPolicy<T> {
    inner: T,
    policy: OverflowPolicy,
}

/// Wraps `inner` so its output carries `policy`.
pub fn with_policy<T: Transition>(inner: T, policy: OverflowPolicy) -> WithPolicy<T> {
    WithPolicy { inner, policy }
}

impl<T: Transition> Transition for WithPolicy<T> {
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        let policy = self.policy;
        self.inner
            .next_color(index, frame, phase)
            .map(|color| color.with_policy(policy))
    }
}

/// Scales RGB channels by `factor^ticks`, truncating each channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    factor: f64,
}

impl ExponentialDecay {
    /// # Errors
    /// `InvalidConfiguration` unless `0 < factor <= 1`.
    pub fn new(factor: f64) -> BlinkenResult<Self> {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(Error::invalid_config(format!(
                "decay factor must be in (0, 1], got {factor}"
            )));
        }
        Ok(Self { factor })
    }

    #[inline]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Fades `color` by `ticks` elapsed ticks.
    pub fn apply(&self, color: Color, ticks: u32) -> Color {
        let scale = self.factor.powf(ticks as f64);
        let (r, g, b) = color.rgb();
        let fade = |c: i32| (c as f64 * scale) as i32;
        Color::from_rgb_with(fade(r), fade(g), fade(b), color.policy())
    }
}

/// Source index for a chase: `index + step`, wrapped once around `len`.
///
/// Steps of a full strand length or more are reduced first so the result is
/// always a valid index. `len` must be non-zero.
#[inline]
pub fn wrapped_source(index: usize, step: usize, len: usize) -> usize {
    let j = index + step % len;
    if j < len { j } else { j - len }
}
