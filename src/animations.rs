//! Compound animations built from the primitive transitions.
//!
//! Chases shift the previous frame toward index 0 by a fixed step, wrapping
//! around the end of the strand. Sparkles randomly light dark pixels and let
//! lit ones fade out exponentially.

use crate::color::Color;
use crate::colors::{self, BLACK, WHITE};
use crate::transition::{
    ExponentialDecay, Fill, FirstPixel, HueRotate, Phased, Rainbow, Transition, fill, first_pixel,
    hue_rotate, phased, pixel_at, rainbow, rotate_hue, unchanged, wrapped_source,
};
use crate::types::{BlinkenResult, Error, Phase};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Pixel transform applied to the color a chase pulls forward.
pub type Transform = fn(Color) -> Color;

/// Moves the pattern produced by `init` one `step_length` toward index 0 per
/// tick, passing every pulled color through `transform`.
#[derive(Debug, Clone)]
pub struct Chase<I, F> {
    init: I,
    transform: F,
    step_length: usize,
}

/// Builds a chase.
///
/// # Errors
/// `InvalidConfiguration` if `step_length` is zero.
pub fn chase<I, F>(init: I, transform: F, step_length: usize) -> BlinkenResult<Chase<I, F>>
where
    I: Transition,
    F: FnMut(Color) -> Color,
{
    if step_length == 0 {
        return Err(Error::invalid_config("chase step length must be at least 1"));
    }
    Ok(Chase {
        init,
        transform,
        step_length,
    })
}

impl<I, F> Chase<I, F> {
    /// Pixels the pattern moves per tick.
    pub fn step_length(&self) -> usize {
        self.step_length
    }
}

impl<I, F> Transition for Chase<I, F>
where
    I: Transition,
    F: FnMut(Color) -> Color,
{
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        match phase {
            Phase::Initialize => self.init.next_color(index, frame, phase),
            Phase::Step => {
                if index >= frame.len() {
                    return pixel_at(frame, index);
                }
                let source = wrapped_source(index, self.step_length, frame.len());
                Ok((self.transform)(frame[source]))
            }
        }
    }
}

/// A single dot of `color` starting at pixel 0 and travelling along the strand.
pub fn pixel_chase<F>(
    color: Color,
    transform: F,
    step_length: usize,
) -> BlinkenResult<Chase<FirstPixel, F>>
where
    F: FnMut(Color) -> Color,
{
    chase(first_pixel(color), transform, step_length)
}

/// A single dot that starts red and walks around the hue wheel as it moves.
pub fn rainbow_chase(step_length: usize) -> BlinkenResult<Chase<FirstPixel, Transform>> {
    pixel_chase(colors::hue(0), rotate_hue as Transform, step_length)
}

/// The hue wheel laid out along the strand, every pixel rotating in place.
pub fn rainbow_cycle() -> Phased<Rainbow, HueRotate> {
    phased(rainbow(), hue_rotate())
}

/// Initializer lighting every `spacing`-th pixel, starting at 0, with the
/// color `lit` produces for that pixel. The pixels between stay dark.
#[derive(Debug, Clone, Copy)]
pub struct Marquee<L> {
    lit: L,
    spacing: usize,
}

impl<L: Transition> Transition for Marquee<L> {
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        let color = self.lit.next_color(index, frame, phase)?;
        Ok(if index % self.spacing == 0 {
            color
        } else {
            BLACK.with_policy(color.policy())
        })
    }
}

fn marquee<L: Transition>(lit: L, spacing: usize) -> BlinkenResult<Marquee<L>> {
    if spacing == 0 {
        return Err(Error::invalid_config("theater chase spacing must be at least 1"));
    }
    Ok(Marquee { lit, spacing })
}

/// Theater-style marquee: every `spacing`-th pixel lit, marching one pixel
/// per tick.
///
/// # Errors
/// `InvalidConfiguration` if `spacing` is zero.
pub fn theater_chase(color: Color, spacing: usize) -> BlinkenResult<Chase<Marquee<Fill>, Transform>> {
    chase(marquee(fill(color), spacing)?, unchanged as Transform, 1)
}

/// Marquee whose lit pixels start at the hue of their index and walk around
/// the hue wheel as they march.
///
/// # Errors
/// `InvalidConfiguration` if `spacing` is zero.
pub fn rainbow_theater_chase(
    spacing: usize,
) -> BlinkenResult<Chase<Marquee<Rainbow>, Transform>> {
    chase(marquee(rainbow(), spacing)?, rotate_hue as Transform, 1)
}

/// Paints `color` over the strand one pixel per tick, starting at pixel 0.
///
/// The Initialize pass lights pixel 0 and keeps the rest of the frame; Step
/// `k` lights pixel `k`. Once every pixel is lit the frame holds steady.
/// Passes must visit pixel 0 first, as [`render_frame`] does.
///
/// [`render_frame`]: crate::transition::render_frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWipe {
    color: Color,
    lit: usize,
}

/// Builds a wipe to `color`.
pub fn color_wipe(color: Color) -> ColorWipe {
    ColorWipe { color, lit: 0 }
}

impl ColorWipe {
    /// Pixels painted so far.
    pub fn lit(&self) -> usize {
        self.lit
    }
}

impl Transition for ColorWipe {
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        let current = pixel_at(frame, index)?;
        if index == 0 {
            self.lit = match phase {
                Phase::Initialize => 1,
                Phase::Step => self.lit.saturating_add(1).min(frame.len()),
            };
        }
        Ok(if index < self.lit { self.color } else { current })
    }
}

/// Chooses the color a pixel pops to when it sparks.
///
/// Receives the pixel index, the previous frame, the per-pixel elapsed tick
/// counters and the sparkle's random source.
pub type PopFn = fn(usize, &[Color], &[u32], &mut dyn RngCore) -> Color;

/// Pops to full white.
pub fn pop_white(_index: usize, _frame: &[Color], _elapsed: &[u32], _rng: &mut dyn RngCore) -> Color {
    WHITE
}

/// Pops to a random hue at full saturation and value.
pub fn pop_random_hue(
    _index: usize,
    _frame: &[Color],
    _elapsed: &[u32],
    rng: &mut dyn RngCore,
) -> Color {
    colors::hue(rng.gen_range(0..=255))
}

/// Random sparkles that fade out.
///
/// Keeps one elapsed-ticks-since-spark counter per pixel. On each Step a dark
/// pixel sparks with `probability`, resetting its counter and taking the
/// color chosen by the pop function; a lit pixel advances its counter `t`
/// and is scaled by `decay_rate^t` until it reaches black and may spark
/// again. The Initialize pass turns every pixel off and zeroes all counters.
pub struct MultiSparkle<P, R = StdRng> {
    elapsed: Vec<u32>,
    probability: f64,
    decay: ExponentialDecay,
    pop: P,
    rng: R,
}

impl<P> MultiSparkle<P, StdRng>
where
    P: FnMut(usize, &[Color], &[u32], &mut dyn RngCore) -> Color,
{
    /// Sparkle over `strand_length` pixels seeded from OS entropy.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `probability` is outside `[0, 1]` or
    /// `decay_rate` is outside `(0, 1]`.
    pub fn new(strand_length: usize, probability: f64, decay_rate: f64, pop: P) -> BlinkenResult<Self> {
        Self::with_rng(strand_length, probability, decay_rate, pop, StdRng::from_entropy())
    }
}

impl<P, R> MultiSparkle<P, R>
where
    P: FnMut(usize, &[Color], &[u32], &mut dyn RngCore) -> Color,
    R: RngCore,
{
    /// Sparkle driven by the given random source.
    pub fn with_rng(
        strand_length: usize,
        probability: f64,
        decay_rate: f64,
        pop: P,
        rng: R,
    ) -> BlinkenResult<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::invalid_config(format!(
                "sparkle probability must be in [0, 1], got {probability}"
            )));
        }
        let decay = ExponentialDecay::new(decay_rate)?;
        Ok(Self {
            elapsed: vec![0; strand_length],
            probability,
            decay,
            pop,
            rng,
        })
    }

    /// Ticks since each pixel last sparked.
    pub fn elapsed(&self) -> &[u32] {
        &self.elapsed
    }

    /// Chance that a dark pixel sparks on a Step.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Per-tick decay factor applied to lit pixels.
    pub fn decay_rate(&self) -> f64 {
        self.decay.factor()
    }
}

impl<P, R> Transition for MultiSparkle<P, R>
where
    P: FnMut(usize, &[Color], &[u32], &mut dyn RngCore) -> Color,
    R: RngCore,
{
    fn next_color(&mut self, index: usize, frame: &[Color], phase: Phase) -> BlinkenResult<Color> {
        if index >= self.elapsed.len() {
            return Err(Error::transition(format!(
                "sparkle sized for {} pixels was asked for pixel {index}",
                self.elapsed.len()
            )));
        }

        if phase.is_initializing() {
            self.elapsed[index] = 0;
            return Ok(BLACK);
        }

        let current = pixel_at(frame, index)?;
        if current.is_off() {
            if self.rng.gen_bool(self.probability) {
                self.elapsed[index] = 0;
                return Ok((self.pop)(index, frame, &self.elapsed, &mut self.rng));
            }
            return Ok(current);
        }

        self.elapsed[index] = self.elapsed[index].saturating_add(1);
        Ok(self.decay.apply(current, self.elapsed[index]))
    }
}

/// White sparkles.
pub fn sparkle(
    strand_length: usize,
    probability: f64,
    decay_rate: f64,
) -> BlinkenResult<MultiSparkle<PopFn>> {
    MultiSparkle::new(strand_length, probability, decay_rate, pop_white as PopFn)
}

/// Sparkles in random fully saturated hues.
pub fn rainbow_sparkle(
    strand_length: usize,
    probability: f64,
    decay_rate: f64,
) -> BlinkenResult<MultiSparkle<PopFn>> {
    MultiSparkle::new(strand_length, probability, decay_rate, pop_random_hue as PopFn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::render_frame;

    fn step(t: &mut impl Transition, frame: &[Color]) -> Vec<Color> {
        let mut next = Vec::new();
        render_frame(t, frame, Phase::Step, &mut next).unwrap();
        next
    }

    fn seeded(probability: f64, decay: f64, len: usize) -> MultiSparkle<PopFn> {
        MultiSparkle::with_rng(len, probability, decay, pop_white as PopFn, StdRng::seed_from_u64(7))
            .unwrap()
    }

    #[test]
    fn chase_pulls_from_wrapped_source() {
        let frame: Vec<Color> = (0..5).map(|i| Color::from_rgb(i * 10, 0, 0)).collect();
        let mut c = chase(rainbow(), unchanged as Transform, 3).unwrap();
        let next = step(&mut c, &frame);
        assert_eq!(next[4], frame[2]);
        assert_eq!(next[0], frame[3]);
        assert_eq!(next[1], frame[4]);
        assert_eq!(next[2], frame[0]);
    }

    #[test]
    fn chase_step_longer_than_strand_is_valid() {
        let frame: Vec<Color> = (0..3).map(|i| Color::from_rgb(i, 0, 0)).collect();
        let mut c = chase(rainbow(), unchanged as Transform, 7).unwrap();
        let next = step(&mut c, &frame);
        assert_eq!(next[0], frame[1]);
        assert_eq!(next[2], frame[0]);
    }

    #[test]
    fn chase_rejects_zero_step() {
        assert!(matches!(
            chase(rainbow(), unchanged as Transform, 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn marquee_lights_every_spacing() {
        let red = Color::from_rgb(255, 0, 0);
        let mut t = theater_chase(red, 3).unwrap();
        let mut frame = Vec::new();
        render_frame(&mut t, &[BLACK; 7], Phase::Initialize, &mut frame).unwrap();
        let lit: Vec<usize> = (0..7).filter(|i| !frame[*i].is_off()).collect();
        assert_eq!(lit, vec![0, 3, 6]);
    }

    #[test]
    fn sparkle_initialize_turns_everything_off() {
        let mut s = seeded(1.0, 0.5, 3);
        let mut next = Vec::new();
        render_frame(&mut s, &[WHITE; 3], Phase::Initialize, &mut next).unwrap();
        assert!(next.iter().all(Color::is_off));
        assert_eq!(s.elapsed(), &[0, 0, 0]);
    }

    #[test]
    fn sparkle_certain_probability_pops_dark_pixels() {
        let mut s = seeded(1.0, 0.5, 4);
        let next = step(&mut s, &[BLACK; 4]);
        assert!(next.iter().all(|c| *c == WHITE));
    }

    #[test]
    fn sparkle_zero_probability_stays_dark() {
        let mut s = seeded(0.0, 0.5, 4);
        let next = step(&mut s, &[BLACK; 4]);
        assert!(next.iter().all(Color::is_off));
    }

    #[test]
    fn sparkle_index_beyond_length_is_error() {
        let mut s = seeded(0.5, 0.5, 2);
        let result = s.next_color(2, &[BLACK; 3], Phase::Step);
        assert!(matches!(result, Err(Error::TransitionFunction(_))));
    }

    #[test]
    fn sparkle_rejects_bad_parameters() {
        assert!(sparkle(4, 1.5, 0.5).is_err());
        assert!(sparkle(4, -0.1, 0.5).is_err());
        assert!(sparkle(4, 0.1, 0.0).is_err());
    }

    #[test]
    fn rainbow_pop_is_fully_saturated() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let color = pop_random_hue(0, &[], &[], &mut rng);
            assert_eq!(color.saturation(), 255);
            assert_eq!(color.value(), 255);
        }
    }
}
