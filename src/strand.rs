//! Double-buffered frame engine driving a pixel strip.
//!
//! Provides [`Strand`] which owns the committed frame, the active transition
//! and the tick interval, and forwards every committed frame to a
//! [`PixelSink`].

use crate::cancel::CancellationToken;
use crate::color::Color;
use crate::colors::BLACK;
use crate::config::StrandConfig;
use crate::sink::PixelSink;
use crate::transition::{Transition, render_frame};
use crate::types::{BlinkenResult, Error, IterationCount, OverflowPolicy, Phase};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Outcome of [`Strand::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks completed during this run.
    pub ticks: u64,
    /// True if the run stopped because the token was cancelled.
    pub cancelled: bool,
}

/// Drives a strip of pixels through a transition function, one frame per tick.
///
/// Each pass reads only the previously committed frame and writes a separate
/// buffer; the two are swapped once the whole pass succeeds. A failing pass
/// therefore leaves the committed frame, and the sink, untouched.
///
/// # Type Parameters
/// * `S` - Output sink implementation type
pub struct Strand<S: PixelSink> {
    sink: S,
    pixels: Vec<Color>,
    scratch: Vec<Color>,
    tick_interval: Duration,
    transition: Option<Box<dyn Transition + Send>>,
    policy: OverflowPolicy,
    ticks: u64,
}

impl<S: PixelSink> Strand<S> {
    /// Creates a strand of `pixel_count` dark pixels and pushes that frame to
    /// the sink.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `pixel_count` is zero or larger than the
    /// sink, or `tick_interval` is zero.
    pub fn new(sink: S, pixel_count: usize, tick_interval: Duration) -> BlinkenResult<Self> {
        if pixel_count == 0 {
            return Err(Error::invalid_config("pixel count must be positive"));
        }
        if pixel_count > sink.pixel_count() {
            return Err(Error::invalid_config(format!(
                "pixel count {pixel_count} exceeds the sink's {} pixels",
                sink.pixel_count()
            )));
        }
        if tick_interval.is_zero() {
            return Err(Error::invalid_config("tick interval must be positive"));
        }

        let policy = OverflowPolicy::default();
        let mut strand = Self {
            sink,
            pixels: vec![BLACK.with_policy(policy); pixel_count],
            scratch: Vec::with_capacity(pixel_count),
            tick_interval,
            transition: None,
            policy,
            ticks: 0,
        };
        strand.forward();
        Ok(strand)
    }

    /// Creates a strand from a validated configuration and installs its
    /// animation.
    ///
    /// The configured overflow policy applies to the strand's own blacks and
    /// to every color the animation produces.
    pub fn from_config(sink: S, config: &StrandConfig) -> BlinkenResult<Self> {
        config.validate()?;
        let mut strand = Self::new(sink, config.pixel_count, config.tick_interval())?;
        strand.set_overflow_policy(config.overflow);
        let animation = config.animation.build(config.pixel_count, config.overflow)?;
        strand.set_boxed_transition(animation)?;
        Ok(strand)
    }

    /// Installs `transition` and immediately runs its Initialize pass.
    ///
    /// On success the starting frame is committed and forwarded to the sink.
    ///
    /// # Errors
    /// Propagates the transition's error; the previous transition and frame
    /// stay active.
    pub fn set_transition<T>(&mut self, transition: T) -> BlinkenResult<()>
    where
        T: Transition + Send + 'static,
    {
        self.set_boxed_transition(Box::new(transition))
    }

    /// Boxed form of [`Strand::set_transition`].
    pub fn set_boxed_transition(
        &mut self,
        mut transition: Box<dyn Transition + Send>,
    ) -> BlinkenResult<()> {
        if let Err(err) = render_frame(
            transition.as_mut(),
            &self.pixels,
            Phase::Initialize,
            &mut self.scratch,
        ) {
            warn!(error = %err, "initialize pass failed, keeping previous transition");
            return Err(err);
        }

        self.commit();
        self.transition = Some(transition);
        debug!(pixels = self.pixels.len(), "transition installed");
        Ok(())
    }

    /// Removes the active transition. The current frame stays on display.
    pub fn clear_transition(&mut self) {
        self.transition = None;
    }

    /// Returns true if a transition is installed.
    pub fn has_transition(&self) -> bool {
        self.transition.is_some()
    }

    /// Computes and commits one Step frame.
    ///
    /// Without a transition the current frame is sent again unchanged.
    ///
    /// # Errors
    /// Propagates the transition's error without committing anything.
    #[tracing::instrument(level = "trace", skip_all, fields(tick = self.ticks))]
    pub fn tick(&mut self) -> BlinkenResult<()> {
        if let Some(transition) = self.transition.as_mut() {
            if let Err(err) = render_frame(
                transition.as_mut(),
                &self.pixels,
                Phase::Step,
                &mut self.scratch,
            ) {
                warn!(error = %err, "step pass failed, frame not committed");
                return Err(err);
            }
            self.commit();
        } else {
            self.forward();
        }

        self.ticks += 1;
        trace!("frame committed");
        Ok(())
    }

    /// Sets every pixel to `color`, bypassing the transition.
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
        self.forward();
        debug!(rgb = ?color.rgb(), "strand filled");
    }

    /// Turns every pixel off.
    pub fn clear(&mut self) {
        self.fill(BLACK.with_policy(self.policy));
    }

    /// Overflow policy of the strand's own blacks.
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Changes the overflow policy and retags the current frame with it.
    ///
    /// Stored channels are not reconverted.
    pub fn set_overflow_policy(&mut self, policy: OverflowPolicy) {
        self.policy = policy;
        for pixel in &mut self.pixels {
            pixel.set_policy(policy);
        }
    }

    /// Ticks repeatedly, waiting `tick_interval` between ticks.
    ///
    /// Stops when `iterations` is exhausted or `cancel` fires. Cancellation is
    /// checked once per iteration and wakes the inter-tick wait immediately;
    /// a cancelled run clears the strand before returning.
    ///
    /// # Errors
    /// The first failing tick ends the run and its error is returned; the
    /// strand keeps its last committed frame.
    #[tracing::instrument(skip_all, fields(iterations = ?iterations))]
    pub fn run(
        &mut self,
        cancel: &CancellationToken,
        iterations: IterationCount,
    ) -> BlinkenResult<RunSummary> {
        info!(interval_ms = self.tick_interval.as_millis() as u64, "run loop started");
        let mut completed = 0u64;

        loop {
            if cancel.is_cancelled() {
                info!(ticks = completed, "run loop cancelled, clearing strand");
                self.clear();
                return Ok(RunSummary {
                    ticks: completed,
                    cancelled: true,
                });
            }

            if iterations.is_exhausted(completed) {
                info!(ticks = completed, "run loop finished");
                return Ok(RunSummary {
                    ticks: completed,
                    cancelled: false,
                });
            }

            self.tick()?;
            completed += 1;

            if !iterations.is_exhausted(completed) {
                cancel.wait_timeout(self.tick_interval);
            }
        }
    }

    /// The committed frame.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Number of pixels driven.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Delay between ticks in [`Strand::run`].
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Changes the delay between ticks.
    ///
    /// # Errors
    /// `InvalidConfiguration` if `interval` is zero.
    pub fn set_tick_interval(&mut self, interval: Duration) -> BlinkenResult<()> {
        if interval.is_zero() {
            return Err(Error::invalid_config("tick interval must be positive"));
        }
        self.tick_interval = interval;
        Ok(())
    }

    /// Step ticks completed since the strand was created.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The output sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the strand, returning its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn commit(&mut self) {
        std::mem::swap(&mut self.pixels, &mut self.scratch);
        self.forward();
    }

    fn forward(&mut self) {
        for (index, pixel) in self.pixels.iter().enumerate() {
            self.sink.set_pixel(index, pixel.to_rgb8());
        }
        self.sink.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::WHITE;
    use crate::transition::{fill, from_fn, hue_rotate};

    struct MockSink {
        pixels: Vec<[u8; 3]>,
        flushes: usize,
    }

    impl MockSink {
        fn new(count: usize) -> Self {
            Self {
                pixels: vec![[0; 3]; count],
                flushes: 0,
            }
        }
    }

    impl PixelSink for MockSink {
        fn set_pixel(&mut self, index: usize, rgb: [u8; 3]) {
            self.pixels[index] = rgb;
        }

        fn flush(&mut self) {
            self.flushes += 1;
        }

        fn pixel_count(&self) -> usize {
            self.pixels.len()
        }
    }

    fn strand(count: usize) -> Strand<MockSink> {
        Strand::new(MockSink::new(count), count, Duration::from_millis(1)).unwrap()
    }

    #[test]
    fn new_rejects_zero_pixels() {
        let result = Strand::new(MockSink::new(4), 0, Duration::from_millis(1));
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn new_rejects_zero_interval() {
        let result = Strand::new(MockSink::new(4), 4, Duration::ZERO);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn new_rejects_more_pixels_than_sink() {
        let result = Strand::new(MockSink::new(2), 3, Duration::from_millis(1));
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn new_pushes_dark_frame() {
        let strand = strand(3);
        assert_eq!(strand.sink().flushes, 1);
        assert!(strand.pixels().iter().all(Color::is_off));
    }

    #[test]
    fn set_transition_commits_initialize_frame() {
        let mut strand = strand(3);
        strand.set_transition(fill(WHITE)).unwrap();
        assert!(strand.pixels().iter().all(|p| *p == WHITE));
        assert_eq!(strand.sink().pixels, vec![[255; 3]; 3]);
        assert_eq!(strand.ticks(), 0);
    }

    #[test]
    fn tick_without_transition_resends_frame() {
        let mut strand = strand(2);
        strand.fill(WHITE);
        strand.tick().unwrap();
        assert!(strand.pixels().iter().all(|p| *p == WHITE));
        assert_eq!(strand.sink().flushes, 3);
    }

    #[test]
    fn failing_step_keeps_last_frame() {
        let mut strand = strand(3);
        strand.fill(WHITE);
        strand
            .set_transition(from_fn(|i, frame: &[Color], phase| match phase {
                Phase::Initialize => Ok(frame[i]),
                Phase::Step if i == 2 => Err(Error::transition("boom")),
                Phase::Step => Ok(BLACK),
            }))
            .unwrap();

        let flushes = strand.sink().flushes;
        let result = strand.tick();
        assert!(matches!(result, Err(Error::TransitionFunction(_))));
        assert!(strand.pixels().iter().all(|p| *p == WHITE));
        assert_eq!(strand.sink().flushes, flushes);
        assert_eq!(strand.ticks(), 0);
    }

    #[test]
    fn failing_initialize_keeps_previous_transition() {
        let mut strand = strand(2);
        strand.set_transition(hue_rotate()).unwrap();
        let result = strand.set_transition(from_fn(|_, _: &[Color], _| Err(Error::transition("no"))));
        assert!(result.is_err());
        assert!(strand.has_transition());
        strand.tick().unwrap();
    }
}
