//! Renders a strand in a truecolor terminal.
//!
//! ```text
//! cargo run --example terminal -- --animation rainbow-chase --pixels 60
//! cargo run --example terminal -- --config strand.json --seconds 10
//! ```

use blinken_strand::{
    AnimationConfig, CancellationToken, ColorSpec, IterationCount, OverflowPolicy, PixelSink,
    Strand, StrandConfig,
};
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Animation {
    Rainbow,
    RainbowCycle,
    RainbowChase,
    PixelChase,
    TheaterChase,
    RainbowTheaterChase,
    ColorWipe,
    Sparkle,
    RainbowSparkle,
}

#[derive(Debug, Parser)]
#[command(about = "Render an LED strand animation in the terminal")]
struct Args {
    /// JSON strand configuration; overrides the other animation flags.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "rainbow-chase")]
    animation: Animation,

    #[arg(long, default_value_t = 60)]
    pixels: usize,

    #[arg(long, default_value_t = 50)]
    interval_ms: u64,

    /// Stop after this many seconds.
    #[arg(long, default_value_t = 5)]
    seconds: u64,

    /// Clamp channel overflow instead of wrapping.
    #[arg(long)]
    clamp: bool,
}

/// Draws one half-block per pixel on a single, repeatedly overwritten line.
struct TerminalSink {
    staged: Vec<[u8; 3]>,
}

impl PixelSink for TerminalSink {
    fn set_pixel(&mut self, index: usize, rgb: [u8; 3]) {
        if let Some(slot) = self.staged.get_mut(index) {
            *slot = rgb;
        }
    }

    fn flush(&mut self) {
        let mut line = String::with_capacity(self.staged.len() * 24);
        for [r, g, b] in &self.staged {
            line.push_str(&format!("\x1b[38;2;{r};{g};{b}m\u{2584}"));
        }
        let mut out = std::io::stdout().lock();
        let _ = write!(out, "\r{line}\x1b[0m");
        let _ = out.flush();
    }

    fn pixel_count(&self) -> usize {
        self.staged.len()
    }
}

fn animation_config(animation: Animation) -> AnimationConfig {
    match animation {
        Animation::Rainbow => AnimationConfig::Rainbow,
        Animation::RainbowCycle => AnimationConfig::RainbowCycle,
        Animation::RainbowChase => AnimationConfig::RainbowChase { step_length: 1 },
        Animation::PixelChase => AnimationConfig::PixelChase {
            color: ColorSpec::named("white"),
            step_length: 1,
            rotate_hue: false,
        },
        Animation::TheaterChase => AnimationConfig::TheaterChase {
            color: ColorSpec::named("amber"),
            spacing: 3,
        },
        Animation::RainbowTheaterChase => AnimationConfig::RainbowTheaterChase { spacing: 3 },
        Animation::ColorWipe => AnimationConfig::ColorWipe {
            color: ColorSpec::named("sky blue"),
        },
        Animation::Sparkle => AnimationConfig::Sparkle {
            probability: 0.05,
            decay_rate: 0.9,
        },
        Animation::RainbowSparkle => AnimationConfig::RainbowSparkle {
            probability: 0.05,
            decay_rate: 0.9,
        },
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => StrandConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => StrandConfig {
            pixel_count: args.pixels,
            tick_interval_ms: args.interval_ms,
            overflow: if args.clamp {
                OverflowPolicy::Clamp
            } else {
                OverflowPolicy::Wrap
            },
            animation: animation_config(args.animation),
        },
    };

    let sink = TerminalSink {
        staged: vec![[0; 3]; config.pixel_count],
    };
    let mut strand = Strand::from_config(sink, &config)?;

    let cancel = CancellationToken::new();
    let timer = cancel.clone();
    let seconds = args.seconds;
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(seconds));
        timer.cancel();
    });

    let summary = strand.run(&cancel, IterationCount::Unbounded)?;
    println!();
    tracing::info!(ticks = summary.ticks, "done");
    Ok(())
}
