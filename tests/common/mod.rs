//! Shared test infrastructure for blinken-strand integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use blinken_strand::{Color, PixelSink};

// ============================================================================
// Recording Sink
// ============================================================================

/// Sink that records every flushed frame for inspection.
pub struct RecordingSink {
    capacity: usize,
    staged: Vec<[u8; 3]>,
    frames: Vec<Vec<[u8; 3]>>,
}

impl RecordingSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            staged: vec![[0; 3]; capacity],
            frames: Vec::new(),
        }
    }

    /// Every frame flushed so far, oldest first.
    pub fn frames(&self) -> &[Vec<[u8; 3]>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[[u8; 3]]> {
        self.frames.last().map(Vec::as_slice)
    }

    pub fn flush_count(&self) -> usize {
        self.frames.len()
    }
}

impl PixelSink for RecordingSink {
    fn set_pixel(&mut self, index: usize, rgb: [u8; 3]) {
        self.staged[index] = rgb;
    }

    fn flush(&mut self) {
        self.frames.push(self.staged.clone());
    }

    fn pixel_count(&self) -> usize {
        self.capacity
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Compare two colors channel by channel with a tolerance
pub fn rgb_within(a: (i32, i32, i32), b: (i32, i32, i32), tolerance: i32) -> bool {
    (a.0 - b.0).abs() <= tolerance && (a.1 - b.1).abs() <= tolerance && (a.2 - b.2).abs() <= tolerance
}

/// 8-bit frame as the sink sees it
pub fn as_rgb8(frame: &[Color]) -> Vec<[u8; 3]> {
    frame.iter().map(Color::to_rgb8).collect()
}

/// Installs a `fmt` subscriber once so `RUST_LOG`-style output shows up with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
