//! Result types returned by a pipeline run.

use crate::config::OutputFormat;
use serde::{Deserialize, Serialize};

/// The composed card plus a record of how it was assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardOutput {
    /// Encoded card bytes. Not serialised; write them with
    /// [`crate::card::save_output`].
    #[serde(skip)]
    pub buffer: Vec<u8>,
    pub format: OutputFormat,
    /// Canvas width (always two panels wide).
    pub width: u32,
    pub height: u32,
    /// Slots whose image made it onto the canvas, in slot order.
    pub placed: Vec<PlacedSlot>,
    pub stats: CardStats,
}

/// A slot that was fetched and painted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedSlot {
    pub index: usize,
    pub text: String,
    pub x: u32,
    pub y: u32,
    /// Size of the fetched image payload.
    pub bytes: usize,
}

/// Counters and timings for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStats {
    pub slots_requested: usize,
    pub slots_placed: usize,
    pub slots_skipped: usize,
    pub bytes_fetched: u64,
    pub output_bytes: u64,
    pub fetch_duration_ms: u64,
    pub compose_duration_ms: u64,
    pub total_duration_ms: u64,
}

impl CardOutput {
    /// True when every requested slot was placed.
    pub fn is_complete(&self) -> bool {
        self.stats.slots_skipped == 0
    }
}
