//! Key input: debounced sampling of the raw lines and per-key events.

mod edges;

pub use edges::{EdgeState, KeyEdgeSerializer, Toggle};

use crate::stream::{Framed, OutputSlot};
use crate::{Result, SelectorError};

/// Push switch of the rotary encoder.
pub const KEY_SW: u32 = 0x01;
/// Encoder phase A. Its rising edge is one detent.
pub const KEY_A: u32 = 0x02;
/// Encoder phase B. Its level at an A edge gives the direction.
pub const KEY_B: u32 = 0x04;

/// Samples the raw key lines once per debounce interval and reports a
/// snapshot whenever it differs from the last one reported.
#[derive(Debug, Clone)]
pub struct KeySampler {
    width_mask: u32,
    debounce: u64,
    counter: u64,
    raw: u32,
    reported: u32,
    slot: OutputSlot<u32>,
}

impl KeySampler {
    pub fn new(width: u32, debounce: u64) -> Result<Self> {
        if width == 0 || width > 32 {
            return Err(SelectorError::InvalidWidth(format!("{width} key lines")));
        }
        if debounce == 0 {
            return Err(SelectorError::ZeroCount("debounce interval"));
        }
        let width_mask = u32::MAX >> (32 - width);
        Ok(Self {
            width_mask,
            debounce,
            counter: 0,
            raw: 0,
            // Starts with every line "high" so the first sample is reported.
            reported: width_mask,
            slot: OutputSlot::new(),
        })
    }

    /// Drives the physical lines; a set bit is a pressed key.
    pub fn set_raw(&mut self, bits: u32) {
        self.raw = bits & self.width_mask;
    }

    pub fn raw(&self) -> u32 {
        self.raw
    }

    pub fn output(&self) -> Option<Framed<u32>> {
        self.slot.peek()
    }

    pub fn tick(&mut self, downstream_ready: bool) {
        let sample = self.counter == 0 && self.slot.is_empty();
        self.slot.drain(downstream_ready);

        if sample && self.raw != self.reported {
            self.reported = self.raw;
            self.slot.load(Framed::single(self.raw));
        }
        self.counter = (self.counter + 1) % self.debounce;
    }
}
