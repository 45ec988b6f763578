//! Linear mapping of one amplitude segment onto LED brightness.
//!
//! Each segment carries a multiplier precomputed when the thresholds are
//! configured, so the run-time work is one subtract, one multiply and
//! one shift.

use std::num::NonZeroU32;

use serde::Serialize;

use crate::stream::{fires, Framed, Stage};
use crate::{Result, SelectorError};

/// Input and output word sizes of the quantizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scale {
    max: u8,
    loss: u32,
}

impl Scale {
    /// `output_width` is at most 8 bits and at least two bits narrower than
    /// `input_width`, leaving room for the multiplier's fraction.
    pub fn new(input_width: u32, output_width: u32) -> Result<Self> {
        if output_width == 0 || output_width > 8 {
            return Err(SelectorError::InvalidWidth(format!(
                "output width of {output_width} bits"
            )));
        }
        if input_width > 24 || input_width <= output_width + 1 {
            return Err(SelectorError::InvalidWidth(format!(
                "input width of {input_width} bits for {output_width}-bit output"
            )));
        }
        Ok(Self {
            max: ((1u32 << output_width) - 1) as u8,
            loss: input_width - output_width - 1,
        })
    }

    /// Full-scale output value.
    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn loss(&self) -> u32 {
        self.loss
    }

    fn multiplier(&self, lo: i32, hi: i32) -> Result<NonZeroU32> {
        let span = i64::from(hi) - i64::from(lo);
        let mul = (i64::from(self.max) << self.loss) / span;
        u32::try_from(mul)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(SelectorError::ZeroMultiplier { lo, hi })
    }

    fn interpolate(&self, mul: NonZeroU32, offset: i64) -> u8 {
        let scaled = (i64::from(mul.get()) * offset) >> self.loss;
        scaled.clamp(0, i64::from(self.max)) as u8
    }

    /// Quantizes `data` against `segment` in one step.
    pub fn quantize(&self, segment: &Segment, data: i32) -> u8 {
        if data >= segment.hi {
            self.max
        } else if data <= segment.lo {
            0
        } else {
            self.interpolate(segment.mul, i64::from(data) - i64::from(segment.lo))
        }
    }
}

/// One `lo..hi` amplitude range. Only [`Thresholds::new`] builds these,
/// so every segment is non-empty with a non-zero multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    lo: i32,
    hi: i32,
    mul: NonZeroU32,
}

impl Segment {
    pub fn lo(&self) -> i32 {
        self.lo
    }

    pub fn hi(&self) -> i32 {
        self.hi
    }

    pub fn mul(&self) -> u32 {
        self.mul.get()
    }
}

/// An ascending list of `N + 1` levels cut into `N` segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    scale: Scale,
    segments: Vec<Segment>,
}

impl Thresholds {
    pub fn new(levels: &[i32], scale: Scale) -> Result<Self> {
        if levels.len() < 2 {
            return Err(SelectorError::TooFewThresholds(levels.len()));
        }

        let mut segments = Vec::with_capacity(levels.len() - 1);
        for (index, pair) in levels.windows(2).enumerate() {
            let (lo, hi) = (pair[0], pair[1]);
            if hi <= lo {
                return Err(SelectorError::ThresholdsNotAscending {
                    index: index + 1,
                    value: hi,
                });
            }
            segments.push(Segment {
                lo,
                hi,
                mul: scale.multiplier(lo, hi)?,
            });
        }

        Ok(Self { scale, segments })
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Brightness of every segment for one level.
    pub fn levels(&self, data: i32) -> Vec<u8> {
        self.segments
            .iter()
            .map(|segment| self.scale.quantize(segment, data))
            .collect()
    }
}

/// One value to compare against one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeRequest {
    pub data: i32,
    pub segment: Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizerState {
    Idle,
    /// Inside the segment; the multiply lands on the next tick.
    Scale {
        mul: NonZeroU32,
        offset: i64,
        framing: Framed<()>,
    },
    Present(Framed<u8>),
}

/// Single-slot comparator stage. Out-of-range values resolve on the tick
/// they arrive; in-range values take one extra tick for the multiply.
#[derive(Debug, Clone)]
pub struct SegmentQuantizer {
    scale: Scale,
    state: QuantizerState,
}

impl SegmentQuantizer {
    pub fn new(scale: Scale) -> Self {
        Self {
            scale,
            state: QuantizerState::Idle,
        }
    }

    pub fn state(&self) -> QuantizerState {
        self.state
    }

    fn compare(&self, request: Framed<QuantizeRequest>) -> QuantizerState {
        let QuantizeRequest { data, segment } = request.data;
        if data >= segment.hi {
            QuantizerState::Present(request.map(|_| self.scale.max))
        } else if data <= segment.lo {
            QuantizerState::Present(request.map(|_| 0))
        } else {
            QuantizerState::Scale {
                mul: segment.mul,
                offset: i64::from(data) - i64::from(segment.lo),
                framing: request.map(|_| ()),
            }
        }
    }
}

impl Stage for SegmentQuantizer {
    type Input = QuantizeRequest;
    type Output = u8;

    fn ready(&self) -> bool {
        self.state == QuantizerState::Idle
    }

    fn output(&self) -> Option<Framed<u8>> {
        match self.state {
            QuantizerState::Present(out) => Some(out),
            _ => None,
        }
    }

    fn tick(&mut self, input: Option<Framed<QuantizeRequest>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());

        self.state = match self.state {
            QuantizerState::Idle => match (accept, input) {
                (true, Some(request)) => self.compare(request),
                _ => QuantizerState::Idle,
            },
            QuantizerState::Scale {
                mul,
                offset,
                framing,
            } => {
                let value = self.scale.interpolate(mul, offset);
                QuantizerState::Present(framing.map(|_| value))
            }
            QuantizerState::Present(_) if downstream_ready => QuantizerState::Idle,
            present @ QuantizerState::Present(_) => present,
        };
    }
}
