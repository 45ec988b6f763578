//! Turns bar-graph brightness values into addressed LED frames.

use serde::{Deserialize, Serialize};

use crate::render::LedFrame;
use crate::stream::{fires, Framed, OutputSlot, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primary {
    Red,
    Green,
    Blue,
}

impl Primary {
    fn paint(self, addr: u8, level: u8) -> LedFrame {
        match self {
            Primary::Red => LedFrame::new(addr, level, 0, 0),
            Primary::Green => LedFrame::new(addr, 0, level, 0),
            Primary::Blue => LedFrame::new(addr, 0, 0, level),
        }
    }
}

/// How a segment's brightness is routed to a colour channel. Chosen once
/// from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorMap {
    /// `low` below address `at`, `high` from `at` upwards.
    Split { at: u8, low: Primary, high: Primary },
    Solid { color: Primary },
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::Split {
            at: 4,
            low: Primary::Green,
            high: Primary::Red,
        }
    }
}

impl ColorMap {
    pub fn frame(&self, addr: u8, level: u8) -> LedFrame {
        match *self {
            ColorMap::Split { at, low, high } => {
                if addr >= at {
                    high.paint(addr, level)
                } else {
                    low.paint(addr, level)
                }
            }
            ColorMap::Solid { color } => color.paint(addr, level),
        }
    }
}

/// Numbers the items of each bar packet from `offset` and colours them.
#[derive(Debug, Clone)]
pub struct BarLeds {
    map: ColorMap,
    offset: u8,
    index: u8,
    slot: OutputSlot<LedFrame>,
}

impl BarLeds {
    pub fn new(map: ColorMap, offset: u8) -> Self {
        Self {
            map,
            offset,
            index: 0,
            slot: OutputSlot::new(),
        }
    }
}

impl Stage for BarLeds {
    type Input = u8;
    type Output = LedFrame;

    fn ready(&self) -> bool {
        self.slot.is_empty()
    }

    fn output(&self) -> Option<Framed<LedFrame>> {
        self.slot.peek()
    }

    fn tick(&mut self, input: Option<Framed<u8>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());
        self.slot.drain(downstream_ready);

        if let (true, Some(item)) = (accept, input) {
            let index = if item.first { 0 } else { self.index };
            self.index = index.wrapping_add(1);
            let addr = self.offset.wrapping_add(index);
            self.slot.load(item.map(|level| self.map.frame(addr, level)));
        }
    }
}
