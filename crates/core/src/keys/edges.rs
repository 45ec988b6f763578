//! Splits a change between two key snapshots into one event per key.

use serde::Serialize;

use crate::stream::{fires, Framed, Stage};

/// One key changed level. `mask` has exactly one bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
    pub mask: u32,
    pub level: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeState {
    Idle,
    /// Bits still to report.
    Calc { diff: u32, first: bool },
    /// One event presented, the rest of the run waiting behind it.
    Send { event: Framed<Toggle>, remaining: u32 },
}

/// Key edge serializer.
///
/// Events come out lowest bit first, framed as one packet per snapshot
/// change. A snapshot identical to the previous one produces nothing.
#[derive(Debug, Clone)]
pub struct KeyEdgeSerializer {
    width_mask: u32,
    keys: u32,
    state: EdgeState,
}

impl KeyEdgeSerializer {
    pub fn new(width: u32) -> Self {
        let width_mask = match width {
            0 => 0,
            w if w >= 32 => u32::MAX,
            w => (1u32 << w) - 1,
        };
        Self {
            width_mask,
            keys: 0,
            state: EdgeState::Idle,
        }
    }

    pub fn state(&self) -> EdgeState {
        self.state
    }

    fn next_event(&self, diff: u32, first: bool) -> EdgeState {
        if diff == 0 {
            return EdgeState::Idle;
        }
        let mask = diff & diff.wrapping_neg();
        EdgeState::Send {
            event: Framed::new(
                Toggle {
                    mask,
                    level: self.keys & mask != 0,
                },
                first,
                diff == mask,
            ),
            remaining: diff & !mask,
        }
    }
}

impl Stage for KeyEdgeSerializer {
    type Input = u32;
    type Output = Toggle;

    fn ready(&self) -> bool {
        self.state == EdgeState::Idle
    }

    fn output(&self) -> Option<Framed<Toggle>> {
        match self.state {
            EdgeState::Send { event, .. } => Some(event),
            _ => None,
        }
    }

    fn tick(&mut self, input: Option<Framed<u32>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());

        self.state = match self.state {
            EdgeState::Idle => match (accept, input) {
                (true, Some(item)) => {
                    let snapshot = item.data & self.width_mask;
                    let diff = self.keys ^ snapshot;
                    self.keys = snapshot;
                    EdgeState::Calc { diff, first: true }
                }
                _ => EdgeState::Idle,
            },
            EdgeState::Calc { diff, first } => self.next_event(diff, first),
            EdgeState::Send { remaining, .. } if downstream_ready => {
                if remaining == 0 {
                    EdgeState::Idle
                } else {
                    EdgeState::Calc {
                        diff: remaining,
                        first: false,
                    }
                }
            }
            send @ EdgeState::Send { .. } => send,
        };
    }
}
