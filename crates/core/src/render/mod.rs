use serde::{Deserialize, Serialize};

use crate::stream::Framed;

/// One addressed pixel on the LED stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedFrame {
    pub addr: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl LedFrame {
    pub fn new(addr: u8, r: u8, g: u8, b: u8) -> Self {
        Self { addr, r, g, b }
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// The physical LED ring at the end of the stream. It accepts a frame on
/// every tick and keeps the latest colour per address.
#[derive(Debug, Clone)]
pub struct LedRing {
    pixels: Vec<[u8; 3]>,
    frames: usize,
    packets: usize,
    dropped: usize,
}

impl LedRing {
    pub fn new(leds: usize) -> Self {
        Self {
            pixels: vec![[0; 3]; leds],
            frames: 0,
            packets: 0,
            dropped: 0,
        }
    }

    pub fn ready(&self) -> bool {
        true
    }

    pub fn accept(&mut self, item: Framed<LedFrame>) {
        let frame = item.data;
        match self.pixels.get_mut(usize::from(frame.addr)) {
            Some(pixel) => {
                *pixel = frame.rgb();
                self.frames += 1;
            }
            None => {
                tracing::trace!(addr = frame.addr, "frame outside the ring");
                self.dropped += 1;
            }
        }
        if item.last {
            self.packets += 1;
        }
    }

    pub fn pixels(&self) -> &[[u8; 3]] {
        &self.pixels
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn packets(&self) -> usize {
        self.packets
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_latest_colour_per_address() {
        let mut ring = LedRing::new(4);
        ring.accept(Framed::new(LedFrame::new(1, 9, 0, 0), true, false));
        ring.accept(Framed::new(LedFrame::new(1, 0, 7, 0), false, true));
        assert_eq!(ring.pixels()[1], [0, 7, 0]);
        assert_eq!(ring.frames(), 2);
        assert_eq!(ring.packets(), 1);
    }

    #[test]
    fn counts_frames_past_the_end() {
        let mut ring = LedRing::new(2);
        ring.accept(Framed::single(LedFrame::new(5, 1, 1, 1)));
        assert_eq!(ring.dropped(), 1);
        assert_eq!(ring.frames(), 0);
    }
}
