//! Channel selection driven by a rotary encoder, shown on the LED ring.
//!
//! Pressing the switch enters edit mode, turning the encoder moves the
//! candidate (green) and pressing again commits it as the live channel
//! (red). Whenever the candidate changes the whole ring is redrawn in one
//! framed sweep. Between sweeps the controller passes the external LED
//! stream (the level meter) through unchanged.

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::UiConfig;
use crate::keys::{KEY_A, KEY_B, KEY_SW};
use crate::render::LedFrame;
use crate::stream::{fires, Framed, OutputSlot};
use crate::Result;

/// Committed channel, candidate channel and whether the candidate is
/// being edited. Both indices always lie in `0..chans`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub channel: usize,
    pub edit: usize,
    pub edit_mode: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    chans: usize,
    leds: usize,
    bright: u8,
    selection: Selection,
    keys: u32,
    /// Next address of the sweep; zero when no sweep is running.
    led: usize,
    update: bool,
    out: OutputSlot<LedFrame>,
    sweeps: usize,
}

impl SelectionController {
    pub fn new(config: &UiConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            chans: config.chans,
            leds: config.leds,
            bright: config.bright,
            selection: Selection::default(),
            keys: 0,
            led: 0,
            update: false,
            out: OutputSlot::new(),
            sweeps: 0,
        })
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The committed channel, which drives the source select.
    pub fn channel(&self) -> usize {
        self.selection.channel
    }

    /// Number of sweeps drawn to the end.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    fn sweeping(&self) -> bool {
        self.update || self.led != 0
    }

    /// Keys are taken only between sweeps, so every change of the
    /// candidate is drawn before the next one can happen.
    pub fn keys_ready(&self) -> bool {
        !self.sweeping()
    }

    pub fn leds_ready(&self) -> bool {
        self.out.is_empty() && !self.sweeping()
    }

    pub fn output(&self) -> Option<Framed<LedFrame>> {
        self.out.peek()
    }

    pub fn tick(
        &mut self,
        keys: Option<Framed<u32>>,
        leds: Option<Framed<LedFrame>>,
        downstream_ready: bool,
    ) {
        let take_keys = fires(&keys, self.keys_ready());
        let take_frame = fires(&leds, self.leds_ready());
        let render = self.sweeping() && self.out.is_empty();

        self.out.drain(downstream_ready);

        if let (true, Some(frame)) = (take_frame, leds) {
            // The selection display owns the ring while editing.
            if !self.selection.edit_mode {
                self.out.load(frame);
            }
        }

        if render {
            let frame = self.sweep_frame();
            self.out.load(frame);
        }

        if let (true, Some(item)) = (take_keys, keys) {
            self.handle_keys(item.data);
        }
    }

    fn sweep_frame(&mut self) -> Framed<LedFrame> {
        let led = self.led;
        let end = self.leds - 1;
        if led == 0 {
            trace!(channel = self.selection.channel, edit = self.selection.edit, "sweep started");
        }

        let r = if led == self.selection.channel { self.bright } else { 0 };
        let g = if led == self.selection.edit { self.bright } else { 0 };
        let frame = Framed::new(LedFrame::new(led as u8, r, g, 0), led == 0, led == end);

        self.update = false;
        if led == end {
            self.led = 0;
            self.sweeps += 1;
        } else {
            self.led = led + 1;
        }
        frame
    }

    fn handle_keys(&mut self, keys: u32) {
        let key_on = keys & !self.keys;
        self.keys = keys;
        let chans = self.chans;
        let selection = &mut self.selection;

        if !selection.edit_mode {
            if key_on & KEY_SW != 0 {
                selection.edit_mode = true;
                selection.edit = selection.channel;
                self.update = true;
                debug!(channel = selection.channel, "entered edit mode");
            }
            return;
        }

        if key_on & KEY_SW != 0 {
            selection.channel = selection.edit;
            selection.edit_mode = false;
            debug!(channel = selection.channel, "selection committed");
        }

        if key_on & KEY_A != 0 {
            self.update = true;
            selection.edit = if keys & KEY_B != 0 {
                (selection.edit + 1) % chans
            } else {
                (selection.edit + chans - 1) % chans
            };
            debug!(edit = selection.edit, "candidate moved");
        }
    }
}
