use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mapping::ColorMap;
use crate::meter::{Boxcar, PeakHold, Scale, Thresholds};
use crate::{Result, SelectorError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub meter: MeterConfig,
    pub ui: UiConfig,
    pub keys: KeyConfig,
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections fall back to
    /// their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Checks everything the pipeline would otherwise reject while it is
    /// being built.
    pub fn validate(&self) -> Result<()> {
        self.meter.validate()?;
        self.ui.validate()?;
        if self.keys.debounce == 0 {
            return Err(SelectorError::ZeroCount("debounce interval"));
        }
        if self.audio.sample_period == 0 {
            return Err(SelectorError::ZeroCount("sample period"));
        }
        if self.audio.sources.len() < self.ui.chans {
            return Err(SelectorError::msg(format!(
                "{} channels configured but only {} sources",
                self.ui.chans,
                self.audio.sources.len()
            )));
        }
        Ok(())
    }
}

/// Metering pipeline parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterConfig {
    pub sample_width: u32,
    pub output_width: u32,
    /// Boxcar window, a power of two.
    pub depth: usize,
    pub decimate: usize,
    /// Samples between decay steps of the peak envelope.
    pub decay_interval: u32,
    /// Fractional bits of the peak envelope.
    pub decay_point: u32,
    pub thresholds: Vec<i32>,
    pub colors: ColorMap,
    /// LED address of the first bar segment.
    pub led_offset: u8,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            sample_width: 16,
            output_width: 8,
            // 48 kHz / 512 is roughly a 10 ms average.
            depth: 512,
            decimate: 32,
            decay_interval: 2,
            decay_point: 8,
            thresholds: vec![0x10, 0x80, 0x200, 0x800, 0x1000, 0x2000, 0x4000, 0x7fff],
            colors: ColorMap::default(),
            led_offset: 0,
        }
    }
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        let scale = Scale::new(self.sample_width, self.output_width)?;
        Thresholds::new(&self.thresholds, scale)?;
        Boxcar::new(self.depth)?;
        PeakHold::new(self.decay_interval, self.decay_point)?;
        if self.decimate == 0 {
            return Err(SelectorError::ZeroCount("decimation factor"));
        }
        Ok(())
    }
}

/// Selection controller parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub chans: usize,
    pub leds: usize,
    pub bright: u8,
    /// Number of key lines in a snapshot.
    pub key_width: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            chans: 5,
            leds: 8,
            bright: 0xff,
            key_width: 3,
        }
    }
}

impl UiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chans == 0 {
            return Err(SelectorError::ZeroCount("channel count"));
        }
        if self.leds == 0 || self.leds > 256 {
            return Err(SelectorError::InvalidWidth(format!(
                "LED ring of {} pixels",
                self.leds
            )));
        }
        if self.chans > self.leds {
            return Err(SelectorError::RingTooSmall {
                chans: self.chans,
                leds: self.leds,
            });
        }
        if !(3..=32).contains(&self.key_width) {
            return Err(SelectorError::InvalidWidth(format!(
                "{} key lines",
                self.key_width
            )));
        }
        Ok(())
    }
}

/// Key sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    /// Ticks between key samples. A rotary encoder pulse lasts a few
    /// milliseconds, so this is long compared to the audio rate.
    pub debounce: u64,
    /// Ticks each scripted key snapshot is held for.
    pub hold: u64,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            debounce: 16,
            hold: 400,
        }
    }
}

/// Synthetic audio sources, one per selectable channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Ticks between consecutive stereo samples.
    pub sample_period: u64,
    pub sources: Vec<ToneConfig>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        let sources = [0x7fff, 0x3000, 0x0c00, 0x0300, 0x0040]
            .into_iter()
            .map(|amplitude| ToneConfig {
                amplitude,
                period: 48,
            })
            .collect();
        Self {
            sample_period: 16,
            sources,
        }
    }
}

/// A triangle wave of the given peak amplitude and period in samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneConfig {
    pub amplitude: i16,
    pub period: u32,
}
