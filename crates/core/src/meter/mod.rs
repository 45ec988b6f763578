//! Level metering: stereo samples in, coloured bar-graph LED frames out.
//!
//! ```text
//! Rectifier -> Boxcar -> Decimate -> PeakHold -> Delta -> BarGraph -> BarLeds
//! ```

mod bargraph;
mod boxcar;
mod peak;
mod quantize;
mod rectify;

pub use bargraph::BarGraph;
pub use boxcar::{Boxcar, BoxcarState};
pub use peak::PeakHold;
pub use quantize::{QuantizeRequest, QuantizerState, Scale, Segment, SegmentQuantizer, Thresholds};
pub use rectify::{Rectifier, StereoSample};

use crate::config::MeterConfig;
use crate::mapping::BarLeds;
use crate::render::LedFrame;
use crate::stream::ops::{Decimate, Delta};
use crate::stream::{Framed, Stage};
use crate::Result;

/// The whole metering chain as one stage.
#[derive(Debug, Clone)]
pub struct Meter {
    rectifier: Rectifier,
    boxcar: Boxcar,
    decimate: Decimate<i32>,
    peak: PeakHold,
    delta: Delta<i32>,
    bars: BarGraph,
    leds: BarLeds,
}

impl Meter {
    pub fn new(config: &MeterConfig) -> Result<Self> {
        let scale = Scale::new(config.sample_width, config.output_width)?;
        let thresholds = Thresholds::new(&config.thresholds, scale)?;

        Ok(Self {
            rectifier: Rectifier::new(),
            boxcar: Boxcar::new(config.depth)?,
            decimate: Decimate::new(config.decimate)?,
            peak: PeakHold::new(config.decay_interval, config.decay_point)?,
            delta: Delta::new(),
            bars: BarGraph::new(thresholds),
            leds: BarLeds::new(config.colors, config.led_offset),
        })
    }

    /// Currently held peak level.
    pub fn level(&self) -> i32 {
        self.peak.peak()
    }

    pub fn thresholds(&self) -> &Thresholds {
        self.bars.thresholds()
    }
}

impl Stage for Meter {
    type Input = StereoSample;
    type Output = LedFrame;

    fn ready(&self) -> bool {
        self.rectifier.ready()
    }

    fn output(&self) -> Option<Framed<LedFrame>> {
        self.leds.output()
    }

    fn tick(&mut self, input: Option<Framed<StereoSample>>, downstream_ready: bool) {
        let rectified = self.rectifier.output();
        let averaged = self.boxcar.output();
        let decimated = self.decimate.output();
        let held = self.peak.output();
        let changed = self.delta.output();
        let levels = self.bars.output();

        let boxcar_ready = self.boxcar.ready();
        let decimate_ready = self.decimate.ready();
        let peak_ready = self.peak.ready();
        let delta_ready = self.delta.ready();
        let bars_ready = self.bars.ready();
        let leds_ready = self.leds.ready();

        self.rectifier.tick(input, boxcar_ready);
        self.boxcar.tick(rectified, decimate_ready);
        self.decimate.tick(averaged, peak_ready);
        self.peak.tick(decimated, delta_ready);
        self.delta.tick(held, bars_ready);
        self.bars.tick(changed, leds_ready);
        self.leds.tick(levels, downstream_ready);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::sim::{drive, Sink, Source};

    fn small_config() -> MeterConfig {
        MeterConfig {
            depth: 4,
            decimate: 2,
            ..MeterConfig::default()
        }
    }

    #[test]
    fn loud_input_lights_the_whole_bar() {
        let mut meter = Meter::new(&small_config()).unwrap();
        let samples = vec![StereoSample::new(i16::MIN, 12); 40];
        let out = drive(&mut meter, Source::singles(samples), Sink::new(), 3_000);

        let last = out.packets().pop().expect("at least one bar packet");
        assert_eq!(last.len(), 7);
        assert!(last.iter().all(|frame| frame.r == 255 || frame.g == 255));
        // A steady input still takes one decay step per interval before
        // the next sample attacks back up.
        assert!(meter.level() >= 0x7f00);
    }

    #[test]
    fn silence_draws_nothing_after_the_first_packet() {
        let mut meter = Meter::new(&small_config()).unwrap();
        let samples = vec![StereoSample::default(); 40];
        let out = drive(&mut meter, Source::singles(samples), Sink::new(), 3_000);

        let packets = out.packets();
        assert_eq!(packets.len(), 1, "delta suppresses repeated levels");
        assert!(packets[0].iter().all(|frame| frame.rgb() == [0, 0, 0]));
    }

    #[test]
    fn bad_configuration_is_rejected_up_front() {
        let config = MeterConfig {
            depth: 100,
            ..MeterConfig::default()
        };
        assert!(Meter::new(&config).is_err());
    }
}
