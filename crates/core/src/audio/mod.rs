use crate::config::{AudioConfig, ToneConfig};
use crate::meter::StereoSample;
use crate::stream::{Framed, OutputSlot};
use crate::{Result, SelectorError};

/// A synthetic input channel producing a triangle wave at a fixed rate.
///
/// Samples arrive on their own clock whether or not anyone is listening;
/// one that finds the previous sample still untaken is lost.
#[derive(Debug, Clone)]
pub struct ToneSource {
    amplitude: i64,
    period: u32,
    phase: u32,
    sample_period: u64,
    counter: u64,
    slot: OutputSlot<StereoSample>,
    overruns: usize,
}

impl ToneSource {
    pub fn new(tone: &ToneConfig, sample_period: u64) -> Result<Self> {
        if sample_period == 0 {
            return Err(SelectorError::ZeroCount("sample period"));
        }
        Ok(Self {
            amplitude: i64::from(tone.amplitude),
            period: tone.period.max(1),
            phase: 0,
            sample_period,
            counter: 0,
            slot: OutputSlot::new(),
            overruns: 0,
        })
    }

    pub fn output(&self) -> Option<Framed<StereoSample>> {
        self.slot.peek()
    }

    pub fn overruns(&self) -> usize {
        self.overruns
    }

    fn wave(&self) -> i64 {
        let half = i64::from(self.period / 2);
        if half == 0 {
            return self.amplitude;
        }
        let pos = i64::from(self.phase);
        let rest = i64::from(self.period) - half;
        if pos < half {
            -self.amplitude + 2 * self.amplitude * pos / half
        } else {
            self.amplitude - 2 * self.amplitude * (pos - half) / rest
        }
    }

    fn next_sample(&mut self) -> StereoSample {
        let value = self.wave().clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16;
        self.phase = (self.phase + 1) % self.period;
        StereoSample::new(value, -(value / 2))
    }

    pub fn tick(&mut self, downstream_ready: bool) {
        self.slot.drain(downstream_ready);

        if self.counter == 0 {
            let sample = self.next_sample();
            if !self.slot.is_empty() {
                self.overruns += 1;
            } else {
                self.slot.load(Framed::single(sample));
            }
        }
        self.counter = (self.counter + 1) % self.sample_period;
    }
}

/// Routes the selected source to the meter and discards the others.
///
/// The selection is latched at the end of a tick, so it never changes
/// between presenting an item and the transfer that takes it.
#[derive(Debug, Clone)]
pub struct SourceSelect {
    sources: Vec<ToneSource>,
    selected: usize,
}

impl SourceSelect {
    pub fn new(config: &AudioConfig) -> Result<Self> {
        let sources = config
            .sources
            .iter()
            .map(|tone| ToneSource::new(tone, config.sample_period))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            sources,
            selected: 0,
        })
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn output(&self) -> Option<Framed<StereoSample>> {
        self.sources.get(self.selected).and_then(ToneSource::output)
    }

    /// Total samples lost on the selected path.
    pub fn overruns(&self) -> usize {
        self.sources
            .get(self.selected)
            .map(ToneSource::overruns)
            .unwrap_or(0)
    }

    pub fn tick(&mut self, select: usize, downstream_ready: bool) {
        for (index, source) in self.sources.iter_mut().enumerate() {
            source.tick(index != self.selected || downstream_ready);
        }
        if select != self.selected {
            tracing::debug!(from = self.selected, to = select, "source switched");
            self.selected = select;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(amplitude: i16, period: u32) -> ToneConfig {
        ToneConfig { amplitude, period }
    }

    #[test]
    fn triangle_spans_the_amplitude() {
        let mut source = ToneSource::new(&tone(1000, 8), 1).unwrap();
        let mut lefts = Vec::new();
        for _ in 0..8 {
            lefts.push(source.output().map(|s| s.data.left));
            source.tick(true);
        }
        let lefts: Vec<i16> = lefts.into_iter().flatten().collect();
        assert_eq!(lefts, vec![-1000, -500, 0, 500, 1000, 500, 0]);
    }

    #[test]
    fn untaken_samples_are_counted_as_lost() {
        let mut source = ToneSource::new(&tone(10, 4), 2).unwrap();
        for _ in 0..9 {
            source.tick(false);
        }
        assert_eq!(source.overruns(), 4);
        assert!(source.output().is_some());
    }

    #[test]
    fn select_routes_only_the_chosen_channel() {
        let config = AudioConfig {
            sample_period: 1,
            sources: vec![tone(100, 2), tone(7000, 2)],
        };
        let mut select = SourceSelect::new(&config).unwrap();
        select.tick(1, false);
        assert_eq!(select.selected(), 1);

        select.tick(1, true);
        let sample = select.output().unwrap().data;
        assert_eq!(sample.magnitude(), 7000);
    }
}
