use serde::{Deserialize, Serialize};

use crate::stream::{fires, Framed, OutputSlot, Stage};

/// One left/right pair from an audio source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StereoSample {
    pub left: i16,
    pub right: i16,
}

impl StereoSample {
    pub fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }

    /// Louder of the two channels. Widened first so `i16::MIN` rectifies
    /// to 32768 instead of overflowing.
    pub fn magnitude(self) -> i32 {
        let left = i32::from(self.left).abs();
        let right = i32::from(self.right).abs();
        left.max(right)
    }
}

/// Stereo absolute value: one magnitude out for every pair in.
#[derive(Debug, Clone, Default)]
pub struct Rectifier {
    slot: OutputSlot<i32>,
}

impl Rectifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for Rectifier {
    type Input = StereoSample;
    type Output = i32;

    fn ready(&self) -> bool {
        self.slot.is_empty()
    }

    fn output(&self) -> Option<Framed<i32>> {
        self.slot.peek()
    }

    fn tick(&mut self, input: Option<Framed<StereoSample>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());
        self.slot.drain(downstream_ready);

        if let (true, Some(item)) = (accept, input) {
            self.slot.load(item.map(StereoSample::magnitude));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::sim::{drive, Sink, Source};

    #[test]
    fn picks_the_louder_channel() {
        assert_eq!(StereoSample::new(-300, 200).magnitude(), 300);
        assert_eq!(StereoSample::new(5, -9).magnitude(), 9);
        assert_eq!(StereoSample::new(0, 0).magnitude(), 0);
    }

    #[test]
    fn negative_full_scale_does_not_overflow() {
        assert_eq!(StereoSample::new(i16::MIN, 0).magnitude(), 32_768);
    }

    #[test]
    fn one_output_per_input() {
        let mut stage = Rectifier::new();
        let samples = vec![
            StereoSample::new(1, -2),
            StereoSample::new(-7, 3),
            StereoSample::new(4, 4),
        ];
        let out = drive(&mut stage, Source::singles(samples), Sink::throttled(3), 50);
        assert_eq!(out.values(), vec![2, 7, 4]);
    }
}
