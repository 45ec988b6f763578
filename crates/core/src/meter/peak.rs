//! Peak envelope follower with instant attack and stepped decay.
//!
//! The envelope is kept with `point` fractional bits. Every `interval`
//! samples without a new peak it loses `1 / 2^point` of its value, which
//! gives the usual peak-programme-meter fall-back.

use crate::stream::{fires, Framed, OutputSlot, Stage};
use crate::{Result, SelectorError};

#[derive(Debug, Clone)]
pub struct PeakHold {
    interval: u32,
    point: u32,
    peak: i64,
    count: u32,
    slot: OutputSlot<i32>,
}

impl PeakHold {
    pub fn new(interval: u32, point: u32) -> Result<Self> {
        if interval == 0 {
            return Err(SelectorError::ZeroCount("decay interval"));
        }
        if point >= 32 {
            return Err(SelectorError::InvalidWidth(format!(
                "decay precision of {point} bits"
            )));
        }
        Ok(Self {
            interval,
            point,
            peak: 0,
            count: 0,
            slot: OutputSlot::new(),
        })
    }

    /// The visible integer part of the envelope.
    pub fn peak(&self) -> i32 {
        (self.peak >> self.point) as i32
    }

    fn follow(&mut self, data: i32) -> i32 {
        let held = self.peak();
        let mut next = self.peak;

        if self.count == self.interval - 1 {
            next -= i64::from(held);
        }

        let out = if data > held {
            next = i64::from(data) << self.point;
            self.count = 0;
            data
        } else {
            self.count = (self.count + 1) % self.interval;
            held
        };

        self.peak = next;
        out
    }
}

impl Stage for PeakHold {
    type Input = i32;
    type Output = i32;

    fn ready(&self) -> bool {
        self.slot.is_empty()
    }

    fn output(&self) -> Option<Framed<i32>> {
        self.slot.peek()
    }

    fn tick(&mut self, input: Option<Framed<i32>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());
        self.slot.drain(downstream_ready);

        if let (true, Some(item)) = (accept, input) {
            let out = self.follow(item.data);
            self.slot.load(item.map(|_| out));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(peak: &mut PeakHold, inputs: &[i32]) -> Vec<i32> {
        inputs.iter().map(|&x| peak.follow(x)).collect()
    }

    #[test]
    fn rising_input_is_tracked_exactly() {
        let mut peak = PeakHold::new(2, 8).unwrap();
        let inputs: Vec<i32> = (1..50).map(|v| v * 37).collect();
        assert_eq!(run(&mut peak, &inputs), inputs);
        assert_eq!(peak.count, 0);
    }

    #[test]
    fn decays_by_a_fraction_each_interval() {
        let mut peak = PeakHold::new(1, 3).unwrap();
        let out = run(&mut peak, &[800, 0, 0, 0]);
        assert_eq!(out, vec![800, 800, 700, 612]);
    }

    #[test]
    fn holds_between_decay_steps() {
        let mut peak = PeakHold::new(4, 4).unwrap();
        let out = run(&mut peak, &[1600, 0, 0, 0, 0, 0]);
        assert_eq!(&out[..5], &[1600, 1600, 1600, 1600, 1600]);
        assert_eq!(out[5], 1500);
    }

    #[test]
    fn quiet_input_never_raises_the_envelope() {
        let mut peak = PeakHold::new(2, 3).unwrap();
        let mut inputs = vec![20_000];
        inputs.extend(std::iter::repeat(10).take(400));
        let out = run(&mut peak, &inputs);

        assert!(out.windows(2).all(|pair| pair[1] <= pair[0]));
        assert!(out[3] < out[0], "first decay lands within one interval");
        assert!(*out.last().unwrap() < 200);
    }

    #[test]
    fn attack_wins_over_a_pending_decay() {
        let mut peak = PeakHold::new(2, 4).unwrap();
        run(&mut peak, &[100, 0]);
        assert_eq!(peak.count, 1);
        assert_eq!(peak.follow(150), 150);
        assert_eq!(peak.peak(), 150);
    }

    #[test]
    fn steady_full_scale_dips_one_step_per_interval() {
        let mut peak = PeakHold::new(2, 8).unwrap();
        let mut levels = Vec::new();
        for _ in 0..8 {
            assert_eq!(peak.follow(32_768), 32_768);
            levels.push(peak.peak());
        }
        assert_eq!(
            levels,
            vec![32_768, 32_768, 32_640, 32_768, 32_768, 32_640, 32_768, 32_768]
        );
    }

    #[test]
    fn rejects_zero_interval() {
        assert!(PeakHold::new(0, 8).is_err());
    }
}
