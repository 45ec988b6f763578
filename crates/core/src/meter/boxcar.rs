//! Moving-average filter over a power-of-two window.
//!
//! The running sum is updated with `new - old` each sample, so the cost
//! per sample is constant whatever the window depth.

use crate::stream::{fires, Framed, Stage};
use crate::{Result, SelectorError};

/// Where the averager is in its per-sample cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxcarState {
    /// Waiting for the next sample.
    Idle,
    /// Holding the new sample and the one it replaces in the ring.
    Write { sample: Framed<i32>, old: i32 },
    /// Difference to fold into the running sum.
    Accum { delta: Framed<i64> },
    /// Sum updated, average about to be presented.
    Emit { framing: Framed<()> },
    /// Average presented downstream until taken.
    Wait(Framed<i32>),
}

#[derive(Debug, Clone)]
pub struct Boxcar {
    ring: Vec<i32>,
    addr: usize,
    sum: i64,
    shift: u32,
    state: BoxcarState,
}

impl Boxcar {
    /// Builds an averager over the last `depth` samples. `depth` must be a
    /// power of two so the division is a shift.
    pub fn new(depth: usize) -> Result<Self> {
        if !depth.is_power_of_two() {
            return Err(SelectorError::DepthNotPowerOfTwo(depth));
        }
        Ok(Self {
            ring: vec![0; depth],
            addr: 0,
            sum: 0,
            shift: depth.trailing_zeros(),
            state: BoxcarState::Idle,
        })
    }

    pub fn state(&self) -> BoxcarState {
        self.state
    }
}

impl Stage for Boxcar {
    type Input = i32;
    type Output = i32;

    fn ready(&self) -> bool {
        self.state == BoxcarState::Idle
    }

    fn output(&self) -> Option<Framed<i32>> {
        match self.state {
            BoxcarState::Wait(out) => Some(out),
            _ => None,
        }
    }

    fn tick(&mut self, input: Option<Framed<i32>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());

        self.state = match self.state {
            BoxcarState::Idle => match (accept, input) {
                (true, Some(sample)) => BoxcarState::Write {
                    sample,
                    old: self.ring[self.addr],
                },
                _ => BoxcarState::Idle,
            },
            BoxcarState::Write { sample, old } => {
                self.ring[self.addr] = sample.data;
                BoxcarState::Accum {
                    delta: sample.map(|new| i64::from(new) - i64::from(old)),
                }
            }
            BoxcarState::Accum { delta } => {
                self.sum += delta.data;
                self.addr = (self.addr + 1) & (self.ring.len() - 1);
                BoxcarState::Emit {
                    framing: delta.map(|_| ()),
                }
            }
            BoxcarState::Emit { framing } => {
                let average = self.sum >> self.shift;
                BoxcarState::Wait(framing.map(|_| average as i32))
            }
            BoxcarState::Wait(_) if downstream_ready => BoxcarState::Idle,
            wait @ BoxcarState::Wait(_) => wait,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::sim::{drive, Sink, Source};
    use proptest::prelude::*;

    fn expected_averages(inputs: &[i32], depth: usize) -> Vec<i32> {
        let shift = depth.trailing_zeros();
        (0..inputs.len())
            .map(|t| {
                let start = (t + 1).saturating_sub(depth);
                let sum: i64 = inputs[start..=t].iter().map(|&v| i64::from(v)).sum();
                (sum >> shift) as i32
            })
            .collect()
    }

    #[test]
    fn rejects_depth_that_is_not_a_power_of_two() {
        assert!(matches!(
            Boxcar::new(12),
            Err(SelectorError::DepthNotPowerOfTwo(12))
        ));
        assert!(Boxcar::new(0).is_err());
        assert!(Boxcar::new(1).is_ok());
    }

    #[test]
    fn walks_through_every_state() {
        let mut boxcar = Boxcar::new(4).unwrap();
        boxcar.tick(Some(Framed::single(8)), false);
        assert!(matches!(boxcar.state(), BoxcarState::Write { old: 0, .. }));
        boxcar.tick(None, false);
        assert!(matches!(boxcar.state(), BoxcarState::Accum { .. }));
        boxcar.tick(None, false);
        assert!(matches!(boxcar.state(), BoxcarState::Emit { .. }));
        boxcar.tick(None, false);
        assert_eq!(boxcar.output(), Some(Framed::single(2)));
        assert!(!boxcar.ready());

        boxcar.tick(Some(Framed::single(100)), false);
        assert_eq!(boxcar.output(), Some(Framed::single(2)), "stalled");
        boxcar.tick(None, true);
        assert!(boxcar.ready());
    }

    #[test]
    fn steady_input_settles_at_its_value() {
        let mut boxcar = Boxcar::new(8).unwrap();
        let out = drive(&mut boxcar, Source::singles(vec![1000; 12]), Sink::new(), 200);
        let values = out.values();
        assert_eq!(values.len(), 12);
        assert_eq!(values[0], 125);
        assert!(values[7..].iter().all(|&v| v == 1000));
    }

    proptest! {
        #[test]
        fn output_is_the_truncated_moving_average(
            inputs in proptest::collection::vec(-32_768i32..=32_768, 1..40),
            log_depth in 0u32..4,
        ) {
            let depth = 1usize << log_depth;
            let mut boxcar = Boxcar::new(depth).unwrap();
            let ticks = inputs.len() as u64 * 12 + 10;
            let out = drive(&mut boxcar, Source::singles(inputs.clone()), Sink::throttled(2), ticks);
            prop_assert_eq!(out.values(), expected_averages(&inputs, depth));
        }
    }
}
