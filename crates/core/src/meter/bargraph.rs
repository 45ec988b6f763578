//! Runs one level through every threshold segment, producing one framed
//! packet of brightness values per level.

use crate::stream::{fires, Framed, Stage};

use super::quantize::{QuantizeRequest, SegmentQuantizer, Thresholds};

/// Progress through the segments for the level being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pass {
    data: i32,
    next: usize,
}

/// Bar graph sequencer.
///
/// The quantizer is owned outright, and a new level is taken only after
/// every segment of the previous one has been handed to it. Packets can
/// therefore never interleave.
#[derive(Debug, Clone)]
pub struct BarGraph {
    thresholds: Thresholds,
    quantizer: SegmentQuantizer,
    pass: Option<Pass>,
    pending: Option<Framed<QuantizeRequest>>,
}

impl BarGraph {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            quantizer: SegmentQuantizer::new(thresholds.scale()),
            thresholds,
            pass: None,
            pending: None,
        }
    }

    /// Number of items in every packet.
    pub fn segments(&self) -> usize {
        self.thresholds.len()
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    fn request(&self, pass: Pass) -> Framed<QuantizeRequest> {
        let end = self.segments() - 1;
        Framed::new(
            QuantizeRequest {
                data: pass.data,
                segment: self.thresholds.segments()[pass.next],
            },
            pass.next == 0,
            pass.next == end,
        )
    }
}

impl Stage for BarGraph {
    type Input = i32;
    type Output = u8;

    fn ready(&self) -> bool {
        self.pass.is_none()
    }

    fn output(&self) -> Option<Framed<u8>> {
        self.quantizer.output()
    }

    fn tick(&mut self, input: Option<Framed<i32>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());
        let link_idle = self.pending.is_none();
        let handed_over = fires(&self.pending, self.quantizer.ready());

        self.quantizer.tick(self.pending, downstream_ready);
        if handed_over {
            self.pending = None;
        }

        match self.pass {
            Some(pass) if pass.next == self.segments() => self.pass = None,
            Some(pass) if link_idle => {
                self.pending = Some(self.request(pass));
                self.pass = Some(Pass {
                    next: pass.next + 1,
                    ..pass
                });
            }
            Some(_) => {}
            None => {
                if let (true, Some(item)) = (accept, input) {
                    self.pass = Some(Pass {
                        data: item.data,
                        next: 0,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::quantize::Scale;
    use crate::stream::sim::{drive, Sink, Source};

    const LEVELS: [i32; 8] = [0x10, 0x80, 0x200, 0x800, 0x1000, 0x2000, 0x4000, 0x7fff];

    fn bar_graph() -> BarGraph {
        let scale = Scale::new(16, 8).unwrap();
        BarGraph::new(Thresholds::new(&LEVELS, scale).unwrap())
    }

    #[test]
    fn every_level_becomes_one_framed_packet() {
        let mut bars = bar_graph();
        let inputs = vec![0, 0x100, 0x900, 0x7fff, 0x30];
        let out = drive(&mut bars, Source::singles(inputs.clone()), Sink::throttled(3), 2_000);

        let items = out.items();
        assert_eq!(items.len(), inputs.len() * 7);
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.first, index % 7 == 0, "first at {index}");
            assert_eq!(item.last, index % 7 == 6, "last at {index}");
        }
    }

    #[test]
    fn packets_match_the_one_shot_quantizer() {
        let mut bars = bar_graph();
        let inputs = vec![0x40, 0x180, 0x1800, 0x7fff];
        let out = drive(&mut bars, Source::singles(inputs.clone()), Sink::new(), 1_000);

        let expected: Vec<Vec<u8>> = inputs.iter().map(|&v| bars.thresholds().levels(v)).collect();
        assert_eq!(out.packets(), expected);
        assert_eq!(out.packets()[3], vec![255; 7]);
    }

    #[test]
    fn louder_levels_never_dim_a_segment() {
        let bars = bar_graph();
        let mut previous = bars.thresholds().levels(0);
        for level in (0..0x8000).step_by(97) {
            let current = bars.thresholds().levels(level);
            assert!(current.iter().zip(&previous).all(|(now, before)| now >= before));
            assert!(current.windows(2).all(|pair| pair[1] <= pair[0]));
            previous = current;
        }
    }

    #[test]
    fn refuses_input_until_the_pass_is_issued() {
        let mut bars = bar_graph();
        bars.tick(Some(Framed::single(0x100)), false);
        assert!(!bars.ready());
        for _ in 0..200 {
            bars.tick(Some(Framed::single(0x200)), false);
        }
        assert!(!bars.ready(), "stalled consumer holds the pass open");
    }
}
