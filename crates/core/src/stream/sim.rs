//! Producer and consumer ends for driving stages outside a full system.
//!
//! [`Source`] presents scheduled items and [`Sink`] collects whatever it
//! accepts, optionally only on some ticks to apply backpressure.

use std::collections::VecDeque;

use super::{fires, Framed, Stage};

/// Presents items in order, each no earlier than its scheduled tick.
#[derive(Debug, Clone)]
pub struct Source<T> {
    queue: VecDeque<(u64, Framed<T>)>,
    now: u64,
}

impl<T: Copy> Source<T> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            now: 0,
        }
    }

    /// Every value as its own single-item packet, all available at once.
    pub fn singles(values: impl IntoIterator<Item = T>) -> Self {
        let mut source = Self::new();
        for value in values {
            source.push(0, Framed::single(value));
        }
        source
    }

    pub fn push(&mut self, at: u64, item: Framed<T>) {
        self.queue.push_back((at, item));
    }

    /// Queues a whole packet with `first`/`last` on its end items.
    pub fn push_packet(&mut self, at: u64, values: &[T]) {
        let end = values.len().saturating_sub(1);
        for (index, value) in values.iter().enumerate() {
            self.push(at, Framed::new(*value, index == 0, index == end));
        }
    }

    pub fn present(&self) -> Option<Framed<T>> {
        self.queue
            .front()
            .filter(|(at, _)| *at <= self.now)
            .map(|(_, item)| *item)
    }

    pub fn tick(&mut self, accepted: bool) {
        if accepted {
            self.queue.pop_front();
        }
        self.now += 1;
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T: Copy> Default for Source<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects accepted items. Ready on one tick out of every `every`.
#[derive(Debug, Clone)]
pub struct Sink<T> {
    items: Vec<Framed<T>>,
    every: u64,
    now: u64,
}

impl<T: Copy> Sink<T> {
    /// A sink that is ready on every tick.
    pub fn new() -> Self {
        Self::throttled(1)
    }

    pub fn throttled(every: u64) -> Self {
        Self {
            items: Vec::new(),
            every: every.max(1),
            now: 0,
        }
    }

    pub fn ready(&self) -> bool {
        self.now % self.every == 0
    }

    pub fn tick(&mut self, presented: Option<Framed<T>>) {
        if let (true, Some(item)) = (self.ready(), presented) {
            self.items.push(item);
        }
        self.now += 1;
    }

    pub fn items(&self) -> &[Framed<T>] {
        &self.items
    }

    pub fn values(&self) -> Vec<T> {
        self.items.iter().map(|item| item.data).collect()
    }

    /// Splits the collected items into packets at `last` markers.
    pub fn packets(&self) -> Vec<Vec<T>> {
        let mut packets = Vec::new();
        let mut current = Vec::new();
        for item in &self.items {
            current.push(item.data);
            if item.last {
                packets.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            packets.push(current);
        }
        packets
    }
}

impl<T: Copy> Default for Sink<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `stage` between `source` and `sink` for `ticks` clock ticks and
/// hands back the sink.
pub fn drive<S: Stage>(
    stage: &mut S,
    mut source: Source<S::Input>,
    mut sink: Sink<S::Output>,
    ticks: u64,
) -> Sink<S::Output> {
    for _ in 0..ticks {
        let presented = source.present();
        let accepted = fires(&presented, stage.ready());
        let out = stage.output();
        let sink_ready = sink.ready();

        stage.tick(presented, sink_ready);
        source.tick(accepted);
        sink.tick(out);
    }
    sink
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_waits_for_schedule() {
        let mut source = Source::new();
        source.push(2, Framed::single(1u8));
        assert!(source.present().is_none());
        source.tick(false);
        source.tick(false);
        assert_eq!(source.present(), Some(Framed::single(1)));
        source.tick(true);
        assert!(source.is_done());
    }

    #[test]
    fn sink_groups_packets() {
        let mut sink = Sink::new();
        let items = [
            Framed::new(1, true, false),
            Framed::new(2, false, true),
            Framed::single(3),
        ];
        for item in items {
            sink.tick(Some(item));
        }
        assert_eq!(sink.packets(), vec![vec![1, 2], vec![3]]);
    }

    #[test]
    fn throttled_sink_skips_ticks() {
        let mut sink = Sink::throttled(3);
        for value in 0..6 {
            sink.tick(Some(Framed::single(value)));
        }
        assert_eq!(sink.values(), vec![0, 3]);
    }
}
