//! Small plumbing stages that sit between the metering components.

use crate::{Result, SelectorError};

use super::{fires, Framed, OutputSlot, Stage};

/// Forwards the first of every `factor` items and consumes the rest.
#[derive(Debug, Clone)]
pub struct Decimate<T> {
    factor: usize,
    count: usize,
    slot: OutputSlot<T>,
}

impl<T: Copy> Decimate<T> {
    pub fn new(factor: usize) -> Result<Self> {
        if factor == 0 {
            return Err(SelectorError::ZeroCount("decimation factor"));
        }
        Ok(Self {
            factor,
            count: 0,
            slot: OutputSlot::new(),
        })
    }
}

impl<T: Copy> Stage for Decimate<T> {
    type Input = T;
    type Output = T;

    fn ready(&self) -> bool {
        self.slot.is_empty()
    }

    fn output(&self) -> Option<Framed<T>> {
        self.slot.peek()
    }

    fn tick(&mut self, input: Option<Framed<T>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());
        self.slot.drain(downstream_ready);

        if let (true, Some(item)) = (accept, input) {
            if self.count == 0 {
                self.slot.load(Framed::single(item.data));
            }
            self.count = (self.count + 1) % self.factor;
        }
    }
}

/// Forwards an item only when it differs from the last one forwarded.
#[derive(Debug, Clone)]
pub struct Delta<T> {
    previous: Option<T>,
    slot: OutputSlot<T>,
}

impl<T: Copy + PartialEq> Delta<T> {
    pub fn new() -> Self {
        Self {
            previous: None,
            slot: OutputSlot::new(),
        }
    }
}

impl<T: Copy + PartialEq> Default for Delta<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialEq> Stage for Delta<T> {
    type Input = T;
    type Output = T;

    fn ready(&self) -> bool {
        self.slot.is_empty()
    }

    fn output(&self) -> Option<Framed<T>> {
        self.slot.peek()
    }

    fn tick(&mut self, input: Option<Framed<T>>, downstream_ready: bool) {
        let accept = fires(&input, self.ready());
        self.slot.drain(downstream_ready);

        if let (true, Some(item)) = (accept, input) {
            if self.previous != Some(item.data) {
                self.previous = Some(item.data);
                self.slot.load(item);
            }
        }
    }
}

/// All-or-none fan-out to two consumers.
///
/// The held item leaves only on a tick where both consumers are ready,
/// so neither side ever sees an item the other one missed.
#[derive(Debug, Clone)]
pub struct Tee<T> {
    slot: OutputSlot<T>,
}

impl<T: Copy> Tee<T> {
    pub fn new() -> Self {
        Self {
            slot: OutputSlot::new(),
        }
    }

    pub fn ready(&self) -> bool {
        self.slot.is_empty()
    }

    /// The item presented to both consumers.
    pub fn output(&self) -> Option<Framed<T>> {
        self.slot.peek()
    }

    pub fn tick(&mut self, input: Option<Framed<T>>, ready_a: bool, ready_b: bool) {
        let accept = fires(&input, self.ready());
        self.slot.drain(ready_a && ready_b);

        if let (true, Some(item)) = (accept, input) {
            self.slot.load(item);
        }
    }
}

impl<T: Copy> Default for Tee<T> {
    fn default() -> Self {
        Self::new()
    }
}
