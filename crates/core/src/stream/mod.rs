//! The valid/ready transfer contract shared by every stage.
//!
//! A link between two stages carries at most one item per tick. The
//! producer presents an item through [`Stage::output`] and the consumer
//! signals [`Stage::ready`]; the item moves on the tick where both hold.
//! Both signals are pure functions of a stage's registered state, so a
//! composite samples every link first and only then ticks its children.
//! That ordering is what keeps one stage's update from leaking into
//! another stage's view of the same tick.

pub mod ops;
pub mod sim;

use serde::{Deserialize, Serialize};

/// One item on a stream, with the packet framing bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framed<T> {
    pub data: T,
    pub first: bool,
    pub last: bool,
}

impl<T> Framed<T> {
    pub fn new(data: T, first: bool, last: bool) -> Self {
        Self { data, first, last }
    }

    /// A packet made of exactly one item.
    pub fn single(data: T) -> Self {
        Self::new(data, true, true)
    }

    /// Replaces the payload while keeping the framing.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Framed<U> {
        Framed {
            data: f(self.data),
            first: self.first,
            last: self.last,
        }
    }
}

/// A clocked component with one input stream and one output stream.
pub trait Stage {
    type Input: Copy;
    type Output: Copy;

    /// Whether the stage takes an item this tick.
    fn ready(&self) -> bool;

    /// The item presented downstream this tick, if any.
    fn output(&self) -> Option<Framed<Self::Output>>;

    /// Advances one clock tick.
    ///
    /// `input` is whatever upstream presents; it is consumed only if
    /// [`Stage::ready`] held before the call. `downstream_ready` decides
    /// whether the item from [`Stage::output`] left the stage.
    fn tick(&mut self, input: Option<Framed<Self::Input>>, downstream_ready: bool);
}

/// True when an item moves across a link this tick.
pub fn fires<T>(item: &Option<T>, ready: bool) -> bool {
    item.is_some() && ready
}

/// Single-slot output register.
///
/// A stage built around it accepts a new item only while the slot is
/// empty, so at most one item is ever in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSlot<T> {
    item: Option<Framed<T>>,
}

impl<T: Copy> OutputSlot<T> {
    pub fn new() -> Self {
        Self { item: None }
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    pub fn peek(&self) -> Option<Framed<T>> {
        self.item
    }

    /// Empties the slot if the presented item was taken. Returns whether
    /// a transfer happened.
    pub fn drain(&mut self, downstream_ready: bool) -> bool {
        let taken = fires(&self.item, downstream_ready);
        if taken {
            self.item = None;
        }
        taken
    }

    pub fn load(&mut self, item: Framed<T>) {
        debug_assert!(self.item.is_none(), "output slot overwritten");
        self.item = Some(item);
    }
}

impl<T: Copy> Default for OutputSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_items_carry_both_framing_bits() {
        let item = Framed::single(7u8);
        assert!(item.first && item.last);
        let mapped = item.map(|v| u32::from(v) * 2);
        assert_eq!(mapped, Framed::new(14, true, true));
    }

    #[test]
    fn slot_only_drains_when_downstream_is_ready() {
        let mut slot = OutputSlot::new();
        assert!(!slot.drain(true));

        slot.load(Framed::single(3));
        assert!(!slot.drain(false));
        assert_eq!(slot.peek(), Some(Framed::single(3)));
        assert!(slot.drain(true));
        assert!(slot.is_empty());
    }
}
