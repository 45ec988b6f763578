//! Scripted key input for simulations.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::keys::{KEY_A, KEY_B, KEY_SW};
use crate::{Result, SelectorError};

/// Raw key lines to drive from a given tick onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledKeys {
    pub at: u64,
    pub keys: u32,
}

/// A sequence of raw key snapshots, as a person at the encoder would
/// produce them.
///
/// Gestures: `sw` presses and releases the switch, `down`/`up` turn the
/// encoder one detent, and a hex value such as `0x6` is used as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyScript {
    snapshots: Vec<u32>,
}

impl KeyScript {
    pub fn parse(text: &str) -> Result<Self> {
        let mut snapshots = Vec::new();
        for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "sw" => snapshots.extend([KEY_SW, 0]),
                // Phase A leads: A rises while B is low.
                "down" => snapshots.extend([KEY_A, KEY_A | KEY_B, KEY_B, 0]),
                // Phase B leads: A rises while B is high.
                "up" => snapshots.extend([KEY_B, KEY_A | KEY_B, KEY_A, 0]),
                raw => snapshots.push(parse_hex(raw)?),
            }
        }
        Ok(Self { snapshots })
    }

    pub fn snapshots(&self) -> &[u32] {
        &self.snapshots
    }

    /// Places each snapshot `hold` ticks after the previous one.
    pub fn schedule(&self, start: u64, hold: u64) -> Result<Vec<ScheduledKeys>> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(index, &keys)| {
                let at = (index as u64)
                    .checked_mul(hold)
                    .and_then(|offset| offset.checked_add(start))
                    .ok_or_else(|| {
                        SelectorError::msg(format!(
                            "key snapshot {index} held {hold} ticks runs past the end of time"
                        ))
                    })?;
                Ok(ScheduledKeys { at, keys })
            })
            .collect()
    }
}

impl FromStr for KeyScript {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_hex(token: &str) -> Result<u32> {
    let digits = token.strip_prefix("0x").unwrap_or(token);
    u32::from_str_radix(digits, 16)
        .map_err(|_| SelectorError::msg(format!("unknown key gesture `{token}`")))
}

/// Hands out scheduled key changes as the clock reaches them.
#[derive(Debug, Default)]
pub struct Scheduler {
    events: Vec<ScheduledKeys>,
    next_event: usize,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_events(&mut self, mut events: Vec<ScheduledKeys>) {
        events.sort_by_key(|event| event.at);
        self.events = events;
        self.next_event = 0;
    }

    /// The keys to apply at tick `now`, if a change is due.
    pub fn tick(&mut self, now: u64) -> Option<u32> {
        let mut due = None;
        while let Some(event) = self.events.get(self.next_event) {
            if event.at > now {
                break;
            }
            due = Some(event.keys);
            self.next_event += 1;
        }
        due
    }

    pub fn is_finished(&self) -> bool {
        self.next_event >= self.events.len()
    }

    /// Tick of the last scheduled change.
    pub fn end(&self) -> u64 {
        self.events.last().map(|event| event.at).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_gestures() {
        let script: KeyScript = "sw, down, up, 0x6".parse().unwrap();
        assert_eq!(
            script.snapshots(),
            &[0x1, 0x0, 0x2, 0x6, 0x4, 0x0, 0x4, 0x6, 0x2, 0x0, 0x6]
        );
    }

    #[test]
    fn rejects_unknown_gestures() {
        let err = KeyScript::parse("sw,left").unwrap_err();
        assert!(format!("{err}").contains("left"));
    }

    #[test]
    fn oversized_hold_is_an_error() {
        let script = KeyScript::parse("sw, up").unwrap();
        assert!(script.schedule(0, u64::MAX).is_err());
        assert!(script.schedule(u64::MAX, 1).is_err());
        assert!(KeyScript::parse("0x1").unwrap().schedule(u64::MAX, u64::MAX).is_ok());
    }

    #[test]
    fn scheduler_releases_events_in_time_order() {
        let mut scheduler = Scheduler::new();
        scheduler.set_events(vec![
            ScheduledKeys { at: 20, keys: 2 },
            ScheduledKeys { at: 10, keys: 1 },
        ]);
        assert_eq!(scheduler.tick(5), None);
        assert_eq!(scheduler.tick(10), Some(1));
        assert_eq!(scheduler.tick(15), None);
        assert_eq!(scheduler.tick(25), Some(2));
        assert!(scheduler.is_finished());
        assert_eq!(scheduler.end(), 20);
    }

    #[test]
    fn schedule_spaces_snapshots_by_hold() {
        let script = KeyScript::parse("sw").unwrap();
        let events = script.schedule(100, 30).unwrap();
        assert_eq!(
            events,
            vec![
                ScheduledKeys { at: 100, keys: 1 },
                ScheduledKeys { at: 130, keys: 0 }
            ]
        );
    }
}
