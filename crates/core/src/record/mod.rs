use std::path::Path;

use serde::Serialize;

use crate::keys::Toggle;
use crate::ui::Selection;
use crate::Result;

/// A key event as seen at the output of the edge serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleRecord {
    pub at: u64,
    pub mask: u32,
    pub level: bool,
}

impl ToggleRecord {
    pub fn new(at: u64, toggle: Toggle) -> Self {
        Self {
            at,
            mask: toggle.mask,
            level: toggle.level,
        }
    }
}

/// Everything a simulation run observed.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub ticks: u64,
    pub selection: Selection,
    pub selected_source: usize,
    pub level: i32,
    pub sweeps: usize,
    pub bar_packets: usize,
    pub ring: Vec<[u8; 3]>,
    pub ring_packets: usize,
    pub overruns: usize,
    pub toggles: Vec<ToggleRecord>,
}

impl SimulationReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
