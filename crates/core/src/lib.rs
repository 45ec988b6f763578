//! Core library for the multi-channel audio selector.
//!
//! Raw stereo samples are turned into a segmented peak-level bar graph,
//! and edges from a rotary encoder drive a channel selection shown on an
//! LED ring. Every component is a clocked stage talking to its neighbours
//! through the valid/ready contract in [`stream`]; [`selector`] wires
//! them into the complete device and advances it one tick at a time.

pub mod audio;
pub mod config;
pub mod error;
pub mod keys;
pub mod mapping;
pub mod meter;
pub mod record;
pub mod render;
pub mod selector;
pub mod stream;
pub mod timeline;
pub mod ui;

pub use audio::{SourceSelect, ToneSource};
pub use config::{AppConfig, AudioConfig, KeyConfig, MeterConfig, ToneConfig, UiConfig};
pub use error::{Result, SelectorError};
pub use keys::{KeyEdgeSerializer, KeySampler, Toggle, KEY_A, KEY_B, KEY_SW};
pub use mapping::{BarLeds, ColorMap, Primary};
pub use meter::{BarGraph, Boxcar, Meter, PeakHold, Rectifier, SegmentQuantizer, StereoSample, Thresholds};
pub use record::{SimulationReport, ToggleRecord};
pub use render::{LedFrame, LedRing};
pub use selector::AudioSelector;
pub use stream::{Framed, Stage};
pub use timeline::{KeyScript, ScheduledKeys, Scheduler};
pub use ui::{Selection, SelectionController};
