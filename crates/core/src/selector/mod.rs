//! The complete selector: sources, meter, keys, controller and ring,
//! advanced together one clock tick at a time.

use tracing::info;

use crate::audio::SourceSelect;
use crate::config::AppConfig;
use crate::keys::{KeyEdgeSerializer, KeySampler};
use crate::meter::Meter;
use crate::record::{SimulationReport, ToggleRecord};
use crate::render::LedRing;
use crate::stream::ops::Tee;
use crate::stream::{fires, Stage};
use crate::timeline::{KeyScript, Scheduler};
use crate::ui::{Selection, SelectionController};
use crate::Result;

#[derive(Debug)]
pub struct AudioSelector {
    sources: SourceSelect,
    meter: Meter,
    sampler: KeySampler,
    tee: Tee<u32>,
    edges: KeyEdgeSerializer,
    ui: SelectionController,
    ring: LedRing,
    scheduler: Scheduler,
    now: u64,
    bar_packets: usize,
    toggles: Vec<ToggleRecord>,
}

impl AudioSelector {
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sources: SourceSelect::new(&config.audio)?,
            meter: Meter::new(&config.meter)?,
            sampler: KeySampler::new(config.ui.key_width, config.keys.debounce)?,
            tee: Tee::new(),
            edges: KeyEdgeSerializer::new(config.ui.key_width),
            ui: SelectionController::new(&config.ui)?,
            ring: LedRing::new(config.ui.leds),
            scheduler: Scheduler::new(),
            now: 0,
            bar_packets: 0,
            toggles: Vec::new(),
        })
    }

    /// Queues `script`, one snapshot every `hold` ticks from now.
    pub fn load_script(&mut self, script: &KeyScript, hold: u64) -> Result<()> {
        self.scheduler.set_events(script.schedule(self.now, hold)?);
        Ok(())
    }

    /// Tick at which the last scripted key change happens.
    pub fn script_end(&self) -> u64 {
        self.scheduler.end()
    }

    pub fn selection(&self) -> Selection {
        self.ui.selection()
    }

    pub fn ring(&self) -> &LedRing {
        &self.ring
    }

    pub fn toggles(&self) -> &[ToggleRecord] {
        &self.toggles
    }

    pub fn tick(&mut self) {
        if let Some(keys) = self.scheduler.tick(self.now) {
            self.sampler.set_raw(keys);
        }

        let sample = self.sources.output();
        let bars = self.meter.output();
        let snapshot = self.sampler.output();
        let fanned = self.tee.output();
        let toggle = self.edges.output();
        let shown = self.ui.output();

        let meter_ready = self.meter.ready();
        let tee_ready = self.tee.ready();
        let edges_ready = self.edges.ready();
        let keys_ready = self.ui.keys_ready();
        let leds_ready = self.ui.leds_ready();
        let ring_ready = self.ring.ready();
        let channel = self.ui.channel();

        // Both branches see the snapshot only on a tick they both take it.
        let fanned = fanned.filter(|_| keys_ready && edges_ready);

        self.sources.tick(channel, meter_ready);
        self.meter.tick(sample, leds_ready);
        self.sampler.tick(tee_ready);
        self.tee.tick(snapshot, keys_ready, edges_ready);
        self.edges.tick(fanned, true);
        self.ui.tick(fanned, bars, ring_ready);

        if let Some(toggle) = toggle {
            self.toggles.push(ToggleRecord::new(self.now, toggle.data));
        }
        if let (true, Some(frame)) = (fires(&bars, leds_ready), bars) {
            if frame.last {
                self.bar_packets += 1;
            }
        }
        if let (true, Some(frame)) = (fires(&shown, ring_ready), shown) {
            self.ring.accept(frame);
        }

        self.now += 1;
    }

    pub fn run(&mut self, ticks: u64) -> SimulationReport {
        info!(ticks, start = self.now, "simulation started");
        for _ in 0..ticks {
            self.tick();
        }
        let report = self.report();
        info!(
            channel = report.selection.channel,
            sweeps = report.sweeps,
            bar_packets = report.bar_packets,
            "simulation finished"
        );
        report
    }

    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            ticks: self.now,
            selection: self.ui.selection(),
            selected_source: self.sources.selected(),
            level: self.meter.level(),
            sweeps: self.ui.sweeps(),
            bar_packets: self.bar_packets,
            ring: self.ring.pixels().to_vec(),
            ring_packets: self.ring.packets(),
            overruns: self.sources.overruns(),
            toggles: self.toggles.clone(),
        }
    }
}
