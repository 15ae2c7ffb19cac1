// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, span, Level};

use super::error::ConfigError;
use super::track::{Performer, Track};
use super::unit::Unit;
use crate::document::Document;
use crate::event;
use crate::timing::{Timing, DEFAULT_REFERENCE_FREQUENCY, DEFAULT_SAMPLE_RATE, DEFAULT_TEMPO};
use crate::unit::{UnitId, UnitRack, UnitRegistry};

/// A score file: units, and tracks that play sequences through them.
#[derive(Deserialize, Clone, Debug)]
pub struct Score {
    /// Beats per minute.
    tempo: Option<u32>,
    /// The frequency all multipliers scale, in Hz.
    reference_frequency: Option<f32>,
    /// The sample rate of every buffer.
    sample_rate: Option<u32>,
    #[serde(default)]
    units: Vec<Unit>,
    #[serde(default)]
    tracks: Vec<Track>,
    /// Where relative sample files are resolved from.
    #[serde(skip)]
    base_dir: PathBuf,
}

/// How long one track plays.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackDuration {
    pub track: String,
    /// Net cursor movement in ticks.
    pub ticks: i64,
    pub duration: Duration,
}

impl Score {
    pub fn tempo(&self) -> u32 {
        self.tempo.unwrap_or(DEFAULT_TEMPO)
    }

    pub fn reference_frequency(&self) -> f32 {
        self.reference_frequency
            .unwrap_or(DEFAULT_REFERENCE_FREQUENCY)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Rejects score-wide settings no render could use.
    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.tempo() == 0 {
            return Err(ConfigError::InvalidScore(
                "tempo must be at least 1 beat per minute".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) fn set_base_dir(&mut self, base_dir: PathBuf) {
        self.base_dir = base_dir;
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Builds every unit and renders every track, in order, into a new document.
    pub fn render(&self, registry: &UnitRegistry) -> Result<Document, ConfigError> {
        let span = span!(Level::INFO, "render score");
        let _enter = span.enter();

        let mut rack = UnitRack::new();
        let mut units: HashMap<&str, UnitId> = HashMap::new();
        for unit in self.units.iter() {
            if units.contains_key(unit.name()) {
                return Err(ConfigError::DuplicateUnit(unit.name().to_string()));
            }
            let id = rack.insert(unit.to_unit(registry, &self.base_dir)?);
            info!(unit = unit.name(), class = unit.class(), "Created unit");
            units.insert(unit.name(), id);
        }

        let mut document = Document::with_sample_rate(self.sample_rate());
        document
            .set_tempo(self.tempo())
            .map_err(|e| ConfigError::InvalidScore(e.to_string()))?;
        document.set_reference_frequency(self.reference_frequency());

        for (index, track) in self.tracks.iter().enumerate() {
            let label = track.label(index);
            let events = track.events(&label)?;
            let lookup = |name: &str| {
                units
                    .get(name)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownUnit {
                        track: label.clone(),
                        unit: name.to_string(),
                    })
            };
            let failed = |source| ConfigError::Render {
                track: label.clone(),
                source,
            };

            let rendered = match track.performer(&label)? {
                Performer::Instrument(name) => {
                    document.play_note_seq(&mut rack, lookup(name)?, &events, track.buffer())
                }
                Performer::Percussion(names) => {
                    let ids = names
                        .iter()
                        .map(|name| lookup(name))
                        .collect::<Result<Vec<UnitId>, ConfigError>>()?;
                    document.play_beat_seq(&mut rack, &ids, &events, track.buffer())
                }
                Performer::Singer(name) => {
                    document.sing(&mut rack, lookup(name)?, &events, track.buffer())
                }
            };
            let buffer = rendered.map_err(failed)?;
            if let Some(volume) = track.volume() {
                document.set_track_volume(buffer, volume).map_err(failed)?;
            }
            info!(track = %label, buffer, events = events.len(), "Rendered track");
        }

        Ok(document)
    }

    /// The duration of every track, without rendering anything.
    pub fn durations(&self) -> Result<Vec<TrackDuration>, ConfigError> {
        let timing = Timing::new(self.tempo(), self.reference_frequency(), self.sample_rate());
        self.tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                let label = track.label(index);
                let events = track.events(&label)?;
                let ticks = event::duration(&events).map_err(|source| ConfigError::Event {
                    track: label.clone(),
                    source,
                })?;
                Ok(TrackDuration {
                    track: label,
                    ticks,
                    duration: timing.ticks_to_duration(ticks),
                })
            })
            .collect()
    }
}
