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
use serde::Deserialize;
use serde_yml::Value;

use super::error::ConfigError;
use crate::event::{parse_sequence, Event, SequenceKind};

/// A YAML representation of a track: one sequence rendered through one unit
/// (or a list of percussion units) into a document buffer.
#[derive(Deserialize, Clone, Debug)]
pub(super) struct Track {
    /// An optional label used in logs and errors.
    name: Option<String>,
    /// The instrument that plays the sequence.
    play: Option<String>,
    /// The percussion units that play the sequence.
    beats: Option<Vec<String>>,
    /// The singer that sings the sequence.
    sing: Option<String>,
    /// An existing buffer to append to. A new buffer is used when absent.
    buffer: Option<usize>,
    /// The mixing weight of the buffer.
    volume: Option<f32>,
    /// The raw event list.
    #[serde(default)]
    sequence: Vec<Value>,
}

/// Who renders a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Performer<'a> {
    Instrument(&'a str),
    Percussion(&'a [String]),
    Singer(&'a str),
}

impl Track {
    /// The track's name, or its position when it has none.
    pub(super) fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("track {}", index),
        }
    }

    pub(super) fn buffer(&self) -> Option<usize> {
        self.buffer
    }

    pub(super) fn volume(&self) -> Option<f32> {
        self.volume
    }

    /// Exactly one of `play`, `beats` and `sing` must be given.
    pub(super) fn performer(&self, label: &str) -> Result<Performer<'_>, ConfigError> {
        match (&self.play, &self.beats, &self.sing) {
            (Some(unit), None, None) => Ok(Performer::Instrument(unit)),
            (None, Some(units), None) => Ok(Performer::Percussion(units)),
            (None, None, Some(unit)) => Ok(Performer::Singer(unit)),
            _ => Err(ConfigError::InvalidTrack {
                track: label.to_string(),
                reason: "a track needs exactly one of play, beats or sing".to_string(),
            }),
        }
    }

    /// Classifies the raw sequence for the track's performer.
    pub(super) fn events(&self, label: &str) -> Result<Vec<Event>, ConfigError> {
        let kind = match self.performer(label)? {
            Performer::Instrument(_) => SequenceKind::Notes,
            Performer::Percussion(_) => SequenceKind::Beats,
            Performer::Singer(_) => SequenceKind::Singing,
        };
        parse_sequence(&self.sequence, kind).map_err(|source| ConfigError::Event {
            track: label.to_string(),
            source,
        })
    }
}
