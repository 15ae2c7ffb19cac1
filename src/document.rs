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
use std::path::Path;

use tracing::info;

use crate::buffer::TrackBuffer;
use crate::error::RenderError;
use crate::event::Event;
use crate::export;
use crate::mixer;
use crate::player::{SequencePlayer, UnderflowPolicy};
use crate::timing::{DEFAULT_REFERENCE_FREQUENCY, DEFAULT_SAMPLE_RATE, DEFAULT_TEMPO};
use crate::unit::{UnitId, UnitRack};

/// A composition session: an append-only list of track buffers plus the
/// tempo and reference frequency every render in the session uses.
///
/// Buffers are addressed by their position, which never changes.
#[derive(Debug, Clone)]
pub struct Document {
    buffers: Vec<TrackBuffer>,
    tempo: u32,
    reference_frequency: f32,
    sample_rate: u32,
    underflow: UnderflowPolicy,
}

impl Document {
    /// Creates an empty document at 80 beats per minute and 264Hz.
    pub fn new() -> Document {
        Document::with_sample_rate(DEFAULT_SAMPLE_RATE)
    }

    /// Creates an empty document whose new buffers use `sample_rate`.
    pub fn with_sample_rate(sample_rate: u32) -> Document {
        Document {
            buffers: Vec::new(),
            tempo: DEFAULT_TEMPO,
            reference_frequency: DEFAULT_REFERENCE_FREQUENCY,
            sample_rate,
            underflow: UnderflowPolicy::default(),
        }
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Sets the tempo used by later renders. A tempo of zero is rejected.
    pub fn set_tempo(&mut self, tempo: u32) -> Result<(), RenderError> {
        if tempo == 0 {
            return Err(RenderError::ZeroTempo);
        }
        self.tempo = tempo;
        Ok(())
    }

    pub fn reference_frequency(&self) -> f32 {
        self.reference_frequency
    }

    pub fn set_reference_frequency(&mut self, reference_frequency: f32) {
        self.reference_frequency = reference_frequency;
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn set_underflow(&mut self, underflow: UnderflowPolicy) {
        self.underflow = underflow;
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn get_buffer(&self, index: usize) -> Result<&TrackBuffer, RenderError> {
        self.buffers
            .get(index)
            .ok_or_else(|| invalid_buffer(index, self.buffers.len()))
    }

    /// Appends an empty buffer and returns its index.
    pub fn new_buf(&mut self) -> usize {
        self.buffers.push(TrackBuffer::with_sample_rate(self.sample_rate));
        self.buffers.len() - 1
    }

    pub fn set_track_volume(&mut self, index: usize, volume: f32) -> Result<(), RenderError> {
        self.buffer_mut(index)?.set_volume(volume);
        Ok(())
    }

    /// Plays a note sequence through an instrument into a new buffer (`None`)
    /// or onto the end of an existing one. Returns the buffer's index.
    pub fn play_note_seq(
        &mut self,
        rack: &mut UnitRack,
        instrument: UnitId,
        events: &[Event],
        buffer: Option<usize>,
    ) -> Result<usize, RenderError> {
        let player = self.player();
        let index = self.resolve(buffer)?;
        player.play(rack, instrument, events, &mut self.buffers[index])?;
        Ok(index)
    }

    /// Plays a beat sequence through a list of percussion units. Returns the
    /// buffer's index.
    pub fn play_beat_seq(
        &mut self,
        rack: &mut UnitRack,
        units: &[UnitId],
        events: &[Event],
        buffer: Option<usize>,
    ) -> Result<usize, RenderError> {
        let player = self.player();
        let index = self.resolve(buffer)?;
        player.play_beats(rack, units, events, &mut self.buffers[index])?;
        Ok(index)
    }

    /// Sings a sequence through a singer. Returns the buffer's index.
    pub fn sing(
        &mut self,
        rack: &mut UnitRack,
        singer: UnitId,
        events: &[Event],
        buffer: Option<usize>,
    ) -> Result<usize, RenderError> {
        let player = self.player();
        let index = self.resolve(buffer)?;
        player.sing(rack, singer, events, &mut self.buffers[index])?;
        Ok(index)
    }

    /// Writes a single buffer to a WAV file.
    pub fn track_to_wav(&self, index: usize, path: &Path) -> Result<(), RenderError> {
        export::write_wav(self.get_buffer(index)?, path)
    }

    /// Mixes every buffer of the document into `target`, which must be empty.
    pub fn mix(&self, target: &mut TrackBuffer) -> Result<(), RenderError> {
        let sources: Vec<&TrackBuffer> = self.buffers.iter().collect();
        mixer::mix_into(target, &sources)
    }

    /// Mixes every buffer into a scratch buffer and writes it to a WAV file.
    pub fn mix_down(&self, path: &Path) -> Result<(), RenderError> {
        let mut target = TrackBuffer::with_sample_rate(self.sample_rate);
        self.mix(&mut target)?;
        info!(
            path = ?path,
            tracks = self.buffers.len(),
            samples = target.len(),
            "Mixing down document"
        );
        export::write_wav(&target, path)
    }

    fn player(&self) -> SequencePlayer {
        SequencePlayer::new(self.tempo, self.reference_frequency).with_underflow(self.underflow)
    }

    fn resolve(&mut self, buffer: Option<usize>) -> Result<usize, RenderError> {
        match buffer {
            None => Ok(self.new_buf()),
            Some(index) if index < self.buffers.len() => Ok(index),
            Some(index) => Err(invalid_buffer(index, self.buffers.len())),
        }
    }

    fn buffer_mut(&mut self, index: usize) -> Result<&mut TrackBuffer, RenderError> {
        let count = self.buffers.len();
        self.buffers
            .get_mut(index)
            .ok_or_else(|| invalid_buffer(index, count))
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

fn invalid_buffer(index: usize, count: usize) -> RenderError {
    RenderError::InvalidHandle(format!(
        "buffer {} does not exist, the document holds {}",
        index, count
    ))
}
