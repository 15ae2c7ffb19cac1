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

//! Track buffers: growable mono sample stores with a mixing weight.

use crate::error::RenderError;
use crate::timing::DEFAULT_SAMPLE_RATE;

/// A growable store of mono samples plus a volume used as a weight when mixing.
///
/// The volume never touches the stored samples. Content is only ever added by
/// appending or by overdubbing (adding into existing samples); a buffer never
/// shrinks until it is destroyed.
#[derive(Debug, Clone)]
pub struct TrackBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    volume: f32,
    /// Fractional position where the last render left its cursor. The next
    /// render resumes here, even when that is short of the end.
    cursor: f64,
    destroyed: bool,
}

impl TrackBuffer {
    /// Creates an empty buffer at the default sample rate with a volume of 1.0.
    pub fn new() -> TrackBuffer {
        TrackBuffer::with_sample_rate(DEFAULT_SAMPLE_RATE)
    }

    /// Creates an empty buffer at the given sample rate with a volume of 1.0.
    pub fn with_sample_rate(sample_rate: u32) -> TrackBuffer {
        TrackBuffer {
            samples: Vec::new(),
            sample_rate,
            volume: 1.0,
            cursor: 0.0,
            destroyed: false,
        }
    }

    /// Creates a buffer holding the given samples.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> TrackBuffer {
        let cursor = samples.len() as f64;
        TrackBuffer {
            samples,
            sample_rate,
            volume: 1.0,
            cursor,
            destroyed: false,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Replaces the mixing weight. Zero mutes, negative values invert phase.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The fractional sample position where the next render starts.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .fold(0.0f32, |peak, sample| peak.max(sample.abs()))
    }

    /// The volume relative to the peak, so that the loudest sample maps to
    /// `volume`. Silent buffers report their plain volume.
    pub fn absolute_volume(&self) -> f32 {
        let peak = self.peak();
        if peak > 0.0 {
            self.volume / peak
        } else {
            self.volume
        }
    }

    /// Appends samples at the current end of the buffer and moves the cursor
    /// to the new end.
    pub fn append(&mut self, samples: &[f32]) -> Result<(), RenderError> {
        self.check()?;
        self.samples.extend_from_slice(samples);
        self.cursor = self.samples.len() as f64;
        Ok(())
    }

    /// Adds samples into the buffer starting at `offset`, growing the buffer
    /// with silence where the write goes past the current end.
    pub fn overdub(&mut self, offset: usize, samples: &[f32]) -> Result<(), RenderError> {
        self.check()?;
        let end = offset + samples.len();
        if end > self.samples.len() {
            self.samples.resize(end, 0.0);
        }
        for (target, sample) in self.samples[offset..end].iter_mut().zip(samples) {
            *target += sample;
        }
        Ok(())
    }

    /// Moves the cursor to `position`, forwards or backwards, padding the
    /// buffer with silence up to it.
    pub(crate) fn set_cursor(&mut self, position: f64) -> Result<(), RenderError> {
        self.check()?;
        self.cursor = position.max(0.0);
        let len = position.round().max(0.0) as usize;
        if len > self.samples.len() {
            self.samples.resize(len, 0.0);
        }
        Ok(())
    }

    /// Releases the sample storage. The buffer is unusable afterwards; calling
    /// this again does nothing.
    pub fn destroy(&mut self) {
        if !self.destroyed {
            self.samples = Vec::new();
            self.cursor = 0.0;
            self.destroyed = true;
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Fails with `InvalidHandle` once the buffer has been destroyed.
    pub fn check(&self) -> Result<(), RenderError> {
        if self.destroyed {
            Err(RenderError::InvalidHandle(
                "track buffer has been destroyed".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl Default for TrackBuffer {
    fn default() -> Self {
        TrackBuffer::new()
    }
}
