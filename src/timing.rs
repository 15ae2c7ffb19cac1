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

//! Conversions between sequence ticks, tempo and PCM sample positions.
//!
//! Sequence durations are written in ticks, 48 to the beat. A render call fixes
//! a tempo, a reference frequency and an output sample rate for its whole
//! duration; `Timing` carries those three values.

use std::time::Duration;

use tracing::warn;

/// Number of ticks in one beat.
pub const TICKS_PER_BEAT: i64 = 48;

/// Default tempo in beats per minute.
pub const DEFAULT_TEMPO: u32 = 80;

/// Default reference frequency in Hz.
pub const DEFAULT_REFERENCE_FREQUENCY: f32 = 264.0;

/// Default output sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// The fixed tempo/frequency/sample rate context of a render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    tempo: u32,
    reference_frequency: f32,
    sample_rate: u32,
}

impl Timing {
    /// Creates a new timing context. A tempo of zero is treated as one beat per
    /// minute; `Document` and score loading reject it before it gets here.
    pub fn new(tempo: u32, reference_frequency: f32, sample_rate: u32) -> Timing {
        if tempo == 0 {
            warn!("Tempo of 0 beats per minute, rendering at 1 instead");
        }
        Timing {
            tempo: tempo.max(1),
            reference_frequency,
            sample_rate,
        }
    }

    /// The tempo in beats per minute.
    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// The reference frequency in Hz.
    pub fn reference_frequency(&self) -> f32 {
        self.reference_frequency
    }

    /// The output sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of (fractional) samples covered by one tick.
    pub fn samples_per_tick(&self) -> f64 {
        60.0 * f64::from(self.sample_rate) / (f64::from(self.tempo) * TICKS_PER_BEAT as f64)
    }

    /// Converts a tick count into a fractional sample count.
    pub fn ticks_to_samples(&self, ticks: i64) -> f64 {
        ticks as f64 * self.samples_per_tick()
    }

    /// Converts a tick count into wall clock time.
    pub fn ticks_to_duration(&self, ticks: i64) -> Duration {
        let seconds = ticks.max(0) as f64 * 60.0 / (f64::from(self.tempo) * TICKS_PER_BEAT as f64);
        Duration::from_secs_f64(seconds)
    }

    /// The physical frequency of a relative frequency multiplier.
    pub fn frequency(&self, multiplier: f32) -> f32 {
        multiplier * self.reference_frequency
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::new(
            DEFAULT_TEMPO,
            DEFAULT_REFERENCE_FREQUENCY,
            DEFAULT_SAMPLE_RATE,
        )
    }
}

/// A fractional render position, measured in samples.
///
/// Spans are placed on rounded positions so that consecutive spans tile the
/// buffer without gaps or overlaps regardless of how ticks divide into samples.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Cursor(f64);

impl Cursor {
    /// Creates a cursor at the given fractional sample position.
    pub fn new(position: f64) -> Cursor {
        Cursor(position.max(0.0))
    }

    /// The fractional position.
    pub fn position(&self) -> f64 {
        self.0
    }

    /// The sample index the cursor currently points at.
    pub fn sample_index(&self) -> usize {
        self.0.round() as usize
    }

    /// Number of whole samples a span of `samples` starting here occupies.
    pub fn span_len(&self, samples: f64) -> usize {
        let end = (self.0 + samples).round();
        (end - self.0.round()).max(0.0) as usize
    }

    /// Moves the cursor forward.
    pub fn advance(&mut self, samples: f64) {
        self.0 += samples;
    }

    /// Moves the cursor backward. Returns false if the move would have gone
    /// before the start of the buffer, in which case the cursor is left at zero.
    pub fn rewind(&mut self, samples: f64) -> bool {
        let target = self.0 - samples;
        // Tolerate float noise from long chains of fractional advances.
        if target < -1e-6 {
            self.0 = 0.0;
            false
        } else {
            self.0 = target.max(0.0);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_beat_at_80_bpm() {
        let timing = Timing::new(80, 264.0, 44100);
        assert_eq!(timing.ticks_to_samples(48), 33075.0);
        assert_eq!(timing.ticks_to_duration(48), Duration::from_millis(750));
    }

    #[test]
    fn test_frequency() {
        let timing = Timing::new(120, 440.0, 48000);
        assert_eq!(timing.frequency(1.0), 440.0);
        assert_eq!(timing.frequency(0.5), 220.0);
    }

    #[test]
    fn test_zero_tempo_is_clamped() {
        let timing = Timing::new(0, 264.0, 44100);
        assert_eq!(timing.tempo(), 1);
        assert!(timing.samples_per_tick().is_finite());
    }

    #[test]
    fn test_spans_tile_without_gaps() {
        // 7 samples per 3 ticks does not divide evenly.
        let mut cursor = Cursor::new(0.0);
        let span = 7.0 / 3.0;
        let mut total = 0;
        for _ in 0..30 {
            assert_eq!(cursor.sample_index(), total);
            total += cursor.span_len(span);
            cursor.advance(span);
        }
        assert_eq!(total, 70);
    }

    #[test]
    fn test_rewind_clamps() {
        let mut cursor = Cursor::new(10.0);
        assert!(cursor.rewind(4.0));
        assert_eq!(cursor.position(), 6.0);
        assert!(!cursor.rewind(20.0));
        assert_eq!(cursor.position(), 0.0);
    }
}
