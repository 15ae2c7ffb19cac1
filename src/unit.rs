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

//! Sound producing units: instruments, percussion and singers.
//!
//! Players drive units through the `SoundUnit` trait. A unit is asked for a
//! fixed number of samples at a physical pitch (or a glide between two
//! pitches), and is tuned with free-form command strings.

use std::f32::consts::TAU;
use std::fmt;

pub mod drum;
pub mod error;
pub mod hummer;
pub mod rack;
pub mod registry;
pub mod sampler;
pub mod sine;

pub use error::UnitError;
pub use rack::{UnitId, UnitRack};
pub use registry::{UnitClass, UnitOptions, UnitRegistry};

/// The three families of units. Each player only accepts one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    Instrument,
    Percussion,
    Singer,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Instrument => write!(f, "instrument"),
            UnitKind::Percussion => write!(f, "percussion"),
            UnitKind::Singer => write!(f, "singer"),
        }
    }
}

/// The physical pitch of a synthesis request, in Hz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pitch {
    Fixed(f32),
    Glide { start: f32, end: f32 },
    /// Percussion hits carry no pitch.
    Unpitched,
}

impl Pitch {
    /// The frequency at `progress` (0.0 to 1.0) through the span.
    pub fn frequency_at(&self, progress: f32) -> f32 {
        match self {
            Pitch::Fixed(frequency) => *frequency,
            Pitch::Glide { start, end } => start + (end - start) * progress.clamp(0.0, 1.0),
            Pitch::Unpitched => 0.0,
        }
    }
}

/// A request for one span of sound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthRequest<'a> {
    pub pitch: Pitch,
    pub num_samples: usize,
    pub sample_rate: u32,
    /// Present when a singer is asked to sing a single span.
    pub lyric: Option<&'a str>,
}

/// One pitched span of a sung syllable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SungSpan {
    pub pitch: Pitch,
    pub num_samples: usize,
}

/// A lyric with the pitch plan it is sung over. An empty lyric asks the
/// singer for its default lyric.
#[derive(Debug, Clone, PartialEq)]
pub struct SungSyllable {
    pub lyric: String,
    pub spans: Vec<SungSpan>,
    /// Rapped syllables are spoken over a glide rather than sung.
    pub rap: bool,
}

impl SungSyllable {
    pub fn num_samples(&self) -> usize {
        self.spans.iter().map(|span| span.num_samples).sum()
    }
}

/// A sound producing unit.
///
/// Units may return more samples than requested (a release tail, for
/// example); the extra samples are mixed into whatever follows.
pub trait SoundUnit: Send {
    /// The registry class this unit was created from.
    fn class_name(&self) -> &str;

    fn kind(&self) -> UnitKind;

    /// Applies a tuning command. Every unit understands `volume <float>`.
    /// Unknown commands yield `UnitError::UnsupportedCommand`.
    fn tune(&mut self, command: &str) -> Result<(), UnitError>;

    /// Renders a single span.
    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32>;

    /// Renders a run of syllables meant to be sung without gaps. The default
    /// renders every span on its own and lays them end to end.
    fn sing(&mut self, syllables: &[SungSyllable], sample_rate: u32) -> Vec<f32> {
        let total: usize = syllables.iter().map(SungSyllable::num_samples).sum();
        let mut output = vec![0.0; total];
        let mut offset = 0;
        for syllable in syllables {
            for span in syllable.spans.iter() {
                let rendered = self.synthesize(&SynthRequest {
                    pitch: span.pitch,
                    num_samples: span.num_samples,
                    sample_rate,
                    lyric: Some(syllable.lyric.as_str()),
                });
                mix_into(&mut output, offset, &rendered);
                offset += span.num_samples;
            }
        }
        output
    }
}

/// Splits a tuning command into its keyword and the (trimmed) remainder.
pub fn split_command(command: &str) -> (&str, &str) {
    let command = command.trim();
    match command.split_once(char::is_whitespace) {
        Some((keyword, argument)) => (keyword, argument.trim()),
        None => (command, ""),
    }
}

/// Handles the `volume <float>` command shared by every unit.
pub fn tune_volume(volume: &mut f32, command: &str) -> Result<(), UnitError> {
    match split_command(command) {
        ("volume", argument) => {
            *volume = argument
                .parse::<f32>()
                .map_err(|e| UnitError::InvalidArgument {
                    command: command.to_string(),
                    reason: e.to_string(),
                })?;
            Ok(())
        }
        _ => Err(UnitError::UnsupportedCommand(command.to_string())),
    }
}

/// Adds `samples` into `output` at `offset`, growing `output` as needed.
pub(crate) fn mix_into(output: &mut Vec<f32>, offset: usize, samples: &[f32]) {
    let end = offset + samples.len();
    if end > output.len() {
        output.resize(end, 0.0);
    }
    for (target, sample) in output[offset..end].iter_mut().zip(samples) {
        *target += sample;
    }
}

/// A phase accumulating oscillator. The phase is kept in cycles (0.0 to 1.0)
/// so that consecutive spans can continue the same waveform.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Oscillator {
    phase: f32,
}

impl Oscillator {
    /// Renders `num_samples` of `wave` following `pitch`, appending to `output`.
    pub(crate) fn render<F>(
        &mut self,
        output: &mut Vec<f32>,
        pitch: Pitch,
        num_samples: usize,
        sample_rate: u32,
        wave: F,
    ) where
        F: Fn(f32) -> f32,
    {
        let sample_rate = sample_rate as f32;
        output.reserve(num_samples);
        for i in 0..num_samples {
            let progress = i as f32 / num_samples as f32;
            output.push(wave(self.phase));
            self.phase = (self.phase + pitch.frequency_at(progress) / sample_rate).fract();
        }
    }
}

/// A plain sine over one cycle.
pub(crate) fn sine_wave(phase: f32) -> f32 {
    (phase * TAU).sin()
}

/// Applies linear fade-in and fade-out ramps to avoid clicks at span edges.
/// Ramps are shortened to fit spans shorter than their combined length.
pub(crate) fn apply_ramps(samples: &mut [f32], attack: usize, release: usize) {
    let len = samples.len();
    let attack = attack.min(len / 2);
    let release = release.min(len - attack);
    for (i, sample) in samples.iter_mut().take(attack).enumerate() {
        *sample *= i as f32 / attack as f32;
    }
    for (i, sample) in samples.iter_mut().rev().take(release).enumerate() {
        *sample *= i as f32 / release as f32;
    }
}

/// Converts milliseconds to a sample count.
pub(crate) fn ms_to_samples(ms: f32, sample_rate: u32) -> usize {
    (ms * sample_rate as f32 / 1000.0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("volume 0.5"), ("volume", "0.5"));
        assert_eq!(split_command("  default_lyric  la la "), ("default_lyric", "la la"));
        assert_eq!(split_command("reset"), ("reset", ""));
    }

    #[test]
    fn test_tune_volume() {
        let mut volume = 1.0;
        tune_volume(&mut volume, "volume 2.5").unwrap();
        assert_eq!(volume, 2.5);

        assert!(matches!(
            tune_volume(&mut volume, "volume loud"),
            Err(UnitError::InvalidArgument { .. })
        ));
        assert!(matches!(
            tune_volume(&mut volume, "vibrato 3"),
            Err(UnitError::UnsupportedCommand(_))
        ));
        assert_eq!(volume, 2.5);
    }

    #[test]
    fn test_glide_frequency() {
        let glide = Pitch::Glide {
            start: 100.0,
            end: 200.0,
        };
        assert_eq!(glide.frequency_at(0.0), 100.0);
        assert_eq!(glide.frequency_at(0.5), 150.0);
        assert_eq!(glide.frequency_at(2.0), 200.0);
        assert_eq!(Pitch::Fixed(440.0).frequency_at(0.3), 440.0);
    }

    #[test]
    fn test_ramps() {
        let mut samples = vec![1.0; 10];
        apply_ramps(&mut samples, 2, 2);
        assert_eq!(samples, vec![0.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 0.0]);

        let mut short = vec![1.0; 3];
        apply_ramps(&mut short, 10, 10);
        assert_eq!(short[0], 0.0);
        assert_eq!(short[2], 0.0);

        let mut empty: Vec<f32> = Vec::new();
        apply_ramps(&mut empty, 4, 4);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_oscillator_continues_phase() {
        let mut split = Oscillator::default();
        let mut output = Vec::new();
        split.render(&mut output, Pitch::Fixed(441.0), 50, 44100, sine_wave);
        split.render(&mut output, Pitch::Fixed(441.0), 50, 44100, sine_wave);

        let mut whole = Oscillator::default();
        let mut reference = Vec::new();
        whole.render(&mut reference, Pitch::Fixed(441.0), 100, 44100, sine_wave);

        for (a, b) in output.iter().zip(reference.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
