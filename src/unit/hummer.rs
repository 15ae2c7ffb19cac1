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

//! A simple singer that hums lyrics with a vowel dependent timbre.

use std::f32::consts::TAU;

use super::{
    apply_ramps, ms_to_samples, split_command, tune_volume, Oscillator, Pitch, SoundUnit,
    SungSyllable, SynthRequest, UnitError, UnitKind,
};

const ATTACK_MS: f32 = 15.0;
const RELEASE_MS: f32 = 30.0;

/// The lyric sung when a syllable's lyric is empty, until tuned otherwise.
pub const DEFAULT_LYRIC: &str = "la";

/// Relative strengths of the first four harmonics per vowel.
fn harmonics(lyric: &str) -> [f32; 4] {
    let vowel = lyric
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .find(|c| "aeiou".contains(*c));
    match vowel {
        Some('a') => [0.5, 0.3, 0.15, 0.05],
        Some('e') => [0.55, 0.15, 0.2, 0.1],
        Some('i') => [0.6, 0.05, 0.1, 0.25],
        Some('o') => [0.7, 0.25, 0.05, 0.0],
        Some('u') => [0.85, 0.15, 0.0, 0.0],
        _ => [1.0, 0.0, 0.0, 0.0],
    }
}

/// Rapped syllables are spoken: the upper harmonics are brighter.
const RAP_HARMONICS: [f32; 4] = [0.4, 0.3, 0.2, 0.1];

fn voice(weights: [f32; 4]) -> impl Fn(f32) -> f32 {
    move |phase| {
        weights
            .iter()
            .enumerate()
            .map(|(i, weight)| weight * (phase * TAU * (i + 1) as f32).sin())
            .sum()
    }
}

/// A humming singer. A run of syllables is sung on one continuous waveform,
/// so only the run's edges are faded.
#[derive(Debug, Clone)]
pub struct Hummer {
    default_lyric: String,
    volume: f32,
}

impl Hummer {
    pub fn new() -> Hummer {
        Hummer {
            default_lyric: DEFAULT_LYRIC.to_string(),
            volume: 1.0,
        }
    }

    pub fn default_lyric(&self) -> &str {
        &self.default_lyric
    }

    fn lyric<'a>(&'a self, lyric: &'a str) -> &'a str {
        if lyric.is_empty() {
            &self.default_lyric
        } else {
            lyric
        }
    }

    fn finish(&self, samples: &mut [f32], sample_rate: u32) {
        apply_ramps(
            samples,
            ms_to_samples(ATTACK_MS, sample_rate),
            ms_to_samples(RELEASE_MS, sample_rate),
        );
        let volume = self.volume;
        samples.iter_mut().for_each(|sample| *sample *= volume);
    }
}

impl Default for Hummer {
    fn default() -> Self {
        Hummer::new()
    }
}

impl SoundUnit for Hummer {
    fn class_name(&self) -> &str {
        "hummer"
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Singer
    }

    fn tune(&mut self, command: &str) -> Result<(), UnitError> {
        match split_command(command) {
            ("default_lyric", "") => Err(UnitError::InvalidArgument {
                command: command.to_string(),
                reason: "a default lyric must not be empty".to_string(),
            }),
            ("default_lyric", lyric) => {
                self.default_lyric = lyric.to_string();
                Ok(())
            }
            _ => tune_volume(&mut self.volume, command),
        }
    }

    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32> {
        let weights = match request.pitch {
            Pitch::Glide { .. } => RAP_HARMONICS,
            _ => harmonics(self.lyric(request.lyric.unwrap_or(""))),
        };
        let mut samples = Vec::with_capacity(request.num_samples);
        Oscillator::default().render(
            &mut samples,
            request.pitch,
            request.num_samples,
            request.sample_rate,
            voice(weights),
        );
        self.finish(&mut samples, request.sample_rate);
        samples
    }

    fn sing(&mut self, syllables: &[SungSyllable], sample_rate: u32) -> Vec<f32> {
        let total: usize = syllables.iter().map(SungSyllable::num_samples).sum();
        let mut samples = Vec::with_capacity(total);
        let mut oscillator = Oscillator::default();
        for syllable in syllables {
            let weights = if syllable.rap {
                RAP_HARMONICS
            } else {
                harmonics(self.lyric(&syllable.lyric))
            };
            for span in syllable.spans.iter() {
                oscillator.render(
                    &mut samples,
                    span.pitch,
                    span.num_samples,
                    sample_rate,
                    voice(weights),
                );
            }
        }
        self.finish(&mut samples, sample_rate);
        samples
    }
}
