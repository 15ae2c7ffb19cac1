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
use super::{
    apply_ramps, ms_to_samples, sine_wave, tune_volume, Oscillator, SoundUnit, SynthRequest,
    UnitError, UnitKind,
};

/// Attack ramp length in milliseconds.
const ATTACK_MS: f32 = 5.0;

/// Release ramp length in milliseconds.
const RELEASE_MS: f32 = 20.0;

/// A plain sine tone instrument.
#[derive(Debug, Clone)]
pub struct Sine {
    volume: f32,
}

impl Sine {
    pub fn new() -> Sine {
        Sine { volume: 1.0 }
    }
}

impl Default for Sine {
    fn default() -> Self {
        Sine::new()
    }
}

impl SoundUnit for Sine {
    fn class_name(&self) -> &str {
        "sine"
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Instrument
    }

    fn tune(&mut self, command: &str) -> Result<(), UnitError> {
        tune_volume(&mut self.volume, command)
    }

    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32> {
        // Every note starts from phase zero.
        let mut oscillator = Oscillator::default();
        let mut samples = Vec::with_capacity(request.num_samples);
        oscillator.render(
            &mut samples,
            request.pitch,
            request.num_samples,
            request.sample_rate,
            sine_wave,
        );
        apply_ramps(
            &mut samples,
            ms_to_samples(ATTACK_MS, request.sample_rate),
            ms_to_samples(RELEASE_MS, request.sample_rate),
        );
        let volume = self.volume;
        samples.iter_mut().for_each(|sample| *sample *= volume);
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::audio_test_utils::calculate_rms;
    use crate::unit::Pitch;

    fn request(pitch: Pitch, num_samples: usize) -> SynthRequest<'static> {
        SynthRequest {
            pitch,
            num_samples,
            sample_rate: 44100,
            lyric: None,
        }
    }

    #[test]
    fn test_exact_length() {
        let mut sine = Sine::new();
        assert_eq!(sine.synthesize(&request(Pitch::Fixed(264.0), 33075)).len(), 33075);
        assert!(sine.synthesize(&request(Pitch::Fixed(264.0), 0)).is_empty());
    }

    #[test]
    fn test_tone_level() {
        let mut sine = Sine::new();
        let samples = sine.synthesize(&request(Pitch::Fixed(441.0), 44100));
        // A full scale sine has an RMS of 1/sqrt(2); the ramps barely move it.
        let rms = calculate_rms(&samples);
        assert!((rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01, "rms {}", rms);
        assert_eq!(samples[0], 0.0);
        assert_eq!(*samples.last().unwrap(), 0.0);
    }

    #[test]
    fn test_volume() {
        let mut sine = Sine::new();
        let loud = sine.synthesize(&request(Pitch::Fixed(441.0), 4410));
        sine.tune("volume 0.5").unwrap();
        let quiet = sine.synthesize(&request(Pitch::Fixed(441.0), 4410));
        for (l, q) in loud.iter().zip(quiet.iter()) {
            assert!((l * 0.5 - q).abs() < 1e-6);
        }
    }

    #[test]
    fn test_glide_is_deterministic() {
        let mut sine = Sine::new();
        let glide = Pitch::Glide {
            start: 264.0,
            end: 132.0,
        };
        let first = sine.synthesize(&request(glide, 2000));
        let second = sine.synthesize(&request(glide, 2000));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unsupported_command() {
        let mut sine = Sine::new();
        assert!(matches!(
            sine.tune("default_lyric la"),
            Err(UnitError::UnsupportedCommand(_))
        ));
    }
}
