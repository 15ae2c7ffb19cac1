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

//! Synthesized percussion.

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{tune_volume, SoundUnit, SynthRequest, UnitError, UnitKind};

const KICK_START_HZ: f32 = 150.0;
const KICK_END_HZ: f32 = 45.0;
/// Time constant of the kick's pitch sweep, in seconds.
const KICK_SWEEP: f32 = 0.04;
/// Time constant of the kick's amplitude decay, in seconds.
const KICK_DECAY: f32 = 0.25;

/// Time constant of the noise burst's amplitude decay, in seconds.
const NOISE_DECAY: f32 = 0.08;

/// A kick drum: a sine swept down in pitch under an exponential decay.
#[derive(Debug, Clone)]
pub struct Kick {
    volume: f32,
}

impl Kick {
    pub fn new() -> Kick {
        Kick { volume: 1.0 }
    }
}

impl Default for Kick {
    fn default() -> Self {
        Kick::new()
    }
}

impl SoundUnit for Kick {
    fn class_name(&self) -> &str {
        "kick"
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Percussion
    }

    fn tune(&mut self, command: &str) -> Result<(), UnitError> {
        tune_volume(&mut self.volume, command)
    }

    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32> {
        let sample_rate = request.sample_rate as f32;
        let mut phase = 0.0f32;
        (0..request.num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate;
                let frequency =
                    KICK_END_HZ + (KICK_START_HZ - KICK_END_HZ) * (-t / KICK_SWEEP).exp();
                let sample = (phase * TAU).sin() * (-t / KICK_DECAY).exp() * self.volume;
                phase = (phase + frequency / sample_rate).fract();
                sample
            })
            .collect()
    }
}

/// A burst of decaying white noise. Every hit replays the same noise, so
/// renders are reproducible.
#[derive(Debug, Clone)]
pub struct Noise {
    seed: u64,
    volume: f32,
}

impl Noise {
    pub fn new(seed: u64) -> Noise {
        Noise { seed, volume: 1.0 }
    }
}

impl SoundUnit for Noise {
    fn class_name(&self) -> &str {
        "noise"
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Percussion
    }

    fn tune(&mut self, command: &str) -> Result<(), UnitError> {
        tune_volume(&mut self.volume, command)
    }

    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32> {
        let sample_rate = request.sample_rate as f32;
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..request.num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate;
                rng.gen_range(-1.0f32..1.0) * (-t / NOISE_DECAY).exp() * self.volume
            })
            .collect()
    }
}
