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
use std::error::Error;
use std::path::Path;
use std::sync::{Arc, Mutex};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::unit::{tune_volume, Pitch, SoundUnit, SungSyllable, SynthRequest, UnitError, UnitKind};

/// Audio test utilities for validating rendered signals
pub mod audio_test_utils {
    /// Calculate RMS (Root Mean Square) of a signal
    pub fn calculate_rms(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }

        let sum_squares: f32 = samples.iter().map(|&x| x * x).sum();
        (sum_squares / samples.len() as f32).sqrt()
    }

    /// Asserts two signals are equal within `tolerance`, sample by sample.
    pub fn assert_close(actual: &[f32], expected: &[f32], tolerance: f32) {
        assert_eq!(actual.len(), expected.len(), "signal lengths differ");
        for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            assert!(
                (a - e).abs() <= tolerance,
                "sample {} differs: {} vs {}",
                i,
                a,
                e
            );
        }
    }
}

/// Shared record of everything a probe unit was asked to do.
pub type ProbeLog = Arc<Mutex<Vec<String>>>;

/// A deterministic unit for tests. Every sample it renders is the pitch in
/// kHz at that point (1.0 for unpitched hits) times its volume, and every
/// call is written to its log.
pub struct Probe {
    kind: UnitKind,
    volume: f32,
    log: ProbeLog,
}

impl Probe {
    pub fn new(kind: UnitKind) -> (Probe, ProbeLog) {
        let log = ProbeLog::default();
        (
            Probe {
                kind,
                volume: 1.0,
                log: log.clone(),
            },
            log,
        )
    }

    fn record(&self, entry: String) {
        self.log.lock().unwrap().push(entry);
    }

    fn render(&self, pitch: Pitch, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| match pitch {
                Pitch::Unpitched => self.volume,
                _ => pitch.frequency_at(i as f32 / num_samples as f32) / 1000.0 * self.volume,
            })
            .collect()
    }
}

impl SoundUnit for Probe {
    fn class_name(&self) -> &str {
        "probe"
    }

    fn kind(&self) -> UnitKind {
        self.kind
    }

    fn tune(&mut self, command: &str) -> Result<(), UnitError> {
        self.record(format!("tune {}", command));
        tune_volume(&mut self.volume, command)
    }

    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32> {
        self.record(format!("synth {}", request.num_samples));
        self.render(request.pitch, request.num_samples)
    }

    fn sing(&mut self, syllables: &[SungSyllable], _sample_rate: u32) -> Vec<f32> {
        let plan: Vec<String> = syllables
            .iter()
            .map(|syllable| format!("{}:{}", syllable.lyric, syllable.spans.len()))
            .collect();
        self.record(format!("sing {}", plan.join(",")));
        syllables
            .iter()
            .flat_map(|syllable| syllable.spans.iter())
            .flat_map(|span| self.render(span.pitch, span.num_samples))
            .collect()
    }
}

/// Writes a 16 bit (or other integer width) WAV file with one sample list per
/// channel, interleaving the channels.
pub fn write_wav(
    path: &Path,
    channels: &[Vec<i32>],
    sample_rate: u32,
    bits_per_sample: u16,
) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::create(
        path,
        WavSpec {
            channels: channels.len() as u16,
            sample_rate,
            bits_per_sample,
            sample_format: SampleFormat::Int,
        },
    )?;

    let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
    for frame in 0..frames {
        for channel in channels {
            writer.write_sample(channel.get(frame).copied().unwrap_or(0))?;
        }
    }
    writer.finalize()?;

    Ok(())
}
