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

//! Volume weighted mixing of track buffers.
//!
//! All sources are aligned at sample zero. Output sample `i` is the sum of
//! `source[i] * source.volume` over every source long enough to have a
//! sample `i`. Muted sources (volume 0) are left out entirely, so they do not
//! lengthen the mix either.

use tracing::debug;

use crate::buffer::TrackBuffer;
use crate::error::RenderError;
use crate::timing::DEFAULT_SAMPLE_RATE;

/// Mixes `sources` into a fresh buffer with a volume of 1.0. The result has
/// the sources' sample rate, or the default sample rate when there are no
/// sources.
pub fn mix(sources: &[&TrackBuffer]) -> Result<TrackBuffer, RenderError> {
    let sample_rate = sample_rate(sources, None)?;
    Ok(TrackBuffer::from_samples(sum(sources), sample_rate))
}

/// Mixes `sources` into `target`, which must not hold any samples yet. The
/// target's own volume plays no part in the mix.
pub fn mix_into(target: &mut TrackBuffer, sources: &[&TrackBuffer]) -> Result<(), RenderError> {
    target.check()?;
    if !target.is_empty() {
        return Err(RenderError::MixTargetNotEmpty(target.len()));
    }
    sample_rate(sources, Some(target.sample_rate()))?;
    target.append(&sum(sources))
}

/// Checks that every source is live and that all share one sample rate.
fn sample_rate(sources: &[&TrackBuffer], expected: Option<u32>) -> Result<u32, RenderError> {
    let mut expected = expected;
    for source in sources {
        source.check()?;
        match expected {
            None => expected = Some(source.sample_rate()),
            Some(rate) if rate != source.sample_rate() => {
                return Err(RenderError::SampleRateMismatch {
                    expected: rate,
                    found: source.sample_rate(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(expected.unwrap_or(DEFAULT_SAMPLE_RATE))
}

fn sum(sources: &[&TrackBuffer]) -> Vec<f32> {
    let audible: Vec<&&TrackBuffer> = sources
        .iter()
        .filter(|source| source.volume() != 0.0)
        .collect();
    let len = audible.iter().map(|source| source.len()).max().unwrap_or(0);

    let mut output = vec![0.0f32; len];
    for source in audible {
        let volume = source.volume();
        for (target, sample) in output.iter_mut().zip(source.samples()) {
            *target += sample * volume;
        }
    }

    debug!(sources = sources.len(), samples = len, "Mixed buffers");
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::audio_test_utils::assert_close;

    fn buffer(samples: &[f32], volume: f32) -> TrackBuffer {
        let mut buffer = TrackBuffer::from_samples(samples.to_vec(), 44100);
        buffer.set_volume(volume);
        buffer
    }

    #[test]
    fn test_weighted_sum_with_padding() {
        let a = buffer(&[1.0, 1.0, 1.0], 0.5);
        let b = buffer(&[0.25], 2.0);
        let mixed = mix(&[&a, &b]).unwrap();
        assert_eq!(mixed.samples(), &[1.0, 0.5, 0.5]);
        assert_eq!(mixed.volume(), 1.0);
        assert_eq!(mixed.sample_rate(), 44100);
    }

    #[test]
    fn test_negative_volume_inverts() {
        let a = buffer(&[0.5, 0.25], 1.0);
        let b = buffer(&[0.5, 0.25], -1.0);
        assert_eq!(mix(&[&a, &b]).unwrap().samples(), &[0.0, 0.0]);
    }

    #[test]
    fn test_commutative_and_associative() {
        let a = buffer(&[0.1, 0.2, 0.3, 0.4], 0.7);
        let b = buffer(&[0.5, -0.5], 1.3);
        let c = buffer(&[0.9, 0.8, 0.7, 0.6, 0.5], -0.4);

        let abc = mix(&[&a, &b, &c]).unwrap();
        let cab = mix(&[&c, &a, &b]).unwrap();
        assert_close(abc.samples(), cab.samples(), 1e-6);

        // Mixing a partial mix (at unit volume) with the rest is the same.
        let ab = mix(&[&a, &b]).unwrap();
        let nested = mix(&[&ab, &c]).unwrap();
        assert_close(abc.samples(), nested.samples(), 1e-6);
    }

    #[test]
    fn test_muted_source_is_omitted() {
        let a = buffer(&[0.25, 0.5], 1.0);
        let muted = buffer(&[1.0, 1.0, 1.0, 1.0], 0.0);
        assert_eq!(
            mix(&[&a, &muted]).unwrap().samples(),
            mix(&[&a]).unwrap().samples()
        );
    }

    #[test]
    fn test_empty_mix() {
        let mixed = mix(&[]).unwrap();
        assert!(mixed.is_empty());
        assert_eq!(mixed.sample_rate(), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_mix_into() {
        let a = buffer(&[0.25, 0.5], 2.0);
        let mut target = buffer(&[], 0.1);
        mix_into(&mut target, &[&a]).unwrap();
        assert_eq!(target.samples(), &[0.5, 1.0]);
        assert_eq!(target.volume(), 0.1);

        assert!(matches!(
            mix_into(&mut target, &[&a]),
            Err(RenderError::MixTargetNotEmpty(2))
        ));
    }

    #[test]
    fn test_rejects_destroyed_and_mismatched_sources() {
        let a = buffer(&[0.25], 1.0);
        let mut gone = buffer(&[0.25], 1.0);
        gone.destroy();
        assert!(matches!(
            mix(&[&a, &gone]),
            Err(RenderError::InvalidHandle(_))
        ));

        let other = TrackBuffer::from_samples(vec![0.25], 48000);
        assert!(matches!(
            mix(&[&a, &other]),
            Err(RenderError::SampleRateMismatch {
                expected: 44100,
                found: 48000
            })
        ));

        let mut target = TrackBuffer::with_sample_rate(48000);
        assert!(matches!(
            mix_into(&mut target, &[&a]),
            Err(RenderError::SampleRateMismatch { .. })
        ));
    }
}
