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

//! Units backed by recorded WAV samples.
//!
//! Samples are loaded entirely into memory and mixed down to mono. Playback
//! re-pitches by resampling with linear interpolation, so a sample recorded at
//! its origin frequency plays faster and shorter for higher notes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hound::WavReader;
use tracing::info;

use super::registry::UnitOptions;
use super::{
    apply_ramps, ms_to_samples, tune_volume, Pitch, SoundUnit, SynthRequest, UnitError, UnitKind,
};

/// Release ramp applied when a note cuts a sample short, in milliseconds.
const RELEASE_MS: f32 = 10.0;

/// Mono sample data shared between units loaded from the same file.
#[derive(Debug, Clone)]
pub struct SampleData {
    data: Arc<Vec<f32>>,
    sample_rate: u32,
}

impl SampleData {
    /// Wraps mono samples recorded at `sample_rate`.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> SampleData {
        SampleData {
            data: Arc::new(samples),
            sample_rate,
        }
    }

    /// Reads a WAV file, averaging all channels down to mono.
    pub fn load(path: &Path) -> Result<SampleData, UnitError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                // Use i64 so 32 bit samples do not overflow the shift.
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|sample| sample as f32 * scale))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        if interleaved.is_empty() {
            return Err(UnitError::EmptySample(path.to_path_buf()));
        }

        let mono: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        info!(
            path = ?path,
            channels,
            sample_rate = spec.sample_rate,
            frames = mono.len(),
            "Sample loaded"
        );

        Ok(SampleData::new(mono, spec.sample_rate))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The sample at a fractional frame position, linearly interpolated.
    /// Positions past the end are silent.
    fn at(&self, position: f64) -> f32 {
        if position < 0.0 {
            return 0.0;
        }
        let index = position.floor() as usize;
        let fraction = (position - position.floor()) as f32;
        match (self.data.get(index), self.data.get(index + 1)) {
            (Some(a), Some(b)) => a + (b - a) * fraction,
            (Some(a), None) => a * (1.0 - fraction),
            _ => 0.0,
        }
    }

    /// Plays the sample at a varying speed. `ratio(progress)` is the number of
    /// source frames to advance per output sample at the given progress.
    fn play<F>(&self, num_samples: usize, ratio: F) -> Vec<f32>
    where
        F: Fn(f32) -> f64,
    {
        let mut position = 0.0f64;
        (0..num_samples)
            .map(|i| {
                let sample = self.at(position);
                position += ratio(i as f32 / num_samples as f32);
                sample
            })
            .collect()
    }
}

fn required_file(class: &str, options: &UnitOptions) -> Result<PathBuf, UnitError> {
    options.file.clone().ok_or_else(|| UnitError::MissingOption {
        class: class.to_string(),
        option: "file",
    })
}

/// A pitched instrument playing a recorded note.
#[derive(Debug, Clone)]
pub struct Sampler {
    sample: SampleData,
    origin_frequency: f32,
    volume: f32,
}

impl Sampler {
    /// Creates a sampler from a sample recorded at `origin_frequency` Hz.
    pub fn new(sample: SampleData, origin_frequency: f32) -> Sampler {
        Sampler {
            sample,
            origin_frequency,
            volume: 1.0,
        }
    }

    /// Loads the sample named by the `file` option. `origin_frequency` is required.
    pub fn from_options(options: &UnitOptions) -> Result<Sampler, UnitError> {
        let file = required_file("sampler", options)?;
        let origin_frequency = options
            .origin_frequency
            .ok_or_else(|| UnitError::MissingOption {
                class: "sampler".to_string(),
                option: "origin_frequency",
            })?;
        Ok(Sampler::new(SampleData::load(&file)?, origin_frequency))
    }
}

impl SoundUnit for Sampler {
    fn class_name(&self) -> &str {
        "sampler"
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Instrument
    }

    fn tune(&mut self, command: &str) -> Result<(), UnitError> {
        tune_volume(&mut self.volume, command)
    }

    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32> {
        let rate = f64::from(self.sample.sample_rate) / f64::from(request.sample_rate);
        let origin = f64::from(self.origin_frequency);
        let pitch = request.pitch;
        let mut samples = self.sample.play(request.num_samples, |progress| match pitch {
            Pitch::Unpitched => rate,
            _ if origin <= 0.0 => rate,
            _ => f64::from(pitch.frequency_at(progress)) / origin * rate,
        });
        apply_ramps(
            &mut samples,
            0,
            ms_to_samples(RELEASE_MS, request.sample_rate),
        );
        let volume = self.volume;
        samples.iter_mut().for_each(|sample| *sample *= volume);
        samples
    }
}

/// An unpitched percussion hit playing a recorded sample to its end, even
/// when that rings past the hit's duration.
#[derive(Debug, Clone)]
pub struct OneShot {
    sample: SampleData,
    volume: f32,
}

impl OneShot {
    pub fn new(sample: SampleData) -> OneShot {
        OneShot {
            sample,
            volume: 1.0,
        }
    }

    /// Loads the sample named by the `file` option.
    pub fn from_options(options: &UnitOptions) -> Result<OneShot, UnitError> {
        let file = required_file("oneshot", options)?;
        Ok(OneShot::new(SampleData::load(&file)?))
    }
}

impl SoundUnit for OneShot {
    fn class_name(&self) -> &str {
        "oneshot"
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Percussion
    }

    fn tune(&mut self, command: &str) -> Result<(), UnitError> {
        tune_volume(&mut self.volume, command)
    }

    fn synthesize(&mut self, request: &SynthRequest<'_>) -> Vec<f32> {
        let rate = f64::from(self.sample.sample_rate) / f64::from(request.sample_rate);
        let natural = (self.sample.len() as f64 / rate).ceil() as usize;
        let volume = self.volume;
        self.sample
            .play(natural.max(request.num_samples), |_| rate)
            .into_iter()
            .map(|sample| sample * volume)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_wav;

    fn request(pitch: Pitch, num_samples: usize) -> SynthRequest<'static> {
        SynthRequest {
            pitch,
            num_samples,
            sample_rate: 100,
            lyric: None,
        }
    }

    #[test]
    fn test_load_int_and_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, &[vec![16384, 0, -16384], vec![0, 0, -16384]], 22050, 16).unwrap();

        let sample = SampleData::load(&path).unwrap();
        assert_eq!(sample.sample_rate(), 22050);
        assert_eq!(sample.data.as_slice(), &[0.25, 0.0, -0.5]);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SampleData::load(Path::new("/nonexistent/sample.wav")),
            Err(UnitError::Wav(_))
        ));
    }

    #[test]
    fn test_load_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_wav(&path, &[vec![]], 44100, 16).unwrap();
        assert!(matches!(
            SampleData::load(&path),
            Err(UnitError::EmptySample(_))
        ));
    }

    #[test]
    fn test_origin_pitch_plays_unchanged() {
        let ramp: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        let mut sampler = Sampler::new(SampleData::new(ramp.clone(), 100), 200.0);
        // The release ramp is 1 sample long at 100Hz, and only touches the last sample.
        let samples = sampler.synthesize(&request(Pitch::Fixed(200.0), 8));
        assert_eq!(&samples[..7], &ramp[..7]);
    }

    #[test]
    fn test_octave_up_skips_frames() {
        let ramp: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let mut sampler = Sampler::new(SampleData::new(ramp, 100), 200.0);
        let samples = sampler.synthesize(&request(Pitch::Fixed(400.0), 6));
        assert_eq!(&samples[..5], &[0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_interpolates_between_frames() {
        let mut sampler = Sampler::new(SampleData::new(vec![0.0, 1.0, 0.0], 100), 100.0);
        let samples = sampler.synthesize(&request(Pitch::Fixed(50.0), 5));
        assert_eq!(&samples[..4], &[0.0, 0.5, 1.0, 0.5]);
    }

    #[test]
    fn test_sampler_runs_out() {
        let mut sampler = Sampler::new(SampleData::new(vec![1.0; 4], 100), 100.0);
        let samples = sampler.synthesize(&request(Pitch::Fixed(100.0), 10));
        assert_eq!(samples.len(), 10);
        assert!(samples[5..].iter().all(|sample| *sample == 0.0));
    }

    #[test]
    fn test_oneshot_rings_past_the_hit() {
        let mut hit = OneShot::new(SampleData::new(vec![0.5; 8], 100));
        assert_eq!(hit.synthesize(&request(Pitch::Unpitched, 3)).len(), 8);
        assert_eq!(hit.synthesize(&request(Pitch::Unpitched, 12)).len(), 12);

        hit.tune("volume 2").unwrap();
        assert_eq!(hit.synthesize(&request(Pitch::Unpitched, 1))[0], 1.0);
    }

    #[test]
    fn test_from_options() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.wav");
        write_wav(&path, &[vec![1000, 2000, 3000]], 44100, 16).unwrap();

        let options = UnitOptions {
            file: Some(path.clone()),
            origin_frequency: Some(261.6),
            ..Default::default()
        };
        assert!(Sampler::from_options(&options).is_ok());
        assert!(OneShot::from_options(&options).is_ok());

        let options = UnitOptions {
            file: Some(path),
            ..Default::default()
        };
        assert!(matches!(
            Sampler::from_options(&options),
            Err(UnitError::MissingOption {
                option: "origin_frequency",
                ..
            })
        ));
    }
}
