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

//! Raw PCM and WAV output for track buffers.

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::info;

use crate::buffer::TrackBuffer;
use crate::error::RenderError;

const BITS_PER_SAMPLE: u16 = 16;

/// The buffer's samples weighted by its volume.
pub fn to_pcm_floats(buffer: &TrackBuffer) -> Result<Vec<f32>, RenderError> {
    buffer.check()?;
    let volume = buffer.volume();
    Ok(buffer.samples().iter().map(|sample| sample * volume).collect())
}

/// Encodes the buffer as a mono 16 bit WAV file.
///
/// Samples are normalized so that the loudest one lands at the buffer's
/// volume times full scale (see `TrackBuffer::absolute_volume`).
pub fn to_wav_bytes(buffer: &TrackBuffer) -> Result<Vec<u8>, RenderError> {
    buffer.check()?;
    let mut bytes = Cursor::new(Vec::new());
    encode(WavWriter::new(&mut bytes, spec(buffer))?, buffer)?;
    Ok(bytes.into_inner())
}

/// Writes the buffer to a WAV file, encoded as by `to_wav_bytes`.
pub fn write_wav(buffer: &TrackBuffer, path: &Path) -> Result<(), RenderError> {
    buffer.check()?;
    encode(WavWriter::create(path, spec(buffer))?, buffer)?;
    info!(
        path = ?path,
        samples = buffer.len(),
        sample_rate = buffer.sample_rate(),
        "Wrote WAV file"
    );
    Ok(())
}

fn spec(buffer: &TrackBuffer) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

fn encode<W>(mut writer: WavWriter<W>, buffer: &TrackBuffer) -> Result<(), RenderError>
where
    W: Write + Seek,
{
    let scale = buffer.absolute_volume() * f32::from(i16::MAX);
    for sample in buffer.samples() {
        let value = (sample * scale).round().clamp(f32::from(i16::MIN), f32::from(i16::MAX));
        writer.write_sample(value as i16)?;
    }
    writer.finalize()?;
    Ok(())
}
