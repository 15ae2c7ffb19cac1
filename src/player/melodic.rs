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

//! The melodic player: notes and singing segments through an instrument.

use tracing::{debug, span, Level};

use super::{check_kind, classify, malformed, tune, Render, SequencePlayer};
use crate::buffer::TrackBuffer;
use crate::error::RenderError;
use crate::event::{Event, Step, Tone, TuneCommand};
use crate::unit::{Pitch, SoundUnit, SynthRequest, UnitId, UnitKind, UnitRack};

impl SequencePlayer {
    /// Plays a note sequence through an instrument, appending to `buffer`.
    ///
    /// Singing segments are accepted and played as plain notes: lyrics are
    /// ignored and rapped syllables become pitch glides.
    pub fn play(
        &self,
        rack: &mut UnitRack,
        instrument: UnitId,
        events: &[Event],
        buffer: &mut TrackBuffer,
    ) -> Result<(), RenderError> {
        check_kind(rack, instrument, UnitKind::Instrument)?;
        let span = span!(
            Level::INFO,
            "play notes",
            unit = %instrument,
            events = events.len(),
            tempo = self.tempo
        );
        let _enter = span.enter();

        let unit = rack.get_mut(instrument)?;
        let mut render = self.start(buffer)?;
        for (index, event) in events.iter().enumerate() {
            match event {
                Event::Note(note) => play_tone(&mut render, unit, &Tone::Note(*note), index)?,
                Event::Segment(segment) => {
                    for tone in segment.tones() {
                        play_tone(&mut render, unit, tone, index)?;
                    }
                }
                Event::Tune(TuneCommand {
                    target: None,
                    command,
                }) => tune(unit, command, index)?,
                Event::Tune(TuneCommand {
                    target: Some(_), ..
                }) => {
                    return Err(malformed(
                        index,
                        "unit addressed tuning commands need a percussive player",
                    ))
                }
                Event::Beat(_) => return Err(malformed(index, "beats need a percussive player")),
            }
        }

        debug!(samples = render.buffer.len(), "Rendered notes");
        Ok(())
    }
}

fn play_tone(
    render: &mut Render<'_>,
    instrument: &mut dyn SoundUnit,
    tone: &Tone,
    index: usize,
) -> Result<(), RenderError> {
    let (step, pitch) = match tone {
        Tone::Note(note) => (
            classify(note.step(), index)?,
            Pitch::Fixed(render.timing.frequency(note.frequency)),
        ),
        Tone::Rap(rap) => (
            classify(rap.step(), index)?,
            Pitch::Glide {
                start: render.timing.frequency(rap.start_frequency),
                end: render.timing.frequency(rap.end_frequency),
            },
        ),
    };
    let ticks = match step {
        Step::Sound(ticks) => ticks,
        step => return render.silent_step(step, index),
    };

    let (num_samples, end) = render.plan(render.cursor, ticks);
    let samples = instrument.synthesize(&SynthRequest {
        pitch,
        num_samples,
        sample_rate: render.timing.sample_rate(),
        lyric: None,
    });
    render.commit(&samples, end)
}
