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

//! The vocal player: singing segments and notes through a singer.
//!
//! A singing segment is cut into runs at every silence or backspace. Each run
//! is handed to the singer in one call so it can sing across syllable
//! boundaries without gaps. A lyric interrupted by a silence carries on into
//! the next run.

use tracing::{debug, span, Level};

use super::{check_kind, classify, malformed, tune, Render, SequencePlayer};
use crate::buffer::TrackBuffer;
use crate::error::RenderError;
use crate::event::{Event, SingingSegment, Step, Tone, TuneCommand};
use crate::timing::Cursor;
use crate::unit::{Pitch, SoundUnit, SungSpan, SungSyllable, UnitId, UnitKind, UnitRack};

impl SequencePlayer {
    /// Sings a sequence, appending to `buffer`.
    ///
    /// Plain notes are sung one at a time with an empty lyric, which the
    /// singer replaces with its default lyric.
    pub fn sing(
        &self,
        rack: &mut UnitRack,
        singer: UnitId,
        events: &[Event],
        buffer: &mut TrackBuffer,
    ) -> Result<(), RenderError> {
        check_kind(rack, singer, UnitKind::Singer)?;
        let span = span!(
            Level::INFO,
            "sing",
            unit = %singer,
            events = events.len(),
            tempo = self.tempo
        );
        let _enter = span.enter();

        let unit = rack.get_mut(singer)?;
        let mut render = self.start(buffer)?;
        for (index, event) in events.iter().enumerate() {
            match event {
                Event::Note(note) => match classify(note.step(), index)? {
                    Step::Sound(ticks) => {
                        let mut run = Run::new(render.cursor);
                        let pitch = Pitch::Fixed(render.timing.frequency(note.frequency));
                        run.push(&render, "", false, pitch, ticks);
                        run.sing(&mut render, unit)?;
                    }
                    step => render.silent_step(step, index)?,
                },
                Event::Segment(segment) => sing_segment(&mut render, unit, segment, index)?,
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

        debug!(samples = render.buffer.len(), "Rendered singing");
        Ok(())
    }
}

fn sing_segment(
    render: &mut Render<'_>,
    singer: &mut dyn SoundUnit,
    segment: &SingingSegment,
    index: usize,
) -> Result<(), RenderError> {
    let mut run = Run::new(render.cursor);
    for syllable in segment.syllables.iter() {
        for tone in syllable.tones.iter() {
            let (step, rap, pitch) = match tone {
                Tone::Note(note) => (
                    classify(note.step(), index)?,
                    false,
                    Pitch::Fixed(render.timing.frequency(note.frequency)),
                ),
                Tone::Rap(rap) => (
                    classify(rap.step(), index)?,
                    true,
                    Pitch::Glide {
                        start: render.timing.frequency(rap.start_frequency),
                        end: render.timing.frequency(rap.end_frequency),
                    },
                ),
            };
            match step {
                Step::Sound(ticks) => run.push(render, &syllable.lyric, rap, pitch, ticks),
                Step::Nothing => {}
                step => {
                    run.sing(render, singer)?;
                    render.silent_step(step, index)?;
                    run = Run::new(render.cursor);
                }
            }
        }
        run.end_syllable();
    }
    run.sing(render, singer)
}

/// Syllables collected for one continuous sung stretch.
struct Run {
    syllables: Vec<SungSyllable>,
    /// Whether the next span extends the last syllable.
    open: bool,
    end: Cursor,
}

impl Run {
    fn new(start: Cursor) -> Run {
        Run {
            syllables: Vec::new(),
            open: false,
            end: start,
        }
    }

    fn push(&mut self, render: &Render<'_>, lyric: &str, rap: bool, pitch: Pitch, ticks: i64) {
        let (num_samples, end) = render.plan(self.end, ticks);
        self.end = end;
        let span = SungSpan { pitch, num_samples };
        if self.open {
            if let Some(syllable) = self.syllables.last_mut() {
                syllable.spans.push(span);
                return;
            }
        }
        self.syllables.push(SungSyllable {
            lyric: lyric.to_string(),
            spans: vec![span],
            rap,
        });
        self.open = true;
    }

    fn end_syllable(&mut self) {
        self.open = false;
    }

    /// Sings the collected syllables at the render cursor.
    fn sing(self, render: &mut Render<'_>, singer: &mut dyn SoundUnit) -> Result<(), RenderError> {
        if self.syllables.is_empty() {
            return Ok(());
        }
        let samples = singer.sing(&self.syllables, render.timing.sample_rate());
        render.commit(&samples, self.end)
    }
}
