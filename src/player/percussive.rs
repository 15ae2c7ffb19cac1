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

//! The percussive player: beats through a list of percussion units.

use tracing::{debug, span, Level};

use super::{check_kind, classify, malformed, tune, SequencePlayer};
use crate::buffer::TrackBuffer;
use crate::error::RenderError;
use crate::event::{Event, Step, TuneCommand};
use crate::unit::{Pitch, SynthRequest, UnitId, UnitKind, UnitRack};

impl SequencePlayer {
    /// Plays a beat sequence, appending to `buffer`. Each beat selects the
    /// unit at its index in `units`.
    ///
    /// A bare tuning command is sent to every listed unit once; an
    /// `(index, command)` pair only to the selected unit.
    pub fn play_beats(
        &self,
        rack: &mut UnitRack,
        units: &[UnitId],
        events: &[Event],
        buffer: &mut TrackBuffer,
    ) -> Result<(), RenderError> {
        for unit in units {
            check_kind(rack, *unit, UnitKind::Percussion)?;
        }
        let span = span!(
            Level::INFO,
            "play beats",
            units = units.len(),
            events = events.len(),
            tempo = self.tempo
        );
        let _enter = span.enter();

        let mut render = self.start(buffer)?;
        for (index, event) in events.iter().enumerate() {
            match event {
                Event::Beat(beat) => match classify(beat.step(), index)? {
                    Step::Sound(ticks) => {
                        let id = select(units, beat.unit as usize, index)?;
                        let (num_samples, end) = render.plan(render.cursor, ticks);
                        let samples = rack.get_mut(id)?.synthesize(&SynthRequest {
                            pitch: Pitch::Unpitched,
                            num_samples,
                            sample_rate: render.timing.sample_rate(),
                            lyric: None,
                        });
                        render.commit(&samples, end)?;
                    }
                    step => render.silent_step(step, index)?,
                },
                Event::Tune(TuneCommand {
                    target: None,
                    command,
                }) => {
                    for (position, id) in units.iter().enumerate() {
                        if units[..position].contains(id) {
                            continue;
                        }
                        tune(rack.get_mut(*id)?, command, index)?;
                    }
                }
                Event::Tune(TuneCommand {
                    target: Some(unit),
                    command,
                }) => {
                    let id = select(units, *unit, index)?;
                    tune(rack.get_mut(id)?, command, index)?;
                }
                Event::Note(_) | Event::Segment(_) => {
                    return Err(malformed(index, "notes need a melodic or vocal player"))
                }
            }
        }

        debug!(samples = render.buffer.len(), "Rendered beats");
        Ok(())
    }
}

/// Resolves a beat's unit index against the supplied unit list.
fn select(units: &[UnitId], unit: usize, index: usize) -> Result<UnitId, RenderError> {
    units.get(unit).copied().ok_or_else(|| {
        RenderError::InvalidHandle(format!(
            "item {} selects percussion unit {} but only {} were supplied",
            index,
            unit,
            units.len()
        ))
    })
}
