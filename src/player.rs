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

//! Sequence players render event lists through units into track buffers.
//!
//! All three players share the same cursor discipline. Rendering resumes at the
//! cursor the buffer's previous render left behind. Sounding events are
//! overdubbed at the cursor, silences advance it and backspaces rewind it. Tempo and reference frequency
//! are fixed for the whole call, and the sample rate is the buffer's own.
//!
//! A call that fails stops at the offending event. Everything rendered before
//! it stays in the buffer.

use tracing::{debug, warn};

use crate::buffer::TrackBuffer;
use crate::error::RenderError;
use crate::event::{EventError, Step};
use crate::timing::{Cursor, Timing, DEFAULT_REFERENCE_FREQUENCY, DEFAULT_TEMPO};
use crate::unit::{SoundUnit, UnitError, UnitId, UnitKind, UnitRack};

mod melodic;
mod percussive;
mod vocal;


/// What a backspace does when it would move before the start of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderflowPolicy {
    /// Stop at the start of the buffer and keep rendering.
    #[default]
    Clamp,
    /// Abort the call with `RenderError::CursorUnderflow`.
    Error,
}

/// Renders note, beat and singing sequences.
///
/// The player itself holds no audio state; the same player can render into
/// any number of buffers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencePlayer {
    tempo: u32,
    reference_frequency: f32,
    underflow: UnderflowPolicy,
}

impl SequencePlayer {
    /// Creates a player for the given tempo (beats per minute) and reference
    /// frequency (Hz).
    pub fn new(tempo: u32, reference_frequency: f32) -> SequencePlayer {
        SequencePlayer {
            tempo,
            reference_frequency,
            underflow: UnderflowPolicy::default(),
        }
    }

    /// Replaces the backspace underflow policy.
    pub fn with_underflow(mut self, underflow: UnderflowPolicy) -> SequencePlayer {
        self.underflow = underflow;
        self
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn reference_frequency(&self) -> f32 {
        self.reference_frequency
    }

    pub fn underflow(&self) -> UnderflowPolicy {
        self.underflow
    }

    fn timing(&self, buffer: &TrackBuffer) -> Timing {
        Timing::new(self.tempo, self.reference_frequency, buffer.sample_rate())
    }

    fn start<'a>(&self, buffer: &'a mut TrackBuffer) -> Result<Render<'a>, RenderError> {
        buffer.check()?;
        Ok(Render {
            timing: self.timing(buffer),
            cursor: Cursor::new(buffer.cursor()),
            underflow: self.underflow,
            buffer,
        })
    }
}

impl Default for SequencePlayer {
    fn default() -> Self {
        SequencePlayer::new(DEFAULT_TEMPO, DEFAULT_REFERENCE_FREQUENCY)
    }
}

/// The state of one render call: the target buffer and the cursor moving
/// through it.
struct Render<'a> {
    buffer: &'a mut TrackBuffer,
    timing: Timing,
    cursor: Cursor,
    underflow: UnderflowPolicy,
}

impl Render<'_> {
    /// The number of samples a span of `ticks` starting at `at` occupies, and
    /// the cursor after it.
    fn plan(&self, at: Cursor, ticks: i64) -> (usize, Cursor) {
        let samples = self.timing.ticks_to_samples(ticks);
        let mut end = at;
        end.advance(samples);
        (at.span_len(samples), end)
    }

    /// Overdubs `samples` at the cursor and moves the cursor to `end`.
    fn commit(&mut self, samples: &[f32], end: Cursor) -> Result<(), RenderError> {
        self.buffer.overdub(self.cursor.sample_index(), samples)?;
        self.cursor = end;
        self.buffer.set_cursor(end.position())
    }

    /// Advances over `ticks` of silence.
    fn rest(&mut self, ticks: i64) -> Result<(), RenderError> {
        self.cursor.advance(self.timing.ticks_to_samples(ticks));
        self.buffer.set_cursor(self.cursor.position())
    }

    /// Rewinds by `ticks` for the event at `index`.
    fn backspace(&mut self, ticks: i64, index: usize) -> Result<(), RenderError> {
        let mut cursor = self.cursor;
        if !cursor.rewind(self.timing.ticks_to_samples(ticks)) {
            match self.underflow {
                UnderflowPolicy::Clamp => {
                    warn!(index, ticks, "Backspace moved before the start of the buffer, clamping");
                }
                UnderflowPolicy::Error => return Err(RenderError::CursorUnderflow { index }),
            }
        }
        self.cursor = cursor;
        self.buffer.set_cursor(cursor.position())
    }

    /// Applies a rest, backspace or no-op step. Sounding steps are left to the caller.
    fn silent_step(&mut self, step: Step, index: usize) -> Result<(), RenderError> {
        match step {
            Step::Rest(ticks) => self.rest(ticks),
            Step::Backspace(ticks) => self.backspace(ticks, index),
            Step::Sound(_) | Step::Nothing => Ok(()),
        }
    }
}

/// Classifies an item, attaching the item's index to a malformed item.
fn classify(step: Result<Step, &'static str>, index: usize) -> Result<Step, RenderError> {
    step.map_err(|reason| EventError::malformed(index, reason).into())
}

fn malformed(index: usize, reason: &str) -> RenderError {
    EventError::malformed(index, reason).into()
}

/// Forwards a tuning command. Commands the unit does not understand are
/// logged and skipped.
fn tune(unit: &mut dyn SoundUnit, command: &str, index: usize) -> Result<(), RenderError> {
    match unit.tune(command) {
        Ok(()) => {
            debug!(index, command, class = unit.class_name(), "Tuned unit");
            Ok(())
        }
        Err(UnitError::UnsupportedCommand(command)) => {
            warn!(index, command = %command, class = unit.class_name(), "Ignoring unsupported tuning command");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Verifies that a handle is live and refers to a unit of the expected kind.
fn check_kind(rack: &UnitRack, id: UnitId, expected: UnitKind) -> Result<(), RenderError> {
    let found = rack.kind(id)?;
    if found != expected {
        return Err(RenderError::KindMismatch { expected, found });
    }
    Ok(())
}
