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

//! Events that make up note, beat and singing sequences.
//!
//! A sequence is an ordered list of heterogeneous items. Negative selectors
//! (frequency multiplier or unit index) turn an item into a silence when its
//! duration is positive, or into a backspace that rewinds the render cursor
//! when its duration is negative.

pub mod error;
pub mod parse;

pub use error::EventError;
pub use parse::{parse_sequence, SequenceKind};

/// A pitched note: a frequency multiplier relative to the reference frequency
/// and a duration in ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency: f32,
    pub duration: i32,
}

impl Note {
    pub fn new(frequency: f32, duration: i32) -> Note {
        Note {
            frequency,
            duration,
        }
    }

    /// What the note does to the render cursor.
    pub fn step(&self) -> Result<Step, &'static str> {
        Step::classify(self.frequency < 0.0, self.duration)
    }
}

/// A percussion hit: the index of a unit in the supplied percussion list and a
/// duration in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Beat {
    pub unit: i32,
    pub duration: i32,
}

impl Beat {
    pub fn new(unit: i32, duration: i32) -> Beat {
        Beat { unit, duration }
    }

    /// What the beat does to the render cursor.
    pub fn step(&self) -> Result<Step, &'static str> {
        Step::classify(self.unit < 0, self.duration)
    }
}

/// A spoken pitch glide used by rap syllables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rap {
    pub duration: i32,
    pub start_frequency: f32,
    pub end_frequency: f32,
}

impl Rap {
    pub fn step(&self) -> Result<Step, &'static str> {
        match self.duration {
            d if d > 0 => Ok(Step::Sound(i64::from(d))),
            0 => Ok(Step::Nothing),
            _ => Err("rap duration must not be negative"),
        }
    }
}

/// One timed element following a lyric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    Note(Note),
    Rap(Rap),
}

impl Tone {
    pub fn step(&self) -> Result<Step, &'static str> {
        match self {
            Tone::Note(note) => note.step(),
            Tone::Rap(rap) => rap.step(),
        }
    }
}

/// A lyric and the tones it is sung over.
#[derive(Debug, Clone, PartialEq)]
pub struct Syllable {
    pub lyric: String,
    pub tones: Vec<Tone>,
}

/// A run of lyrics meant to be sung continuously.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SingingSegment {
    pub syllables: Vec<Syllable>,
}

impl SingingSegment {
    pub fn new() -> SingingSegment {
        SingingSegment::default()
    }

    /// Adds a lyric sung over one or more notes.
    pub fn syllable<I>(mut self, lyric: &str, notes: I) -> SingingSegment
    where
        I: IntoIterator<Item = Note>,
    {
        self.syllables.push(Syllable {
            lyric: lyric.to_string(),
            tones: notes.into_iter().map(Tone::Note).collect(),
        });
        self
    }

    /// Adds a rapped lyric gliding from `start_frequency` to `end_frequency`.
    pub fn rap(
        mut self,
        lyric: &str,
        duration: i32,
        start_frequency: f32,
        end_frequency: f32,
    ) -> SingingSegment {
        self.syllables.push(Syllable {
            lyric: lyric.to_string(),
            tones: vec![Tone::Rap(Rap {
                duration,
                start_frequency,
                end_frequency,
            })],
        });
        self
    }

    /// All tones of the segment in order, lyrics stripped.
    pub fn tones(&self) -> impl Iterator<Item = &Tone> {
        self.syllables.iter().flat_map(|syllable| syllable.tones.iter())
    }
}

/// A tuning command for a unit. `target` addresses a unit of a percussion list;
/// `None` addresses the single unit of a melodic or vocal render, or every unit
/// of a percussion render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuneCommand {
    pub target: Option<usize>,
    pub command: String,
}

/// A sequence item.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Note(Note),
    Beat(Beat),
    Segment(SingingSegment),
    Tune(TuneCommand),
}

impl Event {
    pub fn note(frequency: f32, duration: i32) -> Event {
        Event::Note(Note::new(frequency, duration))
    }

    pub fn beat(unit: i32, duration: i32) -> Event {
        Event::Beat(Beat::new(unit, duration))
    }

    /// A note-sequence silence of `duration` ticks.
    pub fn rest(duration: i32) -> Event {
        Event::note(-1.0, duration.saturating_abs())
    }

    /// A note-sequence backspace of `duration` ticks.
    pub fn backspace(duration: i32) -> Event {
        Event::note(-1.0, -duration.saturating_abs())
    }

    pub fn tune(command: &str) -> Event {
        Event::Tune(TuneCommand {
            target: None,
            command: command.to_string(),
        })
    }

    pub fn tune_unit(unit: usize, command: &str) -> Event {
        Event::Tune(TuneCommand {
            target: Some(unit),
            command: command.to_string(),
        })
    }
}

impl From<SingingSegment> for Event {
    fn from(segment: SingingSegment) -> Self {
        Event::Segment(segment)
    }
}

/// The effect of a timed item on the render cursor, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Render sound and advance.
    Sound(i64),
    /// Advance without sound.
    Rest(i64),
    /// Move backward without rendering.
    Backspace(i64),
    /// Zero duration.
    Nothing,
}

impl Step {
    /// Applies the shared sentinel rules to a selector and a duration.
    pub fn classify(negative_selector: bool, duration: i32) -> Result<Step, &'static str> {
        let ticks = i64::from(duration);
        match (negative_selector, duration) {
            (_, 0) => Ok(Step::Nothing),
            (false, d) if d > 0 => Ok(Step::Sound(ticks)),
            (false, _) => Err("a sounding item must not have a negative duration"),
            (true, d) if d > 0 => Ok(Step::Rest(ticks)),
            (true, _) => Ok(Step::Backspace(-ticks)),
        }
    }

    /// Signed cursor movement in ticks.
    pub fn ticks(&self) -> i64 {
        match self {
            Step::Sound(ticks) | Step::Rest(ticks) => *ticks,
            Step::Backspace(ticks) => -ticks,
            Step::Nothing => 0,
        }
    }
}

/// The net cursor movement of a sequence in ticks.
pub fn duration(events: &[Event]) -> Result<i64, EventError> {
    let mut total = 0;
    for (index, event) in events.iter().enumerate() {
        let malformed = |reason: &str| EventError::malformed(index, reason);
        total += match event {
            Event::Note(note) => note.step().map_err(malformed)?.ticks(),
            Event::Beat(beat) => beat.step().map_err(malformed)?.ticks(),
            Event::Segment(segment) => {
                let mut ticks = 0;
                for tone in segment.tones() {
                    ticks += tone.step().map_err(malformed)?.ticks();
                }
                ticks
            }
            Event::Tune(_) => 0,
        };
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_classification() {
        assert_eq!(Note::new(1.0, 48).step(), Ok(Step::Sound(48)));
        assert_eq!(Note::new(-1.0, 24).step(), Ok(Step::Rest(24)));
        assert_eq!(Note::new(-1.0, -24).step(), Ok(Step::Backspace(24)));
        assert_eq!(Note::new(0.0, 12).step(), Ok(Step::Sound(12)));
        assert_eq!(Note::new(1.0, 0).step(), Ok(Step::Nothing));
        assert!(Note::new(1.0, -12).step().is_err());

        assert_eq!(Beat::new(0, 48).step(), Ok(Step::Sound(48)));
        assert_eq!(Beat::new(-1, 48).step(), Ok(Step::Rest(48)));
        assert_eq!(Beat::new(-1, -48).step(), Ok(Step::Backspace(48)));
    }

    #[test]
    fn test_duration() {
        let events = vec![
            Event::note(1.0, 48),
            Event::tune("volume 0.5"),
            Event::rest(24),
            Event::backspace(48),
            Event::note(1.5, 48),
        ];
        assert_eq!(duration(&events), Ok(72));
    }

    #[test]
    fn test_duration_of_singing() {
        let events = vec![
            SingingSegment::new()
                .syllable("ha", [Note::new(1.0, 48), Note::new(1.2, 24)])
                .rap("la", 36, 1.0, 0.5)
                .into(),
            Event::note(1.0, 12),
        ];
        assert_eq!(duration(&events), Ok(120));
    }

    #[test]
    fn test_duration_reports_index() {
        let events = vec![Event::note(1.0, 48), Event::note(1.0, -48)];
        let err = duration(&events).unwrap_err();
        assert_eq!(
            err,
            EventError::malformed(1, "a sounding item must not have a negative duration")
        );
    }

    #[test]
    fn test_rest_and_backspace_helpers() {
        assert_eq!(Event::rest(-12), Event::note(-1.0, 12));
        assert_eq!(Event::backspace(12), Event::note(-1.0, -12));

        assert_eq!(Event::rest(i32::MIN), Event::note(-1.0, i32::MAX));
        assert_eq!(Event::backspace(i32::MIN), Event::note(-1.0, -i32::MAX));
    }
}
