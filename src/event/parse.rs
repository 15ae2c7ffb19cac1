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

//! Shape based classification of raw sequence items.
//!
//! Raw items come straight out of a YAML document:
//!
//! - `[1.0, 48]` is a note (or `[0, 48]` a beat in a beat sequence)
//! - `"volume 2.0"` is a tuning command
//! - `[0, "volume 2.0"]` is a tuning command addressed to one percussion unit
//! - `["ha", [1.0, 48], "la", [1.25, 48]]` is a singing segment
//! - `["ba", 24, 1.0, 0.8]` is a rapped singing segment
//!
//! Notes and beats are never coerced into each other; the caller picks the
//! sequence kind.

use serde_yml::Value;

use super::{Beat, Event, EventError, Note, Rap, SingingSegment, Syllable, Tone};

/// Which player a sequence is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Notes, singing segments (lyrics ignored) and tuning commands.
    Notes,
    /// Beats and tuning commands, optionally addressed to a unit index.
    Beats,
    /// Singing segments, notes (sung with the default lyric) and tuning commands.
    Singing,
}

/// Classifies every raw item of a sequence. Fails on the first item that has
/// no valid shape for the sequence kind.
pub fn parse_sequence(items: &[Value], kind: SequenceKind) -> Result<Vec<Event>, EventError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            parse_item(item, kind).map_err(|reason| EventError::Malformed { index, reason })
        })
        .collect()
}

fn parse_item(item: &Value, kind: SequenceKind) -> Result<Event, String> {
    match item {
        Value::String(command) => Ok(Event::tune(command)),
        Value::Sequence(fields) => match kind {
            SequenceKind::Beats => parse_beat(fields),
            SequenceKind::Notes | SequenceKind::Singing => {
                if matches!(fields.first(), Some(Value::String(_))) {
                    parse_segment(fields).map(Event::Segment)
                } else {
                    parse_note(fields).map(Event::Note)
                }
            }
        },
        other => Err(format!(
            "expected a list or a tuning command, found {}",
            describe(other)
        )),
    }
}

fn parse_note(fields: &[Value]) -> Result<Note, String> {
    match fields {
        [frequency, duration] => {
            let note = Note::new(number(frequency, "note frequency")?, parse_duration(duration)?);
            note.step()?;
            Ok(note)
        }
        _ => Err(format!("a note has 2 fields, found {}", fields.len())),
    }
}

fn parse_beat(fields: &[Value]) -> Result<Event, String> {
    match fields {
        [unit, Value::String(command)] => {
            let unit = unit
                .as_i64()
                .and_then(|unit| usize::try_from(unit).ok())
                .ok_or_else(|| {
                    format!(
                        "a tuning command must address a unit index, found {}",
                        describe(unit)
                    )
                })?;
            Ok(Event::tune_unit(unit, command))
        }
        [unit, duration] => {
            let unit = unit
                .as_i64()
                .and_then(|unit| i32::try_from(unit).ok())
                .ok_or_else(|| format!("beat unit must be an integer, found {}", describe(unit)))?;
            let beat = Beat::new(unit, parse_duration(duration)?);
            beat.step()?;
            Ok(Event::Beat(beat))
        }
        _ => Err(format!("a beat has 2 fields, found {}", fields.len())),
    }
}

fn parse_segment(fields: &[Value]) -> Result<SingingSegment, String> {
    let mut segment = SingingSegment::new();
    let mut position = 0;

    while position < fields.len() {
        let lyric = match &fields[position] {
            Value::String(lyric) => lyric.clone(),
            other => {
                return Err(format!(
                    "expected a lyric at position {} of the singing segment, found {}",
                    position,
                    describe(other)
                ))
            }
        };
        position += 1;

        let mut tones = Vec::new();
        if let Some(Value::Number(_)) = fields.get(position) {
            let rap = match fields.get(position..position + 3) {
                Some([duration, start, end]) => Rap {
                    duration: parse_duration(duration)?,
                    start_frequency: number(start, "rap start frequency")?,
                    end_frequency: number(end, "rap end frequency")?,
                },
                _ => {
                    return Err(format!(
                        "rap lyric '{}' needs a duration and two frequencies",
                        lyric
                    ))
                }
            };
            rap.step()?;
            tones.push(Tone::Rap(rap));
            position += 3;
        } else {
            while let Some(Value::Sequence(note)) = fields.get(position) {
                tones.push(Tone::Note(parse_note(note)?));
                position += 1;
            }
        }

        if tones.is_empty() {
            return Err(format!("lyric '{}' is not followed by any notes", lyric));
        }
        segment.syllables.push(Syllable { lyric, tones });
    }

    Ok(segment)
}

fn parse_duration(value: &Value) -> Result<i32, String> {
    value
        .as_i64()
        .and_then(|duration| i32::try_from(duration).ok())
        .ok_or_else(|| {
            format!(
                "duration must be an integer tick count, found {}",
                describe(value)
            )
        })
}

fn number(value: &Value, what: &str) -> Result<f32, String> {
    value
        .as_f64()
        .map(|number| number as f32)
        .ok_or_else(|| format!("{} must be a number, found {}", what, describe(value)))
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(yaml: &str) -> Vec<Value> {
        serde_yml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_note_sequence() {
        let events = parse_sequence(
            &items(r#"[[1.0, 48], [-1, 24], [-1, -24], "volume 2.0", [2, 12]]"#),
            SequenceKind::Notes,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                Event::note(1.0, 48),
                Event::note(-1.0, 24),
                Event::note(-1.0, -24),
                Event::tune("volume 2.0"),
                Event::note(2.0, 12),
            ]
        );
    }

    #[test]
    fn test_beat_sequence() {
        let events = parse_sequence(
            &items(r#"[[0, 48], [1, 24], [0, "volume 2.0"], "volume 0.5", [-1, -72]]"#),
            SequenceKind::Beats,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                Event::beat(0, 48),
                Event::beat(1, 24),
                Event::tune_unit(0, "volume 2.0"),
                Event::tune("volume 0.5"),
                Event::beat(-1, -72),
            ]
        );
    }

    #[test]
    fn test_beats_are_not_notes() {
        let err = parse_sequence(&items("[[0, 48], [1.5, 48]]"), SequenceKind::Beats).unwrap_err();
        assert_eq!(err.index(), 1);

        let err = parse_sequence(&items(r#"[[0, "volume 1"]]"#), SequenceKind::Notes).unwrap_err();
        assert_eq!(err.index(), 0);
    }

    #[test]
    fn test_singing_segment() {
        let events = parse_sequence(
            &items(r#"[["ha", [1.0, 48], [1.125, 24], "la", [1.25, 48]], [1.0, 12]]"#),
            SequenceKind::Singing,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![
                SingingSegment::new()
                    .syllable("ha", [Note::new(1.0, 48), Note::new(1.125, 24)])
                    .syllable("la", [Note::new(1.25, 48)])
                    .into(),
                Event::note(1.0, 12),
            ]
        );
    }

    #[test]
    fn test_rap_segment() {
        let events = parse_sequence(
            &items(r#"[["ba", 24, 1.0, 0.75, "da", 48, 1, 0.5]]"#),
            SequenceKind::Singing,
        )
        .unwrap();

        assert_eq!(
            events,
            vec![SingingSegment::new()
                .rap("ba", 24, 1.0, 0.75)
                .rap("da", 48, 1.0, 0.5)
                .into()]
        );
    }

    #[test]
    fn test_segment_accepted_by_note_sequence() {
        let events = parse_sequence(
            &items(r#"[["ha", [1.0, 48]]]"#),
            SequenceKind::Notes,
        )
        .unwrap();
        assert!(matches!(events[0], Event::Segment(_)));
    }

    #[test]
    fn test_malformed_items() {
        let cases = [
            (r#"[[1.0, 48], [1.0]]"#, 1),
            (r#"[[1.0, 48.5]]"#, 0),
            (r#"[[1.0, 48], 12]"#, 1),
            (r#"[[1.0, -48]]"#, 0),
            (r#"[["ha"]]"#, 0),
            (r#"[["ha", 24, 1.0]]"#, 0),
            (r#"[["ha", [1.0, 48], 3]]"#, 0),
            (r#"[[1.0, 48], {a: 1}]"#, 1),
        ];

        for (yaml, index) in cases {
            let err = parse_sequence(&items(yaml), SequenceKind::Singing).unwrap_err();
            assert_eq!(err.index(), index, "{}", yaml);
        }
    }

    #[test]
    fn test_negative_unit_tuning_rejected() {
        let err =
            parse_sequence(&items(r#"[[-1, "volume 1.0"]]"#), SequenceKind::Beats).unwrap_err();
        assert_eq!(err.index(), 0);
    }
}
