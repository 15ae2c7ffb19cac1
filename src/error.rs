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
use crate::event::EventError;
use crate::unit::{UnitError, UnitKind};

/// Errors raised by players, the mixer, documents and exporters.
///
/// Errors abort the call that raised them. Samples rendered before the failure
/// stay in the buffer.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    MalformedEvent(#[from] EventError),

    #[error("invalid handle: {0}")]
    InvalidHandle(String),

    #[error("expected a {expected} unit, found a {found} unit")]
    KindMismatch { expected: UnitKind, found: UnitKind },

    #[error("tempo must be at least 1 beat per minute")]
    ZeroTempo,

    #[error("backspace at index {index} moves before the start of the buffer")]
    CursorUnderflow { index: usize },

    #[error("mix target already holds {0} samples")]
    MixTargetNotEmpty(usize),

    #[error("sample rate mismatch: expected {expected}Hz, found {found}Hz")]
    SampleRateMismatch { expected: u32, found: u32 },

    #[error("unit error: {0}")]
    Unit(#[from] UnitError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}
