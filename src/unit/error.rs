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
use std::path::PathBuf;

/// Errors raised by units and by the unit registry.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("unsupported tuning command: {0}")]
    UnsupportedCommand(String),

    #[error("invalid argument for '{command}': {reason}")]
    InvalidArgument { command: String, reason: String },

    #[error("unknown unit class: {0}")]
    UnknownClass(String),

    #[error("unit class '{class}' requires the '{option}' option")]
    MissingOption { class: String, option: &'static str },

    #[error("sample file {0} holds no audio")]
    EmptySample(PathBuf),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}
