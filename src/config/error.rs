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
use crate::error::RenderError;
use crate::event::EventError;
use crate::unit::UnitError;

/// Errors raised while loading a score file or rendering it, naming the unit
/// or track at fault.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config load/parse error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid score: {0}")]
    InvalidScore(String),

    #[error("unit '{0}' is defined more than once")]
    DuplicateUnit(String),

    #[error("unit '{unit}': {source}")]
    Unit { unit: String, source: UnitError },

    #[error("{track}: unknown unit '{unit}'")]
    UnknownUnit { track: String, unit: String },

    #[error("{track}: {reason}")]
    InvalidTrack { track: String, reason: String },

    #[error("{track}: {source}")]
    Event { track: String, source: EventError },

    #[error("{track}: {source}")]
    Render { track: String, source: RenderError },
}
