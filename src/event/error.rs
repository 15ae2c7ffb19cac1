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

/// Errors raised while classifying or interpreting sequence items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventError {
    #[error("malformed event at index {index}: {reason}")]
    Malformed { index: usize, reason: String },
}

impl EventError {
    pub fn malformed(index: usize, reason: &str) -> EventError {
        EventError::Malformed {
            index,
            reason: reason.to_string(),
        }
    }

    /// The index of the offending item in its sequence.
    pub fn index(&self) -> usize {
        match self {
            EventError::Malformed { index, .. } => *index,
        }
    }
}
