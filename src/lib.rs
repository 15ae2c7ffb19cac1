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
//! Renders note, beat and singing sequences through sound units into track
//! buffers, and mixes the buffers down by volume.

pub mod buffer;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod export;
pub mod mixer;
pub mod player;
pub mod timing;
pub mod unit;
#[cfg(test)]
mod testutil;

pub use buffer::TrackBuffer;
pub use document::Document;
pub use error::RenderError;
pub use event::{Event, Note, SingingSegment};
pub use player::{SequencePlayer, UnderflowPolicy};
pub use timing::Timing;
pub use unit::{SoundUnit, UnitId, UnitKind, UnitRack, UnitRegistry};
