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

//! Ownership of unit instances behind checked handles.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use super::registry::{UnitOptions, UnitRegistry};
use super::{SoundUnit, UnitError, UnitKind};
use crate::error::RenderError;

/// Global rack ID counter, so handles from one rack are rejected by another.
static NEXT_RACK_ID: AtomicU64 = AtomicU64::new(1);

/// A handle to a unit held by a `UnitRack`. Slots are never reused, so a
/// handle to a destroyed unit stays invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitId {
    rack: u64,
    slot: usize,
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit {}:{}", self.rack, self.slot)
    }
}

/// Owns unit instances. Units live until they are destroyed or the rack is
/// dropped, independently of the buffers they render into.
pub struct UnitRack {
    id: u64,
    slots: Vec<Option<Box<dyn SoundUnit>>>,
}

impl UnitRack {
    pub fn new() -> UnitRack {
        UnitRack {
            id: NEXT_RACK_ID.fetch_add(1, Ordering::SeqCst),
            slots: Vec::new(),
        }
    }

    /// Takes ownership of a unit and returns its handle.
    pub fn insert(&mut self, unit: Box<dyn SoundUnit>) -> UnitId {
        let id = UnitId {
            rack: self.id,
            slot: self.slots.len(),
        };
        debug!(%id, class = unit.class_name(), "Unit added to rack");
        self.slots.push(Some(unit));
        id
    }

    /// Constructs a unit of the given registry class.
    pub fn create(
        &mut self,
        registry: &UnitRegistry,
        class: &str,
        options: &UnitOptions,
    ) -> Result<UnitId, UnitError> {
        let unit = registry.create(class, options)?;
        Ok(self.insert(unit))
    }

    /// Drops a unit. Destroying an already destroyed or unknown unit does nothing.
    pub fn destroy(&mut self, id: UnitId) {
        if id.rack != self.id {
            return;
        }
        if let Some(slot) = self.slots.get_mut(id.slot) {
            if slot.take().is_some() {
                debug!(%id, "Unit destroyed");
            }
        }
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.get(id).is_ok()
    }

    pub fn get(&self, id: UnitId) -> Result<&dyn SoundUnit, RenderError> {
        match self.slots.get(id.slot) {
            Some(Some(unit)) if id.rack == self.id => Ok(unit.as_ref()),
            _ => Err(RenderError::InvalidHandle(format!("{} is not in this rack", id))),
        }
    }

    pub fn get_mut(&mut self, id: UnitId) -> Result<&mut dyn SoundUnit, RenderError> {
        let rack = self.id;
        match self.slots.get_mut(id.slot) {
            Some(Some(unit)) if id.rack == rack => Ok(unit.as_mut()),
            _ => Err(RenderError::InvalidHandle(format!("{} is not in this rack", id))),
        }
    }

    pub fn kind(&self, id: UnitId) -> Result<UnitKind, RenderError> {
        Ok(self.get(id)?.kind())
    }

    /// Sends a tuning command to a unit.
    pub fn tune(&mut self, id: UnitId, command: &str) -> Result<(), RenderError> {
        Ok(self.get_mut(id)?.tune(command)?)
    }

    /// Number of live units.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UnitRack {
    fn default() -> Self {
        UnitRack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::sine::Sine;

    #[test]
    fn test_insert_and_destroy() {
        let mut rack = UnitRack::new();
        let id = rack.insert(Box::new(Sine::new()));
        assert!(rack.contains(id));
        assert_eq!(rack.kind(id).unwrap(), UnitKind::Instrument);
        assert_eq!(rack.len(), 1);

        rack.destroy(id);
        assert!(!rack.contains(id));
        assert!(rack.is_empty());
        assert!(matches!(
            rack.get_mut(id),
            Err(RenderError::InvalidHandle(_))
        ));

        // Destroying twice is harmless.
        rack.destroy(id);
    }

    #[test]
    fn test_slots_are_not_reused() {
        let mut rack = UnitRack::new();
        let first = rack.insert(Box::new(Sine::new()));
        rack.destroy(first);
        let second = rack.insert(Box::new(Sine::new()));
        assert_ne!(first, second);
        assert!(!rack.contains(first));
        assert!(rack.contains(second));
    }

    #[test]
    fn test_foreign_handles_are_rejected() {
        let mut a = UnitRack::new();
        let mut b = UnitRack::new();
        let id = a.insert(Box::new(Sine::new()));
        b.insert(Box::new(Sine::new()));

        assert!(matches!(b.get(id), Err(RenderError::InvalidHandle(_))));
        b.destroy(id);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_tune() {
        let mut rack = UnitRack::new();
        let id = rack.insert(Box::new(Sine::new()));
        rack.tune(id, "volume 0.5").unwrap();
        assert!(matches!(
            rack.tune(id, "warp 9"),
            Err(RenderError::Unit(UnitError::UnsupportedCommand(_)))
        ));
    }

    #[test]
    fn test_create_from_registry() {
        let registry = UnitRegistry::with_builtins();
        let mut rack = UnitRack::new();
        let id = rack
            .create(&registry, "kick", &UnitOptions::default())
            .unwrap();
        assert_eq!(rack.kind(id).unwrap(), UnitKind::Percussion);
        assert!(matches!(
            rack.create(&registry, "theremin", &UnitOptions::default()),
            Err(UnitError::UnknownClass(_))
        ));
    }
}
