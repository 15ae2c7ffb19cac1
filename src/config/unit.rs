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
use std::path::Path;

use serde::Deserialize;

use super::error::ConfigError;
use crate::unit::{SoundUnit, UnitError, UnitOptions, UnitRegistry};

/// A YAML representation of a unit.
#[derive(Deserialize, Clone, Debug)]
pub(super) struct Unit {
    /// The name tracks use to refer to the unit.
    name: String,
    /// The registry class to construct.
    class: String,
    /// A sample file, relative to the score.
    file: Option<String>,
    /// The pitch of the sample file in Hz.
    origin_frequency: Option<f32>,
    /// Seed for units with random output.
    seed: Option<u64>,
    /// Tuning commands applied right after construction.
    #[serde(default)]
    tune: Vec<String>,
}

impl Unit {
    pub(super) fn name(&self) -> &str {
        &self.name
    }

    pub(super) fn class(&self) -> &str {
        &self.class
    }

    fn options(&self, base_dir: &Path) -> UnitOptions {
        UnitOptions {
            file: self.file.as_ref().map(|file| base_dir.join(file)),
            origin_frequency: self.origin_frequency,
            seed: self.seed,
        }
    }

    /// Constructs and tunes the unit.
    pub(super) fn to_unit(
        &self,
        registry: &UnitRegistry,
        base_dir: &Path,
    ) -> Result<Box<dyn SoundUnit>, ConfigError> {
        let wrap = |source: UnitError| ConfigError::Unit {
            unit: self.name.clone(),
            source,
        };
        let mut unit = registry
            .create(&self.class, &self.options(base_dir))
            .map_err(wrap)?;
        for command in self.tune.iter() {
            unit.tune(command).map_err(wrap)?;
        }
        Ok(unit)
    }
}
