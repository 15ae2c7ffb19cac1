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

//! Class identifier to constructor mapping for sound producing units.
//!
//! The registry is a static table. A process-wide instance is populated once
//! by `init()` and read with `global()`; tests and embedders may build their
//! own with `UnitRegistry::with_builtins()` and `register`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::debug;

use super::drum::{Kick, Noise};
use super::hummer::Hummer;
use super::sampler::{OneShot, Sampler};
use super::sine::Sine;
use super::{SoundUnit, UnitError, UnitKind};

/// Constructs a unit from its options.
pub type Constructor = fn(&UnitOptions) -> Result<Box<dyn SoundUnit>, UnitError>;

/// Construction options. Which options a class reads is up to the class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOptions {
    /// A sample file for sample backed classes.
    pub file: Option<PathBuf>,
    /// The pitch of the sample file in Hz.
    pub origin_frequency: Option<f32>,
    /// Seed for classes with random output.
    pub seed: Option<u64>,
}

/// A registered unit class.
#[derive(Clone)]
pub struct UnitClass {
    name: &'static str,
    kind: UnitKind,
    description: &'static str,
    constructor: Constructor,
}

impl UnitClass {
    pub fn new(
        name: &'static str,
        kind: UnitKind,
        description: &'static str,
        constructor: Constructor,
    ) -> UnitClass {
        UnitClass {
            name,
            kind,
            description,
            constructor,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Maps class identifiers to unit constructors.
#[derive(Clone, Default)]
pub struct UnitRegistry {
    classes: BTreeMap<&'static str, UnitClass>,
}

impl UnitRegistry {
    /// An empty registry.
    pub fn new() -> UnitRegistry {
        UnitRegistry::default()
    }

    /// A registry holding every built-in class.
    pub fn with_builtins() -> UnitRegistry {
        let mut registry = UnitRegistry::new();
        registry.register(UnitClass::new(
            "sine",
            UnitKind::Instrument,
            "sine tone with short attack and release ramps",
            |_| Ok(Box::new(Sine::new())),
        ));
        registry.register(UnitClass::new(
            "sampler",
            UnitKind::Instrument,
            "re-pitched WAV sample (needs file and origin_frequency)",
            |options| Ok(Box::new(Sampler::from_options(options)?)),
        ));
        registry.register(UnitClass::new(
            "kick",
            UnitKind::Percussion,
            "pitch swept sine drum",
            |_| Ok(Box::new(Kick::new())),
        ));
        registry.register(UnitClass::new(
            "noise",
            UnitKind::Percussion,
            "decaying white noise",
            |options| Ok(Box::new(Noise::new(options.seed.unwrap_or_default()))),
        ));
        registry.register(UnitClass::new(
            "oneshot",
            UnitKind::Percussion,
            "unpitched WAV sample (needs file)",
            |options| Ok(Box::new(OneShot::from_options(options)?)),
        ));
        registry.register(UnitClass::new(
            "hummer",
            UnitKind::Singer,
            "vowel shaped hum that follows lyrics",
            |_| Ok(Box::new(Hummer::new())),
        ));
        registry
    }

    /// Adds a class, replacing any class registered under the same name.
    pub fn register(&mut self, class: UnitClass) {
        debug!(class = class.name, kind = %class.kind, "Registering unit class");
        self.classes.insert(class.name, class);
    }

    pub fn get(&self, name: &str) -> Option<&UnitClass> {
        self.classes.get(name)
    }

    /// Constructs a unit of the named class.
    pub fn create(&self, name: &str, options: &UnitOptions) -> Result<Box<dyn SoundUnit>, UnitError> {
        let class = self
            .get(name)
            .ok_or_else(|| UnitError::UnknownClass(name.to_string()))?;
        (class.constructor)(options)
    }

    /// All classes, ordered by name.
    pub fn classes(&self) -> impl Iterator<Item = &UnitClass> {
        self.classes.values()
    }
}

static GLOBAL: OnceLock<UnitRegistry> = OnceLock::new();

/// Populates the process-wide registry with the built-in classes. Calling it
/// again has no effect.
pub fn init() -> &'static UnitRegistry {
    GLOBAL.get_or_init(UnitRegistry::with_builtins)
}

/// The process-wide registry, if `init()` has been called.
pub fn global() -> Option<&'static UnitRegistry> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = UnitRegistry::with_builtins();
        let names: Vec<&str> = registry.classes().map(UnitClass::name).collect();
        assert_eq!(
            names,
            vec!["hummer", "kick", "noise", "oneshot", "sampler", "sine"]
        );
        assert_eq!(registry.get("hummer").unwrap().kind(), UnitKind::Singer);
        assert_eq!(registry.get("noise").unwrap().kind(), UnitKind::Percussion);
    }

    #[test]
    fn test_create() {
        let registry = UnitRegistry::with_builtins();
        let unit = registry.create("sine", &UnitOptions::default()).unwrap();
        assert_eq!(unit.class_name(), "sine");
        assert_eq!(unit.kind(), UnitKind::Instrument);

        assert!(matches!(
            registry.create("tuba", &UnitOptions::default()),
            Err(UnitError::UnknownClass(name)) if name == "tuba"
        ));
    }

    #[test]
    fn test_sampler_requires_options() {
        let registry = UnitRegistry::with_builtins();
        assert!(matches!(
            registry.create("sampler", &UnitOptions::default()),
            Err(UnitError::MissingOption { option: "file", .. })
        ));
        assert!(matches!(
            registry.create("oneshot", &UnitOptions::default()),
            Err(UnitError::MissingOption { option: "file", .. })
        ));
    }

    #[test]
    fn test_register_custom_class() {
        let mut registry = UnitRegistry::new();
        registry.register(UnitClass::new(
            "quiet",
            UnitKind::Instrument,
            "a sine at half volume",
            |_| {
                let mut sine = Sine::new();
                sine.tune("volume 0.5")?;
                Ok(Box::new(sine))
            },
        ));
        assert!(registry.create("quiet", &UnitOptions::default()).is_ok());
        assert!(registry.get("sine").is_none());
    }

    #[test]
    fn test_global_init() {
        let registry = init();
        assert!(registry.get("kick").is_some());
        assert!(std::ptr::eq(registry, global().unwrap()));
        assert!(std::ptr::eq(registry, init()));
    }
}
