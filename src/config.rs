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
use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use tracing::info;

mod error;
mod score;
mod track;
mod unit;

pub use error::ConfigError;
pub use score::{Score, TrackDuration};

/// Loads a score from a YAML file. Sample files named by the score are
/// resolved relative to the score's directory.
pub fn load_score(path: &Path) -> Result<Score, ConfigError> {
    let mut score: Score = Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .build()?
        .try_deserialize()?;
    score.validate()?;
    score.set_base_dir(
        path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    );
    info!(
        path = ?path,
        tracks = score.track_count(),
        tempo = score.tempo(),
        "Loaded score"
    );
    Ok(score)
}

/// Parses a score from YAML text, resolving sample files against `base_dir`.
pub fn parse_score(yaml: &str, base_dir: PathBuf) -> Result<Score, ConfigError> {
    let mut score: Score = Config::builder()
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?
        .try_deserialize()?;
    score.validate()?;
    score.set_base_dir(base_dir);
    Ok(score)
}
