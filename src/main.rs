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
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use tracing::info;

use scoreline::config;
use scoreline::unit::registry;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A sequence renderer and mixer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders a score and mixes every track down to a WAV file.
    Render {
        /// The path to the score.
        score: PathBuf,
        /// The WAV file to write the mix to.
        output: PathBuf,
        /// A directory to also write each track buffer to, as <INDEX>.wav.
        #[arg[short, long]]
        tracks_dir: Option<PathBuf>,
    },
    /// Lists the available unit classes.
    Units {},
    /// Prints how long each track of a score plays.
    Duration {
        /// The path to the score.
        score: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let registry = registry::init();

    match cli.command {
        Commands::Render {
            score,
            output,
            tracks_dir,
        } => {
            let document = config::load_score(&score)?.render(registry)?;

            if let Some(tracks_dir) = tracks_dir {
                fs::create_dir_all(&tracks_dir)?;
                for index in 0..document.buffer_count() {
                    let path = tracks_dir.join(format!("{}.wav", index));
                    document.track_to_wav(index, &path)?;
                    info!(track = index, path = ?path, "Wrote track");
                }
            }

            document.mix_down(&output)?;
            println!(
                "Mixed {} tracks into {}.",
                document.buffer_count(),
                output.display()
            );
        }
        Commands::Units {} => {
            println!("Units:");
            for class in registry.classes() {
                println!(
                    "- {} ({}): {}",
                    class.name(),
                    class.kind(),
                    class.description()
                );
            }
        }
        Commands::Duration { score } => {
            let durations = config::load_score(&score)?.durations()?;

            if durations.is_empty() {
                println!("No tracks found in {}.", score.display());
                return Ok(());
            }

            println!("Tracks (count: {}):", durations.len());
            for duration in durations.iter() {
                println!(
                    "- {}: {} ticks, {:.3}s",
                    duration.track,
                    duration.ticks,
                    duration.duration.as_secs_f64()
                );
            }
        }
    }

    Ok(())
}
