#![deny(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use automaton_grid::{DEFAULT_SIZE, DEFAULT_STEPS};
use automaton_grid::{LifeLikeRule, NeighborhoodKind, SimulationConfig};
use clap::Parser;
use frame_export::{DEFAULT_FRAME_RATE, VideoEncoder, save_png};
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_IMAGE_FILE: &str = "cellular_automata.png";
const DEFAULT_VIDEO_FILE: &str = "cellular_automata.mp4";

/// Runs a cellular automaton on a wrap-around grid and saves the final
/// generation as a PNG, or every generation as a video.
#[derive(Debug, Parser)]
#[command(author, version, about, allow_negative_numbers = true)]
struct CliArgs {
    /// Cells per side of the square grid.
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: i64,
    /// Number of generations to run.
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    steps: i64,
    /// Save every generation as a video instead of the final generation as an image.
    #[arg(long)]
    video: bool,
    /// Output file [default: cellular_automata.png, or cellular_automata.mp4 with --video].
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Neighborhood counted by the rule: moore or von-neumann.
    #[arg(long, default_value_t = NeighborhoodKind::Moore)]
    neighborhood: NeighborhoodKind,
    /// Birth/survival rule.
    #[arg(long, default_value_t = LifeLikeRule::conway())]
    rule: LifeLikeRule,
    /// Seed for the initial grid. A fresh random seed is used if omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Worker threads per step [default: one per CPU].
    #[arg(long)]
    workers: Option<usize>,
    /// Video frames per second.
    #[arg(
        long,
        default_value_t = DEFAULT_FRAME_RATE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    fps: u32,
}

impl CliArgs {
    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            size: self.size,
            steps: self.steps,
            neighborhood: self.neighborhood,
            seed: self.seed,
            workers: self.workers,
        }
    }

    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let default = if self.video {
                DEFAULT_VIDEO_FILE
            } else {
                DEFAULT_IMAGE_FILE
            };
            PathBuf::from(default)
        })
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();
    match run(&args) {
        Ok(message) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<String> {
    let config = args.simulation_config();
    let mut simulation = config
        .build(args.rule)
        .context("invalid simulation parameters")?;
    let output = args.output_path();

    if args.video {
        let frames = simulation.run(config.steps)?;
        VideoEncoder::default()
            .with_frame_rate(args.fps)
            .encode(&frames, &output)
            .context("creating video")?;
        Ok(format!("Video saved as {}", output.display()))
    } else {
        // Only the final generation is rendered. With zero steps that is the
        // initial grid.
        simulation.advance(config.steps)?;
        let last = simulation.engine().snapshot();
        save_png(&last, &output).context("saving final image")?;
        Ok(format!("Final state saved as {}", output.display()))
    }
}
