use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use audio2midi::{transcribe_file, Config};

/// Convert a polyphonic audio recording into a MIDI file.
#[derive(Parser)]
#[command(name = "audio2midi", version)]
struct Cli {
    /// Input audio file (WAV)
    input: PathBuf,

    /// Output MIDI file
    #[arg(short, long, default_value = "output.mid")]
    output: PathBuf,

    /// Custom configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tempo of the output file in beats per minute
    #[arg(long)]
    bpm: Option<u32>,

    /// Magnitude threshold for pitch candidates
    #[arg(long)]
    threshold: Option<f32>,

    /// Minimum note duration in seconds
    #[arg(long)]
    min_duration: Option<f32>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> audio2midi::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bpm) = cli.bpm {
        config.bpm = bpm;
    }
    if let Some(threshold) = cli.threshold {
        config.magnitude_threshold = threshold;
    }
    if let Some(min_duration) = cli.min_duration {
        config.min_note_duration = min_duration;
    }
    config.validate()?;

    let midi_data = transcribe_file(&cli.input, &config)?;

    let mut file = File::create(&cli.output)?;
    file.write_all(&midi_data)?;
    info!("wrote {} bytes to {}", midi_data.len(), cli.output.display());

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
