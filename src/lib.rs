//! Polyphonic audio to MIDI transcription.
//!
//! Converts per-frame pitch/magnitude candidates from a spectral analysis
//! into a clean, time-ordered note-on/note-off stream: magnitude filtering,
//! harmonic suppression, cross-frame note grouping and tick mapping. The
//! whole pipeline is a pure function of the input frames and a [`Config`].

use log::{debug, info};

pub mod config;
pub mod constants;
pub mod error;
pub mod spectral;

pub mod preprocessing {
    pub mod load_audio;
}

pub mod postprocessing {
    pub mod candidates;
    pub mod helpers;
    pub mod midi;
    pub mod note_events;
    pub mod tempo;
}

pub use config::{Config, ThresholdMode};
pub use error::{Result, TranscribeError};

use postprocessing::candidates::{filter_frames, PitchCandidate};
use postprocessing::midi::{emit_events, generate_midi_file_data, MidiEvent};
use postprocessing::note_events::group_notes;
use postprocessing::tempo::map_to_ticks;

/// Run the core pipeline over already-extracted pitch candidates.
///
/// # Arguments
///
/// * `frames` - Per-frame candidate lists, indexed by frame.
/// * `frame_period` - Seconds covered by one frame (hop / sample rate).
/// * `config` - Pipeline configuration, validated before any processing.
///
/// # Returns
///
/// * The ordered MIDI event stream. Empty input, or input where nothing
///   survives filtering, yields an empty stream.
pub fn transcribe_frames(
    frames: &[Vec<PitchCandidate>],
    frame_period: f32,
    config: &Config,
) -> Result<Vec<MidiEvent>> {
    config.validate()?;

    let fundamentals = filter_frames(frames, config)?;
    debug!(
        "harmonic suppression kept {} candidates across {} frames",
        fundamentals.iter().map(Vec::len).sum::<usize>(),
        fundamentals.len()
    );

    let notes = group_notes(&fundamentals, frame_period, config);
    debug!("grouped {} note events", notes.len());

    let ticked = map_to_ticks(&notes, config.bpm, config.ticks_per_beat);
    Ok(emit_events(&ticked))
}

/// Transcribe a WAV file to MIDI file data.
///
/// # Arguments
///
/// * `path` - Path to the input WAV file.
/// * `config` - Pipeline configuration.
///
/// # Returns
///
/// * The encoded MIDI file bytes.
pub fn transcribe_file<P: AsRef<std::path::Path>>(path: P, config: &Config) -> Result<Vec<u8>> {
    config.validate()?;

    let (samples, sample_rate) = preprocessing::load_audio::load_audio(path)?;
    info!(
        "loaded {} samples at {} Hz ({:.2} s)",
        samples.len(),
        sample_rate,
        samples.len() as f32 / sample_rate as f32
    );

    let spectrogram = spectral::stft(&samples, config.fft_window_size, config.fft_hop, sample_rate);
    let frames =
        spectral::extract_pitch_candidates(&spectrogram, config.min_frequency, config.max_frequency);
    info!("extracted pitch candidates for {} frames", frames.len());

    let events = transcribe_frames(&frames, spectrogram.frame_period(), config)?;
    info!("emitting {} MIDI events", events.len());

    generate_midi_file_data(&events, config.bpm, config.ticks_per_beat)
}
