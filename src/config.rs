use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BPM, FFT_HOP, FFT_WINDOW_SIZE, MAX_PITCH_HZ, MIDI_PITCH_MAX, MIN_PITCH_HZ,
    TICKS_PER_BEAT,
};
use crate::error::{Result, TranscribeError};

/// How the magnitude threshold is interpreted by the candidate filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Threshold is an absolute magnitude floor.
    Absolute,
    /// Threshold is a fraction of the loudest candidate in the frame.
    RelativeToFrameMax,
}

/// Tunables for the whole pipeline, validated once before processing starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Magnitude threshold for keeping a pitch candidate.
    pub magnitude_threshold: f32,
    pub threshold_mode: ThresholdMode,
    /// Relative tolerance for treating a frequency ratio as 2, 3/2 or 5/4.
    pub harmonic_tolerance: f32,
    /// Relative tolerance for matching a candidate to an active note.
    pub frequency_match_tolerance: f32,
    /// Number of consecutive frames a note may go undetected before it closes.
    pub max_gap_frames: usize,
    /// Notes shorter than this are discarded, in seconds.
    pub min_note_duration: f32,
    /// Tempo of the output file, at least 4 BPM.
    pub bpm: u32,
    pub ticks_per_beat: u16,
    /// Velocity assigned to the quietest note.
    pub velocity_floor: u8,
    /// Velocity assigned to the loudest note.
    pub velocity_ceiling: u8,
    /// Pitch search band for candidate extraction, in Hz.
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub fft_window_size: usize,
    pub fft_hop: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            magnitude_threshold: 0.5,
            threshold_mode: ThresholdMode::Absolute,
            harmonic_tolerance: 0.05,
            frequency_match_tolerance: 0.03,
            max_gap_frames: 2,
            min_note_duration: 0.1,
            bpm: DEFAULT_BPM,
            ticks_per_beat: TICKS_PER_BEAT,
            velocity_floor: 32,
            velocity_ceiling: MIDI_PITCH_MAX,
            min_frequency: MIN_PITCH_HZ,
            max_frequency: MAX_PITCH_HZ,
            fft_window_size: FFT_WINDOW_SIZE,
            fft_hop: FFT_HOP,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file, merged over the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&data)
            .map_err(|e| TranscribeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter against its documented range.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the configuration is usable, otherwise the first offending
    ///   parameter as a `TranscribeError::Config`.
    pub fn validate(&self) -> Result<()> {
        if !self.magnitude_threshold.is_finite() || self.magnitude_threshold <= 0.0 {
            return Err(invalid("magnitude_threshold must be > 0"));
        }
        if self.threshold_mode == ThresholdMode::RelativeToFrameMax
            && self.magnitude_threshold > 1.0
        {
            return Err(invalid(
                "magnitude_threshold must be <= 1 when relative to the frame maximum",
            ));
        }
        if !self.harmonic_tolerance.is_finite()
            || self.harmonic_tolerance <= 0.0
            || self.harmonic_tolerance >= 1.0
        {
            return Err(invalid("harmonic_tolerance must be in (0, 1)"));
        }
        if !self.frequency_match_tolerance.is_finite()
            || self.frequency_match_tolerance <= 0.0
            || self.frequency_match_tolerance >= 1.0
        {
            return Err(invalid("frequency_match_tolerance must be in (0, 1)"));
        }
        if self.max_gap_frames == 0 {
            return Err(invalid("max_gap_frames must be >= 1"));
        }
        if !self.min_note_duration.is_finite() || self.min_note_duration <= 0.0 {
            return Err(invalid("min_note_duration must be > 0"));
        }
        // The SMF tempo meta event is 24-bit; 60_000_000 / bpm must fit.
        if self.bpm < 4 {
            return Err(invalid("bpm must be >= 4"));
        }
        if self.ticks_per_beat == 0 || self.ticks_per_beat > 0x7FFF {
            return Err(invalid("ticks_per_beat must be in 1..=32767"));
        }
        if self.velocity_floor > self.velocity_ceiling {
            return Err(invalid("velocity_floor must be <= velocity_ceiling"));
        }
        if self.velocity_ceiling > MIDI_PITCH_MAX {
            return Err(invalid("velocity_ceiling must be <= 127"));
        }
        if !self.min_frequency.is_finite() || self.min_frequency <= 0.0 {
            return Err(invalid("min_frequency must be > 0"));
        }
        if !self.max_frequency.is_finite() || self.max_frequency <= self.min_frequency {
            return Err(invalid("max_frequency must be > min_frequency"));
        }
        if self.fft_window_size < 2 || !self.fft_window_size.is_power_of_two() {
            return Err(invalid("fft_window_size must be a power of two >= 2"));
        }
        if self.fft_hop == 0 || self.fft_hop > self.fft_window_size {
            return Err(invalid("fft_hop must be in 1..=fft_window_size"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> TranscribeError {
    TranscribeError::Config(message.to_string())
}
