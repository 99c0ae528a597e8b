use crate::constants::MIDI_PITCH_MAX;

/// Converts a frequency in Hz to the corresponding fractional MIDI pitch.
///
/// # Arguments
///
/// * `hz` - A frequency in Hz.
///
/// # Returns
///
/// * The corresponding MIDI pitch.
pub fn hz_to_midi(hz: f32) -> f32 {
    12.0 * (hz.log2() - 440.0f32.log2()) + 69.0
}

/// Converts a MIDI pitch to the corresponding frequency in Hz.
///
/// # Arguments
///
/// * `midi` - A MIDI pitch.
///
/// # Returns
///
/// * The corresponding frequency in Hz.
pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * 2.0f32.powf((midi - 69.0) / 12.0)
}

/// Rounds a frequency to the nearest MIDI pitch number, clamped to 0..=127.
pub fn hz_to_midi_pitch(hz: f32) -> u8 {
    hz_to_midi(hz).round().clamp(0.0, MIDI_PITCH_MAX as f32) as u8
}

/// Converts an analysis frame index to seconds.
///
/// # Arguments
///
/// * `frame` - The analysis frame index.
/// * `frame_period` - Seconds covered by one hop (hop length / sample rate).
///
/// # Returns
///
/// * The time the frame maps to in seconds.
pub fn frame_to_time(frame: usize, frame_period: f32) -> f32 {
    frame as f32 * frame_period
}
