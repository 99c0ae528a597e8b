// Analysis
pub const AUDIO_SAMPLE_RATE: usize = 22050;
pub const FFT_WINDOW_SIZE: usize = 2048;
pub const FFT_HOP: usize = 256;

// Pitch search band, C2..C7
pub const MIN_PITCH_HZ: f32 = 65.41;
pub const MAX_PITCH_HZ: f32 = 2093.0;

// MIDI conversion
pub const DEFAULT_BPM: u32 = 120;
pub const TICKS_PER_BEAT: u16 = 480;
pub const MIDI_PITCH_MAX: u8 = 127;
