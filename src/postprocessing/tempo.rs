use crate::postprocessing::note_events::NoteEvent;

/// A note event with its timing converted to MIDI ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickedNote {
    pub start_tick: u32,
    pub duration_ticks: u32,
    pub pitch: u8,
    pub velocity: u8,
}

/// Convert seconds to MIDI ticks at the given tempo and resolution, rounding
/// half-up.
///
/// # Arguments
///
/// * `seconds` - Time span in seconds.
/// * `bpm` - Tempo in beats per minute.
/// * `ticks_per_beat` - Tick resolution of one beat.
///
/// # Returns
///
/// * The corresponding tick count.
pub fn seconds_to_ticks(seconds: f32, bpm: u32, ticks_per_beat: u16) -> u32 {
    let ticks_per_second = bpm as f64 / 60.0 * ticks_per_beat as f64;
    (seconds as f64 * ticks_per_second).round() as u32
}

/// Convert every note's start and duration from seconds to ticks.
///
/// A non-zero duration never collapses to zero ticks: rounding that would
/// produce an empty note is clamped to one tick.
pub fn map_to_ticks(notes: &[NoteEvent], bpm: u32, ticks_per_beat: u16) -> Vec<TickedNote> {
    notes
        .iter()
        .map(|note| {
            let duration_ticks = seconds_to_ticks(note.duration_seconds, bpm, ticks_per_beat);
            TickedNote {
                start_tick: seconds_to_ticks(note.start_seconds, bpm, ticks_per_beat),
                duration_ticks: if note.duration_seconds > 0.0 {
                    duration_ticks.max(1)
                } else {
                    duration_ticks
                },
                pitch: note.pitch,
                velocity: note.velocity,
            }
        })
        .collect()
}
