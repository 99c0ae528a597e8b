use crate::config::Config;
use crate::postprocessing::candidates::PitchCandidate;
use crate::postprocessing::helpers::{frame_to_time, hz_to_midi_pitch};

/// A finished, duration-filtered note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub pitch: u8,
    pub start_seconds: f32,
    pub duration_seconds: f32,
    pub velocity: u8,
}

/// Working state for one note currently being tracked. The frequency is a
/// magnitude-weighted running estimate over every matched candidate.
#[derive(Debug, Clone, Copy)]
struct ActiveNote {
    frequency: f32,
    start_frame: usize,
    last_frame: usize,
    peak_magnitude: f32,
    weight: f32,
}

impl ActiveNote {
    // Timing comes from the frame's position in the input, so a stale
    // `frame` field on a candidate cannot move a note in time.
    fn start(candidate: &PitchCandidate, frame: usize) -> Self {
        Self {
            frequency: candidate.frequency,
            start_frame: frame,
            last_frame: frame,
            peak_magnitude: candidate.magnitude,
            weight: candidate.magnitude,
        }
    }

    fn extend(&mut self, candidate: &PitchCandidate, frame: usize) {
        let weight = self.weight + candidate.magnitude;
        if weight > 0.0 {
            self.frequency = (self.frequency * self.weight
                + candidate.frequency * candidate.magnitude)
                / weight;
        }
        self.weight = weight;
        self.last_frame = frame;
        self.peak_magnitude = self.peak_magnitude.max(candidate.magnitude);
    }
}

/// Merge per-frame fundamentals into continuous note events.
///
/// Every candidate of a frame is matched against the currently active notes:
/// the nearest note within the relative frequency tolerance wins, ties going
/// to the earliest-started note, and each note absorbs at most one candidate
/// per frame. An unmatched candidate starts a new active note, which is how
/// chords come out as parallel events. A note closes once it has gone
/// unmatched for more than `max_gap_frames` consecutive frames, or at the end
/// of the input; shorter gaps are bridged so one or two dropped detections do
/// not split a note in half.
///
/// # Arguments
///
/// * `frames` - Per-frame fundamentals from the harmonic suppressor.
/// * `frame_period` - Seconds covered by one frame.
/// * `config` - Pipeline configuration.
///
/// # Returns
///
/// * Finished notes with duration >= `min_note_duration` (boundary
///   inclusive), ordered by start time.
pub fn group_notes(
    frames: &[Vec<PitchCandidate>],
    frame_period: f32,
    config: &Config,
) -> Vec<NoteEvent> {
    let mut active: Vec<ActiveNote> = Vec::new();
    let mut finished: Vec<ActiveNote> = Vec::new();

    for (frame_idx, candidates) in frames.iter().enumerate() {
        // Expire notes whose silent run has outlasted the gap allowance. An
        // empty frame contributes nothing but this aging step.
        let mut still_active = Vec::with_capacity(active.len());
        for note in active.drain(..) {
            if frame_idx - note.last_frame > config.max_gap_frames + 1 {
                finished.push(note);
            } else {
                still_active.push(note);
            }
        }
        active = still_active;

        let mut claimed = vec![false; active.len()];
        let mut started: Vec<ActiveNote> = Vec::new();
        for candidate in candidates {
            let matched = active
                .iter()
                .enumerate()
                .filter(|(idx, note)| {
                    !claimed[*idx]
                        && (candidate.frequency - note.frequency).abs()
                            <= config.frequency_match_tolerance * note.frequency
                })
                .min_by(|(_, a), (_, b)| {
                    let da = (candidate.frequency - a.frequency).abs();
                    let db = (candidate.frequency - b.frequency).abs();
                    da.partial_cmp(&db)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(a.start_frame.cmp(&b.start_frame))
                })
                .map(|(idx, _)| idx);

            match matched {
                Some(idx) => {
                    claimed[idx] = true;
                    active[idx].extend(candidate, frame_idx);
                }
                None => started.push(ActiveNote::start(candidate, frame_idx)),
            }
        }
        active.append(&mut started);
    }

    // End of input closes everything still sounding.
    finished.append(&mut active);

    // The duration filter compares frame spans, not accumulated seconds:
    // 10 frames of 0.01 s sum to 0.099999998 in f32 and would miss an
    // inclusive 0.1 s bound. The small slack absorbs the division error for
    // minima that are an exact multiple of the frame period.
    let min_span_frames = ((config.min_note_duration as f64 / frame_period as f64) - 1e-6)
        .ceil()
        .max(0.0) as usize;
    let mut kept: Vec<ActiveNote> = finished
        .into_iter()
        .filter(|note| note.last_frame - note.start_frame >= min_span_frames)
        .collect();
    kept.sort_by_key(|note| note.start_frame);

    let loudest = kept
        .iter()
        .map(|note| note.peak_magnitude)
        .fold(0.0f32, f32::max);

    kept.iter()
        .map(|note| NoteEvent {
            pitch: hz_to_midi_pitch(note.frequency),
            start_seconds: frame_to_time(note.start_frame, frame_period),
            duration_seconds: (note.last_frame - note.start_frame) as f32 * frame_period,
            velocity: scale_velocity(note.peak_magnitude, loudest, config),
        })
        .collect()
}

/// Map a note's peak magnitude into the configured velocity range, relative
/// to the loudest note of the piece.
fn scale_velocity(peak: f32, loudest: f32, config: &Config) -> u8 {
    if loudest <= 0.0 {
        return config.velocity_floor;
    }
    let span = (config.velocity_ceiling - config.velocity_floor) as f32;
    let scaled = config.velocity_floor as f32 + (peak / loudest).clamp(0.0, 1.0) * span;
    scaled.round() as u8
}
