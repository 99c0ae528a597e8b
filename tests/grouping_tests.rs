//! Validation tests for cross-frame note grouping.

use audio2midi::postprocessing::candidates::PitchCandidate;
use audio2midi::postprocessing::helpers::midi_to_hz;
use audio2midi::postprocessing::note_events::group_notes;
use audio2midi::Config;

const FRAME_PERIOD: f32 = 0.01;

fn cand(frequency: f32, magnitude: f32, frame: usize) -> PitchCandidate {
    PitchCandidate {
        frequency,
        magnitude,
        frame,
    }
}

/// Build a frame sequence of `n_frames` where `track` lists, per frame, the
/// (frequency, magnitude) pairs present in it.
fn build_frames(n_frames: usize, track: &[(usize, f32, f32)]) -> Vec<Vec<PitchCandidate>> {
    let mut frames = vec![Vec::new(); n_frames];
    for &(frame, frequency, magnitude) in track {
        frames[frame].push(cand(frequency, magnitude, frame));
    }
    frames
}

/// A constant tone across an inclusive frame range.
fn tone(frames: std::ops::RangeInclusive<usize>, frequency: f32) -> Vec<(usize, f32, f32)> {
    frames.map(|f| (f, frequency, 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_track_yields_one_note() {
        let frames = build_frames(40, &tone(5..=25, 440.0));
        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch, 69);
        assert!((notes[0].start_seconds - 0.05).abs() < 1e-6);
        assert!((notes[0].duration_seconds - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_duration_exactly_at_minimum_is_retained() {
        // 10 frame spans = 0.10 s, the default minimum.
        let frames = build_frames(20, &tone(0..=10, 440.0));
        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_duration_below_minimum_is_dropped() {
        let frames = build_frames(20, &tone(0..=9, 440.0));
        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_single_dropped_frame_within_gap_bridges_note() {
        let mut track = tone(0..=20, 440.0);
        track.retain(|&(frame, _, _)| frame != 10);
        let frames = build_frames(30, &track);

        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());
        assert_eq!(notes.len(), 1);
        assert!((notes[0].duration_seconds - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_gap_beyond_tolerance_splits_note() {
        let mut track = tone(0..=40, 440.0);
        // Default max gap is 2 frames; drop 5 in a row.
        track.retain(|&(frame, _, _)| !(15..20).contains(&frame));
        let frames = build_frames(50, &track);

        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());
        assert_eq!(notes.len(), 2);
        assert!((notes[0].start_seconds - 0.0).abs() < 1e-6);
        assert!((notes[1].start_seconds - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_simultaneous_tracks_are_tracked_independently() {
        let mut track = tone(0..=30, midi_to_hz(64.0));
        track.extend(tone(0..=30, midi_to_hz(68.0)));
        let frames = build_frames(40, &track);

        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());
        assert_eq!(notes.len(), 2);

        let pitches: Vec<u8> = notes.iter().map(|n| n.pitch).collect();
        assert!(pitches.contains(&64)); // E4
        assert!(pitches.contains(&68)); // G#4
    }

    #[test]
    fn test_frequency_wobble_within_tolerance_stays_one_note() {
        let track: Vec<(usize, f32, f32)> = (0..=20)
            .map(|f| {
                let wobble = if f % 2 == 0 { 1.0 } else { -1.0 };
                (f, 440.0 + 4.0 * wobble, 1.0)
            })
            .collect();
        let frames = build_frames(30, &track);

        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch, 69);
    }

    #[test]
    fn test_velocity_scales_between_floor_and_ceiling() {
        let mut track: Vec<(usize, f32, f32)> = tone(0..=20, 220.0);
        track.extend((0..=20).map(|f| (f, 440.0, 0.5)));
        let frames = build_frames(30, &track);

        let config = Config::default();
        let notes = group_notes(&frames, FRAME_PERIOD, &config);
        assert_eq!(notes.len(), 2);

        let loud = notes.iter().find(|n| n.pitch == 57).unwrap();
        let quiet = notes.iter().find(|n| n.pitch == 69).unwrap();
        assert_eq!(loud.velocity, config.velocity_ceiling);
        assert!(quiet.velocity < loud.velocity);
        assert!(quiet.velocity >= config.velocity_floor);
    }

    #[test]
    fn test_extreme_register_pitch_is_clamped() {
        let frames = build_frames(30, &tone(0..=20, 30000.0));
        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].pitch, 127);
    }

    #[test]
    fn test_timing_follows_frame_position_not_frame_field() {
        // A candidate whose frame field disagrees with its position in the
        // input must neither move the note in time nor panic the grouper.
        let mut frames = vec![Vec::new(); 30];
        for frame in frames.iter_mut().take(21) {
            frame.push(cand(440.0, 1.0, 99));
        }

        let notes = group_notes(&frames, FRAME_PERIOD, &Config::default());
        assert_eq!(notes.len(), 1);
        assert!((notes[0].start_seconds - 0.0).abs() < 1e-6);
        assert!((notes[0].duration_seconds - 0.20).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input_yields_no_notes() {
        let notes = group_notes(&[], FRAME_PERIOD, &Config::default());
        assert!(notes.is_empty());

        let silent = vec![Vec::new(); 50];
        let notes = group_notes(&silent, FRAME_PERIOD, &Config::default());
        assert!(notes.is_empty());
    }
}
