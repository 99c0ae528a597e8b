//! Validation tests for the MIDI event emitter and file serialization.

use audio2midi::postprocessing::midi::{
    emit_events, generate_midi_file_data, MidiEventKind,
};
use audio2midi::postprocessing::tempo::TickedNote;
use audio2midi::TranscribeError;

fn note(start_tick: u32, duration_ticks: u32, pitch: u8) -> TickedNote {
    TickedNote {
        start_tick,
        duration_ticks,
        pitch,
        velocity: 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_note_emits_on_then_off() {
        let events = emit_events(&[note(96, 192, 60)]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, MidiEventKind::NoteOn);
        assert_eq!(events[0].tick, 96);
        assert_eq!(events[1].kind, MidiEventKind::NoteOff);
        assert_eq!(events[1].tick, 288);
    }

    #[test]
    fn test_note_off_precedes_note_on_at_equal_tick() {
        // First note releases exactly where the second starts.
        let events = emit_events(&[note(0, 480, 60), note(480, 480, 62)]);

        assert_eq!(events.len(), 4);
        assert_eq!(events[1].tick, 480);
        assert_eq!(events[1].kind, MidiEventKind::NoteOff);
        assert_eq!(events[1].pitch, 60);
        assert_eq!(events[2].tick, 480);
        assert_eq!(events[2].kind, MidiEventKind::NoteOn);
        assert_eq!(events[2].pitch, 62);
    }

    #[test]
    fn test_ticks_are_monotonically_non_decreasing() {
        let events = emit_events(&[
            note(960, 240, 64),
            note(0, 480, 60),
            note(480, 960, 67),
            note(0, 1920, 48),
        ]);

        assert_eq!(events.len(), 8);
        for pair in events.windows(2) {
            assert!(pair[0].tick <= pair[1].tick);
        }
    }

    #[test]
    fn test_empty_note_list_yields_empty_stream() {
        assert!(emit_events(&[]).is_empty());
    }

    #[test]
    fn test_generated_file_round_trips_through_midly() {
        let events = emit_events(&[note(0, 480, 60), note(480, 480, 64)]);
        let data = generate_midi_file_data(&events, 120, 480).unwrap();

        let smf = midly::Smf::parse(&data).unwrap();
        assert_eq!(
            smf.header.timing,
            midly::Timing::Metrical(midly::num::u15::new(480))
        );
        assert_eq!(smf.tracks.len(), 1);

        let track = &smf.tracks[0];
        // Tempo meta + 4 note events + end of track.
        assert_eq!(track.len(), 6);
        assert!(matches!(
            track[0].kind,
            midly::TrackEventKind::Meta(midly::MetaMessage::Tempo(t)) if t.as_int() == 500_000
        ));
        assert!(matches!(
            track[track.len() - 1].kind,
            midly::TrackEventKind::Meta(midly::MetaMessage::EndOfTrack)
        ));

        // Delta times reconstruct the absolute ticks.
        let mut tick = 0u32;
        let mut note_ons = 0;
        for event in track {
            tick += event.delta.as_int();
            if let midly::TrackEventKind::Midi {
                message: midly::MidiMessage::NoteOn { .. },
                ..
            } = event.kind
            {
                note_ons += 1;
            }
        }
        assert_eq!(note_ons, 2);
        assert_eq!(tick, 960);
    }

    #[test]
    fn test_slowest_representable_tempo_round_trips() {
        // 4 BPM is the slowest tempo that fits the 24-bit tempo meta.
        let events = emit_events(&[note(0, 480, 60)]);
        let data = generate_midi_file_data(&events, 4, 480).unwrap();

        let smf = midly::Smf::parse(&data).unwrap();
        assert!(matches!(
            smf.tracks[0][0].kind,
            midly::TrackEventKind::Meta(midly::MetaMessage::Tempo(t)) if t.as_int() == 15_000_000
        ));
    }

    #[test]
    fn test_sub_four_bpm_is_rejected_not_truncated() {
        // 2 BPM would need 30_000_000 us per beat, beyond the 24-bit meta;
        // masking it would write a wrong tempo without any error.
        let events = emit_events(&[note(0, 480, 60)]);
        for bpm in [1, 2, 3] {
            assert!(matches!(
                generate_midi_file_data(&events, bpm, 480),
                Err(TranscribeError::Config(_))
            ));
        }
    }
}
