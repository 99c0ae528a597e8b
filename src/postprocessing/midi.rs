use midly::num::u15;
use midly::num::u24;
use midly::num::u28;
use midly::num::u7;
use midly::Format;
use midly::Header;
use midly::MetaMessage;
use midly::MidiMessage;
use midly::Smf;
use midly::Timing;
use midly::Track;
use midly::TrackEvent;
use midly::TrackEventKind;

use std::io::Cursor;

use crate::error::{Result, TranscribeError};
use crate::postprocessing::tempo::TickedNote;

/// The two event kinds the emitter produces. `NoteOff` sorts before `NoteOn`
/// so that at equal ticks a releasing note can never mask or re-trigger a
/// starting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MidiEventKind {
    NoteOff,
    NoteOn,
}

/// One note-on or note-off at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEvent {
    pub tick: u32,
    pub kind: MidiEventKind,
    pub pitch: u8,
    pub velocity: u8,
}

/// Expand ticked notes into a time-ordered event stream.
///
/// # Arguments
///
/// * `notes` - Notes with tick timing.
///
/// # Returns
///
/// * All note-on and note-off events sorted by tick, note-offs first at equal
///   ticks. Ticks are monotonically non-decreasing.
pub fn emit_events(notes: &[TickedNote]) -> Vec<MidiEvent> {
    let mut events: Vec<MidiEvent> = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        events.push(MidiEvent {
            tick: note.start_tick,
            kind: MidiEventKind::NoteOn,
            pitch: note.pitch,
            velocity: note.velocity,
        });
        events.push(MidiEvent {
            tick: note.start_tick + note.duration_ticks,
            kind: MidiEventKind::NoteOff,
            pitch: note.pitch,
            velocity: note.velocity,
        });
    }
    events.sort_by_key(|event| (event.tick, event.kind));
    events
}

/// Generate MIDI file data from an ordered event stream.
///
/// # Arguments
///
/// * `events` - Events from `emit_events`.
/// * `bpm` - Tempo written as the track's tempo meta event.
/// * `ticks_per_beat` - Tick resolution of the file header.
///
/// # Returns
///
/// * A vector of bytes representing the MIDI file.
pub fn generate_midi_file_data(
    events: &[MidiEvent],
    bpm: u32,
    ticks_per_beat: u16,
) -> Result<Vec<u8>> {
    // Tempos slower than 4 BPM do not fit the 24-bit tempo meta and would
    // be bit-masked by `u24::new` into a wrong tempo.
    if bpm < 4 {
        return Err(TranscribeError::Config("bpm must be >= 4".to_string()));
    }

    let mut smf = Smf::new(Header {
        format: Format::SingleTrack,
        timing: Timing::Metrical(u15::new(ticks_per_beat)),
    });
    let mut track = Track::new();

    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(60_000_000 / bpm))),
    });

    let mut previous_tick = 0;
    for event in events {
        let key = u7::new(event.pitch);
        let vel = u7::new(event.velocity);
        let message = match event.kind {
            MidiEventKind::NoteOn => MidiMessage::NoteOn { key, vel },
            MidiEventKind::NoteOff => MidiMessage::NoteOff { key, vel },
        };
        track.push(TrackEvent {
            delta: u28::new(event.tick - previous_tick),
            kind: TrackEventKind::Midi {
                channel: 0.into(),
                message,
            },
        });
        previous_tick = event.tick;
    }

    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    let mut buffer = Vec::new();
    smf.write_std(&mut Cursor::new(&mut buffer))?;

    Ok(buffer)
}
