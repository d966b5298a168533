// MIDI output from composition results.
//
// Converts a CompositionResult into a Standard MIDI File (SMF Format 1).
// Track 0 carries the realized tempo, a 4/4 time signature and the key
// signature derived from the first chord's root and the mood's scale kind.
// Each role then gets its own track with a name, a General MIDI program
// change from the style's instrumentation, and its notes. Drums go on
// channel 10 (index 9) and get no program change.
//
// Note times are seconds; they map to ticks through the same rounded tempo
// written to the tempo track, so the file plays back at the composed timing.
//
// Uses the `midly` crate for MIDI writing.

use crate::compose::CompositionResult;
use crate::error::ExportError;
use crate::note::{Role, Track as RoleTrack};
use crate::scale::ScaleKind;
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Channel index used for General MIDI percussion.
pub const DRUM_CHANNEL: u8 = 9;

const MAX_DELTA: u32 = (1 << 28) - 1;

/// Sharps (positive) or flats (negative) of the major key on each pitch class.
const MAJOR_KEY_SHARPS: [i8; 12] = [0, -5, 2, -3, 4, -1, 6, 1, -4, 3, -2, 5];

/// Convert a result to MIDI and write it to a file.
pub fn write_midi(result: &CompositionResult, path: &Path) -> Result<(), ExportError> {
    let bytes = to_midi_bytes(result)?;
    std::fs::write(path, &bytes)?;
    Ok(())
}

/// Encode a result as SMF bytes.
pub fn to_midi_bytes(result: &CompositionResult) -> Result<Vec<u8>, ExportError> {
    let smf = result_to_smf(result)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    Ok(buf)
}

/// Microseconds per quarter note for a tempo, clamped to what SMF can hold.
fn tempo_microseconds(tempo_bpm: f64) -> u32 {
    let micros = (60_000_000.0 / tempo_bpm).round();
    if micros.is_finite() {
        micros.clamp(1.0, 0xFF_FFFF as f64) as u32
    } else {
        0xFF_FFFF
    }
}

/// Key signature (sharps/flats, is_minor) for a tonic and scale.
pub fn key_signature(tonic_pitch_class: u8, scale: ScaleKind) -> (i8, bool) {
    let pc = tonic_pitch_class as usize % 12;
    match scale {
        ScaleKind::Major => (MAJOR_KEY_SHARPS[pc], false),
        // Minor keys share the signature of their relative major.
        ScaleKind::Minor => (MAJOR_KEY_SHARPS[(pc + 3) % 12], true),
    }
}

fn channel_for(role: Role) -> u8 {
    match role {
        Role::Drums => DRUM_CHANNEL,
        other => other.index() as u8,
    }
}

fn program_for(result: &CompositionResult, role: Role) -> Option<u8> {
    let instruments = &result.instruments;
    match role {
        Role::Melody => Some(instruments.melody_program),
        Role::Chords => Some(instruments.chord_program),
        Role::Bass => Some(instruments.bass_program),
        Role::Drums => None,
    }
}

fn meta(message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

/// Convert a result to an in-memory SMF.
pub fn result_to_smf(result: &CompositionResult) -> Result<Smf<'static>, ExportError> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let micros = tempo_microseconds(result.tempo_bpm);
    let (sharps, minor) = key_signature(result.tonic_pitch_class, result.scale_kind);
    smf.tracks.push(vec![
        meta(MetaMessage::Tempo(u24::new(micros))),
        meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
        meta(MetaMessage::KeySignature(sharps, minor)),
        meta(MetaMessage::EndOfTrack),
    ]);

    let ticks_per_second = TICKS_PER_QUARTER as f64 * 1_000_000.0 / micros as f64;
    for role in Role::ALL {
        smf.tracks.push(role_track(
            result.track(role),
            channel_for(role),
            program_for(result, role),
            ticks_per_second,
        )?);
    }
    Ok(smf)
}

fn role_track(
    notes: &RoleTrack,
    channel: u8,
    program: Option<u8>,
    ticks_per_second: f64,
) -> Result<Track<'static>, ExportError> {
    let channel = u4::new(channel);
    let name = MetaMessage::TrackName(notes.role.name().as_bytes());
    let mut track: Track<'static> = vec![meta(name)];

    if let Some(program) = program {
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(program.min(127)),
                },
            },
        });
    }

    // (tick, is_note_on, key, velocity). Offs sort before ons at the same
    // tick so a repeated pitch is released before it is struck again.
    let to_tick = |seconds: f64| (seconds * ticks_per_second).round().max(0.0) as u32;
    let mut events: Vec<(u32, bool, u8, u8)> = Vec::with_capacity(notes.len() * 2);
    for note in &notes.notes {
        let on = to_tick(note.start);
        let off = to_tick(note.end).max(on + 1);
        events.push((on, true, note.pitch, note.velocity));
        events.push((off, false, note.pitch, 0));
    }
    events.sort_by_key(|&(tick, is_on, _, _)| (tick, is_on));

    let mut last_tick = 0;
    for (tick, is_on, key, vel) in events {
        let delta = tick - last_tick;
        if delta > MAX_DELTA {
            return Err(ExportError::Midi(format!(
                "gap of {delta} ticks exceeds the SMF delta limit"
            )));
        }
        let message = if is_on {
            MidiMessage::NoteOn {
                key: u7::new(key),
                vel: u7::new(vel),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(key),
                vel: u7::new(0),
            }
        };
        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi { channel, message },
        });
        last_tick = tick;
    }

    track.push(meta(MetaMessage::EndOfTrack));
    Ok(track)
}
