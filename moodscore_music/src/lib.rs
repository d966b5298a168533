// Moodscore: mood- and style-driven procedural music composer.
//
// Composes a multi-track symbolic piece (melody, chords, bass, drums) from a
// style, a mood, a duration, a tempo and an optional chord progression.
// Generation is stochastic but table-driven: a style picks instruments and
// rhythmic busyness, a mood picks dynamics, register, tempo feel,
// accompaniment texture, ornament density and one of ~18 melody patterns.
//
// Architecture:
// - note.rs: Note events, role tracks, the uniform duration-clipping policy
// - chord.rs: Chord-type registry, chord-symbol parser, default progression
// - scale.rs: Major/minor scale kinds and the per-chord melodic note pool
// - profile.rs: Style and mood tables, voicing styles, melody pattern ids
// - melody.rs: Melody pattern strategies and their registry
// - voicing.rs: Chord voicing strategies and their registry
// - bass.rs: Bass line renderer
// - ornament.rs: Grace notes and per-beat embellishments
// - drums.rs: Percussion pattern generator
// - compose.rs: Requests, results, slot scheduling and the timeline assembler
// - config.rs: JSON engine config and the resolved profile registry
// - error.rs: Error types for parsing, config, export and rendering
// - midi.rs: Standard MIDI File export
// - render.rs: Rendering gateways (FluidSynth, null) with placeholder fallback
//
// The composer is deterministic given a seed: every random choice draws from
// an explicit `ScoreRng` passed in by the caller.

pub mod bass;
pub mod chord;
pub mod compose;
pub mod config;
pub mod drums;
pub mod error;
pub mod melody;
pub mod midi;
pub mod note;
pub mod ornament;
pub mod profile;
pub mod render;
pub mod scale;
pub mod voicing;

pub use compose::{CompositionRequest, CompositionResult, compose, compose_with};
