// Engine configuration and the resolved profile registry.
//
// `EngineConfig` holds the tunable timing constants of the assembler and
// renderers, plus optional per-entry overrides of the builtin mood and
// style tables. It is loaded from JSON; every field has a default, so a
// config file only needs the values it changes.
//
// `ProfileRegistry` is built once from a config before any composition
// runs. It answers mood/style lookups with overrides applied, so generators
// never consult the builtin tables or the config maps directly.

use crate::chord::DEFAULT_REFERENCE_PITCH;
use crate::error::ConfigError;
use crate::profile::{MoodId, MoodProfile, StyleId, StyleProfile};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Tunable engine parameters. Loaded from JSON, never mutated while composing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Beats in one chord slot.
    pub beats_per_chord: u32,

    /// MIDI pitch of the octave chords are voiced in (60 = C4).
    pub reference_pitch: u8,

    /// Fraction of a slot that sustained chord and bass notes are held.
    pub sustain_fraction: f64,

    /// Stagger between tones of a spread chord, in beats.
    pub spread_offset_beats: f64,

    /// Length of a grace note in seconds.
    pub grace_note_seconds: f64,

    /// Upper bound on grace notes added to one slot.
    pub max_grace_notes: usize,

    /// Replacement mood profiles, keyed by mood.
    pub moods: BTreeMap<MoodId, MoodProfile>,

    /// Replacement style profiles, keyed by style.
    pub styles: BTreeMap<StyleId, StyleProfile>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            beats_per_chord: 4,
            reference_pitch: DEFAULT_REFERENCE_PITCH,
            sustain_fraction: 0.95,
            spread_offset_beats: 0.2,
            grace_note_seconds: 0.05,
            max_grace_notes: 5,
            moods: BTreeMap::new(),
            styles: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        debug!(
            "loaded config from {} ({} mood, {} style overrides)",
            path.display(),
            config.moods.len(),
            config.styles.len()
        );
        Ok(config)
    }

    /// Load `path` if given, falling back to defaults when it is missing or
    /// unreadable.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            None => Self::default(),
            Some(path) => Self::load(path).unwrap_or_else(|e| {
                warn!("could not load config {}: {e}; using defaults", path.display());
                Self::default()
            }),
        }
    }

    /// Clamp values the assembler cannot work with back into range.
    fn sanitized(mut self) -> Self {
        if self.beats_per_chord == 0 {
            warn!("beats_per_chord must be positive, using 4");
            self.beats_per_chord = 4;
        }
        let sustain_ok = self.sustain_fraction > 0.0 && self.sustain_fraction <= 1.0;
        if !sustain_ok {
            warn!("sustain_fraction {} out of (0, 1], using 0.95", self.sustain_fraction);
            self.sustain_fraction = 0.95;
        }
        self.reference_pitch = self.reference_pitch.min(108);
        for (id, mood) in self.moods.iter_mut() {
            *mood = sanitized_mood(*id, *mood);
        }
        self
    }
}

/// Replace override values the generators cannot work with by the builtin
/// value for the same mood.
fn sanitized_mood(id: MoodId, mut mood: MoodProfile) -> MoodProfile {
    let builtin = id.profile();
    let length_ok = mood.base_note_length.is_finite() && mood.base_note_length > 0.0;
    if !length_ok {
        warn!(
            "{id}: base_note_length {} must be positive, using {}",
            mood.base_note_length, builtin.base_note_length
        );
        mood.base_note_length = builtin.base_note_length;
    }
    let tempo_ok = mood.tempo_multiplier.is_finite() && mood.tempo_multiplier > 0.0;
    if !tempo_ok {
        warn!(
            "{id}: tempo_multiplier {} must be positive, using {}",
            mood.tempo_multiplier, builtin.tempo_multiplier
        );
        mood.tempo_multiplier = builtin.tempo_multiplier;
    }
    if mood.ornament_probability.is_nan() {
        warn!("{id}: ornament_probability is NaN, using {}", builtin.ornament_probability);
        mood.ornament_probability = builtin.ornament_probability;
    }
    mood.ornament_probability = mood.ornament_probability.clamp(0.0, 1.0);
    mood
}

/// Mood and style tables with config overrides applied.
#[derive(Clone, Debug)]
pub struct ProfileRegistry {
    config: EngineConfig,
}

impl ProfileRegistry {
    /// Builtin tables and default timing.
    pub fn builtin() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mood(&self, id: MoodId) -> MoodProfile {
        self.config
            .moods
            .get(&id)
            .copied()
            .unwrap_or_else(|| id.profile())
    }

    pub fn style(&self, id: StyleId) -> StyleProfile {
        self.config
            .styles
            .get(&id)
            .copied()
            .unwrap_or_else(|| id.profile())
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
