// Error types for the composition engine and its outer surfaces.
//
// The engine itself recovers from every input problem (see `chord.rs` and
// `profile.rs`); these types exist so that the strict entry points can say
// what went wrong before the recovering wrappers substitute defaults, and so
// that config loading, MIDI export and rendering can propagate I/O failures
// to the caller with `?`.

use thiserror::Error;

/// Failure of the strict chord-text parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChordParseError {
    /// A token whose first character is not a root letter A–G.
    #[error("malformed chord token {token:?} at position {position}")]
    MalformedChordToken { token: String, position: usize },
    /// Empty or whitespace-only chord text.
    #[error("empty chord progression")]
    EmptyProgression,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("MIDI encoding error: {0}")]
    Midi(String),
}

/// Failure of a rendering gateway. Never a composition failure: callers
/// substitute a placeholder asset.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no rendering backend available: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend failed: {0}")]
    Backend(String),
    #[error("MIDI export failed: {0}")]
    Export(#[from] ExportError),
}
