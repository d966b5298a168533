// Rendering gateways: symbolic timeline to audio bytes.
//
// Audio synthesis is outside the composition engine. The engine hands a
// finished `CompositionResult` to a `RenderingGateway` the caller resolved
// up front; composition never probes for or holds backend state.
//
// Two gateways ship here:
// - `FluidSynthGateway` writes the result as a temporary MIDI file and runs
//   the `fluidsynth` executable with a SoundFont (.sf2) to produce WAV.
//   `discover` checks the executable and finds a SoundFont once, before any
//   rendering happens.
// - `NullGateway` always reports that no backend is available.
//
// Rendering failure is never a composition failure. `render_or_placeholder`
// logs the error and returns an empty placeholder asset instead.

use crate::compose::CompositionResult;
use crate::error::RenderError;
use crate::midi::write_midi;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Sample rate of rendered audio.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// How deep to look for SoundFonts below each search directory.
const SOUNDFONT_SEARCH_DEPTH: usize = 4;

/// Turns a composition into an audio asset.
pub trait RenderingGateway {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Render to encoded audio bytes.
    fn render(&self, result: &CompositionResult) -> Result<Vec<u8>, RenderError>;
}

/// Gateway used when no synthesizer is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullGateway;

impl RenderingGateway for NullGateway {
    fn name(&self) -> &str {
        "none"
    }

    fn render(&self, _result: &CompositionResult) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Unavailable("no renderer configured".to_string()))
    }
}

/// Renders WAV through the `fluidsynth` command-line synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidSynthGateway {
    pub executable: PathBuf,
    pub soundfont: PathBuf,
    pub sample_rate: u32,
}

impl FluidSynthGateway {
    pub fn new(executable: impl Into<PathBuf>, soundfont: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            soundfont: soundfont.into(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Resolve a usable gateway: the `fluidsynth` executable must answer
    /// `--version`, and a SoundFont must exist (`soundfont` if given,
    /// otherwise the first .sf2 found under `search_dirs`).
    pub fn discover(
        soundfont: Option<&Path>,
        search_dirs: &[PathBuf],
    ) -> Result<Self, RenderError> {
        let executable = PathBuf::from(if cfg!(windows) {
            "fluidsynth.exe"
        } else {
            "fluidsynth"
        });
        let version = Command::new(&executable)
            .arg("--version")
            .output()
            .map_err(|e| RenderError::Unavailable(format!("cannot run fluidsynth: {e}")))?;
        if !version.status.success() {
            return Err(RenderError::Unavailable(
                "fluidsynth --version failed".to_string(),
            ));
        }
        debug!(
            "fluidsynth: {}",
            String::from_utf8_lossy(&version.stdout).lines().next().unwrap_or("")
        );

        let soundfont = match soundfont {
            Some(path) if path.is_file() => path.to_path_buf(),
            Some(path) => {
                return Err(RenderError::Unavailable(format!(
                    "soundfont {} does not exist",
                    path.display()
                )));
            }
            None => find_soundfont(search_dirs).ok_or_else(|| {
                RenderError::Unavailable("no .sf2 soundfont found".to_string())
            })?,
        };
        info!("rendering with soundfont {}", soundfont.display());
        Ok(Self::new(executable, soundfont))
    }
}

impl RenderingGateway for FluidSynthGateway {
    fn name(&self) -> &str {
        "fluidsynth"
    }

    fn render(&self, result: &CompositionResult) -> Result<Vec<u8>, RenderError> {
        let dir = tempfile::tempdir()?;
        let midi_path = dir.path().join("composition.mid");
        let wav_path = dir.path().join("composition.wav");
        write_midi(result, &midi_path)?;

        let output = Command::new(&self.executable)
            .arg("-ni")
            .arg(&self.soundfont)
            .arg(&midi_path)
            .arg("-F")
            .arg(&wav_path)
            .arg("-r")
            .arg(self.sample_rate.to_string())
            .output()?;
        if !output.status.success() {
            return Err(RenderError::Backend(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(std::fs::read(&wav_path)?)
    }
}

/// First .sf2 file under the search directories, in directory order then
/// path order.
pub fn find_soundfont(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter().find_map(|dir| {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .max_depth(SOUNDFONT_SEARCH_DEPTH)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("sf2"))
            })
            .collect();
        found.sort();
        found.into_iter().next()
    })
}

/// Render, or log the failure and return an empty placeholder asset.
pub fn render_or_placeholder(
    gateway: &dyn RenderingGateway,
    result: &CompositionResult,
) -> Vec<u8> {
    match gateway.render(result) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("{} renderer failed, using placeholder: {e}", gateway.name());
            Vec::new()
        }
    }
}
