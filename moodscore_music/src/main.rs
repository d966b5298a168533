// Moodscore composer: CLI entry point.
//
// Composes a piece for a style and mood, writes it to MIDI, and optionally
// dumps the result as JSON and renders audio through FluidSynth.
//
// Usage:
//   cargo run -p moodscore_music --bin compose -- --style pop --mood happy \
//     --duration 30 --tempo 120 --chords "C G Am F" [--seed N] [--output out.mid]
//     [--json out.json] [--config engine.json] [--render out.wav] [--soundfont gm.sf2]
//   cargo run -p moodscore_music --bin compose -- --list
//
// Duration and tempo bounds are enforced here, not in the engine. Rendering
// problems never fail the run: a missing synthesizer or SoundFont leaves an
// empty placeholder file at the --render path.

use clap::Parser;
use log::{error, info, warn};
use moodscore_music::config::{EngineConfig, ProfileRegistry};
use moodscore_music::midi::write_midi;
use moodscore_music::note::pitch_name;
use moodscore_music::profile::{MelodyPatternId, MoodId, StyleId};
use moodscore_music::render::{
    FluidSynthGateway, NullGateway, RenderingGateway, render_or_placeholder,
};
use moodscore_music::{CompositionRequest, compose_with};
use moodscore_prng::ScoreRng;
use std::path::PathBuf;
use std::process::ExitCode;

const MAX_DURATION_SECONDS: f64 = 300.0;
const MIN_TEMPO: u32 = 20;
const MAX_TEMPO: u32 = 300;

/// Directories searched for a SoundFont when --soundfont is not given.
const SOUNDFONT_DIRS: [&str; 4] = [
    "soundfonts",
    "/usr/share/sounds/sf2",
    "/usr/share/soundfonts",
    "/usr/local/share/soundfonts",
];

#[derive(Parser)]
#[command(name = "compose")]
#[command(about = "Mood- and style-driven procedural music composer")]
struct Cli {
    /// Musical style (pop, rock, classical, electronic, jazz)
    #[arg(long, default_value = "pop")]
    style: String,

    /// Mood name (see --list)
    #[arg(long, default_value = "happy")]
    mood: String,

    /// Length of the piece in seconds (0 < d <= 300)
    #[arg(long, default_value_t = 30.0)]
    duration: f64,

    /// Tempo in BPM before the mood's tempo multiplier (20-300)
    #[arg(long, default_value_t = 120)]
    tempo: u32,

    /// Chord progression, e.g. "C G Am F". Empty uses the default progression.
    #[arg(long, default_value = "")]
    chords: String,

    /// Random seed. Defaults to one derived from the clock.
    #[arg(long)]
    seed: Option<u64>,

    /// MIDI output path
    #[arg(long, default_value = "output.mid")]
    output: PathBuf,

    /// Also write the composition as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Engine config (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render audio (WAV) to this path via FluidSynth
    #[arg(long)]
    render: Option<PathBuf>,

    /// SoundFont for rendering; searched for when omitted
    #[arg(long)]
    soundfont: Option<PathBuf>,

    /// List moods, styles and melody patterns, then exit
    #[arg(long)]
    list: bool,
}

fn validate(duration: f64, tempo: u32) -> Result<(), String> {
    let duration_ok = duration > 0.0 && duration <= MAX_DURATION_SECONDS;
    if !duration_ok {
        return Err(format!(
            "duration must be in (0, {MAX_DURATION_SECONDS}] seconds, got {duration}"
        ));
    }
    if !(MIN_TEMPO..=MAX_TEMPO).contains(&tempo) {
        return Err(format!(
            "tempo must be in [{MIN_TEMPO}, {MAX_TEMPO}] BPM, got {tempo}"
        ));
    }
    Ok(())
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn print_catalogue() {
    println!("Styles:");
    for &style in StyleId::ALL {
        let p = style.profile();
        println!(
            "  {:<12} drums={:<5} complexity={:.1}",
            style.name(),
            p.drums_enabled,
            p.rhythm_complexity
        );
    }
    println!("Moods:");
    for &mood in MoodId::ALL {
        let p = mood.profile();
        println!(
            "  {:<12} {:?} voicing={:<12} pattern={}",
            mood.name(),
            p.scale_kind,
            p.chord_voicing_style.name(),
            p.melody_pattern_id
        );
    }
    let patterns: Vec<&str> = MelodyPatternId::ALL.iter().map(|p| p.name()).collect();
    println!("Melody patterns: {}", patterns.join(", "));
}

fn resolve_gateway(cli: &Cli) -> Box<dyn RenderingGateway> {
    let dirs: Vec<PathBuf> = SOUNDFONT_DIRS.iter().map(PathBuf::from).collect();
    match FluidSynthGateway::discover(cli.soundfont.as_deref(), &dirs) {
        Ok(gateway) => Box::new(gateway),
        Err(e) => {
            warn!("audio rendering unavailable: {e}");
            Box::new(NullGateway)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    if cli.list {
        print_catalogue();
        return ExitCode::SUCCESS;
    }
    if let Err(msg) = validate(cli.duration, cli.tempo) {
        error!("{msg}");
        return ExitCode::from(2);
    }

    // Resolve the renderer before composing; composition never depends on it.
    let gateway = cli.render.as_ref().map(|_| resolve_gateway(&cli));

    let registry = ProfileRegistry::new(EngineConfig::load_or_default(cli.config.as_deref()));
    let request = CompositionRequest::from_names(&cli.style, &cli.mood, cli.duration, cli.tempo)
        .with_chords(cli.chords.clone());
    let seed = cli.seed.unwrap_or_else(clock_seed);

    info!("=== Moodscore ===");
    info!("Style: {}  Mood: {}", request.style, request.mood);
    info!(
        "Duration: {} s  Tempo: {} BPM  Seed: {}",
        request.duration_seconds, request.tempo_bpm, seed
    );
    if !request.chord_text.trim().is_empty() {
        info!("Chords: {}", request.chord_text);
    }

    let mut rng = ScoreRng::new(seed);
    let result = compose_with(&request, &registry, &mut rng);
    info!(
        "Composed {} slots at {:.1} BPM: melody {}, chords {}, bass {}, drums {} notes",
        result.slot_count,
        result.tempo_bpm,
        result.melody.len(),
        result.chords.len(),
        result.bass.len(),
        result.drums.len()
    );
    if let Some(first) = result.bass.notes.first() {
        let mode = if result.scale_kind.is_minor() { "minor" } else { "major" };
        info!("Opening bass {} ({mode} scale)", pitch_name(first.pitch));
    }

    if let Err(e) = write_midi(&result, &cli.output) {
        error!("failed to write {}: {e}", cli.output.display());
        return ExitCode::FAILURE;
    }
    info!("MIDI written to {}", cli.output.display());

    if let Some(path) = &cli.json {
        let written = result
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            error!("failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        info!("JSON written to {}", path.display());
    }

    if let (Some(path), Some(gateway)) = (&cli.render, gateway) {
        let audio = render_or_placeholder(gateway.as_ref(), &result);
        if let Err(e) = std::fs::write(path, &audio) {
            error!("failed to write {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
        if audio.is_empty() {
            warn!("wrote empty placeholder audio to {}", path.display());
        } else {
            info!("Audio written to {} ({} bytes)", path.display(), audio.len());
        }
    }

    ExitCode::SUCCESS
}
