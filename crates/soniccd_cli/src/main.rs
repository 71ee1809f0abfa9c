use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use soniccd_core::core_api::{Engine, Session, SessionSnapshot};
use soniccd_core::model::{Character, GoodFutures, Machines, Platform, TimeStones};
use soniccd_render::{
    JsonStyle, TextRenderOptions, TextStyle, render_json_full, render_json_slot,
    render_text_with_options,
};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CharacterArg {
    Sonic,
    Tails,
    Knuckles,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "SAVE")]
    path: PathBuf,
    #[arg(long, value_name = "sega-cd|pc|retro", value_parser = parse_platform)]
    platform: Option<Platform>,
    /// Slot to show or edit, counting from 1. Defaults to the selected slot
    /// for edits and to every slot for output.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..))]
    slot: Option<u8>,
    #[arg(long)]
    json: bool,
    /// Show every time-attack place instead of first places only.
    #[arg(long)]
    verbose: bool,
    #[arg(long = "export-session", value_name = "PATH")]
    export_session: Option<PathBuf>,
    #[arg(long = "import-session", value_name = "PATH")]
    import_session: Option<PathBuf>,
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..))]
    select: Option<u8>,
    #[arg(long = "set-name")]
    set_name: Option<String>,
    #[arg(long = "set-character")]
    set_character: Option<CharacterArg>,
    #[arg(long = "set-lives")]
    set_lives: Option<u8>,
    #[arg(long = "set-score")]
    set_score: Option<u32>,
    #[arg(long = "set-stage", value_parser = clap::value_parser!(u8).range(0..=7))]
    set_stage: Option<u8>,
    #[arg(long = "set-act", value_parser = clap::value_parser!(u8).range(1..=10))]
    set_act: Option<u8>,
    #[arg(long = "set-special-stage", value_parser = clap::value_parser!(u8).range(0..=7))]
    set_special_stage: Option<u8>,
    #[arg(long = "set-time-stones", value_name = "MASK", value_parser = parse_mask::<u8>)]
    set_time_stones: Option<u8>,
    #[arg(long = "set-good-futures", value_name = "MASK", value_parser = parse_mask::<u8>)]
    set_good_futures: Option<u8>,
    #[arg(long = "set-machines", value_name = "MASK", value_parser = parse_mask::<u16>)]
    set_machines: Option<u16>,
    #[arg(long = "set-holograms")]
    set_holograms: Option<u8>,
    #[arg(long = "set-mobile", action = ArgAction::Set, value_name = "true|false")]
    set_mobile: Option<bool>,
    #[arg(long = "set-music-volume")]
    set_music_volume: Option<u8>,
    #[arg(long = "set-sound-volume")]
    set_sound_volume: Option<u8>,
    /// Unedited save whose bytes fill everything the editor does not write.
    /// Defaults to SAVE.
    #[arg(long, value_name = "PATH")]
    template: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long = "force-overwrite")]
    force_overwrite: bool,
    #[arg(long)]
    backup: bool,
}

impl Cli {
    fn has_slot_edits(&self) -> bool {
        self.set_name.is_some()
            || self.set_character.is_some()
            || self.set_lives.is_some()
            || self.set_score.is_some()
            || self.set_stage.is_some()
            || self.set_act.is_some()
            || self.set_special_stage.is_some()
            || self.set_time_stones.is_some()
            || self.set_good_futures.is_some()
            || self.set_machines.is_some()
            || self.set_holograms.is_some()
    }

    fn has_option_edits(&self) -> bool {
        self.set_mobile.is_some()
            || self.set_music_volume.is_some()
            || self.set_sound_volume.is_some()
    }

    fn has_edits(&self) -> bool {
        self.has_slot_edits()
            || self.has_option_edits()
            || self.select.is_some()
            || self.import_session.is_some()
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let has_edits = cli.has_edits();

    if has_edits && cli.output.is_none() {
        eprintln!("--set-* flags require --output <PATH>");
        process::exit(2);
    }
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set-* flag");
        process::exit(2);
    }
    if cli.template.is_some() && cli.output.is_none() {
        eprintln!("--template is only used together with --output <PATH>");
        process::exit(2);
    }

    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });
    let hint = cli.platform.or_else(|| {
        cli.path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(Platform::from_file_name)
    });

    let engine = Engine::new();
    let mut session = engine.open_bytes(&bytes, hint).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", cli.path.display());
        eprintln!("  {}", e);
        process::exit(1);
    });
    tracing::debug!(platform = %session.platform(), "opened save");

    if let Some(path) = &cli.import_session {
        session = import_session(&engine, path);
    }

    if let Some(select) = cli.select {
        session.select(usize::from(select) - 1).unwrap_or_else(|e| {
            eprintln!("Error selecting slot: {e}");
            process::exit(1);
        });
    }

    let slot_index = cli
        .slot
        .map(|n| usize::from(n) - 1)
        .unwrap_or_else(|| session.selected());
    if let Err(e) = session.slot(slot_index) {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    if cli.has_slot_edits() {
        apply_slot_edits(&cli, &mut session, slot_index);
    }
    if cli.has_option_edits() {
        apply_option_edits(&cli, &mut session);
    }

    if let Some(out_path) = &cli.output {
        write_output(&cli, &session, &bytes, out_path);
    }

    if let Some(path) = &cli.export_session {
        let rendered = serde_json::to_string_pretty(&session.snapshot()).unwrap_or_else(|e| {
            eprintln!("Error rendering session snapshot: {e}");
            process::exit(1);
        });
        fs::write(path, rendered).unwrap_or_else(|e| {
            eprintln!("Error writing {}: {e}", path.display());
            process::exit(1);
        });
    }

    if cli.json {
        let json = match cli.slot {
            Some(_) => render_json_slot(&session, slot_index, JsonStyle::CanonicalV1),
            None => render_json_full(&session, JsonStyle::CanonicalV1),
        };
        let rendered = serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(1);
        });
        println!("{rendered}");
        return;
    }

    if let Some(out_path) = &cli.output {
        println!("Wrote edited save to {}", out_path.display());
        return;
    }

    let options = TextRenderOptions {
        slot: cli.slot.map(|_| slot_index),
        verbose: cli.verbose,
    };
    print!(
        "{}",
        render_text_with_options(&session, TextStyle::Sheet, options)
    );
}

fn import_session(engine: &Engine, path: &Path) -> Session {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", path.display());
        process::exit(1);
    });
    let snapshot: SessionSnapshot = serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing session snapshot {}: {e}", path.display());
        process::exit(1);
    });
    engine.restore(snapshot).unwrap_or_else(|e| {
        eprintln!("Error restoring session snapshot: {e}");
        process::exit(1);
    })
}

fn apply_slot_edits(cli: &Cli, session: &mut Session, index: usize) {
    let slot = session.slot_mut(index).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    if let Some(name) = &cli.set_name {
        slot.metadata.name = name.clone();
    }
    let player = &mut slot.single_player;
    if let Some(character) = cli.set_character {
        player.character = to_core_character(character);
    }
    if let Some(lives) = cli.set_lives {
        player.lives = lives;
    }
    if let Some(score) = cli.set_score {
        player.score = score;
    }
    if let Some(stage) = cli.set_stage {
        player.stage = stage;
        player.is_new = stage == 0;
    }
    if let Some(act) = cli.set_act {
        player.act = act;
    }
    if let Some(special_stage) = cli.set_special_stage {
        player.special_stage = special_stage;
    }
    if let Some(mask) = cli.set_time_stones {
        player.time_stones = TimeStones(mask & TimeStones::ALL.0);
    }
    if let Some(mask) = cli.set_machines {
        player.machines = Machines(mask & Machines::ALL.0);
        player.good_futures = GoodFutures::from_machines(player.machines);
    }
    if let Some(mask) = cli.set_good_futures {
        player.good_futures = GoodFutures(mask & GoodFutures::ALL.0);
        player.machines = player.good_futures.expand_to_machines();
        player.holograms = player.good_futures.holograms();
    }
    if let Some(holograms) = cli.set_holograms {
        player.holograms = holograms;
    }

    if player.normalize() {
        tracing::info!(slot = index + 1, "adjusted slot to keep progress consistent");
    }
    if player.character == Character::Knuckles {
        session.collection_mut().knuckles_available = true;
    }
}

fn apply_option_edits(cli: &Cli, session: &mut Session) {
    let options = &mut session.collection_mut().options;
    if let Some(mobile) = cli.set_mobile {
        options.mobile = mobile;
    }
    let max = options.max_volume();
    for (label, value, target) in [
        ("music", cli.set_music_volume, &mut options.music_volume),
        ("sound", cli.set_sound_volume, &mut options.sound_volume),
    ] {
        if let Some(volume) = value {
            if volume > max {
                eprintln!("Error: {label} volume {volume} exceeds the maximum of {max}");
                process::exit(1);
            }
            *target = volume;
        }
    }
}

fn write_output(cli: &Cli, session: &Session, input: &[u8], out_path: &Path) {
    let template = match &cli.template {
        Some(path) => fs::read(path).unwrap_or_else(|e| {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }),
        None => input.to_vec(),
    };
    let edited_bytes = session.encode(&template).unwrap_or_else(|e| {
        eprintln!("Error creating modified save bytes: {e}");
        process::exit(1);
    });

    if out_path.exists() {
        if !cli.force_overwrite {
            eprintln!(
                "refusing to overwrite existing file {} (pass --force-overwrite)",
                out_path.display()
            );
            process::exit(1);
        }
        if cli.backup {
            let backup_path = PathBuf::from(format!("{}.bak", out_path.display()));
            fs::copy(out_path, &backup_path).unwrap_or_else(|e| {
                eprintln!("Error writing backup {}: {e}", backup_path.display());
                process::exit(1);
            });
        }
    }
    fs::write(out_path, edited_bytes).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    });
}

fn parse_platform(value: &str) -> Result<Platform, String> {
    match value.to_ascii_lowercase().as_str() {
        "sega-cd" | "segacd" | "cd" => Ok(Platform::SegaCd),
        "pc" => Ok(Platform::Pc),
        "retro" => Ok(Platform::Retro),
        _ => Err(format!(
            "invalid platform value '{value}', expected one of: sega-cd, pc, retro"
        )),
    }
}

/// Bit masks accept decimal, `0x` hex or `0b` binary.
fn parse_mask<T>(value: &str) -> Result<T, String>
where
    T: TryFrom<u32>,
{
    let parsed = if let Some(hex) = value.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = value.strip_prefix("0b") {
        u32::from_str_radix(bin, 2)
    } else {
        value.parse::<u32>()
    };
    let parsed = parsed.map_err(|e| format!("invalid mask '{value}': {e}"))?;
    T::try_from(parsed).map_err(|_| format!("mask '{value}' is too wide"))
}

fn to_core_character(character: CharacterArg) -> Character {
    match character {
        CharacterArg::Sonic => Character::Sonic,
        CharacterArg::Tails => Character::Tails,
        CharacterArg::Knuckles => Character::Knuckles,
    }
}
