//! kagekero headless runner.
//!
//! Loads the levels from an asset directory and plays scripted input through
//! the full game loop without a window:
//!
//!   1. read the optional config, then build `Game` (first level, tileset, clips)
//!   2. for every replay frame, turn the held-button mask into press/release
//!      events, then run one update with the replay's fixed delta
//!   3. log where the character ended up and optionally write the final
//!      screen as a PNG
//!
//! Without a replay the game idles for `--frames` updates, which is enough to
//! check that a level loads and settles.

mod assets;
mod collision;
mod config;
mod game;
mod interaction;
mod kero;
mod map;
mod map_renderer;
mod menu;
mod narrative;
mod overlay;
mod replay;

use std::path::PathBuf;

use assets::DirAssets;
use config::{load_config_from_path, GameConfig};
use game::Game;
use kero_core::input::ButtonMask;
use kero_core::time::FrameClock;
use replay::load_replay_from_path;

const IDLE_FRAME_MS: u64 = 16;

#[derive(Debug, Default, PartialEq)]
struct Args {
    assets_dir: PathBuf,
    config: Option<PathBuf>,
    replay: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    frames: u32,
}

fn usage() -> String {
    "Usage: cargo run -p kero_game -- <assets_dir> [--config <file>] [--replay <file>] [--snapshot <png>] [--frames <n>]\nExample: cargo run -p kero_game -- data --replay data/replays/level1.json --snapshot out.png".to_string()
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        frames: 60,
        ..Args::default()
    };
    let mut positional = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {flag}\n{}", usage()))
        };
        match arg.as_str() {
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--replay" => parsed.replay = Some(PathBuf::from(value("--replay")?)),
            "--snapshot" => parsed.snapshot = Some(PathBuf::from(value("--snapshot")?)),
            "--frames" => {
                let raw = value("--frames")?;
                parsed.frames = raw
                    .parse::<u32>()
                    .map_err(|e| format!("Invalid frame count '{raw}': {e}"))?;
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown option '{flag}'\n{}", usage()));
            }
            _ => positional.push(arg.clone()),
        }
    }
    if positional.len() != 1 {
        return Err(usage());
    }
    parsed.assets_dir = PathBuf::from(&positional[0]);
    Ok(parsed)
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let args = parse_args(&args)?;

    let config = match &args.config {
        Some(path) => load_config_from_path(path)?,
        None => GameConfig::default(),
    };
    let assets = DirAssets::new(&args.assets_dir)?;
    let mut game = Game::new(config, Box::new(assets))?;

    let (inputs, dt_ms) = match &args.replay {
        Some(path) => {
            let replay = load_replay_from_path(path)?;
            let inputs = replay.expanded_inputs();
            log::info!(
                "Playing replay {} ({} frame(s) at {}ms)",
                path.display(),
                inputs.len(),
                replay.fixed_dt_ms
            );
            (inputs, replay.fixed_dt_ms)
        }
        None => (vec![ButtonMask::EMPTY; args.frames as usize], IDLE_FRAME_MS),
    };

    let mut clock = FrameClock::new();
    for mask in inputs {
        game.apply_mask(mask);
        let dt = clock.advance(dt_ms);
        game.update(dt);
        if !game.is_running() {
            log::info!("Game quit after {} frame(s)", clock.frame_count);
            break;
        }
    }

    let kero = game.kero();
    log::info!(
        "Finished at level {}: position ({:.1}, {:.1}), state {:?}, {} lives, {}/{} coins, {}ms simulated",
        kero.level,
        kero.pos_x,
        kero.pos_y,
        kero.state,
        kero.life_count,
        game.map().coin_max - game.map().coins_left.min(game.map().coin_max),
        game.map().coin_max,
        clock.total_ms
    );

    if game.is_paused() {
        log::info!("Game is paused");
    }
    if let Some(index) = game.death_line() {
        log::info!("Showing death line #{}", index);
    }
    if let Some(dialogue) = game.dialogue() {
        for row in dialogue.rows() {
            log::info!("| {}", row);
        }
    }
    log::debug!(
        "Camera at ({}, {})",
        game.camera().position.x,
        game.camera().position.y
    );

    if let Some(path) = &args.snapshot {
        game.render().save_png(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("kero_game")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_positional_and_flags() {
        let parsed = parse_args(&args(&["data", "--replay", "r.json", "--frames", "10"]))
            .expect("valid args");
        assert_eq!(parsed.assets_dir, PathBuf::from("data"));
        assert_eq!(parsed.replay, Some(PathBuf::from("r.json")));
        assert_eq!(parsed.frames, 10);
        assert_eq!(parsed.config, None);
    }

    #[test]
    fn missing_assets_dir_prints_usage() {
        let err = parse_args(&args(&["--snapshot", "out.png"])).expect_err("no assets dir");
        assert!(err.starts_with("Usage:"));
    }

    #[test]
    fn flag_without_value_is_an_error() {
        let err = parse_args(&args(&["data", "--config"])).expect_err("missing value");
        assert!(err.contains("Missing value for --config"));
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let err = parse_args(&args(&["data", "--fullscreen"])).expect_err("unknown flag");
        assert!(err.contains("Unknown option '--fullscreen'"));
    }
}
