use kero_core::input::{Button, ButtonMask};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted input: each frame lists the buttons held during it.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt_ms")]
    pub fixed_dt_ms: u64,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub held: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One mask per simulated frame. Labels are checked when loading.
    pub fn expanded_inputs(&self) -> Vec<ButtonMask> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let buttons: Vec<Button> = frame
                .held
                .iter()
                .filter_map(|label| Button::from_label(label))
                .collect();
            let mask = ButtonMask::from_buttons(&buttons);
            for _ in 0..frame.repeat.max(1) {
                out.push(mask);
            }
        }
        out
    }
}

pub fn parse_replay(raw: &str, origin: &str) -> Result<ReplaySequence, String> {
    let replay: ReplaySequence = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse replay JSON {origin}: {e}"))?;
    validate_replay(&replay)?;
    Ok(replay)
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_replay(&raw, &path.display().to_string())
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt_ms == 0 {
        return Err("Replay validation failed: fixed_dt_ms is zero".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: no frames".to_string());
    }
    for (index, frame) in replay.frames.iter().enumerate() {
        if let Some(label) = frame
            .held
            .iter()
            .find(|label| Button::from_label(label).is_none())
        {
            return Err(format!(
                "Replay validation failed: frame {} holds unknown button '{}'",
                index, label
            ));
        }
    }
    Ok(())
}

const fn default_dt_ms() -> u64 {
    16
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::kero::{CharacterClips, Kero};
    use crate::map::tests::sample_map;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "kero_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn repeats_expand_into_one_mask_per_frame() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "fixed_dt_ms": 20,
              "frames": [
                { "held": ["right"], "repeat": 3 },
                { "held": ["right", "7"] },
                { "repeat": 2 }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        assert_eq!(replay.fixed_dt_ms, 20);
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 6);
        assert!(expanded[0].is_set(Button::Right));
        assert!(expanded[3].is_set(Button::Num7));
        assert!(expanded[5].is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_button_is_rejected() {
        let err = parse_replay(r#"{ "frames": [ { "held": ["jump"] } ] }"#, "inline")
            .expect_err("unknown label");
        assert!(err.contains("unknown button 'jump'"));
    }

    #[test]
    fn empty_replay_is_rejected() {
        let err = parse_replay(r#"{ "frames": [] }"#, "inline").expect_err("no frames");
        assert!(err.contains("no frames"));
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay = parse_replay(
            r#"{
              "frames": [
                { "held": ["right"], "repeat": 30 },
                { "held": ["right", "7"], "repeat": 1 },
                { "held": ["right"], "repeat": 20 },
                { "held": ["5"], "repeat": 1 },
                { "repeat": 60 },
                { "held": ["left"], "repeat": 45 }
              ]
            }"#,
            "inline",
        )
        .expect("replay should parse");
        let inputs = replay.expanded_inputs();

        let run = || {
            let mut map = sample_map();
            let mut kero = Kero::new(&map, PhysicsConfig::default(), CharacterClips::default(), 1, 99);
            for mask in &inputs {
                kero.update(&mut map, *mask, replay.fixed_dt_ms, false);
            }
            (kero.pos_x, kero.pos_y, kero.state, kero.life_count, map.coins_left)
        };
        assert_eq!(run(), run());
    }
}
