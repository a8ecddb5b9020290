//! Sprite-sheet animation clips and deterministic frame stepping.
//!
//! A clip is a horizontal strip of equally sized frames on a sprite sheet:
//! frame `n` lives at column `offset_x + n`, row `offset_y`. Frames advance at
//! a fixed `fps`; leftover time is dropped when a frame advances, so timing is
//! integer milliseconds only.
//!
//! Clip tables can be authored as JSON:
//!
//! ```json
//! { "version": "0.1", "animation_id": "kero",
//!   "animations": { "idle": { "fps": 15, "length": 11, "offset_x": 0, "offset_y": 0 } } }
//! ```

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AnimationClip {
    pub fps: u32,
    /// Number of frames. Zero and one both describe a still image.
    pub length: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

impl AnimationClip {
    pub const fn new(fps: u32, length: u32, offset_x: u32, offset_y: u32, looping: bool) -> Self {
        Self {
            fps,
            length,
            offset_x,
            offset_y,
            looping,
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.length.max(1)
    }

    pub fn frame_period_ms(&self) -> u64 {
        1000 / u64::from(self.fps.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    pub animations: HashMap<String, AnimationClip>,
}

/// Runtime playback position inside one clip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationState {
    pub current_frame: u32,
    pub elapsed_ms: u64,
    pub finished: bool,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Advance by `dt_ms`. Returns true when the visible frame changed.
    pub fn tick(&mut self, dt_ms: u64, clip: &AnimationClip) -> bool {
        let count = clip.frame_count();
        if self.current_frame >= count {
            self.current_frame = count - 1;
        }
        if self.finished {
            return false;
        }

        self.elapsed_ms += dt_ms;
        if self.elapsed_ms < clip.frame_period_ms() {
            return false;
        }
        self.elapsed_ms = 0;

        let previous = self.current_frame;
        if self.current_frame + 1 >= count {
            if clip.looping {
                self.current_frame = 0;
            } else {
                self.finished = true;
            }
        } else {
            self.current_frame += 1;
        }
        previous != self.current_frame
    }
}

#[derive(Debug, Deserialize)]
struct AnimationFileJson {
    version: String,
    animation_id: String,
    animations: HashMap<String, AnimationClip>,
}

/// Parse a clip table from JSON text. `origin` names the source in errors.
pub fn parse_animation_file(raw: &str, origin: &str) -> Result<AnimationFile, String> {
    let json: AnimationFileJson = serde_json::from_str(raw)
        .map_err(|e| format!("Failed to parse animation file {origin}: {e}"))?;
    validate_animation_json(&json)?;
    Ok(AnimationFile {
        version: json.version,
        animation_id: json.animation_id,
        animations: json.animations,
    })
}

fn validate_animation_json(json: &AnimationFileJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.animation_id.is_empty() {
        return Err("Animation validation failed: animation_id is empty".to_string());
    }
    for (name, clip) in &json.animations {
        if clip.fps == 0 {
            return Err(format!(
                "Animation validation failed: clip '{}' has zero fps",
                name
            ));
        }
    }
    Ok(())
}

const fn default_looping() -> bool {
    true
}
