//! Character controller: per-frame physics and the state machine of the frog.
//!
//! Positions are the centre of a 32x32 sprite in level pixels. Horizontal
//! velocity is a non-negative speed and `heading` carries the direction.
//! Vertical velocity is signed, positive pointing down.
//!
//! One `update` runs in this order:
//!  1. animation tick, then the Dead state's respawn handling
//!  2. object pickups and dash input
//!  3. ground check on the tile below the centre: death, landing, jump, gravity
//!  4. vertical integration (or snap onto the ground tile)
//!  5. horizontal input, integration and wall/edge clamping
//!  6. state selection from the vertical velocity, then acceleration

use crate::assets::AssetSource;
use crate::collision::Aabb;
use crate::config::PhysicsConfig;
use crate::interaction::{self, Interaction};
use crate::map::Map;
use kero_core::animation::{parse_animation_file, AnimationClip, AnimationFile, AnimationState};
use kero_core::input::{Button, ButtonMask};
use kero_render::PixelRect;

pub const KERO_SIZE: i32 = 32;
pub const KERO_HALF: f32 = 16.0;

/// First sprite row of the character frames on the tileset.
const SPRITE_SHEET_TOP: i32 = 656;
const MASK_COLUMN_OFFSET: u32 = 12;
const LEFT_ROW_OFFSET: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeroState {
    Idle,
    Run,
    Jump,
    Fall,
    Dash,
    Dead,
}

impl KeroState {
    pub const ALL: [KeroState; 6] = [
        KeroState::Idle,
        KeroState::Run,
        KeroState::Jump,
        KeroState::Fall,
        KeroState::Dash,
        KeroState::Dead,
    ];

    pub fn clip_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Run => "run",
            Self::Jump => "jump",
            Self::Fall => "fall",
            Self::Dash => "dash",
            Self::Dead => "dead",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
}

impl Heading {
    fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Sprite-sheet clip for every character state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterClips {
    pub idle: AnimationClip,
    pub run: AnimationClip,
    pub jump: AnimationClip,
    pub fall: AnimationClip,
    pub dash: AnimationClip,
    pub dead: AnimationClip,
}

impl Default for CharacterClips {
    fn default() -> Self {
        Self {
            idle: AnimationClip::new(15, 11, 0, 0, true),
            run: AnimationClip::new(15, 12, 0, 1, true),
            jump: AnimationClip::new(15, 0, 0, 2, true),
            fall: AnimationClip::new(15, 0, 1, 2, true),
            dash: AnimationClip::new(15, 6, 2, 2, true),
            dead: AnimationClip::new(15, 3, 8, 2, false),
        }
    }
}

impl CharacterClips {
    /// Take clips named after the states from a clip table. Missing names
    /// keep the built-in clip.
    pub fn from_animation_file(file: &AnimationFile) -> Self {
        let mut clips = Self::default();
        for state in KeroState::ALL {
            match file.animations.get(state.clip_name()) {
                Some(clip) => *clips.get_mut(state) = *clip,
                None => log::warn!(
                    "Clip table '{}' has no '{}' clip, using the built-in one",
                    file.animation_id,
                    state.clip_name()
                ),
            }
        }
        clips
    }

    pub fn get(&self, state: KeroState) -> &AnimationClip {
        match state {
            KeroState::Idle => &self.idle,
            KeroState::Run => &self.run,
            KeroState::Jump => &self.jump,
            KeroState::Fall => &self.fall,
            KeroState::Dash => &self.dash,
            KeroState::Dead => &self.dead,
        }
    }

    fn get_mut(&mut self, state: KeroState) -> &mut AnimationClip {
        match state {
            KeroState::Idle => &mut self.idle,
            KeroState::Run => &mut self.run,
            KeroState::Jump => &mut self.jump,
            KeroState::Fall => &mut self.fall,
            KeroState::Dash => &mut self.dash,
            KeroState::Dead => &mut self.dead,
        }
    }
}

/// Read a JSON clip table asset and pick the character clips from it.
pub fn load_clip_table(assets: &dyn AssetSource, name: &str) -> Result<CharacterClips, String> {
    let bytes = assets.read(name)?;
    let raw = String::from_utf8(bytes).map_err(|e| format!("Failed to read {name}: {e}"))?;
    let file = parse_animation_file(&raw, name)?;
    log::info!(
        "Loaded clip table '{}' with {} clip(s)",
        file.animation_id,
        file.animations.len()
    );
    Ok(CharacterClips::from_animation_file(&file))
}

/// What happened during one update, for the game loop to act on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub died: bool,
    pub respawned: bool,
    pub door_entered: bool,
    pub interaction: Option<Interaction>,
}

#[derive(Debug, Clone)]
pub struct Kero {
    pub pos_x: f32,
    pub pos_y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub heading: Heading,
    pub state: KeroState,
    pub prev_state: KeroState,
    pub anim: AnimationState,
    pub life_count: u32,
    pub prev_life_count: u32,
    pub level: u32,
    pub jump_lock: bool,
    /// Set by a dash burst, cleared on landing. One burst per airtime.
    pub dash_lock: bool,
    pub respawn_lock: bool,
    pub wears_mask: bool,
    pub physics: PhysicsConfig,
    pub clips: CharacterClips,
}

impl Kero {
    pub fn new(map: &Map, physics: PhysicsConfig, clips: CharacterClips, level: u32, life_count: u32) -> Self {
        Self {
            pos_x: map.spawn_x as f32,
            pos_y: map.spawn_y as f32,
            velocity_x: 0.0,
            velocity_y: 0.0,
            heading: Heading::Right,
            state: KeroState::Idle,
            prev_state: KeroState::Idle,
            anim: AnimationState::new(),
            life_count,
            prev_life_count: life_count,
            level,
            jump_lock: false,
            dash_lock: false,
            respawn_lock: false,
            wears_mask: false,
            physics,
            clips,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb {
            center_x: self.pos_x,
            center_y: self.pos_y,
            half_w: KERO_HALF,
            half_h: KERO_HALF,
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        self.clips.get(self.state)
    }

    /// Source rectangle of the current frame on the tileset.
    pub fn sprite_rect(&self) -> PixelRect {
        let clip = self.clip();
        let mask = if self.wears_mask { MASK_COLUMN_OFFSET } else { 0 };
        let facing = match self.heading {
            Heading::Right => 0,
            Heading::Left => LEFT_ROW_OFFSET,
        };
        let column = self.anim.current_frame + clip.offset_x + mask;
        let row = clip.offset_y + facing;
        PixelRect::new(
            column as i32 * KERO_SIZE,
            SPRITE_SHEET_TOP + row as i32 * KERO_SIZE,
            KERO_SIZE as u32,
            KERO_SIZE as u32,
        )
    }

    pub fn set_state(&mut self, state: KeroState) {
        self.prev_state = self.state;
        self.state = state;
        if self.state != self.prev_state {
            self.anim.reset();
            log::trace!("Kero {:?} -> {:?}", self.prev_state, self.state);
        }
    }

    /// Put the character on the map's spawn point at rest.
    pub fn place_at_spawn(&mut self, map: &Map) {
        self.pos_x = map.spawn_x as f32;
        self.pos_y = map.spawn_y as f32;
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
        self.dash_lock = false;
    }

    pub fn update(&mut self, map: &mut Map, buttons: ButtonMask, dt_ms: u64, paused: bool) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        if paused {
            self.jump_lock = true;
            return outcome;
        }

        let dt = dt_ms as f32;
        let clip = *self.clip();
        self.anim.tick(dt_ms, &clip);

        if self.state == KeroState::Dead {
            self.jump_lock = true;
            let confirm = buttons.is_set(Button::Num7) || buttons.is_set(Button::Select);
            if !self.respawn_lock {
                if confirm {
                    self.respawn(map);
                    outcome.respawned = true;
                }
            } else if !confirm {
                self.respawn_lock = false;
            }
            return outcome;
        }

        outcome.interaction = interaction::handle_intersect(map, &self.bounds());
        self.handle_dash(buttons);

        let index = map.grid.tile_index(self.pos_x as i32, self.pos_y as i32);
        let on_deadly_ground = map.grid.tile(index).is_deadly;
        let below = map
            .grid
            .get(index + map.grid.width as usize)
            .unwrap_or_default();
        let on_solid_ground = below.is_solid && self.state != KeroState::Jump;
        let at_bottom = self.pos_y > map.pixel_height() as f32 - KERO_HALF;

        if on_deadly_ground {
            self.die();
            outcome.died = true;
            return outcome;
        } else if at_bottom {
            self.apply_gravity(dt);
        } else if on_solid_ground {
            match self.state {
                KeroState::Fall | KeroState::Jump => self.velocity_x = 0.0,
                KeroState::Dash => {
                    self.set_state(KeroState::Idle);
                    self.velocity_x = 0.0;
                }
                _ => {}
            }
            self.velocity_y = 0.0;
            self.dash_lock = false;

            if buttons.is_set(Button::Up) && interaction::at_open_door(map, &self.bounds()) {
                outcome.door_entered = true;
            }
            if !buttons.is_set(Button::Num7) {
                self.jump_lock = false;
            }
            self.handle_jump(map, buttons);
        } else {
            self.apply_gravity(dt);
        }

        if self.velocity_y != 0.0 {
            self.pos_y += self.velocity_y * dt;
        } else {
            let tile_h = map.grid.tile_height as f32;
            self.pos_y = (self.pos_y / tile_h).floor() * tile_h + below.offset_top as f32;
        }

        if self.pos_y >= map.pixel_height() as f32 + KERO_HALF {
            self.die();
            outcome.died = true;
            return outcome;
        }

        let left = buttons.is_set(Button::Left);
        let right = buttons.is_set(Button::Right);
        if self.state == KeroState::Dash {
            if self.velocity_x <= 0.0 {
                self.set_state(KeroState::Idle);
            }
        } else {
            if left {
                self.heading = Heading::Left;
            } else if right {
                self.heading = Heading::Right;
            }
            // Airborne states are picked from the vertical velocity below.
            if self.velocity_y == 0.0 {
                if left || right {
                    self.set_state(KeroState::Run);
                } else if self.velocity_x <= 0.0 {
                    self.set_state(KeroState::Idle);
                }
            }
        }

        self.pos_x += self.heading.sign() * (self.velocity_x * dt).abs();
        self.clamp_position(map);

        if self.velocity_y < 0.0 {
            if self.state != KeroState::Dash {
                self.set_state(KeroState::Jump);
            }
        } else if self.velocity_y > 0.0 {
            if self.state != KeroState::Dash {
                self.set_state(KeroState::Fall);
            }
        } else if self.state == KeroState::Idle {
            return outcome;
        }

        if self.state == KeroState::Run || self.velocity_y != 0.0 {
            if (left || right) && self.state != KeroState::Dash {
                self.velocity_x =
                    (self.velocity_x + self.physics.acceleration * dt).min(self.physics.max_speed);
            } else {
                self.velocity_x = (self.velocity_x - self.physics.deceleration * dt).max(0.0);
            }
        }

        outcome
    }

    fn apply_gravity(&mut self, dt: f32) {
        self.velocity_y =
            (self.velocity_y + self.physics.gravity * dt).min(self.physics.max_fall_speed);
    }

    fn handle_jump(&mut self, map: &Map, buttons: ButtonMask) {
        if !buttons.is_set(Button::Num7) || buttons.is_set(Button::Num5) || self.jump_lock {
            return;
        }
        // The row above the head has to exist.
        let head = map
            .grid
            .tile_index(self.pos_x as i32, self.pos_y as i32 - KERO_SIZE);
        if head < map.grid.width as usize {
            return;
        }
        if self.prev_state != KeroState::Jump && self.state != KeroState::Jump {
            self.velocity_y = -self.physics.jump_velocity;
            self.set_state(KeroState::Jump);
        }
        self.jump_lock = true;
    }

    /// Dashing is only possible in the air, once per airtime, and not right
    /// after a respawn.
    fn handle_dash(&mut self, buttons: ButtonMask) {
        let dash = buttons.is_set(Button::Num5);
        if dash && buttons.is_set(Button::Num7) {
            return;
        }
        if !self.jump_lock && self.velocity_y == 0.0 {
            return;
        }
        if !dash || self.prev_state == KeroState::Dead {
            return;
        }
        if self.state == KeroState::Dash {
            self.set_state(KeroState::Dash);
        } else if !self.dash_lock {
            self.set_state(KeroState::Dash);
            self.velocity_x = self.physics.dash_velocity;
            self.dash_lock = true;
        }
    }

    fn die(&mut self) {
        self.set_state(KeroState::Dead);
        self.respawn_lock = true;
        self.life_count = self.life_count.saturating_sub(1);
        log::debug!(
            "Kero died at ({:.1}, {:.1}), {} lives left",
            self.pos_x,
            self.pos_y,
            self.life_count
        );
    }

    fn respawn(&mut self, map: &Map) {
        self.set_state(KeroState::Idle);
        self.place_at_spawn(map);
        self.prev_life_count = self.life_count;
        log::debug!("Kero respawned at ({}, {})", map.spawn_x, map.spawn_y);
    }

    fn clamp_position(&mut self, map: &Map) {
        if self.pos_y <= KERO_HALF {
            self.pos_y = KERO_HALF;
            self.velocity_y = 0.0;
        }

        let max_x = map.pixel_width() as f32 - KERO_HALF;
        if self.pos_x <= KERO_HALF {
            self.pos_x = KERO_HALF;
            return;
        }
        if self.pos_x >= max_x {
            self.pos_x = max_x;
            return;
        }

        let grid = &map.grid;
        let index = grid.tile_index(self.pos_x as i32, self.pos_y as i32);
        let column = grid.column_of(index);
        let (side, flags) = match self.heading {
            Heading::Right => grid.tile_offset(index, 1),
            Heading::Left => grid.tile_offset(index, -1),
        };
        let side_column = grid.column_of(side);
        let adjacent = match self.heading {
            Heading::Right => side_column == column + 1,
            Heading::Left => side_column + 1 == column,
        };
        if !flags.is_wall || !adjacent {
            return;
        }

        let tile_w = grid.tile_width as f32;
        self.pos_x = match self.heading {
            Heading::Right => side_column as f32 * tile_w - KERO_HALF,
            Heading::Left => (side_column + 1) as f32 * tile_w + KERO_HALF,
        }
        .clamp(KERO_HALF, max_x);
        self.velocity_x = 0.0;
    }
}
