//! Owned game state and the per-frame update/render sequence.

use crate::assets::AssetSource;
use crate::config::GameConfig;
use crate::interaction::Interaction;
use crate::kero::{load_clip_table, CharacterClips, Kero, KeroState, KERO_HALF};
use crate::map::{level_file_name, load_map, Map};
use crate::map_renderer::MapRenderer;
use crate::menu::{MenuAction, PauseMenu};
use crate::narrative::{DeathLines, Dialogue, Portrait};
use crate::overlay::{Counters, Overlay};
use kero_core::input::{Button, ButtonMask, InputState};
use kero_render::{decode_png, Camera, Canvas, PixelRect, Tileset};

/// A loaded level: the map plus the art it is drawn with.
struct Level {
    map: Map,
    tileset: Tileset,
    renderer: MapRenderer,
}

fn load_level(assets: &dyn AssetSource, level: u32, anim_fps: u32) -> Result<Level, String> {
    let map = load_map(assets, &level_file_name(level))?;
    let bytes = assets.read(&map.tileset_image)?;
    let image = decode_png(&bytes, &map.tileset_image)?;
    let tileset = Tileset::new(
        image,
        map.grid.tile_width,
        map.grid.tile_height,
        map.tileset_columns,
    )?;
    let renderer = MapRenderer::new(&map, &tileset, anim_fps);
    Ok(Level {
        map,
        tileset,
        renderer,
    })
}

pub struct Game {
    config: GameConfig,
    assets: Box<dyn AssetSource>,
    level: Level,
    kero: Kero,
    overlay: Overlay,
    menu: PauseMenu,
    input: InputState,
    camera: Camera,
    death_lines: DeathLines,
    death_line: Option<usize>,
    cheat_active: bool,
    unavailable_level: Option<u32>,
    running: bool,
    screen: Canvas,
}

impl Game {
    pub fn new(config: GameConfig, assets: Box<dyn AssetSource>) -> Result<Self, String> {
        let clips = match &config.clip_file {
            Some(name) => load_clip_table(assets.as_ref(), name)?,
            None => CharacterClips::default(),
        };
        let level = load_level(assets.as_ref(), config.first_level, config.anim_fps)?;
        let kero = Kero::new(
            &level.map,
            config.physics,
            clips,
            config.first_level,
            config.life_count,
        );
        let overlay = Overlay::new(&level.tileset, config.anim_fps);
        let mut camera = Camera::new(config.screen_width, config.screen_height);
        camera.follow(
            kero.pos_x,
            kero.pos_y,
            level.map.pixel_width(),
            level.map.pixel_height(),
        );
        log::info!(
            "Game started on level {} with {} lives",
            config.first_level,
            config.life_count
        );

        Ok(Self {
            death_lines: DeathLines::new(config.death_line_seed),
            screen: Canvas::new(config.screen_width, config.screen_height),
            config,
            assets,
            level,
            kero,
            overlay,
            menu: PauseMenu::new(),
            input: InputState::new(),
            camera,
            death_line: None,
            cheat_active: false,
            unavailable_level: None,
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.menu.paused
    }

    pub fn kero(&self) -> &Kero {
        &self.kero
    }

    pub fn map(&self) -> &Map {
        &self.level.map
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn dialogue(&self) -> Option<&Dialogue> {
        self.overlay.dialogue()
    }

    /// Index of the death line currently shown, if the character is dead.
    pub fn death_line(&self) -> Option<usize> {
        self.death_line
    }

    pub fn button_down(&mut self, button: Button) {
        if !self.input.button_down(button) {
            return;
        }
        let response = self.menu.handle_button_down(button, self.input.mask());
        if response.cheat_entered {
            self.toggle_cheat();
        }
        match response.action {
            Some(MenuAction::Paused) => log::info!("Paused"),
            Some(MenuAction::Resumed) => log::info!("Resumed"),
            Some(MenuAction::Quit) => {
                log::info!("Quit selected");
                self.running = false;
            }
            Some(MenuAction::Moved(item)) => log::debug!("Menu selection {:?}", item),
            None => {}
        }
    }

    pub fn button_up(&mut self, button: Button) {
        self.input.button_up(button);
    }

    /// Drive the held buttons from a replay frame, generating press events
    /// for buttons that were not held before.
    pub fn apply_mask(&mut self, mask: ButtonMask) {
        for &button in Button::ALL {
            let held = self.input.is_held(button);
            if mask.is_set(button) && !held {
                self.button_down(button);
            } else if !mask.is_set(button) && held {
                self.button_up(button);
            }
        }
    }

    fn toggle_cheat(&mut self) {
        self.cheat_active = !self.cheat_active;
        self.kero.wears_mask = self.cheat_active;
        self.level.map.use_pride_flag = self.cheat_active;
        log::info!(
            "Costume {}",
            if self.cheat_active { "on" } else { "off" }
        );
    }

    pub fn update(&mut self, dt_ms: u64) {
        let outcome = self.kero.update(
            &mut self.level.map,
            self.input.mask(),
            dt_ms,
            self.menu.paused,
        );

        match outcome.interaction {
            Some(Interaction::DialogueStarted(text)) => {
                self.overlay
                    .show_dialogue(&self.level.tileset, Dialogue::new(text, Portrait::Sign));
            }
            Some(Interaction::DialogueEnded) if self.kero.state != KeroState::Dead => {
                self.overlay.hide_dialogue();
            }
            Some(Interaction::CoinCollected { coins_left }) if coins_left == 0 => {
                log::info!("All coins collected, door is open");
            }
            _ => {}
        }

        if outcome.died {
            let (index, line) = self.death_lines.pick();
            self.death_line = Some(index);
            let portrait = if self.kero.wears_mask {
                Portrait::KeroMasked
            } else {
                Portrait::Kero
            };
            self.overlay
                .show_dialogue(&self.level.tileset, Dialogue::new(line, portrait));
        }
        if outcome.respawned {
            self.death_line = None;
            self.level.map.dialogue_block = None;
            self.overlay.hide_dialogue();
        }
        if outcome.door_entered {
            self.enter_next_level();
        }

        self.level
            .renderer
            .update(&mut self.level.map, &self.level.tileset, dt_ms);
        self.camera.follow(
            self.kero.pos_x,
            self.kero.pos_y,
            self.level.map.pixel_width(),
            self.level.map.pixel_height(),
        );

        if self.level.map.prev_coins != self.level.map.coins_left
            || self.kero.prev_life_count != self.kero.life_count
        {
            log::debug!(
                "Coins {}/{}, lives {}",
                self.level.map.coin_max - self.level.map.coins_left.min(self.level.map.coin_max),
                self.level.map.coin_max,
                self.kero.life_count
            );
        }
        self.overlay.update_counters(
            &self.level.tileset,
            Counters {
                coins_left: self.level.map.coins_left,
                coin_max: self.level.map.coin_max,
                life_count: self.kero.life_count,
            },
        );
        self.level.map.prev_coins = self.level.map.coins_left;
        self.kero.prev_life_count = self.kero.life_count;
        if self.menu.paused {
            self.overlay
                .update_menu(&self.level.tileset, self.menu.selection, dt_ms);
        }
    }

    fn enter_next_level(&mut self) {
        let next = self.kero.level + 1;
        if self.unavailable_level == Some(next) {
            return;
        }
        match load_level(self.assets.as_ref(), next, self.config.anim_fps) {
            Ok(mut level) => {
                level.map.use_pride_flag = self.cheat_active;
                self.level = level;
                self.kero.level = next;
                self.kero.place_at_spawn(&self.level.map);
                self.kero.jump_lock = true;
                self.overlay.hide_dialogue();
                self.unavailable_level = None;
                log::info!("Entered level {}", next);
            }
            Err(err) => {
                log::error!("Failed to load level {}: {}", next, err);
                self.unavailable_level = Some(next);
            }
        }
    }

    /// Compose the visible part of the level, the character and the overlay.
    pub fn render(&mut self) -> &Canvas {
        let origin = self.camera.position;
        let view = PixelRect::new(
            origin.x,
            origin.y,
            self.screen.width(),
            self.screen.height(),
        );
        self.screen.fill(self.level.map.background);
        self.screen
            .copy_rect(self.level.renderer.canvas(), view, 0, 0);

        let half = KERO_HALF as i32;
        self.level.tileset.draw_region(
            &mut self.screen,
            self.kero.sprite_rect(),
            self.kero.pos_x as i32 - half - origin.x,
            self.kero.pos_y as i32 - half - origin.y,
        );
        self.overlay.compose(&mut self.screen, self.menu.paused);
        &self.screen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::MemoryAssets;
    use crate::map::tests::sample_map_json;
    use crate::map_renderer::tests::{sample_tileset, tile_color};

    fn assets_with_levels(levels: &[u32]) -> MemoryAssets {
        let mut assets = MemoryAssets::default();
        for level in levels {
            assets.insert(&level_file_name(*level), sample_map_json());
        }
        let png = sample_tileset().image.encode_png().expect("encode tileset");
        assets.insert("tileset.png", png);
        assets
    }

    fn game_with_levels(levels: &[u32]) -> Game {
        Game::new(GameConfig::default(), Box::new(assets_with_levels(levels))).expect("game starts")
    }

    fn step(game: &mut Game, buttons: &[Button], frames: usize) {
        for _ in 0..frames {
            game.apply_mask(ButtonMask::from_buttons(buttons));
            game.update(16);
        }
    }

    #[test]
    fn missing_first_level_fails_init() {
        let err = Game::new(GameConfig::default(), Box::new(assets_with_levels(&[2])))
            .err()
            .expect("level 1 is missing");
        assert!(err.contains("001.tmj"));
    }

    #[test]
    fn starts_at_spawn_with_clamped_camera() {
        let game = game_with_levels(&[1]);
        assert_eq!((game.kero().pos_x, game.kero().pos_y), (40.0, 96.0));
        assert_eq!(game.kero().life_count, 99);
        assert_eq!(game.camera().position.x, 0);
        assert_eq!(game.camera().position.y, 0);
        assert!(game.is_running());
    }

    #[test]
    fn render_shows_level_and_sprite_area() {
        let mut game = game_with_levels(&[1]);
        game.update(16);
        let screen = game.render();
        assert_eq!(screen.width(), 176);
        assert_eq!(screen.get(8, 120), Some(tile_color(0)));
    }

    #[test]
    fn pause_freezes_character_and_quit_stops() {
        let mut game = game_with_levels(&[1]);
        step(&mut game, &[Button::SoftLeft], 1);
        assert!(game.is_paused());

        step(&mut game, &[Button::Right], 20);
        assert_eq!(game.kero().pos_x, 40.0);

        step(&mut game, &[], 1);
        step(&mut game, &[Button::Up], 1);
        step(&mut game, &[], 1);
        step(&mut game, &[Button::Num7], 1);
        assert!(!game.is_running());
    }

    #[test]
    fn cheat_toggles_costume_and_flag_tiles() {
        let mut game = game_with_levels(&[1]);
        step(&mut game, &[Button::SoftLeft], 1);
        step(&mut game, &[], 1);
        step(&mut game, &[Button::Down], 1);
        for button in [Button::Num5, Button::Num4, Button::Num2, Button::Num8, Button::Num7] {
            step(&mut game, &[], 1);
            step(&mut game, &[button], 1);
        }
        assert!(game.kero().wears_mask);
        assert!(game.map().use_pride_flag);
    }

    #[test]
    fn death_shows_a_line_until_respawn() {
        let mut game = game_with_levels(&[1]);
        game.kero.pos_x = 136.0;
        game.update(16);
        assert_eq!(game.kero().state, KeroState::Dead);
        let line = game.death_line().expect("death line chosen");
        assert_eq!(
            game.dialogue().map(|d| d.text.as_str()),
            Some(crate::narrative::DEATH_LINES[line])
        );

        step(&mut game, &[], 1);
        step(&mut game, &[Button::Num7], 1);
        assert_eq!(game.kero().state, KeroState::Idle);
        assert!(game.dialogue().is_none());
        assert_eq!(game.death_line(), None);
    }

    #[test]
    fn open_door_loads_next_level() {
        let mut game = game_with_levels(&[1, 2]);
        game.level.map.coins_left = 0;
        game.kero.pos_x = 24.0;
        step(&mut game, &[Button::Up], 1);
        assert_eq!(game.kero().level, 2);
        assert_eq!((game.kero().pos_x, game.kero().pos_y), (40.0, 96.0));
        assert_eq!(game.map().coins_left, 2);
    }

    #[test]
    fn missing_next_level_keeps_playing() {
        let mut game = game_with_levels(&[1]);
        game.level.map.coins_left = 0;
        game.kero.pos_x = 24.0;
        step(&mut game, &[Button::Up], 3);
        assert_eq!(game.kero().level, 1);
        assert!(game.is_running());
        assert_eq!(game.unavailable_level, Some(2));
    }
}
