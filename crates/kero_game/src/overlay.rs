//! Screen-space panels cut out of the tileset: coin and life counters, the
//! pause menu and the dialogue box.
//!
//! Each panel is a small canvas redrawn only when what it shows changes, then
//! composed onto the screen at a fixed position. Text inside the dialogue box
//! is kept as laid-out rows for the host to draw.

use crate::menu::MenuItem;
use crate::narrative::{Dialogue, Portrait};
use kero_core::time::Ticker;
use kero_render::{Canvas, PixelRect, Tileset};

const COIN_PANEL: PixelRect = PixelRect::new(608, 0, 54, 16);
const LIFE_PANEL: PixelRect = PixelRect::new(747, 0, 37, 16);
const MENU_PANEL: PixelRect = PixelRect::new(608, 16, 96, 48);
const MENU_CURSOR_COLUMN: PixelRect = PixelRect::new(689, 19, 13, 42);
const DIALOGUE_PANEL: PixelRect = PixelRect::new(608, 74, 176, 72);

const DIGITS_X: i32 = 666;
const DIGIT_SIZE: u32 = 8;
const CURSOR_FRAMES: u32 = 12;
const CURSOR_ROWS: [i32; 3] = [4, 19, 34];
const PORTRAIT_SIZE: u32 = 31;

pub const COIN_PANEL_POS: (i32, i32) = (0, 4);
pub const LIFE_PANEL_POS: (i32, i32) = (139, 4);
pub const MENU_PANEL_POS: (i32, i32) = (40, 80);
pub const DIALOGUE_PANEL_POS: (i32, i32) = (0, 136);

fn digit_rect(digit: u32) -> PixelRect {
    PixelRect::new(DIGITS_X + (digit % 10 * DIGIT_SIZE) as i32, 0, DIGIT_SIZE, DIGIT_SIZE)
}

fn cursor_rect(frame: u32) -> PixelRect {
    PixelRect::new(608 + (frame * 14) as i32, 64, 14, 10)
}

fn portrait_rect(portrait: Portrait) -> PixelRect {
    let (x, y) = match portrait {
        Portrait::Kero => (615, 81),
        Portrait::KeroMasked => (608, 146),
        Portrait::Sign => (640, 146),
    };
    PixelRect::new(x, y, PORTRAIT_SIZE, PORTRAIT_SIZE)
}

/// Values shown by the two counter panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub coins_left: u32,
    pub coin_max: u32,
    pub life_count: u32,
}

pub struct Overlay {
    coin_panel: Canvas,
    life_panel: Canvas,
    menu_panel: Canvas,
    dialogue_panel: Canvas,
    shown_counters: Option<Counters>,
    drawn_selection: Option<MenuItem>,
    cursor_frame: u32,
    cursor_ticker: Ticker,
    dialogue: Option<Dialogue>,
}

impl Overlay {
    pub fn new(tileset: &Tileset, anim_fps: u32) -> Self {
        Self {
            coin_panel: Canvas::new(COIN_PANEL.w, COIN_PANEL.h),
            life_panel: Canvas::new(LIFE_PANEL.w, LIFE_PANEL.h),
            menu_panel: tileset.image.crop(MENU_PANEL),
            dialogue_panel: tileset.image.crop(DIALOGUE_PANEL),
            shown_counters: None,
            drawn_selection: None,
            cursor_frame: 0,
            cursor_ticker: Ticker::new(anim_fps),
            dialogue: None,
        }
    }

    /// Redraw the counters if they differ from what is on screen. Returns
    /// true when a panel was redrawn.
    pub fn update_counters(&mut self, tileset: &Tileset, counters: Counters) -> bool {
        if self.shown_counters == Some(counters) {
            return false;
        }
        let coin_max = counters.coin_max.min(9);
        let coins_left = counters.coins_left.min(9);
        let collected = coin_max.saturating_sub(coins_left);

        self.coin_panel.copy_rect(&tileset.image, COIN_PANEL, 0, 0);
        tileset.draw_region(&mut self.coin_panel, digit_rect(collected), 16, 4);
        tileset.draw_region(&mut self.coin_panel, digit_rect(coin_max), 42, 4);

        let lives = counters.life_count.min(99);
        self.life_panel.copy_rect(&tileset.image, LIFE_PANEL, 0, 0);
        if lives < 10 {
            tileset.draw_region(&mut self.life_panel, digit_rect(lives), 27, 4);
        } else {
            tileset.draw_region(&mut self.life_panel, digit_rect(lives / 10), 19, 4);
            tileset.draw_region(&mut self.life_panel, digit_rect(lives % 10), 27, 4);
        }

        log::trace!("Counters redrawn: {:?}", counters);
        self.shown_counters = Some(counters);
        true
    }

    /// Animate the menu cursor next to `selection`.
    pub fn update_menu(&mut self, tileset: &Tileset, selection: MenuItem, dt_ms: u64) -> bool {
        let ticked = self.cursor_ticker.tick(dt_ms);
        let moved = self.drawn_selection != Some(selection);
        if !ticked && !moved {
            return false;
        }
        if moved {
            self.menu_panel.copy_rect(&tileset.image, MENU_PANEL, 0, 0);
            self.drawn_selection = Some(selection);
        }
        if ticked {
            self.cursor_frame = (self.cursor_frame + 1) % CURSOR_FRAMES;
        }
        self.menu_panel.copy_rect(&tileset.image, MENU_CURSOR_COLUMN, 2, 2);
        tileset.draw_region(
            &mut self.menu_panel,
            cursor_rect(self.cursor_frame),
            2,
            CURSOR_ROWS[selection.index()],
        );
        true
    }

    pub fn show_dialogue(&mut self, tileset: &Tileset, dialogue: Dialogue) {
        if self.dialogue.as_ref() == Some(&dialogue) {
            return;
        }
        self.dialogue_panel.copy_rect(&tileset.image, DIALOGUE_PANEL, 0, 0);
        self.dialogue_panel
            .copy_rect(&tileset.image, portrait_rect(dialogue.portrait), 7, 7);
        self.dialogue = Some(dialogue);
    }

    pub fn hide_dialogue(&mut self) {
        self.dialogue = None;
    }

    pub fn dialogue(&self) -> Option<&Dialogue> {
        self.dialogue.as_ref()
    }

    /// Draw the panels onto a screen-sized canvas.
    pub fn compose(&self, screen: &mut Canvas, paused: bool) {
        let full = |canvas: &Canvas| PixelRect::new(0, 0, canvas.width(), canvas.height());

        screen.blit(&self.coin_panel, full(&self.coin_panel), COIN_PANEL_POS.0, COIN_PANEL_POS.1);
        screen.blit(&self.life_panel, full(&self.life_panel), LIFE_PANEL_POS.0, LIFE_PANEL_POS.1);
        if paused {
            screen.blit(&self.menu_panel, full(&self.menu_panel), MENU_PANEL_POS.0, MENU_PANEL_POS.1);
        }
        if self.dialogue.is_some() {
            screen.blit(
                &self.dialogue_panel,
                full(&self.dialogue_panel),
                DIALOGUE_PANEL_POS.0,
                DIALOGUE_PANEL_POS.1,
            );
        }
    }
}
