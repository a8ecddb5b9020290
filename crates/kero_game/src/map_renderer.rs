//! Level canvas composition.
//!
//! Tile layers are drawn once when a level loads. Afterwards only object
//! cells are touched, on a fixed animation tick.

use crate::map::{Map, ObjectKind};
use kero_core::time::Ticker;
use kero_render::{Canvas, PixelRect, Tileset};

const PRIDE_TILE_SHIFT: u32 = 100;

/// Tile actually drawn for `tile_id`. With the flag variant enabled, the
/// flag-carrying objects switch to the rainbow art one sheet row block up.
pub fn display_tile(tile_id: u32, use_pride_flag: bool) -> u32 {
    if use_pride_flag && matches!(tile_id, 930..=949 | 980..=999) {
        tile_id - PRIDE_TILE_SHIFT
    } else {
        tile_id
    }
}

pub struct MapRenderer {
    canvas: Canvas,
    ticker: Ticker,
}

impl MapRenderer {
    pub fn new(map: &Map, tileset: &Tileset, anim_fps: u32) -> Self {
        let mut renderer = Self {
            canvas: Canvas::new(map.pixel_width(), map.pixel_height()),
            ticker: Ticker::new(anim_fps),
        };
        renderer.prerender(map, tileset);
        renderer
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn prerender(&mut self, map: &Map, tileset: &Tileset) {
        self.canvas.fill(map.background);
        let columns = map.grid.width as usize;
        let (tile_w, tile_h) = (map.grid.tile_width as i32, map.grid.tile_height as i32);

        for layer in map.layers.iter().filter(|layer| layer.visible) {
            log::trace!("Drawing layer '{}'", layer.name);
            for (index, cell) in layer.cells.iter().enumerate() {
                let Some(local_id) = cell else {
                    continue;
                };
                let x = (index % columns) as i32 * tile_w;
                let y = (index / columns) as i32 * tile_h;
                tileset.draw_tile(&mut self.canvas, *local_id, x, y);
            }
        }

        for object in map.objects.iter().filter(|o| !o.hidden && o.local_id.is_some()) {
            tileset.draw_tile(
                &mut self.canvas,
                display_tile(object.tile_id, map.use_pride_flag),
                object.x,
                object.y,
            );
        }
        log::debug!(
            "Pre-rendered {} layer(s) onto {}x{} canvas",
            map.layers.len(),
            self.canvas.width(),
            self.canvas.height()
        );
    }

    /// Advance the animation clock. Returns true when objects were redrawn.
    pub fn update(&mut self, map: &mut Map, tileset: &Tileset, dt_ms: u64) -> bool {
        if !self.ticker.tick(dt_ms) {
            return false;
        }
        self.render_objects(map, tileset);
        true
    }

    /// Redraw every tile object and step its animation by one frame.
    pub fn render_objects(&mut self, map: &mut Map, tileset: &Tileset) {
        let doors_open = map.doors_open();
        let background = map.background;
        let use_pride_flag = map.use_pride_flag;

        for index in 0..map.objects.len() {
            let object = &mut map.objects[index];
            let Some(local_id) = object.local_id else {
                continue;
            };
            if object.kind == ObjectKind::Door && doors_open {
                object.start_frame = 1;
                object.current_frame = 1;
            }

            let cell = PixelRect::new(object.x, object.y, tileset.tile_width, tileset.tile_height);
            self.canvas.fill_rect(cell, background);
            if let Some(under) = object.canvas_tile {
                tileset.draw_tile(&mut self.canvas, under, object.x, object.y);
            }
            if !object.hidden {
                tileset.draw_tile(
                    &mut self.canvas,
                    display_tile(object.tile_id, use_pride_flag),
                    object.x,
                    object.y,
                );
            }

            if object.anim_length > 0 {
                object.current_frame += 1;
                if object.current_frame >= object.anim_length + object.start_frame {
                    object.current_frame = object.start_frame;
                }
            }
            let frame = object.current_frame;
            let next = map.animation_frame(local_id, frame).unwrap_or(local_id);
            map.objects[index].tile_id = next;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::map::tests::sample_map;
    use kero_render::argb;

    pub(crate) fn tile_color(local_id: u32) -> u32 {
        argb(0xff, 0x10 + local_id as u8, 0x80, 0x40)
    }

    /// Sheet large enough for every HUD region and sprite frame, with the
    /// first 32 map tiles painted in distinct colours.
    pub(crate) fn sample_tileset() -> Tileset {
        let mut image = Canvas::new(800, 880);
        for id in 0..32u32 {
            let rect = PixelRect::new((id % 8 * 16) as i32, (id / 8 * 16) as i32, 16, 16);
            image.fill_rect(rect, tile_color(id));
        }
        Tileset::new(image, 16, 16, 8).expect("valid tileset")
    }

    fn pixel_at_tile(renderer: &MapRenderer, x: i32, y: i32) -> Option<u32> {
        renderer.canvas().get(x + 8, y + 8)
    }

    #[test]
    fn display_tile_swaps_flag_ranges() {
        assert_eq!(display_tile(930, true), 830);
        assert_eq!(display_tile(999, true), 899);
        assert_eq!(display_tile(950, true), 950);
        assert_eq!(display_tile(985, false), 985);
    }

    #[test]
    fn prerender_draws_layers_and_objects() {
        let map = sample_map();
        let tileset = sample_tileset();
        let renderer = MapRenderer::new(&map, &tileset, 15);

        assert_eq!(renderer.canvas().width(), 160);
        assert_eq!(pixel_at_tile(&renderer, 0, 0), Some(tile_color(4)));
        assert_eq!(pixel_at_tile(&renderer, 0, 112), Some(tile_color(0)));
        assert_eq!(pixel_at_tile(&renderer, 64, 96), Some(tile_color(10)));
    }

    #[test]
    fn animated_objects_cycle_on_tick() {
        let mut map = sample_map();
        let tileset = sample_tileset();
        let mut renderer = MapRenderer::new(&map, &tileset, 15);

        assert!(!renderer.update(&mut map, &tileset, 10));
        let mut seen = Vec::new();
        for _ in 0..4 {
            assert!(renderer.update(&mut map, &tileset, 70));
            seen.push(map.objects[1].tile_id);
        }
        assert_eq!(seen, vec![11, 12, 10, 11]);
    }

    #[test]
    fn hidden_object_shows_tile_underneath() {
        let mut map = sample_map();
        let tileset = sample_tileset();
        let mut renderer = MapRenderer::new(&map, &tileset, 15);

        map.objects[1].hidden = true;
        renderer.render_objects(&mut map, &tileset);
        assert_eq!(pixel_at_tile(&renderer, 64, 96), Some(tile_color(5)));
    }

    #[test]
    fn door_switches_to_open_frame() {
        let mut map = sample_map();
        let tileset = sample_tileset();
        let mut renderer = MapRenderer::new(&map, &tileset, 15);

        renderer.render_objects(&mut map, &tileset);
        assert_eq!(map.objects[3].tile_id, 20);

        map.coins_left = 0;
        renderer.render_objects(&mut map, &tileset);
        assert_eq!(map.objects[3].tile_id, 21);
        renderer.render_objects(&mut map, &tileset);
        assert_eq!(pixel_at_tile(&renderer, 16, 96), Some(tile_color(21)));
    }
}
