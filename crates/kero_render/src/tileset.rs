use crate::canvas::{Canvas, PixelRect, COLOR_KEY, TRANSPARENT};

/// Decode a PNG into a canvas. Magenta pixels become transparent.
pub fn decode_png(bytes: &[u8], origin: &str) -> Result<Canvas, String> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| format!("Failed to decode image {origin}: {e}"))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    let pixels = image
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            let rgb = (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b);
            if a == 0 || rgb == COLOR_KEY {
                TRANSPARENT
            } else {
                0xff00_0000 | rgb
            }
        })
        .collect();
    Canvas::from_pixels(width, height, pixels)
}

/// A sheet of equally sized tiles addressed by local tile id, row-major.
#[derive(Debug, Clone)]
pub struct Tileset {
    pub image: Canvas,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
}

impl Tileset {
    pub fn new(image: Canvas, tile_width: u32, tile_height: u32, columns: u32) -> Result<Self, String> {
        if tile_width == 0 || tile_height == 0 {
            return Err("Tileset validation failed: tile size must be > 0".to_string());
        }
        let columns = if columns == 0 {
            image.width() / tile_width
        } else {
            columns
        };
        if columns == 0 {
            return Err(format!(
                "Tileset validation failed: image width {} is narrower than one tile",
                image.width()
            ));
        }
        Ok(Self {
            image,
            tile_width,
            tile_height,
            columns,
        })
    }

    pub fn tile_rect(&self, local_id: u32) -> PixelRect {
        PixelRect::new(
            ((local_id % self.columns) * self.tile_width) as i32,
            ((local_id / self.columns) * self.tile_height) as i32,
            self.tile_width,
            self.tile_height,
        )
    }

    pub fn draw_tile(&self, dst: &mut Canvas, local_id: u32, x: i32, y: i32) {
        dst.blit(&self.image, self.tile_rect(local_id), x, y);
    }

    /// Blit an arbitrary region of the sheet, e.g. sprite frames or HUD art.
    pub fn draw_region(&self, dst: &mut Canvas, src: PixelRect, x: i32, y: i32) {
        dst.blit(&self.image, src, x, y);
    }
}
