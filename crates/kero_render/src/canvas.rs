//! CPU pixel surface used for every composition step.
//!
//! Pixels are packed `0xAARRGGBB`. Blits skip pixels whose alpha is zero, which
//! is how sprite sheets encode their magenta colour key once decoded.

use std::path::Path;

pub const TRANSPARENT: u32 = 0x0000_0000;
/// Magenta, treated as fully transparent when a sheet is decoded.
pub const COLOR_KEY: u32 = 0x00ff_00ff;

pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, String> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(format!(
                "Canvas size mismatch: {}x{} needs {} pixels, got {}",
                width,
                height,
                expected,
                pixels.len()
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    pub fn set(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color;
        }
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: u32) {
        let Some((x0, y0, x1, y1)) = self.clip(rect.x, rect.y, rect.w, rect.h) else {
            return;
        };
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    /// Copy `src_rect` of `src` to (`dst_x`, `dst_y`), skipping transparent
    /// pixels. Both rectangles are clipped to their canvases.
    pub fn blit(&mut self, src: &Canvas, src_rect: PixelRect, dst_x: i32, dst_y: i32) {
        self.copy_from(src, src_rect, dst_x, dst_y, true);
    }

    /// Like [`Canvas::blit`] but transparent pixels overwrite the destination.
    pub fn copy_rect(&mut self, src: &Canvas, src_rect: PixelRect, dst_x: i32, dst_y: i32) {
        self.copy_from(src, src_rect, dst_x, dst_y, false);
    }

    /// Extract a sub-canvas. Pixels outside the source read as transparent.
    pub fn crop(&self, rect: PixelRect) -> Canvas {
        let mut out = Canvas::new(rect.w, rect.h);
        out.copy_rect(self, rect, 0, 0);
        out
    }

    fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        // ARGB -> RGBA byte order, one [u8; 4] per pixel.
        let rgba: Vec<[u8; 4]> = self
            .pixels
            .iter()
            .map(|p| p.rotate_left(8).to_be_bytes())
            .collect();
        let bytes: &[u8] = bytemuck::cast_slice(&rgba);
        image::RgbaImage::from_raw(self.width, self.height, bytes.to_vec())
    }

    /// Encode the canvas as an in-memory RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, String> {
        let image = self
            .to_rgba_image()
            .ok_or_else(|| "Failed to build image from canvas".to_string())?;
        let mut out = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| format!("Failed to encode png: {e}"))?;
        Ok(out.into_inner())
    }

    /// Write the canvas as an RGBA PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), String> {
        let image = self
            .to_rgba_image()
            .ok_or_else(|| format!("Failed to build image for {}", path.display()))?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        log::info!(
            "Wrote {}x{} snapshot to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }

    fn copy_from(&mut self, src: &Canvas, src_rect: PixelRect, dst_x: i32, dst_y: i32, keyed: bool) {
        // Clip against the source first, shifting the destination to match.
        let Some((sx0, sy0, sx1, sy1)) = src.clip(src_rect.x, src_rect.y, src_rect.w, src_rect.h)
        else {
            return;
        };
        let dx = dst_x + (sx0 - src_rect.x);
        let dy = dst_y + (sy0 - src_rect.y);
        let w = (sx1 - sx0) as u32;
        let h = (sy1 - sy0) as u32;

        let Some((dx0, dy0, dx1, dy1)) = self.clip(dx, dy, w, h) else {
            return;
        };
        let shift_x = dx0 - dx;
        let shift_y = dy0 - dy;

        for row in 0..(dy1 - dy0) {
            let s_row = (sy0 + shift_y + row) as usize * src.width as usize;
            let d_row = (dy0 + row) as usize * self.width as usize;
            for col in 0..(dx1 - dx0) {
                let pixel = src.pixels[s_row + (sx0 + shift_x + col) as usize];
                if keyed && pixel >> 24 == 0 {
                    continue;
                }
                self.pixels[d_row + (dx0 + col) as usize] = pixel;
            }
        }
    }

    fn clip(&self, x: i32, y: i32, w: u32, h: u32) -> Option<(i32, i32, i32, i32)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x.saturating_add(w as i32)).min(self.width as i32);
        let y1 = (y.saturating_add(h as i32)).min(self.height as i32);
        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}
