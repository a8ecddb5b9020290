mod camera;
mod canvas;
mod tileset;

pub use camera::Camera;
pub use canvas::{argb, Canvas, PixelRect, COLOR_KEY, TRANSPARENT};
pub use tileset::{decode_png, Tileset};
