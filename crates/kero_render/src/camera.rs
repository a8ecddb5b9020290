use glam::{IVec2, UVec2};

/// Viewport into the level canvas, centred on a target and kept inside the map.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: IVec2,
    pub viewport: UVec2,
}

impl Camera {
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            position: IVec2::ZERO,
            viewport: UVec2::new(viewport_width, viewport_height),
        }
    }

    pub fn follow(&mut self, target_x: f32, target_y: f32, map_width: u32, map_height: u32) {
        let half = (self.viewport / 2).as_ivec2();
        let desired = IVec2::new(target_x as i32, target_y as i32) - half;
        let max = (UVec2::new(map_width, map_height).as_ivec2() - self.viewport.as_ivec2())
            .max(IVec2::ZERO);
        self.position = desired.clamp(IVec2::ZERO, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follow_centres_on_target() {
        let mut camera = Camera::new(176, 208);
        camera.follow(500.0, 400.0, 1024, 1024);
        assert_eq!(camera.position, IVec2::new(500 - 88, 400 - 104));
    }

    #[test]
    fn follow_clamps_to_map_edges() {
        let mut camera = Camera::new(176, 208);
        camera.follow(10.0, 10.0, 1024, 512);
        assert_eq!(camera.position, IVec2::ZERO);
        camera.follow(1020.0, 510.0, 1024, 512);
        assert_eq!(camera.position, IVec2::new(1024 - 176, 512 - 208));
    }

    #[test]
    fn map_smaller_than_viewport_pins_to_origin() {
        let mut camera = Camera::new(176, 208);
        camera.follow(64.0, 64.0, 128, 128);
        assert_eq!(camera.position, IVec2::ZERO);
    }
}
