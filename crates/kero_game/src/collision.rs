//! Tile-property collision grid.
//!
//! Every cell of the level carries the union of the collision properties of
//! the tiles stacked on it across all tile layers. The character controller
//! never tests geometry: it samples the cell under (or beside) its centre and
//! reacts to the flags it finds there.
//!
//! Lookups are total. Positions left of or above the map clamp to the first
//! cell and anything past the last cell clamps to the last one, so callers can
//! look around the edges without bounds checks.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileFlags {
    pub is_solid: bool,
    pub is_wall: bool,
    pub is_deadly: bool,
    /// Vertical nudge applied when standing on this tile, in pixels.
    pub offset_top: i32,
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    tiles: Vec<TileFlags>,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tile_width: u32, tile_height: u32) -> Self {
        Self {
            width,
            height,
            tile_width: tile_width.max(1),
            tile_height: tile_height.max(1),
            tiles: vec![TileFlags::default(); (width as usize * height as usize).max(1)],
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn pixel_width(&self) -> u32 {
        self.width * self.tile_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.height * self.tile_height
    }

    /// Flat index of the cell containing pixel (`x`, `y`), clamped to the grid.
    pub fn tile_index(&self, x: i32, y: i32) -> usize {
        let col = (x.max(0) as u32 / self.tile_width) as usize;
        let row = (y.max(0) as u32 / self.tile_height) as usize;
        let index = col + row * self.width as usize;
        index.min(self.tile_count() - 1)
    }

    pub fn tile(&self, index: usize) -> TileFlags {
        self.tiles[index.min(self.tiles.len() - 1)]
    }

    /// Flags at `index`, or `None` past the last row.
    pub fn get(&self, index: usize) -> Option<TileFlags> {
        self.tiles.get(index).copied()
    }

    /// Flags at a possibly negative or overflowing index. Out-of-range cells
    /// are treated as the nearest valid cell.
    pub fn tile_offset(&self, index: usize, delta: isize) -> (usize, TileFlags) {
        let target = index
            .checked_add_signed(delta)
            .unwrap_or(0)
            .min(self.tiles.len() - 1);
        (target, self.tiles[target])
    }

    #[allow(dead_code)]
    pub fn tile_at(&self, x: i32, y: i32) -> TileFlags {
        self.tile(self.tile_index(x, y))
    }

    pub fn column_of(&self, index: usize) -> u32 {
        (index % self.width.max(1) as usize) as u32
    }

    /// Merge properties into a cell. Booleans accumulate across layers and
    /// the topmost layer decides `offset_top`.
    pub fn merge(&mut self, index: usize, flags: TileFlags) {
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.is_solid |= flags.is_solid;
            tile.is_wall |= flags.is_wall;
            tile.is_deadly |= flags.is_deadly;
            tile.offset_top = flags.offset_top;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn from_rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            center_x: x + w / 2.0,
            center_y: y + h / 2.0,
            half_w: w / 2.0,
            half_h: h / 2.0,
        }
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_h
    }

    /// Overlap test. Boxes that share an edge count as intersecting.
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.left() > self.right()
            || other.top() > self.bottom()
            || self.left() > other.right()
            || self.top() > other.bottom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TileGrid {
        TileGrid::new(10, 6, 16, 16)
    }

    #[test]
    fn tile_index_row_major() {
        let grid = grid();
        assert_eq!(grid.tile_index(0, 0), 0);
        assert_eq!(grid.tile_index(17, 0), 1);
        assert_eq!(grid.tile_index(0, 16), 10);
        assert_eq!(grid.tile_index(33, 40), 2 + 2 * 10);
    }

    #[test]
    fn tile_index_is_clamped() {
        let grid = grid();
        assert_eq!(grid.tile_index(-50, -50), 0);
        assert_eq!(grid.tile_index(10_000, 10_000), grid.tile_count() - 1);
    }

    #[test]
    fn tile_index_is_monotonic() {
        let grid = grid();
        let mut last = 0;
        for x in (-20..200).step_by(3) {
            let index = grid.tile_index(x, 20);
            assert!(index >= last);
            assert!(index < grid.tile_count());
            last = index;
        }
        let mut last = 0;
        for y in (-20..200).step_by(3) {
            let index = grid.tile_index(20, y);
            assert!(index >= last);
            assert!(index < grid.tile_count());
            last = index;
        }
    }

    #[test]
    fn get_past_last_row_is_none() {
        let grid = grid();
        assert!(grid.get(grid.tile_count() - 1).is_some());
        assert!(grid.get(grid.tile_count()).is_none());
    }

    #[test]
    fn tile_offset_stays_in_range() {
        let grid = grid();
        assert_eq!(grid.tile_offset(0, -1).0, 0);
        assert_eq!(grid.tile_offset(grid.tile_count() - 1, 1).0, grid.tile_count() - 1);
        assert_eq!(grid.tile_offset(5, 1).0, 6);
    }

    #[test]
    fn merge_accumulates_flags() {
        let mut grid = grid();
        grid.merge(
            3,
            TileFlags {
                is_solid: true,
                offset_top: 4,
                ..TileFlags::default()
            },
        );
        grid.merge(
            3,
            TileFlags {
                is_deadly: true,
                ..TileFlags::default()
            },
        );
        let tile = grid.tile(3);
        assert!(tile.is_solid);
        assert!(tile.is_deadly);
        assert!(!tile.is_wall);
        assert_eq!(tile.offset_top, 0);
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::from_rect(0.0, 0.0, 16.0, 16.0);
        let b = Aabb::from_rect(16.0, 0.0, 16.0, 16.0);
        let c = Aabb::from_rect(16.5, 0.0, 16.0, 16.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn vertical_separation_is_not_overlap() {
        let a = Aabb::from_rect(0.0, 0.0, 16.0, 16.0);
        let b = Aabb::from_rect(0.0, 20.0, 16.0, 16.0);
        assert!(!a.intersects(&b));
    }
}
