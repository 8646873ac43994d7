// Tile cache: a fixed grid of cells rendered into a private pixmap. Only
// cells marked dirty are re-derived (tile info + pixels) on the next draw.

use super::gfx::{Bitmap, GfxElement, Rect};

/// Graphic, color group and horizontal flip of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileInfo {
    pub code: u16,
    pub color: u8,
    pub flip_x: bool,
}

/// Per-cell callback the owner of the video RAM supplies.
pub trait TileSource {
    fn tile_info(&self, index: usize) -> TileInfo;
}

impl<F: Fn(usize) -> TileInfo> TileSource for F {
    fn tile_info(&self, index: usize) -> TileInfo {
        self(index)
    }
}

pub struct Tilemap {
    cols: usize,
    rows: usize,
    tile_width: usize,
    tile_height: usize,

    tiles: Vec<TileInfo>,
    dirty: Vec<u64>,

    // rendered cells, palette index + opaque flag per pixel
    pixmap: Vec<u16>,
    opaque: Vec<bool>,

    transparent_pen: Option<u8>,
    scroll_x: i32,
    scroll_y: i32,
    dx: i32,
    dx_flipped: i32,
    dy: i32,
    dy_flipped: i32,

    tile_updates: u64,
}

impl Tilemap {
    pub fn new(cols: usize, rows: usize, tile_width: usize, tile_height: usize) -> Self {
        let cells = cols * rows;
        let pixels = cells * tile_width * tile_height;
        let mut map = Self {
            cols,
            rows,
            tile_width,
            tile_height,
            tiles: vec![TileInfo::default(); cells],
            dirty: vec![0; cells.div_ceil(64)],
            pixmap: vec![0; pixels],
            opaque: vec![false; pixels],
            transparent_pen: None,
            scroll_x: 0,
            scroll_y: 0,
            dx: 0,
            dx_flipped: 0,
            dy: 0,
            dy_flipped: 0,
            tile_updates: 0,
        };
        map.mark_all_dirty();
        map
    }

    pub fn cells(&self) -> usize {
        self.cols * self.rows
    }

    pub fn width(&self) -> usize {
        self.cols * self.tile_width
    }

    pub fn height(&self) -> usize {
        self.rows * self.tile_height
    }

    pub fn set_transparent_pen(&mut self, pen: Option<u8>) {
        if self.transparent_pen != pen {
            self.transparent_pen = pen;
            self.mark_all_dirty();
        }
    }

    pub fn set_scrollx(&mut self, value: i32) {
        self.scroll_x = value;
    }

    pub fn set_scrolly(&mut self, value: i32) {
        self.scroll_y = value;
    }

    pub fn set_scrolldx(&mut self, dx: i32, dx_flipped: i32) {
        self.dx = dx;
        self.dx_flipped = dx_flipped;
    }

    pub fn set_scrolldy(&mut self, dy: i32, dy_flipped: i32) {
        self.dy = dy;
        self.dy_flipped = dy_flipped;
    }

    pub fn mark_dirty(&mut self, index: usize) {
        if index < self.cells() {
            self.dirty[index / 64] |= 1 << (index % 64);
        }
    }

    pub fn mark_all_dirty(&mut self) {
        let cells = self.cells();
        for (word, bits) in self.dirty.iter_mut().enumerate() {
            let remaining = cells - word * 64;
            *bits = if remaining >= 64 { u64::MAX } else { (1u64 << remaining) - 1 };
        }
    }

    pub fn is_dirty(&self, index: usize) -> bool {
        index < self.cells() && self.dirty[index / 64] & (1 << (index % 64)) != 0
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Total tile info re-derivations since creation.
    pub fn tile_updates(&self) -> u64 {
        self.tile_updates
    }

    /// Cached tile info; only meaningful for cells that are not dirty.
    pub fn tile(&self, index: usize) -> TileInfo {
        self.tiles[index]
    }

    /// Re-derive every dirty cell, then clear the dirty set.
    pub fn update(&mut self, source: &impl TileSource, gfx: &GfxElement) {
        for word in 0..self.dirty.len() {
            let mut bits = std::mem::take(&mut self.dirty[word]);
            while bits != 0 {
                let index = word * 64 + bits.trailing_zeros() as usize;
                bits &= bits - 1;
                self.render_cell(index, source.tile_info(index), gfx);
            }
        }
    }

    fn render_cell(&mut self, index: usize, info: TileInfo, gfx: &GfxElement) {
        self.tiles[index] = info;
        self.tile_updates += 1;

        let origin_x = (index % self.cols) * self.tile_width;
        let origin_y = (index / self.cols) * self.tile_height;
        let width = self.width();
        let drawable = gfx.count() > 0
            && gfx.width() >= self.tile_width
            && gfx.height() >= self.tile_height;

        for y in 0..self.tile_height {
            for x in 0..self.tile_width {
                let at = (origin_y + y) * width + origin_x + x;
                if !drawable {
                    self.pixmap[at] = 0;
                    self.opaque[at] = false;
                    continue;
                }
                let sx = if info.flip_x { self.tile_width - 1 - x } else { x };
                let pen = gfx.pen(info.code as usize, sx, y);
                self.pixmap[at] = gfx.palette_index(info.color, pen);
                self.opaque[at] = self.transparent_pen != Some(pen);
            }
        }
    }

    // Pixmap coordinate sampled for screen coordinate `pos`. The fixed
    // offset moves the layer origin to `offset - scroll` on screen.
    fn source_coord(
        pos: i32,
        size: usize,
        screen: usize,
        scroll: i32,
        offset: i32,
        flipped: bool,
    ) -> usize {
        let size = size as i32;
        if flipped {
            let effective = size - screen as i32 - scroll + offset;
            (size - 1 - (pos + effective).rem_euclid(size)) as usize
        } else {
            (pos + scroll - offset).rem_euclid(size) as usize
        }
    }

    /// Bring dirty cells up to date and copy the visible window into `dest`.
    pub fn draw(
        &mut self,
        source: &impl TileSource,
        gfx: &GfxElement,
        dest: &mut Bitmap,
        clip: &Rect,
        flip_screen: bool,
    ) {
        self.update(source, gfx);

        let clip = clip.intersect(&dest.bounds());
        if clip.is_empty() {
            return;
        }
        let (dx, dy) = if flip_screen {
            (self.dx_flipped, self.dy_flipped)
        } else {
            (self.dx, self.dy)
        };
        let (width, height) = (self.width(), self.height());

        for y in clip.min_y..=clip.max_y {
            let ty = Self::source_coord(y, height, dest.height(), self.scroll_y, dy, flip_screen);
            for x in clip.min_x..=clip.max_x {
                let tx = Self::source_coord(x, width, dest.width(), self.scroll_x, dx, flip_screen);
                let at = ty * width + tx;
                if self.opaque[at] || self.transparent_pen.is_none() {
                    dest.set_pixel(x as usize, y as usize, self.pixmap[at]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 8x8 cells: code 0 all pen 0, code 1 all pen 1, code 2 left column pen 2
    fn test_gfx() -> GfxElement {
        let mut pens = vec![0u8; 64];
        pens.extend(std::iter::repeat(1).take(64));
        pens.extend((0..64).map(|i| if i % 8 == 0 { 2 } else { 0 }));
        GfxElement::from_pens(8, 8, 3, 0, 32, pens)
    }

    #[test]
    fn test_starts_fully_dirty() {
        let map = Tilemap::new(32, 32, 8, 8);
        assert_eq!(map.dirty_count(), 1024);
        assert!(map.is_dirty(0));
        assert!(map.is_dirty(1023));
        assert!(!map.is_dirty(1024));
    }

    #[test]
    fn test_update_only_touches_dirty_cells() {
        let gfx = test_gfx();
        let mut map = Tilemap::new(32, 32, 8, 8);
        let source = |_i: usize| TileInfo { code: 1, color: 0, flip_x: false };
        map.update(&source, &gfx);
        assert_eq!(map.tile_updates(), 1024);
        assert_eq!(map.dirty_count(), 0);

        map.update(&source, &gfx);
        assert_eq!(map.tile_updates(), 1024);

        map.mark_dirty(5);
        map.mark_dirty(5);
        map.mark_dirty(700);
        map.update(&source, &gfx);
        assert_eq!(map.tile_updates(), 1026);
    }

    #[test]
    fn test_transparent_pen_shows_destination() {
        let gfx = test_gfx();
        let mut map = Tilemap::new(32, 32, 8, 8);
        map.set_transparent_pen(Some(0));
        let mut dest = Bitmap::new(256, 256);
        dest.fill(0x1FF);

        let source = |i: usize| TileInfo { code: if i == 0 { 1 } else { 0 }, color: 2, flip_x: false };
        let clip = dest.bounds();
        map.draw(&source, &gfx, &mut dest, &clip, false);

        assert_eq!(dest.pixel(0, 0), 2 * 8 + 1);
        assert_eq!(dest.pixel(7, 7), 2 * 8 + 1);
        assert_eq!(dest.pixel(8, 0), 0x1FF);
    }

    #[test]
    fn test_flip_x_attribute_mirrors_cell() {
        let gfx = test_gfx();
        let mut map = Tilemap::new(32, 32, 8, 8);
        let mut dest = Bitmap::new(256, 256);
        let source = |_i: usize| TileInfo { code: 2, color: 0, flip_x: true };
        let clip = dest.bounds();
        map.draw(&source, &gfx, &mut dest, &clip, false);

        assert_eq!(dest.pixel(0, 0), 0);
        assert_eq!(dest.pixel(7, 0), 2);
    }

    #[test]
    fn test_scroll_and_flip_screen_sampling() {
        let gfx = test_gfx();
        let mut map = Tilemap::new(32, 32, 8, 8);
        map.set_transparent_pen(Some(0));
        map.set_scrolldy(8, 8);
        // single opaque cell at row 5, column 3
        let source = |i: usize| TileInfo { code: if i == 5 * 32 + 3 { 1 } else { 0 }, color: 0, flip_x: false };

        // the fixed offset pushes pixmap row 40 down to screen row 48
        let mut dest = Bitmap::new(256, 256);
        let clip = dest.bounds();
        map.draw(&source, &gfx, &mut dest, &clip, false);
        assert_eq!(dest.pixel(24, 48), 1);
        assert_eq!(dest.pixel(31, 55), 1);
        assert_eq!(dest.pixel(24, 47), 0);
        assert_eq!(dest.pixel(24, 56), 0);

        let mut dest = Bitmap::new(256, 256);
        map.draw(&source, &gfx, &mut dest, &clip, true);
        assert_eq!(dest.pixel(224, 200), 1);
        assert_eq!(dest.pixel(231, 207), 1);
        assert_eq!(dest.pixel(224, 208), 0);
        assert_eq!(dest.pixel(24, 48), 0);

        map.set_scrollx(16);
        let mut dest = Bitmap::new(256, 256);
        map.draw(&source, &gfx, &mut dest, &clip, false);
        assert_eq!(dest.pixel(8, 48), 1);
        assert_eq!(dest.pixel(24, 48), 0);
    }

    #[test]
    fn test_offset_places_first_row_on_first_visible_line() {
        let gfx = test_gfx();
        let mut map = Tilemap::new(32, 32, 8, 8);
        map.set_transparent_pen(Some(0));
        map.set_scrolldy(8, 8);
        let source = |i: usize| TileInfo { code: if i == 0 { 1 } else { 0 }, color: 0, flip_x: false };

        let mut dest = Bitmap::new(256, 256);
        let clip = dest.bounds();
        map.draw(&source, &gfx, &mut dest, &clip, false);
        let rows: Vec<usize> = (0..256).filter(|&y| dest.pixel(0, y) == 1).collect();
        assert_eq!(rows, (8..16).collect::<Vec<_>>());

        // flipped, the same cell ends on the last visible line
        let mut dest = Bitmap::new(256, 256);
        map.draw(&source, &gfx, &mut dest, &clip, true);
        let rows: Vec<usize> = (0..256).filter(|&y| dest.pixel(255, y) == 1).collect();
        assert_eq!(rows, (240..248).collect::<Vec<_>>());
    }

    #[test]
    fn test_vertical_scroll_and_horizontal_offset() {
        let gfx = test_gfx();
        let mut map = Tilemap::new(32, 32, 8, 8);
        map.set_transparent_pen(Some(0));
        let source = |i: usize| TileInfo { code: if i == 2 * 32 + 2 { 1 } else { 0 }, color: 0, flip_x: false };

        map.set_scrolly(8);
        map.set_scrolldx(4, 0);
        let mut dest = Bitmap::new(256, 256);
        let clip = dest.bounds();
        map.draw(&source, &gfx, &mut dest, &clip, false);
        // cell origin (16, 16) moved up one row and right by four pixels
        assert_eq!(dest.pixel(20, 8), 1);
        assert_eq!(dest.pixel(27, 15), 1);
        assert_eq!(dest.pixel(19, 8), 0);
        assert_eq!(dest.pixel(20, 16), 0);
    }
}
