use super::gfx::{Bitmap, GfxElement, Rect};
use super::tilemap::{TileInfo, TileSource, Tilemap};

pub const LAYER_COLS: usize = 32;
pub const LAYER_ROWS: usize = 32;
pub const LAYER_CELLS: usize = LAYER_COLS * LAYER_ROWS;
/// Both layers are shifted up by one tile row to line up with the visible raster.
pub const LAYER_SCROLL_DY: i32 = 8;

/// Video RAM of one layer: graphic index and attribute byte per cell.
#[derive(Debug, Clone)]
pub struct LayerRam {
    pub videoram: [u8; LAYER_CELLS],
    pub colorram: [u8; LAYER_CELLS],
}

impl LayerRam {
    fn new() -> Self {
        Self {
            videoram: [0; LAYER_CELLS],
            colorram: [0; LAYER_CELLS],
        }
    }
}

impl TileSource for LayerRam {
    // attribute: bits 0-3 color, bit 4 flip x, bits 5-7 graphic bank
    fn tile_info(&self, index: usize) -> TileInfo {
        let attr = self.colorram[index];
        TileInfo {
            code: self.videoram[index] as u16 + 256 * ((attr >> 5) & 7) as u16,
            color: attr & 0x0F,
            flip_x: attr & 0x10 != 0,
        }
    }
}

/// One tile layer: its video RAM plus the tile cache it feeds.
pub struct TileLayer {
    ram: LayerRam,
    tilemap: Tilemap,
}

impl TileLayer {
    pub fn new(transparent_pen: Option<u8>) -> Self {
        let mut tilemap = Tilemap::new(LAYER_COLS, LAYER_ROWS, 8, 8);
        tilemap.set_transparent_pen(transparent_pen);
        tilemap.set_scrolldy(LAYER_SCROLL_DY, LAYER_SCROLL_DY);
        Self {
            ram: LayerRam::new(),
            tilemap,
        }
    }

    /// Foreground: pen 0 lets the background show through.
    pub fn foreground() -> Self {
        Self::new(Some(0))
    }

    /// Background: fully opaque.
    pub fn background() -> Self {
        Self::new(None)
    }

    pub fn write_graphic(&mut self, offset: usize, data: u8) {
        let offset = offset % LAYER_CELLS;
        self.ram.videoram[offset] = data;
        self.tilemap.mark_dirty(offset);
    }

    pub fn write_attribute(&mut self, offset: usize, data: u8) {
        let offset = offset % LAYER_CELLS;
        self.ram.colorram[offset] = data;
        self.tilemap.mark_dirty(offset);
    }

    pub fn read_graphic(&self, offset: usize) -> u8 {
        self.ram.videoram[offset % LAYER_CELLS]
    }

    pub fn read_attribute(&self, offset: usize) -> u8 {
        self.ram.colorram[offset % LAYER_CELLS]
    }

    pub fn tile_info(&self, offset: usize) -> TileInfo {
        self.ram.tile_info(offset % LAYER_CELLS)
    }

    pub fn ram(&self) -> &LayerRam {
        &self.ram
    }

    /// Replace the whole RAM at once (save state restore); every cell goes stale.
    pub fn load_ram(&mut self, videoram: &[u8], colorram: &[u8]) {
        self.ram.videoram.copy_from_slice(videoram);
        self.ram.colorram.copy_from_slice(colorram);
        self.tilemap.mark_all_dirty();
    }

    pub fn set_scrollx(&mut self, value: u8) {
        self.tilemap.set_scrollx(value as i32);
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn invalidate(&mut self) {
        self.tilemap.mark_all_dirty();
    }

    pub fn draw(&mut self, gfx: &GfxElement, dest: &mut Bitmap, clip: &Rect, flip_screen: bool) {
        self.tilemap.draw(&self.ram, gfx, dest, clip, flip_screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_info_decoding() {
        let mut layer = TileLayer::background();
        layer.write_graphic(10, 0x34);
        layer.write_attribute(10, 0b1011_0110);

        let info = layer.tile_info(10);
        assert_eq!(info.code, 0x34 + 256 * 5);
        assert_eq!(info.color, 0x06);
        assert!(info.flip_x);

        layer.write_attribute(10, 0xEF);
        let info = layer.tile_info(10);
        assert_eq!(info.code, 0x34 + 256 * 7);
        assert_eq!(info.color, 0x0F);
        assert!(!info.flip_x);
    }

    #[test]
    fn test_writes_mark_single_cell_dirty() {
        let gfx = GfxElement::empty(8, 8);
        let mut layer = TileLayer::foreground();
        let mut dest = Bitmap::new(256, 256);
        let clip = dest.bounds();
        layer.draw(&gfx, &mut dest, &clip, false);
        assert_eq!(layer.tilemap().dirty_count(), 0);

        layer.write_graphic(37, 1);
        assert_eq!(layer.tilemap().dirty_count(), 1);
        assert!(layer.tilemap().is_dirty(37));

        layer.write_attribute(37, 0x20);
        assert_eq!(layer.tilemap().dirty_count(), 1);

        layer.write_attribute(38, 0x20);
        assert_eq!(layer.tilemap().dirty_count(), 2);
    }

    #[test]
    fn test_read_back_last_write() {
        let mut layer = TileLayer::foreground();
        layer.write_graphic(0x3FF, 0xAA);
        layer.write_graphic(0x3FF, 0xBB);
        layer.write_attribute(0x400, 0x12); // wraps to cell 0
        assert_eq!(layer.read_graphic(0x3FF), 0xBB);
        assert_eq!(layer.read_attribute(0), 0x12);
    }
}
