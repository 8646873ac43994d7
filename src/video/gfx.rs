// Graphics primitives: indexed bitmaps, clip rectangles, decoded graphics
// elements and the transparent-pen blitter shared by tilemaps and sprites.

use super::palette::Palette;

/// Inclusive clip rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Rect {
    pub const fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self { min_x, max_x, min_y, max_y }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
        }
    }
}

/// Palette-indexed framebuffer (one `u16` pen per pixel).
#[derive(Debug, Clone)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<u16>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, self.width as i32 - 1, 0, self.height as i32 - 1)
    }

    pub fn fill(&mut self, pen: u16) {
        self.pixels.fill(pen);
    }

    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * self.width + x]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, pen: u16) {
        self.pixels[y * self.width + x] = pen;
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Resolve every pixel through `palette` into packed RGB bytes.
    pub fn to_rgb(&self, palette: &Palette) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &pen in &self.pixels {
            let c = palette.color(pen as usize);
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
        out
    }
}

/// Planar graphics layout. Offsets are bit positions, MSB first within a byte.
#[derive(Debug, Clone)]
pub struct GfxLayout {
    pub width: usize,
    pub height: usize,
    pub total: usize,
    pub planes: Vec<usize>,
    pub x_offsets: Vec<usize>,
    pub y_offsets: Vec<usize>,
    pub char_increment: usize,
}

impl GfxLayout {
    /// 8x8 cells, 3 bitplanes, one plane per third of the ROM region.
    pub fn chars_3bpp(rom_len: usize) -> Self {
        let total = rom_len / 3 / 8;
        let third = rom_len / 3 * 8;
        Self {
            width: 8,
            height: 8,
            total,
            planes: vec![2 * third, third, 0],
            x_offsets: (0..8).collect(),
            y_offsets: (0..8).map(|y| y * 8).collect(),
            char_increment: 8 * 8,
        }
    }

    /// 16x16 cells built from four 8x8 quadrants (TL, TR, BL, BR order in ROM).
    pub fn sprites_3bpp(rom_len: usize) -> Self {
        let total = rom_len / 3 / 32;
        let third = rom_len / 3 * 8;
        let x_offsets = (0..8).chain(64..72).collect();
        let y_offsets = (0..8).map(|y| y * 8).chain((16..24).map(|y| y * 8)).collect();
        Self {
            width: 16,
            height: 16,
            total,
            planes: vec![2 * third, third, 0],
            x_offsets,
            y_offsets,
            char_increment: 32 * 8,
        }
    }
}

fn read_bit(rom: &[u8], bit: usize) -> u8 {
    rom.get(bit / 8).map_or(0, |&b| (b >> (7 - (bit % 8))) & 1)
}

/// A set of decoded graphics cells sharing one size and color base.
#[derive(Debug, Clone)]
pub struct GfxElement {
    width: usize,
    height: usize,
    granularity: u16,
    color_base: u16,
    total_colors: u16,
    // one pen per pixel, cell after cell
    pens: Vec<u8>,
}

impl GfxElement {
    pub fn empty(width: usize, height: usize) -> Self {
        Self::from_pens(width, height, 3, 0, 1, Vec::new())
    }

    /// Build from already-decoded pens (`width * height` bytes per cell).
    pub fn from_pens(
        width: usize,
        height: usize,
        bits_per_pixel: u32,
        color_base: u16,
        total_colors: u16,
        pens: Vec<u8>,
    ) -> Self {
        Self {
            width,
            height,
            granularity: 1 << bits_per_pixel,
            color_base,
            total_colors: total_colors.max(1),
            pens,
        }
    }

    pub fn decode(layout: &GfxLayout, rom: &[u8], color_base: u16, total_colors: u16) -> Self {
        let cell_size = layout.width * layout.height;
        let mut pens = Vec::with_capacity(layout.total * cell_size);
        for code in 0..layout.total {
            let base = code * layout.char_increment;
            for &yo in &layout.y_offsets {
                for &xo in &layout.x_offsets {
                    let mut pen = 0u8;
                    for &plane in &layout.planes {
                        pen = (pen << 1) | read_bit(rom, base + plane + yo + xo);
                    }
                    pens.push(pen);
                }
            }
        }
        log::debug!(
            "decoded {} cells of {}x{} ({} planes)",
            layout.total,
            layout.width,
            layout.height,
            layout.planes.len()
        );
        Self::from_pens(
            layout.width,
            layout.height,
            layout.planes.len() as u32,
            color_base,
            total_colors,
            pens,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn count(&self) -> usize {
        let cell = self.width * self.height;
        if cell == 0 {
            0
        } else {
            self.pens.len() / cell
        }
    }

    /// Raw pen of one pixel within a cell; codes wrap modulo `count()`.
    pub fn pen(&self, code: usize, x: usize, y: usize) -> u8 {
        let count = self.count();
        if count == 0 {
            return 0;
        }
        let cell = (code % count) * self.width * self.height;
        self.pens[cell + y * self.width + x]
    }

    /// Final palette index for `pen` drawn in color group `color`.
    pub fn palette_index(&self, color: u8, pen: u8) -> u16 {
        let color = color as u16 % self.total_colors;
        self.color_base + color * self.granularity + pen as u16
    }

    /// Draw one cell at (`x`, `y`); pixels whose raw pen equals
    /// `transparent_pen` leave `dest` untouched.
    pub fn transpen(
        &self,
        dest: &mut Bitmap,
        clip: &Rect,
        code: usize,
        color: u8,
        flip_x: bool,
        flip_y: bool,
        x: i32,
        y: i32,
        transparent_pen: u8,
    ) {
        if self.count() == 0 {
            return;
        }
        let clip = clip.intersect(&dest.bounds());
        if clip.is_empty() {
            return;
        }
        for row in 0..self.height {
            let dy = y + row as i32;
            if dy < clip.min_y || dy > clip.max_y {
                continue;
            }
            let sy = if flip_y { self.height - 1 - row } else { row };
            for col in 0..self.width {
                let dx = x + col as i32;
                if dx < clip.min_x || dx > clip.max_x {
                    continue;
                }
                let sx = if flip_x { self.width - 1 - col } else { col };
                let pen = self.pen(code, sx, sy);
                if pen != transparent_pen {
                    dest.set_pixel(dx as usize, dy as usize, self.palette_index(color, pen));
                }
            }
        }
    }
}
