// Appoooh / Robo Wres video hardware.
//
// Two 32x32 tile layers, two banks of eight 16x16 sprites and one out latch
// selecting flip screen and the layer/sprite draw order. The CPU side only
// ever writes; `render_frame` composes the current state into an indexed
// bitmap once per refresh.

pub mod gfx;
pub mod layers;
pub mod palette;
pub mod registers;
pub mod renderer;
pub mod sprites;
pub mod tilemap;


use crate::debug_flags;
use gfx::{Bitmap, GfxElement, GfxLayout, Rect};
use layers::TileLayer;
use palette::{Palette, Variant, PALETTE_ENTRIES};
use registers::ControlLatch;
use renderer::{draw_order, DrawStep};
use sprites::{SpriteBank, SpriteBankId};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 256;
/// Visible raster: all columns, tile rows 1 to 30.
pub const VISIBLE_AREA: Rect = Rect::new(0, 32 * 8 - 1, 8, 31 * 8 - 1);

/// Color base of everything drawn from the second graphics ROM set.
const SET2_COLOR_BASE: u16 = 32 * 8;

/// Decoded graphics for the four element slots of the board.
pub struct GfxSet {
    pub fg_tiles: GfxElement,
    pub bg_tiles: GfxElement,
    pub sprites: GfxElement,
    pub sprites_2: GfxElement,
}

impl GfxSet {
    /// Nothing to draw; frames come out as whatever the bitmap held.
    pub fn empty() -> Self {
        Self {
            fg_tiles: GfxElement::empty(8, 8),
            bg_tiles: GfxElement::empty(8, 8),
            sprites: GfxElement::empty(16, 16),
            sprites_2: GfxElement::empty(16, 16),
        }
    }

    /// Decode the two 3bpp graphics ROM sets. The first feeds the foreground
    /// and primary sprites, the second the background and secondary sprites.
    pub fn decode(gfx1: &[u8], gfx2: &[u8]) -> Self {
        Self {
            fg_tiles: GfxElement::decode(&GfxLayout::chars_3bpp(gfx1.len()), gfx1, 0, 32),
            bg_tiles: GfxElement::decode(&GfxLayout::chars_3bpp(gfx2.len()), gfx2, SET2_COLOR_BASE, 32),
            sprites: GfxElement::decode(&GfxLayout::sprites_3bpp(gfx1.len()), gfx1, 0, 32),
            sprites_2: GfxElement::decode(&GfxLayout::sprites_3bpp(gfx2.len()), gfx2, SET2_COLOR_BASE, 32),
        }
    }

    fn sprites_for(&self, bank: SpriteBankId) -> &GfxElement {
        match bank {
            SpriteBankId::Primary => &self.sprites,
            SpriteBankId::Secondary => &self.sprites_2,
        }
    }
}

pub struct Video {
    variant: Variant,
    palette: Palette,
    gfx: GfxSet,

    fg: TileLayer,
    bg: TileLayer,
    sprites: [SpriteBank; 2],

    control: ControlLatch,
    scroll_x: u8,

    frame: u64,
}

impl Video {
    pub fn new(variant: Variant, gfx: GfxSet) -> Self {
        let [primary, secondary] = variant.sprite_code_offsets();
        Self {
            variant,
            palette: Palette::black(PALETTE_ENTRIES),
            gfx,
            fg: TileLayer::foreground(),
            bg: TileLayer::background(),
            sprites: [SpriteBank::new(primary), SpriteBank::new(secondary)],
            control: ControlLatch::default(),
            scroll_x: 0,
            frame: 0,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Decode the color PROM. Called once at power-up and again on reset.
    pub fn rebuild_palette(&mut self, prom: &[u8]) {
        self.palette = palette::decode(prom, PALETTE_ENTRIES, self.variant);
        log::debug!(
            "palette rebuilt: {} entries from {} PROM bytes ({})",
            self.palette.len(),
            prom.len(),
            self.variant.name()
        );
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_gfx(&mut self, gfx: GfxSet) {
        self.gfx = gfx;
        self.fg.invalidate();
        self.bg.invalidate();
    }

    /// Reset the latch and scroll register to their power-on values.
    /// Video RAM contents survive a reset.
    pub fn reset(&mut self) {
        self.control = ControlLatch::default();
        self.scroll_x = 0;
        self.fg.set_scrollx(0);
    }

    pub fn fg_videoram_w(&mut self, offset: usize, data: u8) {
        if debug_flags::video_write() {
            log::debug!("fg videoram[{:03X}] = {:02X}", offset, data);
        }
        self.fg.write_graphic(offset, data);
    }

    pub fn fg_colorram_w(&mut self, offset: usize, data: u8) {
        if debug_flags::video_write() {
            log::debug!("fg colorram[{:03X}] = {:02X}", offset, data);
        }
        self.fg.write_attribute(offset, data);
    }

    pub fn bg_videoram_w(&mut self, offset: usize, data: u8) {
        if debug_flags::video_write() {
            log::debug!("bg videoram[{:03X}] = {:02X}", offset, data);
        }
        self.bg.write_graphic(offset, data);
    }

    pub fn bg_colorram_w(&mut self, offset: usize, data: u8) {
        if debug_flags::video_write() {
            log::debug!("bg colorram[{:03X}] = {:02X}", offset, data);
        }
        self.bg.write_attribute(offset, data);
    }

    pub fn spriteram_w(&mut self, bank: SpriteBankId, offset: usize, data: u8) {
        if debug_flags::video_write() {
            log::debug!("{:?} spriteram[{:02X}] = {:02X}", bank, offset, data);
        }
        self.sprites[bank.index()].write(offset, data);
    }

    pub fn scroll_w(&mut self, data: u8) {
        self.scroll_x = data;
        self.fg.set_scrollx(data);
    }

    /// Out latch: NMI mask, flip screen, priority, ROM bank.
    pub fn out_w(&mut self, data: u8) {
        let latch = ControlLatch::from_bits(data);
        if latch != self.control && debug_flags::latch() {
            log::debug!(
                "out latch {:02X}: nmi={} flip={} priority={} bank={}",
                data,
                latch.nmi_enabled(),
                latch.flip_screen(),
                latch.priority().code(),
                latch.rom_bank()
            );
        }
        self.control = latch;
    }

    pub fn control(&self) -> ControlLatch {
        self.control
    }

    pub fn scroll_x(&self) -> u8 {
        self.scroll_x
    }

    pub fn foreground(&self) -> &TileLayer {
        &self.fg
    }

    pub fn background(&self) -> &TileLayer {
        &self.bg
    }

    pub fn sprite_bank(&self, bank: SpriteBankId) -> &SpriteBank {
        &self.sprites[bank.index()]
    }

    pub(crate) fn layers_mut(&mut self) -> (&mut TileLayer, &mut TileLayer) {
        (&mut self.fg, &mut self.bg)
    }

    pub(crate) fn sprite_bank_mut(&mut self, bank: SpriteBankId) -> &mut SpriteBank {
        &mut self.sprites[bank.index()]
    }

    pub(crate) fn restore_registers(&mut self, control: u8, scroll_x: u8) {
        self.control = ControlLatch::from_bits(control);
        self.scroll_w(scroll_x);
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Compose one frame into `dest`. Always returns 0.
    pub fn render_frame(&mut self, dest: &mut Bitmap, clip: &Rect) -> u32 {
        let flip_screen = self.control.flip_screen();
        let order = draw_order(self.control.priority());
        let updates_before = (self.fg.tilemap().tile_updates(), self.bg.tilemap().tile_updates());

        for step in order {
            match step {
                DrawStep::Background => self.bg.draw(&self.gfx.bg_tiles, dest, clip, flip_screen),
                DrawStep::Foreground => self.fg.draw(&self.gfx.fg_tiles, dest, clip, flip_screen),
                DrawStep::Sprites(bank) => {
                    self.sprites[bank.index()].draw(dest, clip, self.gfx.sprites_for(bank), flip_screen)
                }
            }
        }

        if debug_flags::render_verbose() {
            log::trace!(
                "frame {}: order={:?} flip={} fg updates={} bg updates={}",
                self.frame,
                order,
                flip_screen,
                self.fg.tilemap().tile_updates() - updates_before.0,
                self.bg.tilemap().tile_updates() - updates_before.1
            );
        }
        self.frame += 1;
        0
    }

    /// Render into a fresh screen-sized bitmap and resolve it to RGB bytes.
    pub fn render_rgb(&mut self) -> Vec<u8> {
        let mut bitmap = Bitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT);
        self.render_frame(&mut bitmap, &VISIBLE_AREA);
        bitmap.to_rgb(&self.palette)
    }
}
