use super::gfx::{Bitmap, GfxElement, Rect};

pub const SPRITE_COUNT: usize = 8;
pub const SPRITE_RAM_SIZE: usize = SPRITE_COUNT * 4;
pub const SPRITE_TRANSPARENT_PEN: u8 = 0;

/// Which of the two sprite attribute tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteBankId {
    Primary,
    Secondary,
}

impl SpriteBankId {
    pub fn index(self) -> usize {
        match self {
            SpriteBankId::Primary => 0,
            SpriteBankId::Secondary => 1,
        }
    }
}

/// One decoded sprite record, already in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteAttr {
    pub code: u16,
    pub color: u8,
    pub x: i32,
    pub y: i32,
    pub flip_x: bool,
    pub flip_y: bool,
}

/// Eight 4-byte records: y, code/flip x, bank/color, x.
#[derive(Debug, Clone)]
pub struct SpriteBank {
    ram: [u8; SPRITE_RAM_SIZE],
    code_offset: u16,
}

impl SpriteBank {
    pub fn new(code_offset: u16) -> Self {
        Self {
            ram: [0; SPRITE_RAM_SIZE],
            code_offset,
        }
    }

    pub fn write(&mut self, offset: usize, data: u8) {
        self.ram[offset % SPRITE_RAM_SIZE] = data;
    }

    pub fn read(&self, offset: usize) -> u8 {
        self.ram[offset % SPRITE_RAM_SIZE]
    }

    pub fn ram(&self) -> &[u8; SPRITE_RAM_SIZE] {
        &self.ram
    }

    pub fn load_ram(&mut self, data: &[u8]) {
        self.ram.copy_from_slice(data);
    }

    pub fn code_offset(&self) -> u16 {
        self.code_offset
    }

    pub fn decode(&self, slot: usize, flip_screen: bool) -> SpriteAttr {
        let entry = &self.ram[slot * 4..slot * 4 + 4];

        let mut y = 240 - entry[0] as i32;
        let code = self.code_offset + (entry[1] >> 2) as u16 + ((entry[2] >> 5) & 0x07) as u16 * 0x40;
        // bit 4 of the color byte toggles constantly in game; meaning unknown
        let color = entry[2] & 0x0F;
        let mut x = entry[3] as i32;
        let mut flip_x = entry[1] & 0x01 != 0;

        // wrap at 248 so sprites leave through the left edge
        if x >= 248 {
            x -= 256;
        }

        if flip_screen {
            x = 239 - x;
            y = 239 - y;
            flip_x = !flip_x;
        }

        SpriteAttr {
            code,
            color,
            x,
            y,
            flip_x,
            flip_y: flip_screen,
        }
    }

    /// Records in draw order: slot 7 first, so slot 0 ends up on top.
    pub fn attributes(&self, flip_screen: bool) -> impl Iterator<Item = SpriteAttr> + '_ {
        (0..SPRITE_COUNT).rev().map(move |slot| self.decode(slot, flip_screen))
    }

    pub fn draw(&self, dest: &mut Bitmap, clip: &Rect, gfx: &GfxElement, flip_screen: bool) {
        for sprite in self.attributes(flip_screen) {
            gfx.transpen(
                dest,
                clip,
                sprite.code as usize,
                sprite.color,
                sprite.flip_x,
                sprite.flip_y,
                sprite.x,
                sprite.y,
                SPRITE_TRANSPARENT_PEN,
            );
        }
    }
}
