//! CPU-side address decoding for the video hardware.
//!
//! Sprite RAM sits at the bottom of each 1 KiB video RAM window and the layer
//! RAM starts right after it. Layer offsets count from the start of their own
//! range, so the last 0x20 cells (the bottom tile row) are never written.

use crate::video::sprites::SpriteBankId;
use crate::video::Video;

pub const SPRITERAM_BASE: u16 = 0xF000;
pub const FG_VIDEORAM_BASE: u16 = 0xF020;
pub const FG_COLORRAM_BASE: u16 = 0xF420;
pub const SPRITERAM_2_BASE: u16 = 0xF800;
pub const BG_VIDEORAM_BASE: u16 = 0xF820;
pub const BG_COLORRAM_BASE: u16 = 0xFC20;

pub const PORT_OUT: u8 = 0x04;
pub const PORT_SCROLL: u8 = 0x05;

/// Region a memory write lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoRegion {
    SpriteRam(SpriteBankId, usize),
    FgVideoRam(usize),
    FgColorRam(usize),
    BgVideoRam(usize),
    BgColorRam(usize),
}

pub fn decode(addr: u16) -> Option<VideoRegion> {
    let region = match addr {
        0xF000..=0xF01F => VideoRegion::SpriteRam(SpriteBankId::Primary, (addr - SPRITERAM_BASE) as usize),
        0xF020..=0xF3FF => VideoRegion::FgVideoRam((addr - FG_VIDEORAM_BASE) as usize),
        0xF400..=0xF41F => return None,
        0xF420..=0xF7FF => VideoRegion::FgColorRam((addr - FG_COLORRAM_BASE) as usize),
        0xF800..=0xF81F => VideoRegion::SpriteRam(SpriteBankId::Secondary, (addr - SPRITERAM_2_BASE) as usize),
        0xF820..=0xFBFF => VideoRegion::BgVideoRam((addr - BG_VIDEORAM_BASE) as usize),
        0xFC00..=0xFC1F => return None,
        0xFC20..=0xFFFF => VideoRegion::BgColorRam((addr - BG_COLORRAM_BASE) as usize),
        _ => return None,
    };
    Some(region)
}

impl Video {
    /// Route a CPU memory write. Returns false when the address is not video RAM.
    pub fn write_mem(&mut self, addr: u16, data: u8) -> bool {
        match decode(addr) {
            Some(VideoRegion::SpriteRam(bank, off)) => self.spriteram_w(bank, off, data),
            Some(VideoRegion::FgVideoRam(off)) => self.fg_videoram_w(off, data),
            Some(VideoRegion::FgColorRam(off)) => self.fg_colorram_w(off, data),
            Some(VideoRegion::BgVideoRam(off)) => self.bg_videoram_w(off, data),
            Some(VideoRegion::BgColorRam(off)) => self.bg_colorram_w(off, data),
            None => return false,
        }
        true
    }

    /// Read back video RAM (the CPU cannot; debuggers and tests can).
    pub fn read_mem(&self, addr: u16) -> Option<u8> {
        let value = match decode(addr)? {
            VideoRegion::SpriteRam(bank, off) => self.sprite_bank(bank).read(off),
            VideoRegion::FgVideoRam(off) => self.foreground().read_graphic(off),
            VideoRegion::FgColorRam(off) => self.foreground().read_attribute(off),
            VideoRegion::BgVideoRam(off) => self.background().read_graphic(off),
            VideoRegion::BgColorRam(off) => self.background().read_attribute(off),
        };
        Some(value)
    }

    /// Route an I/O port write. Sound chip ports are not ours.
    pub fn write_port(&mut self, port: u8, data: u8) -> bool {
        match port {
            PORT_OUT => self.out_w(data),
            PORT_SCROLL => self.scroll_w(data),
            _ => {
                log::trace!("unhandled port write {:02X} = {:02X}", port, data);
                return false;
            }
        }
        true
    }
}
