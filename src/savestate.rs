use serde::{Deserialize, Serialize};

use crate::video::layers::LAYER_CELLS;
use crate::video::palette::Variant;
use crate::video::sprites::{SpriteBankId, SPRITE_RAM_SIZE};
use crate::video::Video;

/// Snapshot of everything the CPU can write to the video hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoState {
    pub version: u32,
    pub variant: Variant,

    // registers
    pub control: u8,
    pub scroll_x: u8,

    // video RAM
    pub fg_videoram: Vec<u8>,
    pub fg_colorram: Vec<u8>,
    pub bg_videoram: Vec<u8>,
    pub bg_colorram: Vec<u8>,
    pub spriteram: Vec<u8>,
    pub spriteram_2: Vec<u8>,
}

impl VideoState {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn save_to_file(&self, filename: &str) -> Result<(), Box<dyn std::error::Error>> {
        let data = bincode::serialize(self)?;
        std::fs::write(filename, data)?;
        log::info!("Save state written to: {}", filename);
        Ok(())
    }

    pub fn load_from_file(filename: &str) -> Result<VideoState, Box<dyn std::error::Error>> {
        let data = std::fs::read(filename)?;
        let state: VideoState = bincode::deserialize(&data)?;
        log::info!("Save state loaded from: {}", filename);
        Ok(state)
    }

    fn validate(&self, variant: Variant) -> Result<(), String> {
        if self.version != Self::CURRENT_VERSION {
            return Err(format!(
                "save state version {} (expected {})",
                self.version,
                Self::CURRENT_VERSION
            ));
        }
        if self.variant != variant {
            return Err(format!(
                "save state is for {}, board is {}",
                self.variant.name(),
                variant.name()
            ));
        }
        let layers = [
            ("fg_videoram", &self.fg_videoram),
            ("fg_colorram", &self.fg_colorram),
            ("bg_videoram", &self.bg_videoram),
            ("bg_colorram", &self.bg_colorram),
        ];
        for (name, ram) in layers {
            if ram.len() != LAYER_CELLS {
                return Err(format!("{} has {} bytes, expected {}", name, ram.len(), LAYER_CELLS));
            }
        }
        for (name, ram) in [("spriteram", &self.spriteram), ("spriteram_2", &self.spriteram_2)] {
            if ram.len() != SPRITE_RAM_SIZE {
                return Err(format!("{} has {} bytes, expected {}", name, ram.len(), SPRITE_RAM_SIZE));
            }
        }
        Ok(())
    }
}

impl Video {
    pub fn save_state(&self) -> VideoState {
        let fg = self.foreground().ram();
        let bg = self.background().ram();
        VideoState {
            version: VideoState::CURRENT_VERSION,
            variant: self.variant(),
            control: self.control().raw(),
            scroll_x: self.scroll_x(),
            fg_videoram: fg.videoram.to_vec(),
            fg_colorram: fg.colorram.to_vec(),
            bg_videoram: bg.videoram.to_vec(),
            bg_colorram: bg.colorram.to_vec(),
            spriteram: self.sprite_bank(SpriteBankId::Primary).ram().to_vec(),
            spriteram_2: self.sprite_bank(SpriteBankId::Secondary).ram().to_vec(),
        }
    }

    /// Restore a snapshot. Both tile caches are invalidated.
    pub fn load_state(&mut self, state: &VideoState) -> Result<(), String> {
        state.validate(self.variant())?;

        let (fg, bg) = self.layers_mut();
        fg.load_ram(&state.fg_videoram, &state.fg_colorram);
        bg.load_ram(&state.bg_videoram, &state.bg_colorram);
        self.sprite_bank_mut(SpriteBankId::Primary).load_ram(&state.spriteram);
        self.sprite_bank_mut(SpriteBankId::Secondary).load_ram(&state.spriteram_2);
        self.restore_registers(state.control, state.scroll_x);
        Ok(())
    }
}
