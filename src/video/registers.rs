use bitflags::bitflags;

bitflags! {
    /// Out port ($04) bit assignment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OutControl: u8 {
        const NMI_ENABLE = 0b0000_0001;
        const FLIP_SCREEN = 0b0000_0010;
        // bits 2-3 unknown
        const UNKNOWN_LOW = 0b0000_1100;
        const PRIORITY = 0b0011_0000;
        const ROM_BANK = 0b0100_0000;
        // bit 7 unknown, but written by the game
        const UNKNOWN_HIGH = 0b1000_0000;
    }
}

/// Playfield/sprite priority code (out port bits 4-5).
///
/// Only the draw order is known: code 0 puts the foreground behind the
/// sprites and code 1 swaps the two sprite banks. Codes 2 and 3 draw the
/// same way as each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Priority(u8);

impl Priority {
    pub fn new(code: u8) -> Self {
        Self(code & 0x03)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Foreground is drawn before the sprites.
    pub fn foreground_behind_sprites(self) -> bool {
        self.0 == 0
    }

    /// Primary bank is drawn first, so the secondary bank wins overlaps.
    pub fn primary_sprites_first(self) -> bool {
        self.0 == 1
    }
}

/// Decomposed out latch. Rebuilt on every write; consumers read fields, never the raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlLatch {
    bits: OutControl,
    nmi_enabled: bool,
    flip_screen: bool,
    priority: Priority,
    rom_bank: u8,
}

impl Default for ControlLatch {
    fn default() -> Self {
        Self::from_bits(0)
    }
}

impl ControlLatch {
    pub fn from_bits(data: u8) -> Self {
        let bits = OutControl::from_bits_retain(data);
        Self {
            bits,
            nmi_enabled: bits.contains(OutControl::NMI_ENABLE),
            flip_screen: bits.contains(OutControl::FLIP_SCREEN),
            priority: Priority::new((bits & OutControl::PRIORITY).bits() >> 4),
            rom_bank: bits.contains(OutControl::ROM_BANK) as u8,
        }
    }

    /// Last value written, unknown bits included.
    pub fn raw(&self) -> u8 {
        self.bits.bits()
    }

    pub fn bits(&self) -> OutControl {
        self.bits
    }

    pub fn nmi_enabled(&self) -> bool {
        self.nmi_enabled
    }

    pub fn flip_screen(&self) -> bool {
        self.flip_screen
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn rom_bank(&self) -> u8 {
        self.rom_bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_latch_fields() {
        let latch = ControlLatch::from_bits(0b0101_0011);
        assert!(latch.nmi_enabled());
        assert!(latch.flip_screen());
        assert_eq!(latch.priority().code(), 1);
        assert_eq!(latch.rom_bank(), 1);

        let latch = ControlLatch::from_bits(0b0010_0000);
        assert!(!latch.nmi_enabled());
        assert!(!latch.flip_screen());
        assert_eq!(latch.priority().code(), 2);
        assert_eq!(latch.rom_bank(), 0);
    }

    #[test]
    fn test_unknown_bits_are_stored() {
        let latch = ControlLatch::from_bits(0x8C);
        assert_eq!(latch.raw(), 0x8C);
        assert!(latch.bits().contains(OutControl::UNKNOWN_LOW));
        assert!(latch.bits().contains(OutControl::UNKNOWN_HIGH));
        assert_eq!(latch.priority().code(), 0);
        assert!(!latch.flip_screen());
    }

    #[test]
    fn test_default_is_power_on_state() {
        let latch = ControlLatch::default();
        assert_eq!(latch.raw(), 0);
        assert!(latch.priority().foreground_behind_sprites());
        assert!(!latch.priority().primary_sprites_first());
    }

    #[test]
    fn test_priority_codes() {
        assert!(Priority::new(0).foreground_behind_sprites());
        assert!(Priority::new(1).primary_sprites_first());
        for code in [2, 3] {
            let p = Priority::new(code);
            assert!(!p.foreground_behind_sprites());
            assert!(!p.primary_sprites_first());
        }
        assert_eq!(Priority::new(7).code(), 3);
    }
}
