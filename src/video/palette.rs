// Color PROM decoding.
//
// The PROM holds 0x20 color bytes followed by lookup tables that map every
// final pen to one of those bytes. Each color byte drives a 3-bit weighted
// resistor ladder per gun (blue only gets the two high resistors).

use serde::{Deserialize, Serialize};

/// Offset of the pen lookup tables inside the color PROM.
pub const LOOKUP_OFFSET: usize = 0x20;
/// 32 color groups of 8 pens for each of the two graphics sets.
pub const PALETTE_ENTRIES: usize = 32 * 8 + 32 * 8;
/// Bytes needed to decode a full palette.
pub const PROM_SIZE: usize = LOOKUP_OFFSET + PALETTE_ENTRIES;

const LADDER: [u16; 3] = [0x21, 0x47, 0x97];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Board revision. Both share every routine; they differ only in a few
/// addressing constants, which are all answered here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Appoooh: lookup entries past 0x100 select the upper 16 color bytes.
    Appoooh,
    /// Robo Wres 2001: a single 16-color bank, sprites live at code 0x200+.
    Robowres,
}

impl Variant {
    /// Color byte index selected by palette entry `entry`.
    pub fn pen_index(self, prom: &[u8], entry: usize) -> usize {
        let lookup = prom.get(LOOKUP_OFFSET + entry).copied().unwrap_or(0) as usize & 0x0F;
        match self {
            Variant::Appoooh if entry >= 0x100 => lookup | 0x10,
            _ => lookup,
        }
    }

    /// Constant added to every sprite code, indexed by bank (primary, secondary).
    ///
    /// The Appoooh secondary bank already draws from its own element, so its
    /// 0x200 lands back on the same cells once the code wraps modulo the
    /// element's 0x200-entry count. Robo Wres sprite ROMs are twice that size
    /// and the offset selects their upper half.
    pub fn sprite_code_offsets(self) -> [u16; 2] {
        match self {
            Variant::Appoooh => [0x000, 0x200],
            Variant::Robowres => [0x200, 0x200],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Appoooh => "appoooh",
            Variant::Robowres => "robowres",
        }
    }
}

impl std::str::FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "appoooh" | "legacy" => Ok(Variant::Appoooh),
            "robowres" | "revised" => Ok(Variant::Robowres),
            other => Err(format!("unknown board variant '{}'", other)),
        }
    }
}

fn ladder(byte: u8, bits: [Option<u8>; 3]) -> u8 {
    let mut level = 0u16;
    for (weight, bit) in LADDER.iter().zip(bits) {
        if let Some(bit) = bit {
            level += weight * ((byte >> bit) & 1) as u16;
        }
    }
    level as u8
}

/// Convert one color byte: red bits 0-2, green bits 3-5, blue bits 6-7.
pub fn decode_color(byte: u8) -> Rgb {
    Rgb {
        r: ladder(byte, [Some(0), Some(1), Some(2)]),
        g: ladder(byte, [Some(3), Some(4), Some(5)]),
        b: ladder(byte, [None, Some(6), Some(7)]),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// All-black palette used until the PROM has been decoded.
    pub fn black(entries: usize) -> Self {
        Self {
            colors: vec![Rgb::default(); entries],
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, index: usize) -> Rgb {
        self.colors.get(index).copied().unwrap_or_default()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

/// Decode `entries` palette entries from `prom`. Short PROMs read as zero.
pub fn decode(prom: &[u8], entries: usize, variant: Variant) -> Palette {
    let colors = (0..entries)
        .map(|i| {
            let pen = variant.pen_index(prom, i);
            decode_color(prom.get(pen).copied().unwrap_or(0))
        })
        .collect();
    Palette { colors }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_prom() -> Vec<u8> {
        let mut prom = vec![0u8; PROM_SIZE];
        for i in 0..0x20 {
            prom[i] = (i as u8).wrapping_mul(37) ^ 0x5A;
        }
        for i in 0..PALETTE_ENTRIES {
            prom[LOOKUP_OFFSET + i] = (i as u8).wrapping_mul(7) | 0xA0;
        }
        prom
    }

    #[test]
    fn test_ladder_weights() {
        assert_eq!(decode_color(0x00), Rgb::new(0, 0, 0));
        assert_eq!(decode_color(0xFF), Rgb::new(0xFF, 0xFF, 0xDE));
        assert_eq!(decode_color(0x01), Rgb::new(0x21, 0, 0));
        assert_eq!(decode_color(0x02), Rgb::new(0x47, 0, 0));
        assert_eq!(decode_color(0x04), Rgb::new(0x97, 0, 0));
        assert_eq!(decode_color(0x08), Rgb::new(0, 0x21, 0));
        assert_eq!(decode_color(0x20), Rgb::new(0, 0x97, 0));
        assert_eq!(decode_color(0x40), Rgb::new(0, 0, 0x47));
        assert_eq!(decode_color(0x80), Rgb::new(0, 0, 0x97));
    }

    #[test]
    fn test_pen_index_per_variant() {
        let prom = test_prom();
        for i in 0..PALETTE_ENTRIES {
            let lookup = (prom[LOOKUP_OFFSET + i] & 0x0F) as usize;
            let high = if i < 0x100 { 0x00 } else { 0x10 };
            assert_eq!(Variant::Appoooh.pen_index(&prom, i), lookup | high);
            assert_eq!(Variant::Robowres.pen_index(&prom, i), lookup);
        }
    }

    #[test]
    fn test_decode_uses_resolved_pen() {
        let prom = test_prom();
        let legacy = decode(&prom, PALETTE_ENTRIES, Variant::Appoooh);
        let revised = decode(&prom, PALETTE_ENTRIES, Variant::Robowres);
        assert_eq!(legacy.len(), PALETTE_ENTRIES);
        assert!(!legacy.is_empty());
        assert!(Palette::black(0).is_empty());

        for i in 0..PALETTE_ENTRIES {
            let lookup = (prom[LOOKUP_OFFSET + i] & 0x0F) as usize;
            let high = if i < 0x100 { 0 } else { 0x10 };
            assert_eq!(legacy.color(i), decode_color(prom[lookup | high]));
            assert_eq!(revised.color(i), decode_color(prom[lookup]));
        }
        // lower half is identical between the two revisions
        assert_eq!(&legacy.colors()[..0x100], &revised.colors()[..0x100]);
    }

    #[test]
    fn test_short_prom_is_black_not_panic() {
        // missing lookup bytes read as 0, which selects color byte 0
        let palette = decode(&[0xFF; 4], 16, Variant::Appoooh);
        assert!(palette.colors().iter().all(|&c| c == decode_color(0xFF)));
        assert_eq!(palette.color(9999), Rgb::default());
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("Appoooh".parse::<Variant>(), Ok(Variant::Appoooh));
        assert_eq!("revised".parse::<Variant>(), Ok(Variant::Robowres));
        assert!("galaxian".parse::<Variant>().is_err());
    }
}
