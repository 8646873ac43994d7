use super::registers::Priority;
use super::sprites::SpriteBankId;

/// One pass of the per-frame composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStep {
    Background,
    Foreground,
    Sprites(SpriteBankId),
}

/// Draw order for a priority code.
///
/// The background always goes first. Code 0 draws the foreground right
/// after it (behind the sprites); any other code draws it last. Code 1
/// draws the primary sprite bank before the secondary one, every other code
/// the reverse. Codes 2 and 3 therefore produce the same frame.
pub fn draw_order(priority: Priority) -> [DrawStep; 4] {
    use DrawStep::*;
    use SpriteBankId::*;

    let sprites = if priority.primary_sprites_first() {
        [Sprites(Primary), Sprites(Secondary)]
    } else {
        [Sprites(Secondary), Sprites(Primary)]
    };

    if priority.foreground_behind_sprites() {
        [Background, Foreground, sprites[0], sprites[1]]
    } else {
        [Background, sprites[0], sprites[1], Foreground]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DrawStep::*;
    use SpriteBankId::*;

    #[test]
    fn test_draw_order_per_code() {
        assert_eq!(
            draw_order(Priority::new(0)),
            [Background, Foreground, Sprites(Secondary), Sprites(Primary)]
        );
        assert_eq!(
            draw_order(Priority::new(1)),
            [Background, Sprites(Primary), Sprites(Secondary), Foreground]
        );
        assert_eq!(
            draw_order(Priority::new(2)),
            [Background, Sprites(Secondary), Sprites(Primary), Foreground]
        );
        assert_eq!(draw_order(Priority::new(3)), draw_order(Priority::new(2)));
    }

    #[test]
    fn test_three_distinct_orders() {
        let mut orders: Vec<[DrawStep; 4]> = (0..4).map(|c| draw_order(Priority::new(c))).collect();
        orders.dedup();
        assert_eq!(orders.len(), 3);
    }
}
