//! Video hardware of the Appoooh / Robo Wres 2001 arcade boards: color PROM
//! palette, two tile layers, two sprite banks and the priority latch.

pub mod bus;
pub mod debug_flags;
pub mod savestate;
pub mod video;

pub use savestate::VideoState;
pub use video::gfx::{Bitmap, Rect};
pub use video::palette::Variant;
pub use video::{GfxSet, Video, SCREEN_HEIGHT, SCREEN_WIDTH, VISIBLE_AREA};
