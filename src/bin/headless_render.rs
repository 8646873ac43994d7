use appoooh_video::debug_flags;
use appoooh_video::video::palette::PROM_SIZE;
use appoooh_video::{Bitmap, GfxSet, Variant, Video, VideoState, SCREEN_HEIGHT, SCREEN_WIDTH, VISIBLE_AREA};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

// Headless frame dump
// Usage:
//   cargo run --release --bin headless_render -- --prom roms/prom.bin --gfx1 roms/gfx1.bin \
//       --gfx2 roms/gfx2.bin --state snap.sav --frames 2 --out frame.png
// HEADLESS_FRAMES can stand in for --frames.

struct Args {
    variant: Variant,
    prom: Option<PathBuf>,
    gfx1: Option<PathBuf>,
    gfx2: Option<PathBuf>,
    state: Option<String>,
    latch: Option<u8>,
    scroll: Option<u8>,
    frames: u64,
    out: PathBuf,
}

fn parse_u32_hex_or_dec(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Some(stripped) = s.strip_prefix("0x") {
        u32::from_str_radix(stripped, 16).ok()
    } else {
        s.parse::<u32>().ok()
    }
}

fn parse_u8(flag: &str, value: Option<String>) -> Result<u8, String> {
    value
        .as_deref()
        .and_then(parse_u32_hex_or_dec)
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(|| format!("{} expects a byte value", flag))
}

fn parse_args() -> Result<Args, String> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        variant: Variant::Appoooh,
        prom: None,
        gfx1: None,
        gfx2: None,
        state: None,
        latch: None,
        scroll: None,
        frames: debug_flags::headless_frames(),
        out: PathBuf::from("frame.png"),
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--variant" => {
                let v = args.next().ok_or("--variant expects a name")?;
                parsed.variant = v.parse()?;
            }
            "--prom" => parsed.prom = args.next().map(PathBuf::from),
            "--gfx1" => parsed.gfx1 = args.next().map(PathBuf::from),
            "--gfx2" => parsed.gfx2 = args.next().map(PathBuf::from),
            "--state" => parsed.state = args.next(),
            "--latch" => parsed.latch = Some(parse_u8("--latch", args.next())?),
            "--scroll" => parsed.scroll = Some(parse_u8("--scroll", args.next())?),
            "--frames" => {
                parsed.frames = args
                    .next()
                    .as_deref()
                    .and_then(parse_u32_hex_or_dec)
                    .ok_or("--frames expects a number")? as u64;
            }
            "--out" | "-o" => {
                parsed.out = args.next().map(PathBuf::from).ok_or("--out expects a path")?;
            }
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(parsed)
}

fn read_optional(path: &Option<PathBuf>) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(std::fs::read(p)?),
        None => Ok(Vec::new()),
    }
}

fn write_png(path: &Path, bitmap: &Bitmap, video: &Video) -> Result<(), Box<dyn std::error::Error>> {
    // crop to the visible rows
    let width = SCREEN_WIDTH as u32;
    let top = VISIBLE_AREA.min_y as usize;
    let rows = (VISIBLE_AREA.max_y - VISIBLE_AREA.min_y + 1) as usize;
    let rgb = bitmap.to_rgb(video.palette());
    let visible = &rgb[top * SCREEN_WIDTH * 3..(top + rows) * SCREEN_WIDTH * 3];

    let file = File::create(path)?;
    let w = BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, width, rows as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(visible)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!(
                "usage: headless_render [--variant appoooh|robowres] [--prom FILE] [--gfx1 FILE] \
                 [--gfx2 FILE] [--state FILE] [--latch N] [--scroll N] [--frames N] [--out FILE]"
            );
            std::process::exit(2);
        }
    };

    let gfx1 = read_optional(&args.gfx1)?;
    let gfx2 = read_optional(&args.gfx2)?;
    let mut video = Video::new(args.variant, GfxSet::decode(&gfx1, &gfx2));

    if let Some(path) = &args.prom {
        let prom = std::fs::read(path)?;
        if prom.len() < PROM_SIZE {
            return Err(format!(
                "{}: color PROM has {} bytes, need {}",
                path.display(),
                prom.len(),
                PROM_SIZE
            )
            .into());
        }
        video.rebuild_palette(&prom);
    } else {
        log::warn!("no color PROM given, frame will be black");
    }

    if let Some(path) = &args.state {
        let state = VideoState::load_from_file(path)?;
        video.load_state(&state)?;
    }
    if let Some(latch) = args.latch {
        video.out_w(latch);
    }
    if let Some(scroll) = args.scroll {
        video.scroll_w(scroll);
    }

    let mut bitmap = Bitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    for _ in 0..args.frames.max(1) {
        bitmap.fill(0);
        video.render_frame(&mut bitmap, &VISIBLE_AREA);
    }

    write_png(&args.out, &bitmap, &video)?;
    if !debug_flags::quiet() {
        println!(
            "Rendered {} frame(s) [{}] priority={} flip={} -> {}",
            video.frame(),
            video.variant().name(),
            video.control().priority().code(),
            video.control().flip_screen(),
            args.out.display()
        );
    }
    Ok(())
}
