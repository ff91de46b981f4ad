//! Shape a codepoint sequence against a directory of raw OpenType table
//! dumps and print the resulting glyph sequence, offsets, and codepoint
//! mappings. Each table lives in its own file named after its tag
//! (`cmap`, `GDEF`, `GSUB`, `GPOS`, `hmtx`, `hhea`) — this tool does not
//! parse an `sfnt` container, matching the library's own scope (table
//! bytes are handed in already located, via `FontTableProvider`).

use std::path::PathBuf;

use clap::Parser;
use shape_fonts::data::TableSet;
use shape_fonts::direction::{TextDirection, TextMode};
use shape_fonts::tag::Tag;
use shape_fonts::{shape, ShapeOptions};

#[derive(Parser, Debug)]
#[command(version, about = "Shape a codepoint sequence against raw OpenType table dumps")]
struct Args {
    /// Directory containing one file per table, named by tag (cmap, GDEF, GSUB, GPOS, hmtx, hhea).
    #[arg(long)]
    tables: PathBuf,

    /// Codepoints to shape, as hex (e.g. "41,301" for U+0041 U+0301).
    #[arg(long, value_delimiter = ',')]
    codepoints: Vec<String>,

    /// Four-character script tag (default "latn").
    #[arg(long, default_value = "latn")]
    script: String,

    /// Four-character language tag, if any.
    #[arg(long)]
    language: Option<String>,

    #[arg(long, value_enum, default_value = "ltr")]
    direction: Direction,

    /// Treat the codepoint sequence as already in visual (reversed) order.
    #[arg(long)]
    backward: bool,

    #[arg(long, default_value_t = 32)]
    recursion_limit: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Direction {
    Ltr,
    Rtl,
}

const TABLE_NAMES: &[&str] = &["cmap", "GDEF", "GSUB", "GPOS", "hmtx", "hhea"];

fn parse_tag(raw: &str) -> Tag {
    let mut bytes = [b' '; 4];
    for (i, b) in raw.bytes().take(4).enumerate() {
        bytes[i] = b;
    }
    Tag::new(&bytes)
}

fn parse_codepoint(raw: &str) -> u32 {
    u32::from_str_radix(raw.trim_start_matches("0x"), 16)
        .unwrap_or_else(|_| panic!("invalid hex codepoint: {raw}"))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let loaded: Vec<(Tag, Vec<u8>)> = TABLE_NAMES
        .iter()
        .filter_map(|name| {
            let path = args.tables.join(name);
            std::fs::read(&path).ok().map(|bytes| (parse_tag(name), bytes))
        })
        .collect();
    let entries: Vec<([u8; 4], &[u8])> = loaded
        .iter()
        .map(|(tag, bytes)| (tag.to_be_bytes(), bytes.as_slice()))
        .collect();
    let fonts = TableSet::new(&entries);

    let codepoints: Vec<u32> = args.codepoints.iter().map(|s| parse_codepoint(s)).collect();

    let mut options = ShapeOptions::default()
        .with_script(parse_tag(&args.script))
        .with_text_direction(match args.direction {
            Direction::Ltr => TextDirection::LeftToRight,
            Direction::Rtl => TextDirection::RightToLeft,
        })
        .with_recursion_limit(args.recursion_limit);
    if args.backward {
        options = options.with_text_mode(TextMode::Backward);
    }
    if let Some(lang) = &args.language {
        options = options.with_language(parse_tag(lang));
    }

    match shape(&fonts, &codepoints, options) {
        Ok(result) => {
            println!("glyphs: {:?}", result.glyph_ids);
            println!("positions (xOff,yOff,xAdv,yAdv): {:?}", result.positions);
            println!("glyph -> codepoint: {:?}", result.glyph_to_codepoint);
            println!("codepoint -> glyph: {:?}", result.codepoint_to_glyph);
        }
        Err(err) => {
            eprintln!("shaping failed: {err}");
            std::process::exit(1);
        }
    }
}
