//! A complex-script text shaping engine: drives OpenType GSUB/GPOS lookups
//! over a mutable glyph buffer (the [`album::Album`]), with script-specific
//! pre-passes (the [`engine`] module) for scripts whose contextual forms
//! (e.g. Arabic joining) a generic lookup pass cannot itself discover.
//!
//! [`shape`] is the single public entry point: given a [`data::FontTableProvider`],
//! a codepoint sequence, and [`ShapeOptions`], it returns a [`ShapedOutput`]
//! or a [`error::ShapingError`] if the font's layout tables are structurally
//! unreadable.

pub mod album;
pub(crate) mod bitset;
pub mod data;
pub mod direction;
pub mod engine;
pub mod error;
pub mod glyph;
pub mod gpos_eval;
pub mod gsub_eval;
pub mod locator;
pub mod pattern;
pub mod processor;
pub mod script;
pub mod tables;
pub mod tag;

use data::{FontData, FontRead, FontTableProvider};
use direction::{TextDirection, TextMode};
use engine::ShapingEngine;
use error::ShapingError;
use glyph::GlyphId16;
use pattern::Pattern;
use processor::TextProcessor;
use script::knowledge_for;
use tables::cmap::Cmap;
use tables::gdef::Gdef;
use tables::hmtx::Hmtx;
use tables::script::LayoutHeader;
use tag::Tag;

/// The `[offset, offset+length)` slice of the input codepoint sequence to
/// shape. Defaults to the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRange {
    pub offset: usize,
    pub length: usize,
}

/// Every option `shape` recognises. Construct with [`ShapeOptions::default`]
/// and the builder setters, mirroring a typed-builder configuration surface
/// rather than a file format — there is no configuration file in scope.
#[derive(Debug, Clone, Copy)]
pub struct ShapeOptions {
    text_direction: TextDirection,
    text_mode: TextMode,
    script_tag: Tag,
    language_tag: Option<Tag>,
    string_range: Option<StringRange>,
    recursion_limit: u8,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        ShapeOptions {
            text_direction: TextDirection::LeftToRight,
            text_mode: TextMode::Forward,
            script_tag: tag::script::LATIN,
            language_tag: None,
            string_range: None,
            recursion_limit: 32,
        }
    }
}

impl ShapeOptions {
    pub fn with_text_direction(mut self, direction: TextDirection) -> Self {
        self.text_direction = direction;
        self
    }

    pub fn with_text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = mode;
        self
    }

    pub fn with_script(mut self, script_tag: Tag) -> Self {
        self.script_tag = script_tag;
        self
    }

    pub fn with_language(mut self, language_tag: Tag) -> Self {
        self.language_tag = Some(language_tag);
        self
    }

    pub fn with_string_range(mut self, range: StringRange) -> Self {
        self.string_range = Some(range);
        self
    }

    /// Caps contextual/chaining-contextual nested-lookup recursion. The
    /// default of 32 matches the ceiling real shaping engines use to bound
    /// pathological font data.
    pub fn with_recursion_limit(mut self, limit: u8) -> Self {
        self.recursion_limit = limit;
        self
    }
}

/// The shaped result: parallel per-glyph arrays plus the two codepoint
/// mappings, dense and in final (post-`wrapUp`) order.
#[derive(Debug, Clone, Default)]
pub struct ShapedOutput {
    pub glyph_ids: Vec<GlyphId16>,
    /// `(x_offset, y_offset, x_advance, y_advance)` per glyph.
    pub positions: Vec<(i32, i32, i32, i32)>,
    /// For each output glyph, its first input codepoint index.
    pub glyph_to_codepoint: Vec<usize>,
    /// For each input codepoint index (within the shaped range), the output
    /// glyph it currently maps to.
    pub codepoint_to_glyph: Vec<usize>,
}

/// Shapes `codepoints` against the tables `fonts` provides, per `options`.
///
/// Returns `Err` only for a structural font failure (a required table
/// missing or unreadable); a single bad lookup is logged and skipped rather
/// than aborting the whole call.
pub fn shape<'a>(
    fonts: &impl FontTableProvider<'a>,
    codepoints: &[u32],
    options: ShapeOptions,
) -> Result<ShapedOutput, ShapingError> {
    let range = options.string_range.unwrap_or(StringRange { offset: 0, length: codepoints.len() });

    let cmap_data = fonts.table_data(*b"cmap").ok_or(error::ReadError::TableMissing)?;
    let cmap = Cmap::from_table(cmap_data)?;

    let gdef = fonts
        .table_data(*b"GDEF")
        .map(Gdef::read)
        .transpose()?;

    let hmtx = match (fonts.table_data(*b"hmtx"), fonts.table_data(*b"hhea")) {
        (Some(hmtx_data), Some(hhea_data)) => {
            let num_h_metrics: u16 = hhea_data.read_at(34)?;
            Some(Hmtx::new(hmtx_data, num_h_metrics))
        }
        _ => None,
    };

    let gsub = fonts.table_data(*b"GSUB").map(LayoutHeader::read).transpose()?;
    let gpos = fonts.table_data(*b"GPOS").map(LayoutHeader::read).transpose()?;

    let pattern = Pattern::compile(gsub.as_ref(), gpos.as_ref(), options.script_tag, options.language_tag)?;
    let knowledge = knowledge_for(options.script_tag);
    let engine = ShapingEngine::select(options.script_tag);

    let processor = TextProcessor {
        cmap: &cmap,
        gdef: gdef.as_ref(),
        hmtx: hmtx.as_ref(),
        gsub_lookups: gsub.as_ref().map(|h| &h.lookup_list),
        gpos_lookups: gpos.as_ref().map(|h| &h.lookup_list),
        recursion_limit: options.recursion_limit,
    };

    let mut album = album::Album::new();
    processor.shape(
        &mut album,
        codepoints,
        range.offset,
        range.length,
        &pattern,
        knowledge,
        &engine,
        options.text_direction,
        options.text_mode,
    )?;

    let glyph_ids = album.slots().iter().map(|s| s.glyph_id).collect();
    let positions = album
        .slots()
        .iter()
        .map(|s| (s.offset.0, s.offset.1, s.advance, 0))
        .collect();
    let glyph_to_codepoint = (0..album.len()).map(|i| album.get_origin(i)).collect();
    let codepoint_to_glyph = (range.offset..range.offset + range.length)
        .map(|c| album.get_association(c).unwrap_or(usize::MAX))
        .collect();

    Ok(ShapedOutput {
        glyph_ids,
        positions,
        glyph_to_codepoint,
        codepoint_to_glyph,
    })
}

pub use error::ReadError;

#[cfg(test)]
mod tests {
    use super::*;
    use data::TableSet;

    fn empty_cmap() -> Vec<u8> {
        // format 4, zero segments except the mandatory terminator.
        let mut bytes = vec![];
        bytes.extend(0u16.to_be_bytes()); // version
        bytes.extend(1u16.to_be_bytes()); // numTables
        bytes.extend(3u16.to_be_bytes()); // platformID (windows)
        bytes.extend(1u16.to_be_bytes()); // encodingID (unicode BMP)
        bytes.extend(12u32.to_be_bytes()); // offset to subtable
        // subtable at offset 12
        bytes.extend(4u16.to_be_bytes()); // format
        bytes.extend(0u16.to_be_bytes()); // length
        bytes.extend(0u16.to_be_bytes()); // language
        bytes.extend(2u16.to_be_bytes()); // segCountX2 (1 segment)
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0xFFFFu16.to_be_bytes()); // endCode
        bytes.extend(0u16.to_be_bytes()); // reservedPad
        bytes.extend(0xFFFFu16.to_be_bytes()); // startCode
        bytes.extend(1i16.to_be_bytes()); // idDelta
        bytes.extend(0u16.to_be_bytes()); // idRangeOffset
        bytes
    }

    #[test]
    fn identity_pattern_maps_codepoints_with_no_lookups_applied() {
        let cmap_bytes = empty_cmap();
        let tables: &[([u8; 4], &[u8])] = &[(*b"cmap", &cmap_bytes)];
        let fonts = TableSet::new(tables);
        let codepoints = [0xFFFFu32];
        let result = shape(&fonts, &codepoints, ShapeOptions::default()).unwrap();
        assert_eq!(result.glyph_ids.len(), 1);
        assert_eq!(result.glyph_ids[0], GlyphId16::new(0));
        assert_eq!(result.positions[0], (0, 0, 0, 0));
        assert_eq!(result.glyph_to_codepoint, vec![0]);
        assert_eq!(result.codepoint_to_glyph, vec![0]);
    }

    #[test]
    fn missing_cmap_table_is_a_structural_error() {
        let tables: &[([u8; 4], &[u8])] = &[];
        let fonts = TableSet::new(tables);
        let result = shape(&fonts, &[], ShapeOptions::default());
        assert!(result.is_err());
    }
}
