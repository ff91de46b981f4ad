//! `TextProcessor`: drives discovery → substitution → positioning →
//! wrap-up against a compiled [`Pattern`].

use crate::album::{Album, SlotTraits};
use crate::direction::{TextDirection, TextMode};
use crate::engine::ShapingEngine;
use crate::error::ShapingError;
use crate::glyph::GlyphId16;
use crate::gpos_eval;
use crate::gsub_eval;
use crate::locator::LocatorGdef;
use crate::pattern::Pattern;
use crate::script::ScriptKnowledge;
use crate::tables::cmap::Cmap;
use crate::tables::gdef::{Gdef, GlyphClass};
use crate::tables::hmtx::Hmtx;
use crate::tables::layout::LookupList;

/// Borrowed views of the font tables a shaping call needs. All optional
/// except `cmap`: a font missing GDEF, hmtx, GSUB, or GPOS still shapes
/// (with default traits/advances, or simply no substitution/positioning).
pub struct TextProcessor<'a> {
    pub cmap: &'a Cmap<'a>,
    pub gdef: Option<&'a Gdef<'a>>,
    pub hmtx: Option<&'a Hmtx<'a>>,
    pub gsub_lookups: Option<&'a LookupList<'a>>,
    pub gpos_lookups: Option<&'a LookupList<'a>>,
    pub recursion_limit: u8,
}

impl<'a> TextProcessor<'a> {
    /// Runs the full pipeline over `[range_start, range_start+range_len)`
    /// of `codepoints`, leaving `album` in its post-wrap-up (dense, final)
    /// state.
    #[allow(clippy::too_many_arguments)]
    pub fn shape(
        &self,
        album: &mut Album,
        codepoints: &[u32],
        range_start: usize,
        range_len: usize,
        pattern: &Pattern,
        knowledge: ScriptKnowledge,
        engine: &ShapingEngine,
        direction: TextDirection,
        mode: TextMode,
    ) -> Result<(), ShapingError> {
        album.reset(range_start, range_len);
        self.discover_glyphs(album, codepoints, range_start, range_len, pattern);
        engine.preprocess(album, codepoints, knowledge);

        let gdef_view = self.gdef.map(LocatorGdef::from_gdef).unwrap_or_default();

        if let Some(gsub) = self.gsub_lookups {
            for unit in pattern.substitution_units() {
                for &lookup_index in &unit.lookup_indices {
                    gsub_eval::execute_lookup(gsub, lookup_index, unit.mask, album, gdef_view, 0, self.recursion_limit);
                }
            }
        }
        if let Some(gpos) = self.gpos_lookups {
            for unit in pattern.positioning_units() {
                for &lookup_index in &unit.lookup_indices {
                    gpos_eval::execute_lookup(gpos, lookup_index, unit.mask, album, gdef_view, 0, self.recursion_limit);
                }
            }
        }
        engine.process_album(album, direction);

        let reverse = direction.is_rtl() ^ (mode == TextMode::Backward);
        album.wrap_up(reverse);
        log::debug!(
            "wrap_up: {} glyph(s) remain, direction={:?} reversed={}",
            album.len(),
            direction,
            reverse
        );
        Ok(())
    }

    /// Applies `cmap` to each codepoint in range and appends a slot, with
    /// traits from GDEF's `GlyphClassDef` (defaulting to Base when GDEF, or
    /// an entry for the glyph, is absent) and an advance seeded from hmtx.
    fn discover_glyphs(
        &self,
        album: &mut Album,
        codepoints: &[u32],
        range_start: usize,
        range_len: usize,
        pattern: &Pattern,
    ) {
        let full_mask = pattern.full_mask();
        for i in 0..range_len {
            let codepoint_index = range_start + i;
            let glyph = codepoints
                .get(codepoint_index)
                .and_then(|&cp| self.cmap.map(cp))
                .unwrap_or(GlyphId16::NOTDEF);
            let traits = self
                .gdef
                .and_then(|g| g.glyph_class_def.as_ref())
                .map(|cd| glyph_class_traits(cd.get(glyph)))
                .unwrap_or(SlotTraits::BASE);
            let slot_index = album.add(glyph, traits, codepoint_index);
            let advance = self.hmtx.and_then(|h| h.advance_width(glyph).ok()).unwrap_or(0);
            album.set_advance(slot_index, advance);
            album.set_mask(slot_index, full_mask);
        }
    }
}

fn glyph_class_traits(class: u16) -> SlotTraits {
    match GlyphClass::from_raw(class) {
        GlyphClass::Base | GlyphClass::Unclassified => SlotTraits::BASE,
        GlyphClass::Ligature => SlotTraits::LIGATURE,
        GlyphClass::Mark => SlotTraits::MARK,
        GlyphClass::Component => SlotTraits::COMPONENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FontData, FontRead};
    use crate::direction::TextDirection;
    use crate::tables::cmap::Cmap4;
    use crate::tag::script;

    fn build_cmap4() -> Vec<u8> {
        // A minimal format-4 cmap subtable mapping 'A'..'C' (0x41..0x43)
        // to glyph ids 1..3 via idDelta, single segment plus the required
        // terminating 0xFFFF segment.
        let seg_count_x2 = 4u16;
        let mut bytes = vec![];
        bytes.extend(4u16.to_be_bytes()); // format
        bytes.extend(0u16.to_be_bytes()); // length (unused by reader)
        bytes.extend(0u16.to_be_bytes()); // language
        bytes.extend(seg_count_x2.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // searchRange
        bytes.extend(0u16.to_be_bytes()); // entrySelector
        bytes.extend(0u16.to_be_bytes()); // rangeShift
        // endCode[2]
        bytes.extend(0x43u16.to_be_bytes());
        bytes.extend(0xFFFFu16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // reservedPad
        // startCode[2]
        bytes.extend(0x41u16.to_be_bytes());
        bytes.extend(0xFFFFu16.to_be_bytes());
        // idDelta[2]
        bytes.extend((1i16 - 0x41i16).to_be_bytes());
        bytes.extend(1i16.to_be_bytes());
        // idRangeOffset[2]
        bytes.extend(0u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        bytes
    }

    #[test]
    fn discover_glyphs_maps_codepoints_via_cmap_and_defaults_to_base() {
        let bytes = build_cmap4();
        let cmap4 = Cmap4::read(FontData::new(&bytes)).unwrap();
        let cmap = Cmap::Format4(cmap4);
        let processor = TextProcessor {
            cmap: &cmap,
            gdef: None,
            hmtx: None,
            gsub_lookups: None,
            gpos_lookups: None,
            recursion_limit: 32,
        };
        let codepoints = [0x41u32, 0x42, 0x43];
        let pattern = Pattern {
            feature_units: vec![],
            script_tag: script::LATIN,
            language_tag: None,
            default_direction: TextDirection::LeftToRight,
        };
        let mut album = Album::new();
        album.reset(0, 3);
        processor.discover_glyphs(&mut album, &codepoints, 0, 3, &pattern);
        assert_eq!(album.len(), 3);
        assert_eq!(album.slot(0).glyph_id, GlyphId16::new(1));
        assert_eq!(album.slot(1).glyph_id, GlyphId16::new(2));
        assert_eq!(album.slot(2).glyph_id, GlyphId16::new(3));
        assert!(album.slot(0).traits.contains(SlotTraits::BASE));
    }
}
