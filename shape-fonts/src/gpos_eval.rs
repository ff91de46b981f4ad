//! Executes GPOS lookups: single, pair, cursive, the three mark attachment
//! kinds, context, chaining context, and extension subtables, all matched
//! through a [`Locator`] exactly as [`crate::gsub_eval`] does for GSUB.

use crate::album::{Album, SlotTraits};
use crate::glyph::GlyphId16;
use crate::locator::{Locator, LocatorGdef};
use crate::tables::context::{ChainedSequenceContext, SequenceContext};
use crate::tables::gpos::PositionSubtable;
use crate::tables::layout::{ClassDef, LookupFlag, LookupList, ValueRecord};

pub fn execute_lookup(
    lookup_list: &LookupList<'_>,
    lookup_index: u16,
    mask: u16,
    album: &mut Album,
    gdef: LocatorGdef<'_>,
    depth: u8,
    recursion_limit: u8,
) {
    if depth > recursion_limit {
        log::warn!("gpos lookup {lookup_index}: recursion limit exceeded, skipping");
        return;
    }
    let lookup = match lookup_list.get(lookup_index) {
        Ok(l) => l,
        Err(e) => {
            log::warn!("gpos lookup {lookup_index}: {e}");
            return;
        }
    };
    let mut loc = Locator::new(album, gdef);
    loc.set_lookup_flag(lookup.lookup_flag);
    loc.set_feature_mask(mask);
    if let Some(set) = lookup.mark_filtering_set {
        loc.set_mark_filtering_set(set);
    }
    let rtl = lookup.lookup_flag.contains(LookupFlag::RIGHT_TO_LEFT);

    while loc.move_next(album) {
        let pos = loc.current().unwrap();
        for sub_idx in 0..lookup.subtable_count() {
            let sub_data = match lookup.subtable_data(sub_idx) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("gpos lookup {lookup_index} subtable {sub_idx}: {e}");
                    continue;
                }
            };
            let subtable = match PositionSubtable::read(lookup.lookup_type, sub_data) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("gpos lookup {lookup_index} subtable {sub_idx}: {e}");
                    continue;
                }
            };
            if let Some(restart_at) = apply_subtable(
                &subtable,
                pos,
                &loc,
                album,
                lookup_list,
                mask,
                gdef,
                rtl,
                depth,
                recursion_limit,
            ) {
                loc.jump_to(restart_at);
                break;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_subtable(
    subtable: &PositionSubtable<'_>,
    pos: usize,
    loc: &Locator<'_>,
    album: &mut Album,
    lookup_list: &LookupList<'_>,
    mask: u16,
    gdef: LocatorGdef<'_>,
    rtl: bool,
    depth: u8,
    recursion_limit: u8,
) -> Option<usize> {
    match subtable {
        PositionSubtable::Single(s) => {
            let glyph = album.slot(pos).glyph_id;
            let value = s.value_for(glyph)?;
            apply_value(album, pos, &value);
            Some(pos + 1)
        }
        PositionSubtable::Pair(s) => {
            let first = album.slot(pos).glyph_id;
            let second_pos = loc.get_after(album, pos)?;
            let second = album.slot(second_pos).glyph_id;
            let (v1, v2) = s.pair_values(first, second)?;
            apply_value(album, pos, &v1);
            if v2.is_null() {
                Some(pos + 1)
            } else {
                apply_value(album, second_pos, &v2);
                Some(second_pos + 1)
            }
        }
        PositionSubtable::Cursive(s) => {
            let glyph = album.slot(pos).glyph_id;
            let (entry, exit) = s.entry_exit(glyph)?;
            let neighbor = if rtl { loc.get_after(album, pos) } else { loc.get_before(album, pos) };
            let neighbor = neighbor?;
            let neighbor_glyph = album.slot(neighbor).glyph_id;
            let (neighbor_entry, neighbor_exit) = s.entry_exit(neighbor_glyph)?;
            let (child, parent, child_anchor, parent_anchor) = if rtl {
                (pos, neighbor, exit, neighbor_entry)
            } else {
                (pos, neighbor, entry, neighbor_exit)
            };
            let child_anchor = child_anchor?;
            let parent_anchor = parent_anchor?;
            let delta_y = parent_anchor.y as i32 - child_anchor.y as i32;
            // `wrap_up`'s cycle-guarded resolution makes a malformed chain
            // here safe (worst case, zero contribution), so no cycle check
            // is needed at link time.
            album.link_cursive(child, parent, delta_y);
            Some(pos + 1)
        }
        PositionSubtable::MarkToBase(s) => {
            apply_mark_attachment(album, loc, pos, s, |traits| traits.contains(SlotTraits::BASE))
        }
        PositionSubtable::MarkToMark(s) => {
            apply_mark_attachment(album, loc, pos, s, |traits| traits.contains(SlotTraits::MARK))
        }
        PositionSubtable::MarkToLigature(s) => {
            let mark_glyph = album.slot(pos).glyph_id;
            let record = s.mark_record(mark_glyph)?;
            let base = loc.get_before(album, pos)?;
            if !album.slot(base).traits.contains(SlotTraits::LIGATURE) {
                return None;
            }
            let base_glyph = album.slot(base).glyph_id;
            // Simplification: attaches to the ligature's first component —
            // the Album does not track which original component position a
            // still-pending mark belongs to once the ligature has merged.
            let anchor = s.ligature_anchor(base_glyph, 0, record.mark_class)?;
            let delta = record.mark_anchor.delta_to(&anchor);
            if !album.would_cycle(pos, base) {
                album.link_attachment(pos, base, delta);
            }
            Some(pos + 1)
        }
        PositionSubtable::Context(ctx) => {
            apply_sequence_context(ctx, pos, loc, album, lookup_list, mask, gdef, depth, recursion_limit)
        }
        PositionSubtable::ChainContext(ctx) => apply_chained_context(
            ctx,
            pos,
            loc,
            album,
            lookup_list,
            mask,
            gdef,
            depth,
            recursion_limit,
        ),
    }
}

fn apply_value(album: &mut Album, index: usize, value: &ValueRecord) {
    album.add_offset(index, (value.x_placement as i32, value.y_placement as i32));
    album.add_advance(index, value.x_advance as i32);
}

/// Shared MarkToBase/MarkToMark logic: find the nearest preceding
/// legitimate glyph matching `is_base_like`, look up its anchor for the
/// mark's class, and link the mark's offset to it.
fn apply_mark_attachment<'a>(
    album: &mut Album,
    loc: &Locator<'a>,
    pos: usize,
    s: &crate::tables::gpos::MarkBasePos<'a>,
    is_base_like: impl Fn(SlotTraits) -> bool,
) -> Option<usize> {
    let mark_glyph = album.slot(pos).glyph_id;
    let record = s.mark_record(mark_glyph)?;
    let base = loc.get_before(album, pos)?;
    if !is_base_like(album.slot(base).traits) {
        return None;
    }
    let base_glyph = album.slot(base).glyph_id;
    let base_anchor = s.base_anchor(base_glyph, record.mark_class)?;
    let delta = record.mark_anchor.delta_to(&base_anchor);
    if !album.would_cycle(pos, base) {
        album.link_attachment(pos, base, delta);
    }
    Some(pos + 1)
}

fn classify(class_def: Option<&ClassDef<'_>>, glyph: GlyphId16) -> u16 {
    class_def.map(|cd| cd.get(glyph)).unwrap_or(glyph.to_u16())
}

fn match_classified_run(
    loc: &Locator<'_>,
    album: &Album,
    start: usize,
    expected: &[GlyphId16],
    class_def: Option<&ClassDef<'_>>,
) -> Option<Vec<usize>> {
    let mut positions = vec![start];
    let mut cursor = start;
    for &g in expected {
        let next = loc.get_after(album, cursor)?;
        if classify(class_def, album.slot(next).glyph_id) != g.to_u16() {
            return None;
        }
        positions.push(next);
        cursor = next;
    }
    Some(positions)
}

fn match_backtrack(
    loc: &Locator<'_>,
    album: &Album,
    start: usize,
    expected: &[GlyphId16],
    class_def: Option<&ClassDef<'_>>,
) -> bool {
    let mut cursor = start;
    for &g in expected {
        let Some(prev) = loc.get_before(album, cursor) else { return false };
        if classify(class_def, album.slot(prev).glyph_id) != g.to_u16() {
            return false;
        }
        cursor = prev;
    }
    true
}

fn match_lookahead(
    loc: &Locator<'_>,
    album: &Album,
    after: usize,
    expected: &[GlyphId16],
    class_def: Option<&ClassDef<'_>>,
) -> bool {
    let mut cursor = after;
    for &g in expected {
        let Some(next) = loc.get_after(album, cursor) else { return false };
        if classify(class_def, album.slot(next).glyph_id) != g.to_u16() {
            return false;
        }
        cursor = next;
    }
    true
}

#[allow(clippy::too_many_arguments)]
fn apply_nested(
    lookup_list: &LookupList<'_>,
    lookup_list_index: u16,
    mask: u16,
    album: &mut Album,
    gdef: LocatorGdef<'_>,
    position: usize,
    depth: u8,
    recursion_limit: u8,
) {
    execute_lookup_once(lookup_list, lookup_list_index, mask, album, gdef, position, depth + 1, recursion_limit);
}

#[allow(clippy::too_many_arguments)]
fn execute_lookup_once(
    lookup_list: &LookupList<'_>,
    lookup_index: u16,
    mask: u16,
    album: &mut Album,
    gdef: LocatorGdef<'_>,
    position: usize,
    depth: u8,
    recursion_limit: u8,
) {
    if depth > recursion_limit {
        log::warn!("gpos lookup {lookup_index}: recursion limit exceeded, skipping");
        return;
    }
    let lookup = match lookup_list.get(lookup_index) {
        Ok(l) => l,
        Err(e) => {
            log::warn!("gpos lookup {lookup_index}: {e}");
            return;
        }
    };
    let mut loc = Locator::new(album, gdef);
    loc.set_lookup_flag(lookup.lookup_flag);
    loc.set_feature_mask(mask);
    let rtl = lookup.lookup_flag.contains(LookupFlag::RIGHT_TO_LEFT);
    loc.jump_to(position);
    if !loc.move_next(album) {
        return;
    }
    let pos = loc.current().unwrap();
    for sub_idx in 0..lookup.subtable_count() {
        let Ok(sub_data) = lookup.subtable_data(sub_idx) else { continue };
        let Ok(subtable) = PositionSubtable::read(lookup.lookup_type, sub_data) else { continue };
        if apply_subtable(&subtable, pos, &loc, album, lookup_list, mask, gdef, rtl, depth, recursion_limit).is_some()
        {
            return;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_sequence_context(
    ctx: &SequenceContext<'_>,
    pos: usize,
    loc: &Locator<'_>,
    album: &mut Album,
    lookup_list: &LookupList<'_>,
    mask: u16,
    gdef: LocatorGdef<'_>,
    depth: u8,
    recursion_limit: u8,
) -> Option<usize> {
    let glyph = album.slot(pos).glyph_id;
    let (positions, lookup_records) = match ctx {
        SequenceContext::Format1 { coverage, rule_sets } => {
            let idx = coverage.get(glyph)?;
            let rules = rule_sets.get(idx as usize)?;
            rules.iter().find_map(|rule| {
                match_classified_run(loc, album, pos, &rule.input, None)
                    .map(|p| (p, rule.lookup_records.clone()))
            })?
        }
        SequenceContext::Format2 { coverage, class_def, class_rule_sets } => {
            coverage.get(glyph)?;
            let class = class_def.get(glyph);
            let rules = class_rule_sets.get(class as usize)?;
            rules.iter().find_map(|rule| {
                match_classified_run(loc, album, pos, &rule.input, Some(class_def))
                    .map(|p| (p, rule.lookup_records.clone()))
            })?
        }
        SequenceContext::Format3 { input_coverages, lookup_records } => {
            let mut positions = vec![pos];
            let mut cursor = pos;
            if !input_coverages.first()?.contains(glyph) {
                return None;
            }
            for cov in input_coverages.iter().skip(1) {
                let next = loc.get_after(album, cursor)?;
                if !cov.contains(album.slot(next).glyph_id) {
                    return None;
                }
                positions.push(next);
                cursor = next;
            }
            (positions, lookup_records.clone())
        }
    };
    let last = *positions.last().unwrap();
    for record in &lookup_records {
        if let Some(&target) = positions.get(record.sequence_index as usize) {
            apply_nested(lookup_list, record.lookup_list_index, mask, album, gdef, target, depth, recursion_limit);
        }
    }
    Some(last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FontData, FontRead};
    use crate::glyph::GlyphId16;

    /// A `LookupList` with one lookup (type 2, PairPos format 1) giving
    /// glyph 1 ("A") a -30 unit kern before glyph 2 ("V").
    fn kerning_lookup_list() -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // lookupCount
        bytes.extend(4u16.to_be_bytes()); // lookupOffsets[0]
        assert_eq!(bytes.len(), 4);

        // Lookup @4
        bytes.extend(2u16.to_be_bytes()); // lookupType: Pair
        bytes.extend(0u16.to_be_bytes()); // lookupFlag
        bytes.extend(1u16.to_be_bytes()); // subTableCount
        bytes.extend(8u16.to_be_bytes()); // subtableOffsets[0] (relative to 4)
        assert_eq!(bytes.len(), 12);

        // PairPos format1 @12
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(12u16.to_be_bytes()); // coverageOffset (relative to 12)
        bytes.extend(0x0004u16.to_be_bytes()); // valueFormat1: xAdvance
        bytes.extend(0u16.to_be_bytes()); // valueFormat2: none
        bytes.extend(1u16.to_be_bytes()); // pairSetCount
        bytes.extend(18u16.to_be_bytes()); // pairSetOffsets[0] (relative to 12)
        assert_eq!(bytes.len(), 24);

        // Coverage @24
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes()); // first glyph
        assert_eq!(bytes.len(), 30);

        // PairSet @30
        bytes.extend(1u16.to_be_bytes()); // pairValueCount
        bytes.extend(2u16.to_be_bytes()); // secondGlyph
        bytes.extend((-30i16).to_be_bytes()); // value1.xAdvance
        assert_eq!(bytes.len(), 36);
        bytes
    }

    #[test]
    fn execute_lookup_applies_a_kerning_pair_to_the_first_member_only() {
        let bytes = kerning_lookup_list();
        let lookup_list = LookupList::read(FontData::new(&bytes)).unwrap();

        let mut album = Album::new();
        album.reset(0, 2);
        album.add(GlyphId16::new(1), SlotTraits::BASE, 0);
        album.add(GlyphId16::new(2), SlotTraits::BASE, 1);

        execute_lookup(&lookup_list, 0, 0, &mut album, LocatorGdef::default(), 0, 32);

        assert_eq!(album.slot(0).advance, -30);
        assert_eq!(album.slot(1).advance, 0);
    }

    /// A `LookupList` with one lookup (type 4, MarkToBase) attaching mark
    /// glyph 20 to base glyph 30.
    fn mark_to_base_lookup_list() -> Vec<u8> {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // lookupCount
        bytes.extend(4u16.to_be_bytes()); // lookupOffsets[0]
        assert_eq!(bytes.len(), 4);

        // Lookup @4
        bytes.extend(4u16.to_be_bytes()); // lookupType: MarkToBase
        bytes.extend(0u16.to_be_bytes()); // lookupFlag
        bytes.extend(1u16.to_be_bytes()); // subTableCount
        bytes.extend(8u16.to_be_bytes()); // subtableOffsets[0] (relative to 4)
        assert_eq!(bytes.len(), 12);

        // MarkBasePos @12
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(12u16.to_be_bytes()); // markCoverageOffset (relative to 12)
        bytes.extend(18u16.to_be_bytes()); // baseCoverageOffset (relative to 12)
        bytes.extend(1u16.to_be_bytes()); // markClassCount
        bytes.extend(24u16.to_be_bytes()); // markArrayOffset (relative to 12)
        bytes.extend(36u16.to_be_bytes()); // baseArrayOffset (relative to 12)
        assert_eq!(bytes.len(), 24);

        // MarkCoverage @24
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(20u16.to_be_bytes());
        assert_eq!(bytes.len(), 30);

        // BaseCoverage @30
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(30u16.to_be_bytes());
        assert_eq!(bytes.len(), 36);

        // MarkArray @36: one MarkRecord(class=0, anchorOffset=6 relative to 36).
        bytes.extend(1u16.to_be_bytes()); // markCount
        bytes.extend(0u16.to_be_bytes()); // markClass
        bytes.extend(6u16.to_be_bytes()); // markAnchorOffset
        bytes.extend(1u16.to_be_bytes()); // Anchor format
        bytes.extend(1i16.to_be_bytes()); // x
        bytes.extend(2i16.to_be_bytes()); // y
        assert_eq!(bytes.len(), 48);

        // BaseArray @48: one row, one class-anchor offset (local 4, relative to 48).
        bytes.extend(1u16.to_be_bytes()); // baseCount
        bytes.extend(4u16.to_be_bytes()); // baseAnchorOffsets[0][0]
        bytes.extend(1u16.to_be_bytes()); // Anchor format
        bytes.extend(10i16.to_be_bytes()); // x
        bytes.extend(20i16.to_be_bytes()); // y
        assert_eq!(bytes.len(), 58);
        bytes
    }

    #[test]
    fn execute_lookup_links_a_mark_to_the_preceding_base_and_wrap_up_resolves_it() {
        let bytes = mark_to_base_lookup_list();
        let lookup_list = LookupList::read(FontData::new(&bytes)).unwrap();

        let mut album = Album::new();
        album.reset(0, 2);
        album.add(GlyphId16::new(30), SlotTraits::BASE, 0);
        album.add(GlyphId16::new(20), SlotTraits::MARK, 1);

        execute_lookup(&lookup_list, 0, 0, &mut album, LocatorGdef::default(), 0, 32);
        assert_eq!(album.attachment_parent(1), Some(0));

        album.wrap_up(false);
        assert_eq!(album.slot(1).offset, (9, 18));
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_chained_context(
    ctx: &ChainedSequenceContext<'_>,
    pos: usize,
    loc: &Locator<'_>,
    album: &mut Album,
    lookup_list: &LookupList<'_>,
    mask: u16,
    gdef: LocatorGdef<'_>,
    depth: u8,
    recursion_limit: u8,
) -> Option<usize> {
    let glyph = album.slot(pos).glyph_id;
    let (positions, lookup_records) = match ctx {
        ChainedSequenceContext::Format1 { coverage, rule_sets } => {
            let idx = coverage.get(glyph)?;
            let rules = rule_sets.get(idx as usize)?;
            rules.iter().find_map(|rule| {
                if !match_backtrack(loc, album, pos, &rule.backtrack, None) {
                    return None;
                }
                let positions = match_classified_run(loc, album, pos, &rule.input, None)?;
                let last = *positions.last().unwrap();
                if !match_lookahead(loc, album, last, &rule.lookahead, None) {
                    return None;
                }
                Some((positions, rule.lookup_records.clone()))
            })?
        }
        ChainedSequenceContext::Format2 {
            coverage,
            backtrack_class_def,
            input_class_def,
            lookahead_class_def,
            class_rule_sets,
        } => {
            coverage.get(glyph)?;
            let class = input_class_def.get(glyph);
            let rules = class_rule_sets.get(class as usize)?;
            rules.iter().find_map(|rule| {
                if !match_backtrack(loc, album, pos, &rule.backtrack, Some(backtrack_class_def)) {
                    return None;
                }
                let positions = match_classified_run(loc, album, pos, &rule.input, Some(input_class_def))?;
                let last = *positions.last().unwrap();
                if !match_lookahead(loc, album, last, &rule.lookahead, Some(lookahead_class_def)) {
                    return None;
                }
                Some((positions, rule.lookup_records.clone()))
            })?
        }
        ChainedSequenceContext::Format3 {
            backtrack_coverages,
            input_coverages,
            lookahead_coverages,
            lookup_records,
        } => {
            let mut bt_cursor = pos;
            for cov in backtrack_coverages {
                let prev = loc.get_before(album, bt_cursor)?;
                if !cov.contains(album.slot(prev).glyph_id) {
                    return None;
                }
                bt_cursor = prev;
            }
            let mut positions = vec![pos];
            let mut cursor = pos;
            if !input_coverages.first()?.contains(glyph) {
                return None;
            }
            for cov in input_coverages.iter().skip(1) {
                let next = loc.get_after(album, cursor)?;
                if !cov.contains(album.slot(next).glyph_id) {
                    return None;
                }
                positions.push(next);
                cursor = next;
            }
            let mut la_cursor = cursor;
            for cov in lookahead_coverages {
                let next = loc.get_after(album, la_cursor)?;
                if !cov.contains(album.slot(next).glyph_id) {
                    return None;
                }
                la_cursor = next;
            }
            (positions, lookup_records.clone())
        }
    };
    let last = *positions.last().unwrap();
    for record in &lookup_records {
        if let Some(&target) = positions.get(record.sequence_index as usize) {
            apply_nested(lookup_list, record.lookup_list_index, mask, album, gdef, target, depth, recursion_limit);
        }
    }
    Some(last + 1)
}
