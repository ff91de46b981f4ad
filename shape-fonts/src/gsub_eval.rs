//! Executes GSUB lookups: single, multiple, alternate, ligature, context,
//! chaining context, and extension subtables, all matched and applied
//! exclusively through a [`Locator`] so filtering stays centralized.

use crate::album::Album;
use crate::glyph::GlyphId16;
use crate::locator::{Locator, LocatorGdef};
use crate::tables::context::{ChainedSequenceContext, SequenceContext};
use crate::tables::gsub::SubstSubtable;
use crate::tables::layout::{ClassDef, LookupList};

/// Runs every subtable of `lookup_index` over the whole Album, restarting
/// after each match at the slot following the last consumed input slot.
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
        log::warn!("gsub lookup {lookup_index}: recursion limit exceeded, skipping");
        return;
    }
    let lookup = match lookup_list.get(lookup_index) {
        Ok(l) => l,
        Err(e) => {
            log::warn!("gsub lookup {lookup_index}: {e}");
            return;
        }
    };
    let mut loc = Locator::new(album, gdef);
    loc.set_lookup_flag(lookup.lookup_flag);
    loc.set_feature_mask(mask);
    if let Some(set) = lookup.mark_filtering_set {
        loc.set_mark_filtering_set(set);
    }

    let before = album.len();
    while loc.move_next(album) {
        let pos = loc.current().unwrap();
        let mut matched = false;
        for sub_idx in 0..lookup.subtable_count() {
            let sub_data = match lookup.subtable_data(sub_idx) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("gsub lookup {lookup_index} subtable {sub_idx}: {e}");
                    continue;
                }
            };
            let subtable = match SubstSubtable::read(lookup.lookup_type, sub_data) {
                Ok(s) => s,
                Err(e) => {
                    log::warn!("gsub lookup {lookup_index} subtable {sub_idx}: {e}");
                    continue;
                }
            };
            if let Some(restart_at) =
                apply_subtable(&subtable, pos, &loc, album, lookup_list, mask, gdef, depth, recursion_limit)
            {
                loc.jump_to(restart_at);
                matched = true;
                break;
            }
        }
        let _ = matched;
    }
    log::trace!(
        "gsub lookup {lookup_index}: kind={} glyphs {before} -> {}",
        lookup.lookup_type,
        album.len()
    );
}

/// Tries one subtable at `pos`; returns the index to resume scanning from
/// on a match (the slot following the last consumed input slot).
#[allow(clippy::too_many_arguments)]
fn apply_subtable(
    subtable: &SubstSubtable<'_>,
    pos: usize,
    loc: &Locator<'_>,
    album: &mut Album,
    lookup_list: &LookupList<'_>,
    mask: u16,
    gdef: LocatorGdef<'_>,
    depth: u8,
    recursion_limit: u8,
) -> Option<usize> {
    match subtable {
        SubstSubtable::Single(s) => {
            let glyph = album.slot(pos).glyph_id;
            let replacement = s.map(glyph)?;
            album.replace(pos, replacement);
            Some(pos + 1)
        }
        SubstSubtable::Alternate(s) => {
            let glyph = album.slot(pos).glyph_id;
            let replacement = s.first_alternate(glyph)?;
            album.replace(pos, replacement);
            Some(pos + 1)
        }
        SubstSubtable::Multiple(s) => {
            let glyph = album.slot(pos).glyph_id;
            let sequence = s.sequence_for(glyph)?.to_vec();
            if sequence.is_empty() {
                return None;
            }
            let traits = album.slot(pos).traits;
            let slot_mask = album.slot(pos).mask;
            album.replace(pos, sequence[0]);
            for (i, &g) in sequence.iter().enumerate().skip(1) {
                album.insert_at(pos + i, g, traits);
                album.set_mask(pos + i, slot_mask);
            }
            Some(pos + sequence.len())
        }
        SubstSubtable::Ligature(s) => {
            let glyph = album.slot(pos).glyph_id;
            let set = s.ligature_set_for(glyph)?;
            for ligature in set {
                if let Some(positions) = match_glyph_run(loc, album, pos, &ligature.component_glyph_ids) {
                    let last = *positions.last().unwrap();
                    album.ligate(&positions, ligature.ligature_glyph);
                    return Some(last + 1);
                }
            }
            None
        }
        SubstSubtable::Context(ctx) => {
            apply_sequence_context(ctx, pos, loc, album, lookup_list, mask, gdef, depth, recursion_limit)
        }
        SubstSubtable::ChainContext(ctx) => apply_chained_context(
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

/// Matches `expected` glyphs one-for-one against successive legitimate
/// slots starting immediately after `start`, returning the positions
/// matched (including `start`) on success.
fn match_glyph_run(loc: &Locator<'_>, album: &Album, start: usize, expected: &[GlyphId16]) -> Option<Vec<usize>> {
    let mut positions = vec![start];
    let mut cursor = start;
    for &g in expected {
        let next = loc.get_after(album, cursor)?;
        if album.slot(next).glyph_id != g {
            return None;
        }
        positions.push(next);
        cursor = next;
    }
    Some(positions)
}

fn classify(class_def: Option<&ClassDef<'_>>, glyph: GlyphId16) -> u16 {
    class_def.map(|cd| cd.get(glyph)).unwrap_or(glyph.to_u16())
}

/// Matches `expected` raw values (glyph ids for format 1, class values for
/// format 2) against successive legitimate slots after `start`, using
/// `classify` to interpret each candidate slot's glyph.
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

/// Applies exactly one subtable of `lookup_index` at (or at the next
/// legitimate slot at-or-after) `position` — used for the nested lookups a
/// contextual match invokes at a specific sequence position, as opposed to
/// [`execute_lookup`]'s full scan over the Album.
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
        log::warn!("gsub lookup {lookup_index}: recursion limit exceeded, skipping");
        return;
    }
    let lookup = match lookup_list.get(lookup_index) {
        Ok(l) => l,
        Err(e) => {
            log::warn!("gsub lookup {lookup_index}: {e}");
            return;
        }
    };
    let mut loc = Locator::new(album, gdef);
    loc.set_lookup_flag(lookup.lookup_flag);
    loc.set_feature_mask(mask);
    loc.jump_to(position);
    if !loc.move_next(album) {
        return;
    }
    let pos = loc.current().unwrap();
    for sub_idx in 0..lookup.subtable_count() {
        let Ok(sub_data) = lookup.subtable_data(sub_idx) else { continue };
        let Ok(subtable) = SubstSubtable::read(lookup.lookup_type, sub_data) else { continue };
        if apply_subtable(&subtable, pos, &loc, album, lookup_list, mask, gdef, depth, recursion_limit).is_some() {
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
