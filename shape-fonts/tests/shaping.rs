//! End-to-end coverage for [`shape_fonts::shape`]: each test builds a
//! minimal synthetic font (raw `cmap`/`GSUB`/`GPOS`/`hhea`/`hmtx` byte
//! buffers, wrapped in a [`TableSet`]) and drives the public entry point,
//! rather than poking at any one evaluator in isolation.

use pretty_assertions::assert_eq;

use shape_fonts::data::TableSet;
use shape_fonts::direction::TextDirection;
use shape_fonts::glyph::GlyphId16;
use shape_fonts::tag::script;
use shape_fonts::{shape, ShapeOptions};

/// `Coverage` format 1: an explicit, sorted glyph list.
fn coverage1(glyphs: &[u16]) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend(1u16.to_be_bytes());
    bytes.extend((glyphs.len() as u16).to_be_bytes());
    for &g in glyphs {
        bytes.extend(g.to_be_bytes());
    }
    bytes
}

/// A `cmap` format 4 subtable mapping each `(codepoint, glyph)` pair via its
/// own one-codepoint segment, plus the mandatory `0xFFFF` terminator.
fn build_cmap4(mappings: &[(u32, u16)]) -> Vec<u8> {
    let seg_count = mappings.len() + 1;
    let mut end_codes = vec![];
    let mut start_codes = vec![];
    let mut id_deltas = vec![];
    for &(cp, gid) in mappings {
        let cp16 = cp as u16;
        end_codes.push(cp16);
        start_codes.push(cp16);
        id_deltas.push((gid as i32 - cp16 as i32) as i16);
    }
    end_codes.push(0xFFFF);
    start_codes.push(0xFFFF);
    id_deltas.push(1);

    let mut bytes = vec![];
    bytes.extend(4u16.to_be_bytes()); // format
    bytes.extend(0u16.to_be_bytes()); // length (unused by the reader)
    bytes.extend(0u16.to_be_bytes()); // language
    bytes.extend(((seg_count * 2) as u16).to_be_bytes());
    bytes.extend(0u16.to_be_bytes()); // searchRange
    bytes.extend(0u16.to_be_bytes()); // entrySelector
    bytes.extend(0u16.to_be_bytes()); // rangeShift
    for v in &end_codes {
        bytes.extend(v.to_be_bytes());
    }
    bytes.extend(0u16.to_be_bytes()); // reservedPad
    for v in &start_codes {
        bytes.extend(v.to_be_bytes());
    }
    for v in &id_deltas {
        bytes.extend(v.to_be_bytes());
    }
    for _ in 0..seg_count {
        bytes.extend(0u16.to_be_bytes()); // idRangeOffset
    }
    bytes
}

/// Wraps a single subtable in a minimal `cmap` table with one Windows/BMP
/// encoding record.
fn wrap_cmap(subtable: Vec<u8>) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend(0u16.to_be_bytes()); // version
    bytes.extend(1u16.to_be_bytes()); // numTables
    bytes.extend(3u16.to_be_bytes()); // platformID (Windows)
    bytes.extend(1u16.to_be_bytes()); // encodingID (Unicode BMP)
    bytes.extend(12u32.to_be_bytes()); // offset to subtable
    bytes.extend(subtable);
    bytes
}

/// A `SingleSubst` format 1 subtable: one covered glyph, one constant
/// delta.
fn single_subst(covered: u16, delta: i16) -> Vec<u8> {
    let mut bytes = vec![];
    bytes.extend(1u16.to_be_bytes()); // format
    bytes.extend(6u16.to_be_bytes()); // coverageOffset
    bytes.extend(delta.to_be_bytes());
    bytes.extend(coverage1(&[covered]));
    bytes
}

/// Builds a full `GSUB`/`GPOS`-shaped `LayoutHeader` table for a single
/// script with one default `LangSys` enabling every given feature, each
/// feature pointing at the lookup indices named in `features`. `lookups` is
/// the full `LookupList`, in order — a lookup need not be referenced by any
/// `features` entry directly if it's only reached via a nested
/// `SequenceLookupRecord`.
fn build_layout_table(script_tag: &[u8; 4], features: &[(&[u8; 4], &[u16])], lookups: &[(u16, u16, Vec<u8>)]) -> Vec<u8> {
    let feature_count = features.len();
    let lookup_count = lookups.len();

    let lookup_tables: Vec<Vec<u8>> = lookups
        .iter()
        .map(|(lookup_type, lookup_flag, subtable)| {
            let mut bytes = vec![];
            bytes.extend(lookup_type.to_be_bytes());
            bytes.extend(lookup_flag.to_be_bytes());
            bytes.extend(1u16.to_be_bytes()); // subtableCount
            bytes.extend(8u16.to_be_bytes()); // subtableOffsets[0], relative to this Lookup
            bytes.extend_from_slice(subtable);
            bytes
        })
        .collect();
    let lookup_list_header_len = 2 + 2 * lookup_count;
    let mut offset = lookup_list_header_len;
    let mut lookup_offsets = vec![];
    for t in &lookup_tables {
        lookup_offsets.push(offset as u16);
        offset += t.len();
    }
    let mut lookup_list = vec![];
    lookup_list.extend((lookup_count as u16).to_be_bytes());
    for &o in &lookup_offsets {
        lookup_list.extend(o.to_be_bytes());
    }
    for t in &lookup_tables {
        lookup_list.extend_from_slice(t);
    }

    let feature_tables: Vec<Vec<u8>> = features
        .iter()
        .map(|(_, indices)| {
            let mut bytes = vec![];
            bytes.extend(0u16.to_be_bytes()); // featureParamsOffset
            bytes.extend((indices.len() as u16).to_be_bytes());
            for &i in *indices {
                bytes.extend(i.to_be_bytes());
            }
            bytes
        })
        .collect();
    let feature_list_header_len = 2 + 6 * feature_count;
    let mut offset = feature_list_header_len;
    let mut feature_offsets = vec![];
    for t in &feature_tables {
        feature_offsets.push(offset as u16);
        offset += t.len();
    }
    let mut feature_list = vec![];
    feature_list.extend((feature_count as u16).to_be_bytes());
    for (i, (tag, _)) in features.iter().enumerate() {
        feature_list.extend_from_slice(*tag);
        feature_list.extend(feature_offsets[i].to_be_bytes());
    }
    for t in &feature_tables {
        feature_list.extend_from_slice(t);
    }

    // ScriptList: one Script, one default LangSys enabling every feature
    // (by feature-list index) in order.
    let script_offset = 8u16; // ScriptList header (count + one record) is 8 bytes
    let mut script_list = vec![];
    script_list.extend(1u16.to_be_bytes()); // scriptCount
    script_list.extend_from_slice(script_tag);
    script_list.extend(script_offset.to_be_bytes());
    script_list.extend(4u16.to_be_bytes()); // defaultLangSysOffset, relative to Script start
    script_list.extend(0u16.to_be_bytes()); // langSysCount
    script_list.extend(0u16.to_be_bytes()); // lookupOrder (reserved)
    script_list.extend(0xFFFFu16.to_be_bytes()); // requiredFeatureIndex (none)
    script_list.extend((feature_count as u16).to_be_bytes());
    for i in 0..feature_count {
        script_list.extend((i as u16).to_be_bytes());
    }

    let header_len = 10u16;
    let script_list_offset = header_len;
    let feature_list_offset = script_list_offset + script_list.len() as u16;
    let lookup_list_offset = feature_list_offset + feature_list.len() as u16;

    let mut bytes = vec![];
    bytes.extend(1u16.to_be_bytes()); // majorVersion
    bytes.extend(0u16.to_be_bytes()); // minorVersion
    bytes.extend(script_list_offset.to_be_bytes());
    bytes.extend(feature_list_offset.to_be_bytes());
    bytes.extend(lookup_list_offset.to_be_bytes());
    bytes.extend_from_slice(&script_list);
    bytes.extend_from_slice(&feature_list);
    bytes.extend_from_slice(&lookup_list);
    bytes
}

fn build_hhea(num_h_metrics: u16) -> Vec<u8> {
    let mut bytes = vec![0u8; 36];
    bytes[34..36].copy_from_slice(&num_h_metrics.to_be_bytes());
    bytes
}

fn build_hmtx(advances: &[u16]) -> Vec<u8> {
    let mut bytes = vec![];
    for &a in advances {
        bytes.extend(a.to_be_bytes());
        bytes.extend(0u16.to_be_bytes()); // lsb, unused
    }
    bytes
}

#[test]
fn latin_fi_ligature_merges_two_codepoints_into_one_glyph() {
    let cmap = wrap_cmap(build_cmap4(&[(0x66, 5), (0x69, 6)]));

    // LigatureSubst: covers glyph 5 ("f"), ligates with a trailing glyph 6
    // ("i") into glyph 7 ("fi").
    let mut ligature_subst = vec![];
    ligature_subst.extend(1u16.to_be_bytes()); // format
    ligature_subst.extend(8u16.to_be_bytes()); // coverageOffset
    ligature_subst.extend(1u16.to_be_bytes()); // ligatureSetCount
    ligature_subst.extend(14u16.to_be_bytes()); // ligatureSetOffsets[0]
    ligature_subst.extend(coverage1(&[5])); // @8
    ligature_subst.extend(1u16.to_be_bytes()); // ligatureCount
    ligature_subst.extend(4u16.to_be_bytes()); // ligatureOffsets[0], relative to @14
    ligature_subst.extend(7u16.to_be_bytes()); // ligatureGlyph
    ligature_subst.extend(2u16.to_be_bytes()); // componentCount
    ligature_subst.extend(6u16.to_be_bytes()); // components[0]

    let gsub = build_layout_table(b"latn", &[(b"liga", &[0])], &[(4, 0, ligature_subst)]);

    let tables: &[([u8; 4], &[u8])] = &[(*b"cmap", &cmap), (*b"GSUB", &gsub)];
    let fonts = TableSet::new(tables);
    let result = shape(&fonts, &[0x66, 0x69], ShapeOptions::default()).unwrap();

    assert_eq!(result.glyph_ids, vec![GlyphId16::new(7)]);
    assert_eq!(result.positions, vec![(0, 0, 0, 0)]);
    assert_eq!(result.glyph_to_codepoint, vec![0]);
    // The second codepoint was absorbed into the ligature; it has no glyph
    // of its own left to point at.
    assert_eq!(result.codepoint_to_glyph, vec![0, usize::MAX]);
}

#[test]
fn av_kerning_pair_shortens_the_first_glyphs_advance_only() {
    let cmap = wrap_cmap(build_cmap4(&[(0x41, 1), (0x56, 2)]));

    // PairPos format 1: glyph 1 ("A") kerned -80 before glyph 2 ("V").
    let mut pair_pos = vec![];
    pair_pos.extend(1u16.to_be_bytes()); // format
    pair_pos.extend(12u16.to_be_bytes()); // coverageOffset
    pair_pos.extend(0x0004u16.to_be_bytes()); // valueFormat1: X_ADVANCE
    pair_pos.extend(0u16.to_be_bytes()); // valueFormat2: none
    pair_pos.extend(1u16.to_be_bytes()); // pairSetCount
    pair_pos.extend(18u16.to_be_bytes()); // pairSetOffsets[0]
    pair_pos.extend(coverage1(&[1])); // @12
    pair_pos.extend(1u16.to_be_bytes()); // pairValueCount @18
    pair_pos.extend(2u16.to_be_bytes()); // secondGlyph
    pair_pos.extend((-80i16).to_be_bytes()); // value1.xAdvance

    let gpos = build_layout_table(b"latn", &[(b"kern", &[0])], &[(2, 0, pair_pos)]);
    let hhea = build_hhea(3);
    let hmtx = build_hmtx(&[0, 500, 450]);

    let tables: &[([u8; 4], &[u8])] = &[(*b"cmap", &cmap), (*b"GPOS", &gpos), (*b"hhea", &hhea), (*b"hmtx", &hmtx)];
    let fonts = TableSet::new(tables);
    let result = shape(&fonts, &[0x41, 0x56], ShapeOptions::default()).unwrap();

    assert_eq!(result.glyph_ids, vec![GlyphId16::new(1), GlyphId16::new(2)]);
    assert_eq!(result.positions, vec![(0, 0, 420, 0), (0, 0, 450, 0)]);
    assert_eq!(result.glyph_to_codepoint, vec![0, 1]);
    assert_eq!(result.codepoint_to_glyph, vec![0, 1]);
}

#[test]
fn arabic_beh_alef_take_their_joined_forms_and_land_in_visual_rtl_order() {
    let cmap = wrap_cmap(build_cmap4(&[(0x628, 10), (0x627, 11)]));

    // beh (glyph 10) -> beh-initial (glyph 20); alef (glyph 11) -> alef-final (glyph 21).
    let init_lookup = single_subst(10, 10);
    let fina_lookup = single_subst(11, 10);
    let gsub = build_layout_table(b"arab", &[(b"init", &[0]), (b"fina", &[1])], &[(1, 0, init_lookup), (1, 0, fina_lookup)]);

    let tables: &[([u8; 4], &[u8])] = &[(*b"cmap", &cmap), (*b"GSUB", &gsub)];
    let fonts = TableSet::new(tables);
    let options = ShapeOptions::default().with_script(script::ARABIC).with_text_direction(TextDirection::RightToLeft);
    let result = shape(&fonts, &[0x628, 0x627], options).unwrap();

    // The joining engine assigns beh=Initial, alef=Final before GSUB runs;
    // the RTL reversal at wrap-up then puts the alef glyph first in memory.
    assert_eq!(result.glyph_ids, vec![GlyphId16::new(21), GlyphId16::new(20)]);
    assert_eq!(result.glyph_to_codepoint, vec![1, 0]);
    assert_eq!(result.codepoint_to_glyph, vec![1, 0]);
}

#[test]
fn combining_mark_is_positioned_relative_to_the_preceding_base_anchor() {
    let cmap = wrap_cmap(build_cmap4(&[(0x41, 1), (0x301, 2)]));

    // MarkToBase: mark (glyph 2) anchor (1, 2); base (glyph 1) anchor (10, 20).
    let mut mark_base = vec![];
    mark_base.extend(1u16.to_be_bytes()); // format
    mark_base.extend(12u16.to_be_bytes()); // markCoverageOffset
    mark_base.extend(18u16.to_be_bytes()); // baseCoverageOffset
    mark_base.extend(1u16.to_be_bytes()); // markClassCount
    mark_base.extend(24u16.to_be_bytes()); // markArrayOffset
    mark_base.extend(36u16.to_be_bytes()); // baseArrayOffset
    mark_base.extend(coverage1(&[2])); // markCoverage @12
    mark_base.extend(coverage1(&[1])); // baseCoverage @18
    mark_base.extend(1u16.to_be_bytes()); // markCount @24
    mark_base.extend(0u16.to_be_bytes()); // markClass
    mark_base.extend(6u16.to_be_bytes()); // markAnchorOffset, relative to @24
    mark_base.extend(1u16.to_be_bytes()); // anchor format
    mark_base.extend(1i16.to_be_bytes()); // mark anchor x
    mark_base.extend(2i16.to_be_bytes()); // mark anchor y
    mark_base.extend(1u16.to_be_bytes()); // baseCount @36
    mark_base.extend(4u16.to_be_bytes()); // baseAnchorOffsets[0][0], relative to @36
    mark_base.extend(1u16.to_be_bytes()); // anchor format
    mark_base.extend(10i16.to_be_bytes()); // base anchor x
    mark_base.extend(20i16.to_be_bytes()); // base anchor y

    let gpos = build_layout_table(b"latn", &[(b"mark", &[0])], &[(4, 0, mark_base)]);

    let tables: &[([u8; 4], &[u8])] = &[(*b"cmap", &cmap), (*b"GPOS", &gpos)];
    let fonts = TableSet::new(tables);
    let result = shape(&fonts, &[0x41, 0x301], ShapeOptions::default()).unwrap();

    assert_eq!(result.glyph_ids, vec![GlyphId16::new(1), GlyphId16::new(2)]);
    assert_eq!(result.positions[0], (0, 0, 0, 0));
    // offset == baseAnchor - markAnchor == (10-1, 20-2)
    assert_eq!(result.positions[1], (9, 18, 0, 0));
    assert_eq!(result.glyph_to_codepoint, vec![0, 1]);
    assert_eq!(result.codepoint_to_glyph, vec![0, 1]);
}

#[test]
fn chaining_context_only_rewrites_the_glyph_immediately_after_the_trigger() {
    let cmap = wrap_cmap(build_cmap4(&[(0x2000, 30), (0x2001, 31), (0x2002, 31)]));

    // "after glyph 30, replace glyph 31 with glyph 32" — applied via a
    // ChainContext lookup (0) that nests a SingleSubst lookup (1).
    let mut chain_context = vec![];
    chain_context.extend(3u16.to_be_bytes()); // format
    chain_context.extend(1u16.to_be_bytes()); // backtrackGlyphCount
    chain_context.extend(18u16.to_be_bytes()); // backtrackCoverageOffsets[0]
    chain_context.extend(1u16.to_be_bytes()); // inputGlyphCount
    chain_context.extend(24u16.to_be_bytes()); // inputCoverageOffsets[0]
    chain_context.extend(0u16.to_be_bytes()); // lookaheadGlyphCount
    chain_context.extend(1u16.to_be_bytes()); // seqLookupCount
    chain_context.extend(0u16.to_be_bytes()); // sequenceIndex
    chain_context.extend(1u16.to_be_bytes()); // lookupListIndex (nested)
    chain_context.extend(coverage1(&[30])); // backtrack coverage @18
    chain_context.extend(coverage1(&[31])); // input coverage @24

    let nested_subst = single_subst(31, 1); // 31 -> 32

    let gsub = build_layout_table(b"latn", &[(b"ccmp", &[0])], &[(6, 0, chain_context), (1, 0, nested_subst)]);

    let tables: &[([u8; 4], &[u8])] = &[(*b"cmap", &cmap), (*b"GSUB", &gsub)];
    let fonts = TableSet::new(tables);
    let result = shape(&fonts, &[0x2000, 0x2001, 0x2002], ShapeOptions::default()).unwrap();

    assert_eq!(
        result.glyph_ids,
        vec![GlyphId16::new(30), GlyphId16::new(32), GlyphId16::new(31)]
    );
    assert_eq!(result.glyph_to_codepoint, vec![0, 1, 2]);
    assert_eq!(result.codepoint_to_glyph, vec![0, 1, 2]);
}

#[test]
fn a_script_absent_from_the_fonts_script_list_compiles_to_a_no_op_pattern() {
    let cmap = wrap_cmap(build_cmap4(&[(0x41, 1), (0x42, 2)]));

    // The font only knows how to shape "latn"; a "grek" run should pass
    // through untouched rather than erroring.
    let mut ligature_subst = vec![];
    ligature_subst.extend(1u16.to_be_bytes());
    ligature_subst.extend(8u16.to_be_bytes());
    ligature_subst.extend(1u16.to_be_bytes());
    ligature_subst.extend(14u16.to_be_bytes());
    ligature_subst.extend(coverage1(&[1]));
    ligature_subst.extend(1u16.to_be_bytes());
    ligature_subst.extend(4u16.to_be_bytes());
    ligature_subst.extend(99u16.to_be_bytes());
    ligature_subst.extend(2u16.to_be_bytes());
    ligature_subst.extend(2u16.to_be_bytes());

    let gsub = build_layout_table(b"latn", &[(b"liga", &[0])], &[(4, 0, ligature_subst)]);

    let tables: &[([u8; 4], &[u8])] = &[(*b"cmap", &cmap), (*b"GSUB", &gsub)];
    let fonts = TableSet::new(tables);
    let options = ShapeOptions::default().with_script(script::GREEK);
    let result = shape(&fonts, &[0x41, 0x42], options).unwrap();

    assert_eq!(result.glyph_ids, vec![GlyphId16::new(1), GlyphId16::new(2)]);
    assert_eq!(result.positions, vec![(0, 0, 0, 0), (0, 0, 0, 0)]);
    assert_eq!(result.glyph_to_codepoint, vec![0, 1]);
    assert_eq!(result.codepoint_to_glyph, vec![0, 1]);
}
