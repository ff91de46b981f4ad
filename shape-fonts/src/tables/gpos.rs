//! GPOS subtable formats: single, pair, cursive, and the three mark
//! attachment kinds. Contextual/chaining-contextual subtables are shared
//! with GSUB and live in [`crate::tables::context`].

use crate::data::{FontData, FontRead, ReadError};
use crate::glyph::GlyphId16;
use crate::tables::context::{ChainedSequenceContext, SequenceContext};
use crate::tables::layout::{Anchor, ClassDef, CoverageTable, ValueFormat, ValueRecord};

#[derive(Debug, Clone)]
pub struct SinglePos<'a> {
    pub coverage: CoverageTable<'a>,
    format: u16,
    value_format: ValueFormat,
    single_value: ValueRecord,
    values: Vec<ValueRecord>,
}

impl<'a> SinglePos<'a> {
    pub fn value_for(&self, glyph: GlyphId16) -> Option<ValueRecord> {
        let idx = self.coverage.get(glyph)?;
        match self.format {
            1 => Some(self.single_value),
            2 => self.values.get(idx as usize).copied(),
            _ => None,
        }
    }
}

impl<'a> FontRead<'a> for SinglePos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let coverage_offset: u16 = data.read_at(2)?;
        let coverage =
            CoverageTable::read(data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?)?;
        let value_format = ValueFormat::from_bits_truncate(data.read_at(4)?);
        match format {
            1 => {
                let (value, _) = ValueRecord::read(data, 6, value_format)?;
                Ok(SinglePos {
                    coverage,
                    format,
                    value_format,
                    single_value: value,
                    values: Vec::new(),
                })
            }
            2 => {
                let count: u16 = data.read_at(6)?;
                let mut values = Vec::with_capacity(count as usize);
                let mut pos = 8;
                let record_size = value_format_size(value_format);
                for _ in 0..count {
                    let (value, _) = ValueRecord::read(data, pos, value_format)?;
                    values.push(value);
                    pos += record_size;
                }
                Ok(SinglePos {
                    coverage,
                    format,
                    value_format,
                    single_value: ValueRecord::default(),
                    values,
                })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

fn value_format_size(format: ValueFormat) -> usize {
    [
        ValueFormat::X_PLACEMENT,
        ValueFormat::Y_PLACEMENT,
        ValueFormat::X_ADVANCE,
        ValueFormat::Y_ADVANCE,
        ValueFormat::X_PLACEMENT_DEVICE,
        ValueFormat::Y_PLACEMENT_DEVICE,
        ValueFormat::X_ADVANCE_DEVICE,
        ValueFormat::Y_ADVANCE_DEVICE,
    ]
    .into_iter()
    .filter(|f| format.contains(*f))
    .count()
        * 2
}

#[derive(Debug, Clone)]
pub struct PairSet {
    pub second_glyph: GlyphId16,
    pub value1: ValueRecord,
    pub value2: ValueRecord,
}

#[derive(Debug, Clone)]
pub enum PairPos<'a> {
    Format1 {
        coverage: CoverageTable<'a>,
        pair_sets: Vec<Vec<PairSet>>,
    },
    Format2 {
        coverage: CoverageTable<'a>,
        class_def1: ClassDef<'a>,
        class_def2: ClassDef<'a>,
        class1_count: u16,
        class2_count: u16,
        class_records: Vec<(ValueRecord, ValueRecord)>,
    },
}

impl<'a> PairPos<'a> {
    /// Looks up the pair values for `(first, second)`, if a rule covers
    /// that pair.
    pub fn pair_values(&self, first: GlyphId16, second: GlyphId16) -> Option<(ValueRecord, ValueRecord)> {
        match self {
            PairPos::Format1 { coverage, pair_sets } => {
                let idx = coverage.get(first)?;
                let set = pair_sets.get(idx as usize)?;
                set.iter()
                    .find(|p| p.second_glyph == second)
                    .map(|p| (p.value1, p.value2))
            }
            PairPos::Format2 {
                coverage,
                class_def1,
                class_def2,
                class1_count,
                class2_count,
                class_records,
            } => {
                coverage.get(first)?;
                let c1 = class_def1.get(first);
                let c2 = class_def2.get(second);
                if c1 >= *class1_count || c2 >= *class2_count {
                    return None;
                }
                let idx = c1 as usize * *class2_count as usize + c2 as usize;
                class_records.get(idx).copied()
            }
        }
    }
}

impl<'a> FontRead<'a> for PairPos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let coverage_offset: u16 = data.read_at(2)?;
        let coverage =
            CoverageTable::read(data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?)?;
        let value_format1 = ValueFormat::from_bits_truncate(data.read_at(4)?);
        let value_format2 = ValueFormat::from_bits_truncate(data.read_at(6)?);
        match format {
            1 => {
                let count: u16 = data.read_at(8)?;
                let set_offsets = data.read_array::<u16>(10, count as usize)?;
                let pair_sets = set_offsets
                    .into_iter()
                    .map(|o| read_pair_set(data, o, value_format1, value_format2))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(PairPos::Format1 { coverage, pair_sets })
            }
            2 => {
                let class_def1_offset: u16 = data.read_at(8)?;
                let class_def2_offset: u16 = data.read_at(10)?;
                let class_def1 = ClassDef::read(
                    data.split_off(class_def1_offset as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let class_def2 = ClassDef::read(
                    data.split_off(class_def2_offset as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let class1_count: u16 = data.read_at(12)?;
                let class2_count: u16 = data.read_at(14)?;
                let rec1_size = value_format_size(value_format1);
                let rec2_size = value_format_size(value_format2);
                let mut class_records = Vec::with_capacity(class1_count as usize * class2_count as usize);
                let mut pos = 16;
                for _ in 0..(class1_count as usize * class2_count as usize) {
                    let (v1, _) = ValueRecord::read(data, pos, value_format1)?;
                    pos += rec1_size;
                    let (v2, _) = ValueRecord::read(data, pos, value_format2)?;
                    pos += rec2_size;
                    class_records.push((v1, v2));
                }
                Ok(PairPos::Format2 {
                    coverage,
                    class_def1,
                    class_def2,
                    class1_count,
                    class2_count,
                    class_records,
                })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

fn read_pair_set(
    data: FontData<'_>,
    offset: u16,
    value_format1: ValueFormat,
    value_format2: ValueFormat,
) -> Result<Vec<PairSet>, ReadError> {
    let set_data = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
    let count: u16 = set_data.read_at(0)?;
    let rec1_size = value_format_size(value_format1);
    let rec2_size = value_format_size(value_format2);
    let mut pairs = Vec::with_capacity(count as usize);
    let mut pos = 2;
    for _ in 0..count {
        let second_glyph: GlyphId16 = set_data.read_at(pos)?;
        pos += 2;
        let (value1, _) = ValueRecord::read(set_data, pos, value_format1)?;
        pos += rec1_size;
        let (value2, _) = ValueRecord::read(set_data, pos, value_format2)?;
        pos += rec2_size;
        pairs.push(PairSet {
            second_glyph,
            value1,
            value2,
        });
    }
    Ok(pairs)
}

#[derive(Debug, Clone)]
pub struct CursivePos<'a> {
    pub coverage: CoverageTable<'a>,
    entries: Vec<(Option<Anchor>, Option<Anchor>)>,
}

impl<'a> CursivePos<'a> {
    pub fn entry_exit(&self, glyph: GlyphId16) -> Option<(Option<Anchor>, Option<Anchor>)> {
        let idx = self.coverage.get(glyph)?;
        self.entries.get(idx as usize).copied()
    }
}

impl<'a> FontRead<'a> for CursivePos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset: u16 = data.read_at(2)?;
        let coverage =
            CoverageTable::read(data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?)?;
        let count: u16 = data.read_at(4)?;
        let mut entries = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let base = 6 + i * 4;
            let entry_offset: u16 = data.read_at(base)?;
            let exit_offset: u16 = data.read_at(base + 2)?;
            let entry = read_optional_anchor(data, entry_offset)?;
            let exit = read_optional_anchor(data, exit_offset)?;
            entries.push((entry, exit));
        }
        Ok(CursivePos { coverage, entries })
    }
}

fn read_optional_anchor(base: FontData<'_>, offset: u16) -> Result<Option<Anchor>, ReadError> {
    if offset == 0 {
        return Ok(None);
    }
    Anchor::read(base.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?).map(Some)
}

#[derive(Debug, Clone, Copy)]
pub struct MarkRecord {
    pub mark_class: u16,
    pub mark_anchor: Anchor,
}

/// Shared shape for MarkToBase / MarkToLigature / MarkToMark: a mark
/// coverage + per-mark (class, anchor) records, and a base-side coverage
/// with one anchor array per class (MarkToLigature additionally indexes by
/// component within the ligature).
#[derive(Debug, Clone)]
pub struct MarkBasePos<'a> {
    pub mark_coverage: CoverageTable<'a>,
    pub base_coverage: CoverageTable<'a>,
    mark_records: Vec<MarkRecord>,
    // indexed [base_index][mark_class]
    base_anchors: Vec<Vec<Option<Anchor>>>,
}

impl<'a> MarkBasePos<'a> {
    pub fn mark_record(&self, mark_glyph: GlyphId16) -> Option<MarkRecord> {
        let idx = self.mark_coverage.get(mark_glyph)?;
        self.mark_records.get(idx as usize).copied()
    }

    pub fn base_anchor(&self, base_glyph: GlyphId16, mark_class: u16) -> Option<Anchor> {
        let idx = self.base_coverage.get(base_glyph)?;
        self.base_anchors.get(idx as usize)?.get(mark_class as usize).copied().flatten()
    }
}

impl<'a> FontRead<'a> for MarkBasePos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let mark_coverage_offset: u16 = data.read_at(2)?;
        let base_coverage_offset: u16 = data.read_at(4)?;
        let mark_class_count: u16 = data.read_at(6)?;
        let mark_array_offset: u16 = data.read_at(8)?;
        let base_array_offset: u16 = data.read_at(10)?;

        let mark_coverage = CoverageTable::read(
            data.split_off(mark_coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
        )?;
        let base_coverage = CoverageTable::read(
            data.split_off(base_coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
        )?;
        let mark_records = read_mark_array(data, mark_array_offset)?;
        let base_anchors = read_anchor_matrix(data, base_array_offset, mark_class_count)?;

        Ok(MarkBasePos {
            mark_coverage,
            base_coverage,
            mark_records,
            base_anchors,
        })
    }
}

fn read_mark_array(data: FontData<'_>, offset: u16) -> Result<Vec<MarkRecord>, ReadError> {
    let array_data = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
    let count: u16 = array_data.read_at(0)?;
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let base = 2 + i * 4;
        let mark_class: u16 = array_data.read_at(base)?;
        let anchor_offset: u16 = array_data.read_at(base + 2)?;
        let anchor = Anchor::read(
            array_data.split_off(anchor_offset as usize).ok_or(ReadError::OutOfBounds)?,
        )?;
        out.push(MarkRecord { mark_class, mark_anchor: anchor });
    }
    Ok(out)
}

/// Reads a `BaseArray`-shaped table: count, then `count` rows of
/// `class_count` anchor offsets each.
fn read_anchor_matrix(
    data: FontData<'_>,
    offset: u16,
    class_count: u16,
) -> Result<Vec<Vec<Option<Anchor>>>, ReadError> {
    let array_data = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
    let count: u16 = array_data.read_at(0)?;
    let mut rows = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let mut row = Vec::with_capacity(class_count as usize);
        for c in 0..class_count as usize {
            let pos = 2 + (i * class_count as usize + c) * 2;
            let anchor_offset: u16 = array_data.read_at(pos)?;
            row.push(read_optional_anchor(array_data, anchor_offset)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// `MarkToLigature`: like `MarkBasePos`, but the base side is a ligature
/// glyph with one anchor row per covered component.
#[derive(Debug, Clone)]
pub struct MarkLigPos<'a> {
    pub mark_coverage: CoverageTable<'a>,
    pub ligature_coverage: CoverageTable<'a>,
    mark_records: Vec<MarkRecord>,
    // indexed [ligature_index][component_index][mark_class]
    ligature_anchors: Vec<Vec<Vec<Option<Anchor>>>>,
}

impl<'a> MarkLigPos<'a> {
    pub fn mark_record(&self, mark_glyph: GlyphId16) -> Option<MarkRecord> {
        let idx = self.mark_coverage.get(mark_glyph)?;
        self.mark_records.get(idx as usize).copied()
    }

    pub fn ligature_anchor(
        &self,
        ligature_glyph: GlyphId16,
        component_index: usize,
        mark_class: u16,
    ) -> Option<Anchor> {
        let idx = self.ligature_coverage.get(ligature_glyph)?;
        self.ligature_anchors
            .get(idx as usize)?
            .get(component_index)?
            .get(mark_class as usize)
            .copied()
            .flatten()
    }
}

impl<'a> FontRead<'a> for MarkLigPos<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let mark_coverage_offset: u16 = data.read_at(2)?;
        let ligature_coverage_offset: u16 = data.read_at(4)?;
        let mark_class_count: u16 = data.read_at(6)?;
        let mark_array_offset: u16 = data.read_at(8)?;
        let ligature_array_offset: u16 = data.read_at(10)?;

        let mark_coverage = CoverageTable::read(
            data.split_off(mark_coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
        )?;
        let ligature_coverage = CoverageTable::read(
            data.split_off(ligature_coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
        )?;
        let mark_records = read_mark_array(data, mark_array_offset)?;

        let lig_array_data = data
            .split_off(ligature_array_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        let lig_count: u16 = lig_array_data.read_at(0)?;
        let lig_attach_offsets = lig_array_data.read_array::<u16>(2, lig_count as usize)?;
        let mut ligature_anchors = Vec::with_capacity(lig_count as usize);
        for offset in lig_attach_offsets {
            ligature_anchors.push(read_anchor_matrix(lig_array_data, offset, mark_class_count)?);
        }

        Ok(MarkLigPos {
            mark_coverage,
            ligature_coverage,
            mark_records,
            ligature_anchors,
        })
    }
}

/// `MarkToMark`: structurally identical to `MarkBasePos`, with the base
/// side being a preceding mark in the same mark-attachment class.
pub type MarkMarkPos<'a> = MarkBasePos<'a>;

/// A GPOS subtable, dispatched on `Lookup.lookupType` (extension subtables
/// are redirected to their real type before this enum is constructed).
#[derive(Debug, Clone)]
pub enum PositionSubtable<'a> {
    Single(SinglePos<'a>),
    Pair(PairPos<'a>),
    Cursive(CursivePos<'a>),
    MarkToBase(MarkBasePos<'a>),
    MarkToLigature(MarkLigPos<'a>),
    MarkToMark(MarkMarkPos<'a>),
    Context(SequenceContext<'a>),
    ChainContext(ChainedSequenceContext<'a>),
}

impl<'a> PositionSubtable<'a> {
    pub fn read(lookup_type: u16, data: FontData<'a>) -> Result<Self, ReadError> {
        match lookup_type {
            1 => SinglePos::read(data).map(PositionSubtable::Single),
            2 => PairPos::read(data).map(PositionSubtable::Pair),
            3 => CursivePos::read(data).map(PositionSubtable::Cursive),
            4 => MarkBasePos::read(data).map(PositionSubtable::MarkToBase),
            5 => MarkLigPos::read(data).map(PositionSubtable::MarkToLigature),
            6 => MarkMarkPos::read(data).map(PositionSubtable::MarkToMark),
            7 => SequenceContext::read(data).map(PositionSubtable::Context),
            8 => ChainedSequenceContext::read(data).map(PositionSubtable::ChainContext),
            9 => read_extension(data),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

fn read_extension<'a>(data: FontData<'a>) -> Result<PositionSubtable<'a>, ReadError> {
    let format: u16 = data.read_at(0)?;
    if format != 1 {
        return Err(ReadError::InvalidFormat(format));
    }
    let extension_lookup_type: u16 = data.read_at(2)?;
    let extension_offset: u32 = data.read_at(4)?;
    let ext_data = data
        .split_off(extension_offset as usize)
        .ok_or(ReadError::OutOfBounds)?;
    PositionSubtable::read(extension_lookup_type, ext_data)
}
