//! `SequenceContext` and `ChainedSequenceContext`: the three rule formats
//! shared by GSUB lookup type 5/6 and GPOS lookup type 7/8.

use crate::data::{FontData, FontRead, ReadError};
use crate::glyph::GlyphId16;
use crate::tables::layout::{ClassDef, CoverageTable, SequenceLookupRecord};

#[derive(Debug, Clone)]
pub enum SequenceContext<'a> {
    Format1 {
        coverage: CoverageTable<'a>,
        rule_sets: Vec<Vec<SequenceRule>>,
    },
    Format2 {
        coverage: CoverageTable<'a>,
        class_def: ClassDef<'a>,
        class_rule_sets: Vec<Vec<SequenceRule>>,
    },
    Format3 {
        input_coverages: Vec<CoverageTable<'a>>,
        lookup_records: Vec<SequenceLookupRecord>,
    },
}

#[derive(Debug, Clone)]
pub struct SequenceRule {
    /// Glyphs after the first (which is already known from Coverage/class).
    pub input: Vec<GlyphId16>,
    pub lookup_records: Vec<SequenceLookupRecord>,
}

fn read_sequence_rule(data: FontData<'_>) -> Result<SequenceRule, ReadError> {
    let glyph_count: u16 = data.read_at(0)?;
    let seq_lookup_count: u16 = data.read_at(2)?;
    let input_len = glyph_count.saturating_sub(1) as usize;
    let input = data.read_array::<GlyphId16>(4, input_len)?;
    let records = SequenceLookupRecord::read_array(data, 4 + input_len * 2, seq_lookup_count as usize)?;
    Ok(SequenceRule {
        input,
        lookup_records: records,
    })
}

fn read_rule_set(data: FontData<'_>, offset: u16) -> Result<Vec<SequenceRule>, ReadError> {
    if offset == 0 {
        return Ok(Vec::new());
    }
    let set_data = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
    let count: u16 = set_data.read_at(0)?;
    let rule_offsets = set_data.read_array::<u16>(2, count as usize)?;
    let mut rules = Vec::with_capacity(count as usize);
    for rule_offset in rule_offsets {
        let rule_data = set_data.split_off(rule_offset as usize).ok_or(ReadError::OutOfBounds)?;
        rules.push(read_sequence_rule(rule_data)?);
    }
    Ok(rules)
}

impl<'a> FontRead<'a> for SequenceContext<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => {
                let coverage_offset: u16 = data.read_at(2)?;
                let coverage = CoverageTable::read(
                    data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let count: u16 = data.read_at(4)?;
                let set_offsets = data.read_array::<u16>(6, count as usize)?;
                let rule_sets = set_offsets
                    .into_iter()
                    .map(|o| read_rule_set(data, o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SequenceContext::Format1 { coverage, rule_sets })
            }
            2 => {
                let coverage_offset: u16 = data.read_at(2)?;
                let coverage = CoverageTable::read(
                    data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let class_def_offset: u16 = data.read_at(4)?;
                let class_def = ClassDef::read(
                    data.split_off(class_def_offset as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let count: u16 = data.read_at(6)?;
                let set_offsets = data.read_array::<u16>(8, count as usize)?;
                let class_rule_sets = set_offsets
                    .into_iter()
                    .map(|o| read_rule_set(data, o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SequenceContext::Format2 {
                    coverage,
                    class_def,
                    class_rule_sets,
                })
            }
            3 => {
                let glyph_count: u16 = data.read_at(2)?;
                let seq_lookup_count: u16 = data.read_at(4)?;
                let coverage_offsets = data.read_array::<u16>(6, glyph_count as usize)?;
                let input_coverages = coverage_offsets
                    .into_iter()
                    .map(|o| CoverageTable::read(data.split_off(o as usize).ok_or(ReadError::OutOfBounds)?))
                    .collect::<Result<Vec<_>, _>>()?;
                let records_pos = 6 + glyph_count as usize * 2;
                let lookup_records =
                    SequenceLookupRecord::read_array(data, records_pos, seq_lookup_count as usize)?;
                Ok(SequenceContext::Format3 {
                    input_coverages,
                    lookup_records,
                })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[cfg(test)]
mod sequence_context_tests {
    use super::*;

    #[test]
    fn format1_walks_coverage_then_rule_set_then_rule() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(8u16.to_be_bytes()); // coverageOffset
        bytes.extend(1u16.to_be_bytes()); // seqRuleSetCount
        bytes.extend(14u16.to_be_bytes()); // seqRuleSetOffsets[0]
        assert_eq!(bytes.len(), 8);

        // Coverage @8
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(5u16.to_be_bytes());
        assert_eq!(bytes.len(), 14);

        // SequenceRuleSet @14
        bytes.extend(1u16.to_be_bytes()); // seqRuleCount
        bytes.extend(4u16.to_be_bytes()); // seqRuleOffsets[0] (relative to 14)
        assert_eq!(bytes.len(), 18);

        // SequenceRule @18
        bytes.extend(2u16.to_be_bytes()); // glyphCount
        bytes.extend(1u16.to_be_bytes()); // seqLookupCount
        bytes.extend(6u16.to_be_bytes()); // inputSequence[0]
        bytes.extend(0u16.to_be_bytes()); // sequenceIndex
        bytes.extend(3u16.to_be_bytes()); // lookupListIndex
        assert_eq!(bytes.len(), 28);

        let context = SequenceContext::read(FontData::new(&bytes)).unwrap();
        let SequenceContext::Format1 { coverage, rule_sets } = context else {
            panic!("expected Format1");
        };
        assert_eq!(coverage.get(GlyphId16::new(5)), Some(0));
        assert_eq!(rule_sets.len(), 1);
        let rule = &rule_sets[0][0];
        assert_eq!(rule.input, vec![GlyphId16::new(6)]);
        assert_eq!(rule.lookup_records.len(), 1);
        assert_eq!(rule.lookup_records[0].sequence_index, 0);
        assert_eq!(rule.lookup_records[0].lookup_list_index, 3);
    }

    #[test]
    fn format3_reads_input_coverages_and_lookup_records_inline() {
        let mut bytes = vec![];
        bytes.extend(3u16.to_be_bytes()); // format
        bytes.extend(1u16.to_be_bytes()); // inputGlyphCount
        bytes.extend(1u16.to_be_bytes()); // seqLookupCount
        bytes.extend(12u16.to_be_bytes()); // inputCoverageOffsets[0]
        bytes.extend(0u16.to_be_bytes()); // sequenceIndex
        bytes.extend(5u16.to_be_bytes()); // lookupListIndex
        assert_eq!(bytes.len(), 12);

        // Coverage @12
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(9u16.to_be_bytes());
        assert_eq!(bytes.len(), 18);

        let context = SequenceContext::read(FontData::new(&bytes)).unwrap();
        let SequenceContext::Format3 {
            input_coverages,
            lookup_records,
        } = context
        else {
            panic!("expected Format3");
        };
        assert_eq!(input_coverages.len(), 1);
        assert_eq!(input_coverages[0].get(GlyphId16::new(9)), Some(0));
        assert_eq!(lookup_records.len(), 1);
        assert_eq!(lookup_records[0].sequence_index, 0);
        assert_eq!(lookup_records[0].lookup_list_index, 5);
    }
}

#[derive(Debug, Clone)]
pub enum ChainedSequenceContext<'a> {
    Format1 {
        coverage: CoverageTable<'a>,
        rule_sets: Vec<Vec<ChainedSequenceRule>>,
    },
    Format2 {
        coverage: CoverageTable<'a>,
        backtrack_class_def: ClassDef<'a>,
        input_class_def: ClassDef<'a>,
        lookahead_class_def: ClassDef<'a>,
        class_rule_sets: Vec<Vec<ChainedSequenceRule>>,
    },
    Format3 {
        backtrack_coverages: Vec<CoverageTable<'a>>,
        input_coverages: Vec<CoverageTable<'a>>,
        lookahead_coverages: Vec<CoverageTable<'a>>,
        lookup_records: Vec<SequenceLookupRecord>,
    },
}

#[derive(Debug, Clone)]
pub struct ChainedSequenceRule {
    pub backtrack: Vec<GlyphId16>,
    pub input: Vec<GlyphId16>,
    pub lookahead: Vec<GlyphId16>,
    pub lookup_records: Vec<SequenceLookupRecord>,
}

fn read_chained_rule(data: FontData<'_>) -> Result<ChainedSequenceRule, ReadError> {
    let backtrack_count: u16 = data.read_at(0)?;
    let backtrack = data.read_array::<GlyphId16>(2, backtrack_count as usize)?;
    let mut pos = 2 + backtrack_count as usize * 2;
    let input_count: u16 = data.read_at(pos)?;
    pos += 2;
    let input = data.read_array::<GlyphId16>(pos, input_count.saturating_sub(1) as usize)?;
    pos += input.len() * 2;
    let lookahead_count: u16 = data.read_at(pos)?;
    pos += 2;
    let lookahead = data.read_array::<GlyphId16>(pos, lookahead_count as usize)?;
    pos += lookahead.len() * 2;
    let seq_lookup_count: u16 = data.read_at(pos)?;
    pos += 2;
    let lookup_records = SequenceLookupRecord::read_array(data, pos, seq_lookup_count as usize)?;
    Ok(ChainedSequenceRule {
        backtrack,
        input,
        lookahead,
        lookup_records,
    })
}

fn read_chained_rule_set(data: FontData<'_>, offset: u16) -> Result<Vec<ChainedSequenceRule>, ReadError> {
    if offset == 0 {
        return Ok(Vec::new());
    }
    let set_data = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
    let count: u16 = set_data.read_at(0)?;
    let rule_offsets = set_data.read_array::<u16>(2, count as usize)?;
    let mut rules = Vec::with_capacity(count as usize);
    for rule_offset in rule_offsets {
        let rule_data = set_data.split_off(rule_offset as usize).ok_or(ReadError::OutOfBounds)?;
        rules.push(read_chained_rule(rule_data)?);
    }
    Ok(rules)
}

impl<'a> FontRead<'a> for ChainedSequenceContext<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => {
                let coverage_offset: u16 = data.read_at(2)?;
                let coverage = CoverageTable::read(
                    data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let count: u16 = data.read_at(4)?;
                let set_offsets = data.read_array::<u16>(6, count as usize)?;
                let rule_sets = set_offsets
                    .into_iter()
                    .map(|o| read_chained_rule_set(data, o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ChainedSequenceContext::Format1 { coverage, rule_sets })
            }
            2 => {
                let coverage_offset: u16 = data.read_at(2)?;
                let coverage = CoverageTable::read(
                    data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let backtrack_cd_off: u16 = data.read_at(4)?;
                let input_cd_off: u16 = data.read_at(6)?;
                let lookahead_cd_off: u16 = data.read_at(8)?;
                let backtrack_class_def = ClassDef::read(
                    data.split_off(backtrack_cd_off as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let input_class_def = ClassDef::read(
                    data.split_off(input_cd_off as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let lookahead_class_def = ClassDef::read(
                    data.split_off(lookahead_cd_off as usize).ok_or(ReadError::OutOfBounds)?,
                )?;
                let count: u16 = data.read_at(10)?;
                let set_offsets = data.read_array::<u16>(12, count as usize)?;
                let class_rule_sets = set_offsets
                    .into_iter()
                    .map(|o| read_chained_rule_set(data, o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ChainedSequenceContext::Format2 {
                    coverage,
                    backtrack_class_def,
                    input_class_def,
                    lookahead_class_def,
                    class_rule_sets,
                })
            }
            3 => {
                let backtrack_count: u16 = data.read_at(2)?;
                let backtrack_offsets = data.read_array::<u16>(4, backtrack_count as usize)?;
                let mut pos = 4 + backtrack_count as usize * 2;
                let input_count: u16 = data.read_at(pos)?;
                pos += 2;
                let input_offsets = data.read_array::<u16>(pos, input_count as usize)?;
                pos += input_count as usize * 2;
                let lookahead_count: u16 = data.read_at(pos)?;
                pos += 2;
                let lookahead_offsets = data.read_array::<u16>(pos, lookahead_count as usize)?;
                pos += lookahead_count as usize * 2;
                let seq_lookup_count: u16 = data.read_at(pos)?;
                pos += 2;
                let lookup_records =
                    SequenceLookupRecord::read_array(data, pos, seq_lookup_count as usize)?;

                let read_coverages = |offsets: Vec<u16>| -> Result<Vec<CoverageTable<'a>>, ReadError> {
                    offsets
                        .into_iter()
                        .map(|o| CoverageTable::read(data.split_off(o as usize).ok_or(ReadError::OutOfBounds)?))
                        .collect()
                };
                Ok(ChainedSequenceContext::Format3 {
                    backtrack_coverages: read_coverages(backtrack_offsets)?,
                    input_coverages: read_coverages(input_offsets)?,
                    lookahead_coverages: read_coverages(lookahead_offsets)?,
                    lookup_records,
                })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}
