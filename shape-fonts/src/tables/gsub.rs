//! GSUB subtable formats: single, multiple, alternate, and ligature
//! substitution. Contextual and chaining-contextual subtables are shared
//! with GPOS and live in [`crate::tables::context`]; extension subtables
//! redirect to one of these before dispatch.

use crate::data::{FontData, FontRead, ReadError};
use crate::glyph::GlyphId16;
use crate::tables::context::{ChainedSequenceContext, SequenceContext};
use crate::tables::layout::CoverageTable;

#[derive(Debug, Clone)]
pub enum SingleSubst<'a> {
    Format1 {
        coverage: CoverageTable<'a>,
        delta_glyph_id: i16,
    },
    Format2 {
        coverage: CoverageTable<'a>,
        substitute_glyph_ids: Vec<GlyphId16>,
    },
}

impl<'a> SingleSubst<'a> {
    pub fn map(&self, glyph: GlyphId16) -> Option<GlyphId16> {
        match self {
            SingleSubst::Format1 { coverage, delta_glyph_id } => coverage
                .get(glyph)
                .map(|_| GlyphId16::new((glyph.to_u16() as i32 + *delta_glyph_id as i32) as u16)),
            SingleSubst::Format2 { coverage, substitute_glyph_ids } => coverage
                .get(glyph)
                .and_then(|idx| substitute_glyph_ids.get(idx as usize))
                .copied(),
        }
    }
}

impl<'a> FontRead<'a> for SingleSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        let coverage_offset: u16 = data.read_at(2)?;
        let coverage =
            CoverageTable::read(data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?)?;
        match format {
            1 => Ok(SingleSubst::Format1 {
                coverage,
                delta_glyph_id: data.read_at(4)?,
            }),
            2 => {
                let count: u16 = data.read_at(4)?;
                let substitute_glyph_ids = data.read_array::<GlyphId16>(6, count as usize)?;
                Ok(SingleSubst::Format2 {
                    coverage,
                    substitute_glyph_ids,
                })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MultipleSubst<'a> {
    pub coverage: CoverageTable<'a>,
    sequences: Vec<Vec<GlyphId16>>,
}

impl<'a> MultipleSubst<'a> {
    pub fn sequence_for(&self, glyph: GlyphId16) -> Option<&[GlyphId16]> {
        self.coverage
            .get(glyph)
            .and_then(|idx| self.sequences.get(idx as usize))
            .map(|v| v.as_slice())
    }
}

impl<'a> FontRead<'a> for MultipleSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset: u16 = data.read_at(2)?;
        let coverage =
            CoverageTable::read(data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?)?;
        let count: u16 = data.read_at(4)?;
        let seq_offsets = data.read_array::<u16>(6, count as usize)?;
        let sequences = seq_offsets
            .into_iter()
            .map(|o| -> Result<Vec<GlyphId16>, ReadError> {
                let seq_data = data.split_off(o as usize).ok_or(ReadError::OutOfBounds)?;
                let glyph_count: u16 = seq_data.read_at(0)?;
                seq_data.read_array::<GlyphId16>(2, glyph_count as usize)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultipleSubst { coverage, sequences })
    }
}

#[derive(Debug, Clone)]
pub struct AlternateSubst<'a> {
    pub coverage: CoverageTable<'a>,
    alternate_sets: Vec<Vec<GlyphId16>>,
}

impl<'a> AlternateSubst<'a> {
    /// Returns the first alternate for `glyph` — this core has no user
    /// selector for a specific alternate.
    pub fn first_alternate(&self, glyph: GlyphId16) -> Option<GlyphId16> {
        self.coverage
            .get(glyph)
            .and_then(|idx| self.alternate_sets.get(idx as usize))
            .and_then(|set| set.first().copied())
    }
}

impl<'a> FontRead<'a> for AlternateSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset: u16 = data.read_at(2)?;
        let coverage =
            CoverageTable::read(data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?)?;
        let count: u16 = data.read_at(4)?;
        let set_offsets = data.read_array::<u16>(6, count as usize)?;
        let alternate_sets = set_offsets
            .into_iter()
            .map(|o| -> Result<Vec<GlyphId16>, ReadError> {
                let set_data = data.split_off(o as usize).ok_or(ReadError::OutOfBounds)?;
                let glyph_count: u16 = set_data.read_at(0)?;
                set_data.read_array::<GlyphId16>(2, glyph_count as usize)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AlternateSubst { coverage, alternate_sets })
    }
}

/// One entry of a `LigatureSet`: the glyph produced, and the glyphs (after
/// the one selected by Coverage) that must follow for the rule to match.
#[derive(Debug, Clone)]
pub struct Ligature {
    pub ligature_glyph: GlyphId16,
    pub component_glyph_ids: Vec<GlyphId16>,
}

#[derive(Debug, Clone)]
pub struct LigatureSubst<'a> {
    pub coverage: CoverageTable<'a>,
    ligature_sets: Vec<Vec<Ligature>>,
}

impl<'a> LigatureSubst<'a> {
    pub fn ligature_set_for(&self, glyph: GlyphId16) -> Option<&[Ligature]> {
        self.coverage
            .get(glyph)
            .and_then(|idx| self.ligature_sets.get(idx as usize))
            .map(|v| v.as_slice())
    }
}

impl<'a> FontRead<'a> for LigatureSubst<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let coverage_offset: u16 = data.read_at(2)?;
        let coverage =
            CoverageTable::read(data.split_off(coverage_offset as usize).ok_or(ReadError::OutOfBounds)?)?;
        let count: u16 = data.read_at(4)?;
        let set_offsets = data.read_array::<u16>(6, count as usize)?;
        let ligature_sets = set_offsets
            .into_iter()
            .map(|o| read_ligature_set(data, o))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(LigatureSubst { coverage, ligature_sets })
    }
}

fn read_ligature_set(data: FontData<'_>, offset: u16) -> Result<Vec<Ligature>, ReadError> {
    let set_data = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
    let count: u16 = set_data.read_at(0)?;
    let lig_offsets = set_data.read_array::<u16>(2, count as usize)?;
    lig_offsets
        .into_iter()
        .map(|o| -> Result<Ligature, ReadError> {
            let lig_data = set_data.split_off(o as usize).ok_or(ReadError::OutOfBounds)?;
            let ligature_glyph: GlyphId16 = lig_data.read_at(0)?;
            let component_count: u16 = lig_data.read_at(2)?;
            let component_glyph_ids =
                lig_data.read_array::<GlyphId16>(4, component_count.saturating_sub(1) as usize)?;
            Ok(Ligature {
                ligature_glyph,
                component_glyph_ids,
            })
        })
        .collect()
}

/// A GSUB subtable, dispatched on `Lookup.lookupType` (extension subtables
/// are redirected to their real type before this enum is constructed).
#[derive(Debug, Clone)]
pub enum SubstSubtable<'a> {
    Single(SingleSubst<'a>),
    Multiple(MultipleSubst<'a>),
    Alternate(AlternateSubst<'a>),
    Ligature(LigatureSubst<'a>),
    Context(SequenceContext<'a>),
    ChainContext(ChainedSequenceContext<'a>),
}

impl<'a> SubstSubtable<'a> {
    pub fn read(lookup_type: u16, data: FontData<'a>) -> Result<Self, ReadError> {
        match lookup_type {
            1 => SingleSubst::read(data).map(SubstSubtable::Single),
            2 => MultipleSubst::read(data).map(SubstSubtable::Multiple),
            3 => AlternateSubst::read(data).map(SubstSubtable::Alternate),
            4 => LigatureSubst::read(data).map(SubstSubtable::Ligature),
            5 => SequenceContext::read(data).map(SubstSubtable::Context),
            6 => ChainedSequenceContext::read(data).map(SubstSubtable::ChainContext),
            7 => read_extension(data),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

/// `ExtensionSubstFormat1`: format(u16)=1, extensionLookupType(u16),
/// extensionOffset(u32), relative to the start of this subtable.
fn read_extension<'a>(data: FontData<'a>) -> Result<SubstSubtable<'a>, ReadError> {
    let format: u16 = data.read_at(0)?;
    if format != 1 {
        return Err(ReadError::InvalidFormat(format));
    }
    let extension_lookup_type: u16 = data.read_at(2)?;
    let extension_offset: u32 = data.read_at(4)?;
    let ext_data = data
        .split_off(extension_offset as usize)
        .ok_or(ReadError::OutOfBounds)?;
    SubstSubtable::read(extension_lookup_type, ext_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_subst_format1_applies_a_constant_delta() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(6u16.to_be_bytes()); // coverageOffset
        bytes.extend((1i16).to_be_bytes()); // deltaGlyphId
        // coverage format 1 with one glyph
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(10u16.to_be_bytes());
        let subst = SingleSubst::read(FontData::new(&bytes)).unwrap();
        assert_eq!(subst.map(GlyphId16::new(10)), Some(GlyphId16::new(11)));
        assert_eq!(subst.map(GlyphId16::new(99)), None);
    }

    #[test]
    fn multiple_subst_expands_one_glyph_into_a_sequence() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(8u16.to_be_bytes()); // coverageOffset
        bytes.extend(1u16.to_be_bytes()); // sequenceCount
        bytes.extend(14u16.to_be_bytes()); // sequence offset
        // coverage @8
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(5u16.to_be_bytes());
        // Sequence @14: glyphCount(2) + substituteGlyphIDs
        bytes.extend(2u16.to_be_bytes());
        bytes.extend(7u16.to_be_bytes());
        bytes.extend(8u16.to_be_bytes());
        let subst = MultipleSubst::read(FontData::new(&bytes)).unwrap();
        assert_eq!(
            subst.sequence_for(GlyphId16::new(5)),
            Some(&[GlyphId16::new(7), GlyphId16::new(8)][..])
        );
    }

    #[test]
    fn ligature_subst_matches_on_covered_first_glyph_and_component_tail() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(8u16.to_be_bytes()); // coverageOffset
        bytes.extend(1u16.to_be_bytes()); // ligatureSetCount
        bytes.extend(14u16.to_be_bytes()); // ligatureSet offset
        // coverage @8: covers glyph 0x66 ("f")
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(0x66u16.to_be_bytes());
        // LigatureSet @14: ligatureCount(1) + offset to Ligature(4, relative to 14)
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(4u16.to_be_bytes());
        // Ligature @18 (14+4): ligatureGlyph + componentCount + components[count-1]
        bytes.extend(0xFFu16.to_be_bytes()); // ligatureGlyph
        bytes.extend(2u16.to_be_bytes()); // componentCount (f + i = 2)
        bytes.extend(0x69u16.to_be_bytes()); // component after the covered glyph ("i")
        let subst = LigatureSubst::read(FontData::new(&bytes)).unwrap();
        let set = subst.ligature_set_for(GlyphId16::new(0x66)).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].ligature_glyph, GlyphId16::new(0xFF));
        assert_eq!(set[0].component_glyph_ids, vec![GlyphId16::new(0x69)]);
    }

    #[test]
    fn extension_subtable_redirects_to_the_real_lookup_type() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes()); // format
        bytes.extend(1u16.to_be_bytes()); // extensionLookupType (single subst)
        bytes.extend(8u32.to_be_bytes()); // extensionOffset
        // SingleSubst format 1 @8
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(6u16.to_be_bytes());
        bytes.extend(1i16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(3u16.to_be_bytes());
        let subtable = SubstSubtable::read(7, FontData::new(&bytes)).unwrap();
        match subtable {
            SubstSubtable::Single(s) => assert_eq!(s.map(GlyphId16::new(3)), Some(GlyphId16::new(4))),
            _ => panic!("expected Single"),
        }
    }
}
