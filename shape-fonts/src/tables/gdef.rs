//! The `GDEF` table: glyph class definitions, mark-attachment classes, and
//! mark filtering sets consulted by the Locator's ignore-mask computation
//! and by the TextProcessor's glyph-discovery pass.

use crate::data::{FontData, FontRead, ReadError};
use crate::tables::layout::{ClassDef, CoverageTable};

#[derive(Debug, Clone, Default)]
pub struct Gdef<'a> {
    pub glyph_class_def: Option<ClassDef<'a>>,
    pub mark_attach_class_def: Option<ClassDef<'a>>,
    pub mark_glyph_sets_def: Option<MarkGlyphSets<'a>>,
}

/// Glyph classes as defined by GDEF's `GlyphClassDef` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphClass {
    Unclassified,
    Base,
    Ligature,
    Mark,
    Component,
}

impl GlyphClass {
    pub fn from_raw(value: u16) -> Self {
        match value {
            1 => GlyphClass::Base,
            2 => GlyphClass::Ligature,
            3 => GlyphClass::Mark,
            4 => GlyphClass::Component,
            _ => GlyphClass::Unclassified,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkGlyphSets<'a> {
    sets: Vec<CoverageTable<'a>>,
}

impl<'a> MarkGlyphSets<'a> {
    pub fn covers(&self, set_index: u16, glyph: crate::glyph::GlyphId16) -> bool {
        self.sets
            .get(set_index as usize)
            .map(|c| c.contains(glyph))
            .unwrap_or(false)
    }
}

impl<'a> FontRead<'a> for MarkGlyphSets<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 1 {
            return Err(ReadError::InvalidFormat(format));
        }
        let count: u16 = data.read_at(2)?;
        let offsets = data.read_array::<u32>(4, count as usize)?;
        let mut sets = Vec::with_capacity(count as usize);
        for offset in offsets {
            let table_data = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
            sets.push(CoverageTable::read(table_data)?);
        }
        Ok(MarkGlyphSets { sets })
    }
}

impl<'a> FontRead<'a> for Gdef<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let major: u16 = data.read_at(0)?;
        let minor: u16 = data.read_at(2)?;
        if major != 1 {
            return Err(ReadError::InvalidFormat(major));
        }
        let glyph_class_def_offset: u16 = data.read_at(4)?;
        let mark_attach_class_def_offset: u16 = data.read_at(8)?;

        let glyph_class_def = read_optional_offset16(data, glyph_class_def_offset)?;
        let mark_attach_class_def = read_optional_offset16(data, mark_attach_class_def_offset)?;

        let mark_glyph_sets_def = if minor >= 2 {
            let offset: u16 = data.read_at(12)?;
            read_optional_offset16(data, offset)?
        } else {
            None
        };

        Ok(Gdef {
            glyph_class_def,
            mark_attach_class_def,
            mark_glyph_sets_def,
        })
    }
}

fn read_optional_offset16<'a, T: FontRead<'a>>(
    base: FontData<'a>,
    offset: u16,
) -> Result<Option<T>, ReadError> {
    if offset == 0 {
        return Ok(None);
    }
    let data = base.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
    T::read(data).map(Some)
}
