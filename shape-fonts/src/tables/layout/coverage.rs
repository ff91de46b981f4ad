//! `Coverage` table (format 1 and format 2), as used throughout GSUB/GPOS to
//! map a glyph to its index within a lookup's input set.

use crate::data::{FontData, FontRead, ReadError};
use crate::glyph::GlyphId16;

#[derive(Debug, Clone)]
pub enum CoverageTable<'a> {
    Format1 { glyphs: Vec<GlyphId16> },
    Format2 { ranges: Vec<RangeRecord> },
    #[allow(dead_code)]
    Phantom(std::marker::PhantomData<&'a ()>),
}

#[derive(Debug, Clone, Copy)]
pub struct RangeRecord {
    pub start_glyph_id: GlyphId16,
    pub end_glyph_id: GlyphId16,
    pub start_coverage_index: u16,
}

impl<'a> CoverageTable<'a> {
    /// Returns the coverage index of `glyph`, or `None` if it is not
    /// covered by this table.
    pub fn get(&self, glyph: GlyphId16) -> Option<u16> {
        match self {
            CoverageTable::Format1 { glyphs } => {
                glyphs.iter().position(|g| *g == glyph).map(|i| i as u16)
            }
            CoverageTable::Format2 { ranges } => ranges.iter().find_map(|r| {
                if glyph.to_u16() >= r.start_glyph_id.to_u16()
                    && glyph.to_u16() <= r.end_glyph_id.to_u16()
                {
                    Some(r.start_coverage_index + (glyph.to_u16() - r.start_glyph_id.to_u16()))
                } else {
                    None
                }
            }),
            CoverageTable::Phantom(_) => None,
        }
    }

    pub fn contains(&self, glyph: GlyphId16) -> bool {
        self.get(glyph).is_some()
    }
}

impl<'a> FontRead<'a> for CoverageTable<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => {
                let count: u16 = data.read_at(2)?;
                let glyphs = data.read_array::<GlyphId16>(4, count as usize)?;
                Ok(CoverageTable::Format1 { glyphs })
            }
            2 => {
                let count: u16 = data.read_at(2)?;
                let mut ranges = Vec::with_capacity(count as usize);
                for i in 0..count as usize {
                    let base = 4 + i * 6;
                    ranges.push(RangeRecord {
                        start_glyph_id: data.read_at(base)?,
                        end_glyph_id: data.read_at(base + 2)?,
                        start_coverage_index: data.read_at(base + 4)?,
                    });
                }
                Ok(CoverageTable::Format2 { ranges })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format1_looks_up_by_position_in_the_glyph_list() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(3u16.to_be_bytes());
        bytes.extend(10u16.to_be_bytes());
        bytes.extend(20u16.to_be_bytes());
        bytes.extend(30u16.to_be_bytes());
        let table = CoverageTable::read(FontData::new(&bytes)).unwrap();
        assert_eq!(table.get(GlyphId16::new(20)), Some(1));
        assert_eq!(table.get(GlyphId16::new(99)), None);
        assert!(table.contains(GlyphId16::new(30)));
    }

    #[test]
    fn format2_looks_up_by_range() {
        let mut bytes = vec![];
        bytes.extend(2u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(100u16.to_be_bytes());
        bytes.extend(110u16.to_be_bytes());
        bytes.extend(0u16.to_be_bytes());
        let table = CoverageTable::read(FontData::new(&bytes)).unwrap();
        assert_eq!(table.get(GlyphId16::new(105)), Some(5));
        assert_eq!(table.get(GlyphId16::new(111)), None);
    }

    #[test]
    fn unrecognized_format_is_an_error() {
        let bytes = 9u16.to_be_bytes();
        assert!(CoverageTable::read(FontData::new(&bytes)).is_err());
    }
}
