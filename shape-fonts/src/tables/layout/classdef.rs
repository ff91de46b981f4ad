//! `ClassDef` table (format 1 and format 2): maps glyphs to small integer
//! classes, used by GDEF mark-attachment classes and by GSUB/GPOS context
//! lookups that match on glyph class rather than individual glyph id.

use crate::data::{FontData, FontRead, ReadError};
use crate::glyph::GlyphId16;

#[derive(Debug, Clone)]
pub enum ClassDef<'a> {
    Format1 {
        start_glyph_id: GlyphId16,
        class_values: Vec<u16>,
    },
    Format2 {
        ranges: Vec<ClassRangeRecord>,
    },
    #[allow(dead_code)]
    Phantom(std::marker::PhantomData<&'a ()>),
}

#[derive(Debug, Clone, Copy)]
pub struct ClassRangeRecord {
    pub start_glyph_id: GlyphId16,
    pub end_glyph_id: GlyphId16,
    pub class: u16,
}

impl<'a> ClassDef<'a> {
    /// The class of `glyph`, or `0` (the default class) if unlisted.
    pub fn get(&self, glyph: GlyphId16) -> u16 {
        match self {
            ClassDef::Format1 {
                start_glyph_id,
                class_values,
            } => {
                let gid = glyph.to_u16();
                let start = start_glyph_id.to_u16();
                if gid < start {
                    return 0;
                }
                let idx = (gid - start) as usize;
                class_values.get(idx).copied().unwrap_or(0)
            }
            ClassDef::Format2 { ranges } => ranges
                .iter()
                .find(|r| gid_in_range(glyph, r.start_glyph_id, r.end_glyph_id))
                .map(|r| r.class)
                .unwrap_or(0),
            ClassDef::Phantom(_) => 0,
        }
    }
}

fn gid_in_range(glyph: GlyphId16, start: GlyphId16, end: GlyphId16) -> bool {
    glyph.to_u16() >= start.to_u16() && glyph.to_u16() <= end.to_u16()
}

impl<'a> FontRead<'a> for ClassDef<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 => {
                let start_glyph_id = data.read_at(2)?;
                let count: u16 = data.read_at(4)?;
                let class_values = data.read_array::<u16>(6, count as usize)?;
                Ok(ClassDef::Format1 {
                    start_glyph_id,
                    class_values,
                })
            }
            2 => {
                let count: u16 = data.read_at(2)?;
                let mut ranges = Vec::with_capacity(count as usize);
                for i in 0..count as usize {
                    let base = 4 + i * 6;
                    ranges.push(ClassRangeRecord {
                        start_glyph_id: data.read_at(base)?,
                        end_glyph_id: data.read_at(base + 2)?,
                        class: data.read_at(base + 4)?,
                    });
                }
                Ok(ClassDef::Format2 { ranges })
            }
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format1_classes_are_contiguous_from_start_glyph() {
        let mut bytes = vec![];
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(10u16.to_be_bytes()); // startGlyphID
        bytes.extend(3u16.to_be_bytes()); // glyphCount
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(2u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        let cd = ClassDef::read(FontData::new(&bytes)).unwrap();
        assert_eq!(cd.get(GlyphId16::new(9)), 0);
        assert_eq!(cd.get(GlyphId16::new(10)), 1);
        assert_eq!(cd.get(GlyphId16::new(11)), 2);
        assert_eq!(cd.get(GlyphId16::new(50)), 0);
    }

    #[test]
    fn format2_classes_come_from_overlapping_free_ranges() {
        let mut bytes = vec![];
        bytes.extend(2u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(100u16.to_be_bytes());
        bytes.extend(105u16.to_be_bytes());
        bytes.extend(3u16.to_be_bytes());
        let cd = ClassDef::read(FontData::new(&bytes)).unwrap();
        assert_eq!(cd.get(GlyphId16::new(102)), 3);
        assert_eq!(cd.get(GlyphId16::new(106)), 0);
    }
}
