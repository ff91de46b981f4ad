//! The `cmap` table: codepoint → nominal glyph id mapping, used by
//! `TextProcessor::discover_glyphs`. Supports subtable formats 4 (BMP
//! segment mapping) and 12 (full-repertoire segmented coverage), which
//! between them cover both BMP and supplementary-plane codepoints.

use crate::data::{FontData, FontRead, ReadError};
use crate::glyph::GlyphId16;

#[derive(Debug, Clone)]
pub enum Cmap<'a> {
    Format4(Cmap4<'a>),
    Format12(Cmap12<'a>),
}

impl<'a> Cmap<'a> {
    pub fn map(&self, codepoint: u32) -> Option<GlyphId16> {
        match self {
            Cmap::Format4(t) => t.map(codepoint),
            Cmap::Format12(t) => t.map(codepoint),
        }
    }

    /// Reads the single "best" subtable out of a full `cmap` table, per a
    /// simplified version of the selection strategy real shapers use:
    /// prefer a Windows Unicode full-repertoire (format 12) subtable, then
    /// fall back to a Windows BMP (format 4) subtable.
    pub fn from_table(data: FontData<'a>) -> Result<Self, ReadError> {
        let num_tables: u16 = data.read_at(2)?;
        let mut best_format4: Option<u32> = None;
        let mut best_format12: Option<u32> = None;
        for i in 0..num_tables as usize {
            let base = 4 + i * 8;
            let platform_id: u16 = data.read_at(base)?;
            let encoding_id: u16 = data.read_at(base + 2)?;
            let offset: u32 = data.read_at(base + 4)?;
            let is_windows_unicode = platform_id == 3 && (encoding_id == 1 || encoding_id == 10);
            let is_unicode_platform = platform_id == 0;
            if !(is_windows_unicode || is_unicode_platform) {
                continue;
            }
            let subtable = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
            let format: u16 = subtable.read_at(0)?;
            match format {
                12 => best_format12 = Some(offset),
                4 => best_format4 = Some(offset),
                _ => {}
            }
        }
        if let Some(offset) = best_format12 {
            let subtable = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
            return Ok(Cmap::Format12(Cmap12::read(subtable)?));
        }
        if let Some(offset) = best_format4 {
            let subtable = data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
            return Ok(Cmap::Format4(Cmap4::read(subtable)?));
        }
        Err(ReadError::TableMissing)
    }
}

#[derive(Debug, Clone)]
pub struct Cmap4<'a> {
    seg_count: u16,
    data: FontData<'a>,
    // byte offsets of each parallel array, relative to `data`
    end_codes_off: usize,
    start_codes_off: usize,
    id_deltas_off: usize,
    id_range_offsets_off: usize,
}

impl<'a> Cmap4<'a> {
    pub fn map(&self, codepoint: u32) -> Option<GlyphId16> {
        let cp: u16 = codepoint.try_into().ok()?;
        for seg in 0..self.seg_count as usize {
            let end: u16 = self.data.read_at(self.end_codes_off + seg * 2).ok()?;
            if cp > end {
                continue;
            }
            let start: u16 = self.data.read_at(self.start_codes_off + seg * 2).ok()?;
            if cp < start {
                return None;
            }
            let id_delta: i16 = self.data.read_at(self.id_deltas_off + seg * 2).ok()?;
            let id_range_offset: u16 = self.data.read_at(self.id_range_offsets_off + seg * 2).ok()?;
            if id_range_offset == 0 {
                let gid = cp.wrapping_add(id_delta as u16);
                return if gid == 0 { None } else { Some(GlyphId16::new(gid)) };
            }
            let glyph_index_addr = self.id_range_offsets_off
                + seg * 2
                + id_range_offset as usize
                + (cp - start) as usize * 2;
            let raw_gid: u16 = self.data.read_at(glyph_index_addr).ok()?;
            if raw_gid == 0 {
                return None;
            }
            let gid = raw_gid.wrapping_add(id_delta as u16);
            return Some(GlyphId16::new(gid));
        }
        None
    }
}

impl<'a> FontRead<'a> for Cmap4<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 4 {
            return Err(ReadError::InvalidFormat(format));
        }
        let seg_count_x2: u16 = data.read_at(6)?;
        let seg_count = seg_count_x2 / 2;
        let end_codes_off = 14;
        let start_codes_off = end_codes_off + seg_count as usize * 2 + 2;
        let id_deltas_off = start_codes_off + seg_count as usize * 2;
        let id_range_offsets_off = id_deltas_off + seg_count as usize * 2;
        Ok(Cmap4 {
            seg_count,
            data,
            end_codes_off,
            start_codes_off,
            id_deltas_off,
            id_range_offsets_off,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Cmap12<'a> {
    groups: Vec<SequentialMapGroup>,
    #[allow(dead_code)]
    data: FontData<'a>,
}

#[derive(Debug, Clone, Copy)]
struct SequentialMapGroup {
    start_char_code: u32,
    end_char_code: u32,
    start_glyph_id: u32,
}

impl<'a> Cmap12<'a> {
    pub fn map(&self, codepoint: u32) -> Option<GlyphId16> {
        for group in &self.groups {
            if codepoint >= group.start_char_code && codepoint <= group.end_char_code {
                let gid = group.start_glyph_id + (codepoint - group.start_char_code);
                return u16::try_from(gid).ok().map(GlyphId16::new);
            }
        }
        None
    }
}

impl<'a> FontRead<'a> for Cmap12<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        if format != 12 {
            return Err(ReadError::InvalidFormat(format));
        }
        let num_groups: u32 = data.read_at(12)?;
        let mut groups = Vec::with_capacity(num_groups as usize);
        for i in 0..num_groups as usize {
            let base = 16 + i * 12;
            groups.push(SequentialMapGroup {
                start_char_code: data.read_at(base)?,
                end_char_code: data.read_at(base + 4)?,
                start_glyph_id: data.read_at(base + 8)?,
            });
        }
        Ok(Cmap12 { groups, data })
    }
}
