//! The `hmtx` table: per-glyph default horizontal advance widths, used to
//! seed a slot's advance before any GPOS lookup adjusts it.

use crate::data::{FontData, ReadError};
use crate::glyph::GlyphId16;

#[derive(Debug, Clone, Copy)]
pub struct Hmtx<'a> {
    data: FontData<'a>,
    num_h_metrics: u16,
}

impl<'a> Hmtx<'a> {
    pub fn new(data: FontData<'a>, num_h_metrics: u16) -> Self {
        Hmtx { data, num_h_metrics }
    }

    pub fn advance_width(&self, glyph: GlyphId16) -> Result<i32, ReadError> {
        if self.num_h_metrics == 0 {
            return Ok(0);
        }
        let gid = glyph.to_u16();
        let index = gid.min(self.num_h_metrics - 1) as usize;
        let advance: u16 = self.data.read_at(index * 4)?;
        Ok(advance as i32)
    }
}
