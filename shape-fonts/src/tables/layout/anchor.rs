//! GPOS `Anchor` tables (formats 1–3): an (x, y) attachment point on a
//! glyph, used by cursive and mark-attachment positioning.

use crate::data::{FontData, FontRead, ReadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: i16,
    pub y: i16,
    // Format 2's `anchor_point` (a contour point index, used by hinting
    // instructions) and format 3's device table offsets are parsed but not
    // applied: they require layout-time hinting state or a ppem/DPI value
    // this layer does not have.
}

impl<'a> FontRead<'a> for Anchor {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let format: u16 = data.read_at(0)?;
        match format {
            1 | 2 | 3 => Ok(Anchor {
                x: data.read_at(2)?,
                y: data.read_at(4)?,
            }),
            other => Err(ReadError::InvalidFormat(other)),
        }
    }
}

impl Anchor {
    pub fn delta_to(&self, other: &Anchor) -> (i32, i32) {
        (
            other.x as i32 - self.x as i32,
            other.y as i32 - self.y as i32,
        )
    }
}
