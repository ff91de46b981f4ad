//! The `LookupFlag` bit field from the OpenType `Lookup` table header.

use crate::bitset::bitflags_u16;

bitflags_u16! {
    pub struct LookupFlag: u16 {
        const RIGHT_TO_LEFT = 0x0001;
        const IGNORE_BASE_GLYPHS = 0x0002;
        const IGNORE_LIGATURES = 0x0004;
        const IGNORE_MARKS = 0x0008;
        const USE_MARK_FILTERING_SET = 0x0010;
    }
}

impl LookupFlag {
    /// The mark-attachment-class filter, if any (top byte of the flag
    /// field — not a bit flag but packed alongside the others).
    pub fn mark_attachment_class(self) -> u16 {
        self.bits() >> 8
    }
}
