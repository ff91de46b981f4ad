//! Glyph identifiers.

use crate::data::Scalar;
use std::fmt;

/// A 16-bit glyph identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GlyphId16(u16);

impl GlyphId16 {
    pub const NOTDEF: GlyphId16 = GlyphId16(0);

    pub const fn new(raw: u16) -> Self {
        GlyphId16(raw)
    }

    pub const fn to_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for GlyphId16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gid{}", self.0)
    }
}

impl Scalar for GlyphId16 {
    const RAW_BYTE_LEN: usize = 2;
    fn read(bytes: &[u8]) -> Option<Self> {
        u16::read(bytes).map(GlyphId16)
    }
    fn to_be_bytes(self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }
}
