//! OpenType tags: 4-byte ASCII identifiers for scripts, languages, and
//! features (`"arab"`, `"liga"`, `"dflt"`, ...).

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    pub const fn new(bytes: &[u8; 4]) -> Self {
        Tag(*bytes)
    }

    pub const fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

pub mod script {
    use super::Tag;
    pub const ARABIC: Tag = Tag::new(b"arab");
    pub const LATIN: Tag = Tag::new(b"latn");
    pub const CYRILLIC: Tag = Tag::new(b"cyrl");
    pub const GREEK: Tag = Tag::new(b"grek");
    pub const ARMENIAN: Tag = Tag::new(b"armn");
    pub const GEORGIAN: Tag = Tag::new(b"geor");
    pub const OGHAM: Tag = Tag::new(b"ogam");
    pub const RUNIC: Tag = Tag::new(b"runr");
}

pub mod feature {
    use super::Tag;
    pub const CCMP: Tag = Tag::new(b"ccmp");
    pub const LIGA: Tag = Tag::new(b"liga");
    pub const CLIG: Tag = Tag::new(b"clig");
    pub const DIST: Tag = Tag::new(b"dist");
    pub const KERN: Tag = Tag::new(b"kern");
    pub const MARK: Tag = Tag::new(b"mark");
    pub const MKMK: Tag = Tag::new(b"mkmk");
    pub const INIT: Tag = Tag::new(b"init");
    pub const MEDI: Tag = Tag::new(b"medi");
    pub const FINA: Tag = Tag::new(b"fina");
    pub const ISOL: Tag = Tag::new(b"isol");
    pub const RLIG: Tag = Tag::new(b"rlig");
    pub const CALT: Tag = Tag::new(b"calt");
    pub const CURS: Tag = Tag::new(b"curs");
}
