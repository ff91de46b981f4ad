//! OpenType Layout common table formats, shared between GSUB and GPOS:
//! `Coverage`, `ClassDef`, `ValueRecord`, `Anchor`, and the `Lookup`/
//! `LookupList` header structures.

mod anchor;
mod classdef;
mod coverage;
mod lookupflag;
mod valuerecord;

pub use anchor::Anchor;
pub use classdef::ClassDef;
pub use coverage::CoverageTable;
pub use lookupflag::LookupFlag;
pub use valuerecord::{ValueFormat, ValueRecord};

use crate::data::{FontData, FontRead, ReadError};

/// A single `Lookup` table header: the kind, flags, and list of subtable
/// offsets. Interpreting a subtable's bytes (GSUB/GPOS format-specific) is
/// the job of the lookup evaluators, not this type.
#[derive(Debug, Clone)]
pub struct RawLookup<'a> {
    pub lookup_type: u16,
    pub lookup_flag: LookupFlag,
    pub subtable_offsets: Vec<u16>,
    pub mark_filtering_set: Option<u16>,
    data: FontData<'a>,
}

impl<'a> RawLookup<'a> {
    pub fn subtable_count(&self) -> usize {
        self.subtable_offsets.len()
    }

    /// Resolves the bytes for the `idx`th subtable, relative to the start
    /// of this `Lookup` table.
    pub fn subtable_data(&self, idx: usize) -> Result<FontData<'a>, ReadError> {
        let offset = *self
            .subtable_offsets
            .get(idx)
            .ok_or(ReadError::OutOfBounds)?;
        self.data
            .split_off(offset as usize)
            .ok_or(ReadError::OutOfBounds)
    }
}

impl<'a> FontRead<'a> for RawLookup<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let lookup_type: u16 = data.read_at(0)?;
        let lookup_flag = LookupFlag::from_bits_truncate(data.read_at(2)?);
        let subtable_count: u16 = data.read_at(4)?;
        let subtable_offsets = data.read_array::<u16>(6, subtable_count as usize)?;
        let mark_filtering_set = if lookup_flag.contains(LookupFlag::USE_MARK_FILTERING_SET) {
            let pos = 6 + subtable_count as usize * 2;
            Some(data.read_at(pos)?)
        } else {
            None
        };
        Ok(RawLookup {
            lookup_type,
            lookup_flag,
            subtable_offsets,
            mark_filtering_set,
            data,
        })
    }
}

/// A `LookupList` table: an array of offsets to `Lookup` tables.
#[derive(Debug, Clone)]
pub struct LookupList<'a> {
    data: FontData<'a>,
    offsets: Vec<u16>,
}

impl<'a> LookupList<'a> {
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, index: u16) -> Result<RawLookup<'a>, ReadError> {
        let offset = *self.offsets.get(index as usize).ok_or(ReadError::OutOfBounds)?;
        let data = self.data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
        RawLookup::read(data)
    }
}

impl<'a> FontRead<'a> for LookupList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(0)?;
        let offsets = data.read_array::<u16>(2, count as usize)?;
        Ok(LookupList { data, offsets })
    }
}

/// A `SequenceLookupRecord`: applies a nested lookup at a given sequence
/// position, used by contextual and chaining-contextual subtables.
#[derive(Debug, Clone, Copy)]
pub struct SequenceLookupRecord {
    pub sequence_index: u16,
    pub lookup_list_index: u16,
}

impl SequenceLookupRecord {
    pub fn read_array(data: FontData<'_>, offset: usize, count: usize) -> Result<Vec<Self>, ReadError> {
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let base = offset + i * 4;
            out.push(SequenceLookupRecord {
                sequence_index: data.read_at(base)?,
                lookup_list_index: data.read_at(base + 2)?,
            });
        }
        Ok(out)
    }
}
