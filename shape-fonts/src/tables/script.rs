//! `ScriptList`/`Script`/`LangSys`/`FeatureList` — the GSUB/GPOS header
//! structures a [`crate::pattern::Pattern`] compiler walks to turn a
//! (script, language) pair into an ordered set of lookup indices.

use crate::data::{FontData, FontRead, ReadError};
use crate::tag::Tag;

#[derive(Debug, Clone, Copy)]
pub struct LangSys {
    pub required_feature_index: Option<u16>,
    feature_indices_offset: usize,
    feature_index_count: u16,
}

impl LangSys {
    pub fn feature_indices(&self, data: FontData<'_>) -> Result<Vec<u16>, ReadError> {
        data.read_array::<u16>(self.feature_indices_offset, self.feature_index_count as usize)
    }
}

impl<'a> FontRead<'a> for LangSys {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let required: u16 = data.read_at(2)?;
        let count: u16 = data.read_at(4)?;
        Ok(LangSys {
            required_feature_index: (required != 0xFFFF).then_some(required),
            feature_indices_offset: 6,
            feature_index_count: count,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Script<'a> {
    default_lang_sys: Option<LangSys>,
    lang_sys_records: Vec<(Tag, u16)>,
    data: FontData<'a>,
}

impl<'a> Script<'a> {
    pub fn lang_sys_for(&self, language_tag: Option<Tag>) -> Result<Option<LangSys>, ReadError> {
        if let Some(tag) = language_tag {
            if let Some(&(_, offset)) = self.lang_sys_records.iter().find(|(t, _)| *t == tag) {
                let data = self.data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
                return Ok(Some(LangSys::read(data)?));
            }
        }
        Ok(self.default_lang_sys)
    }

    pub fn table_data(&self) -> FontData<'a> {
        self.data
    }
}

impl<'a> FontRead<'a> for Script<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let default_offset: u16 = data.read_at(0)?;
        let default_lang_sys = if default_offset != 0 {
            Some(LangSys::read(
                data.split_off(default_offset as usize).ok_or(ReadError::OutOfBounds)?,
            )?)
        } else {
            None
        };
        let count: u16 = data.read_at(2)?;
        let mut lang_sys_records = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let base = 4 + i * 6;
            let tag = Tag::from_be_bytes(data.read_array::<u8>(base, 4)?.try_into().unwrap());
            let offset: u16 = data.read_at(base + 4)?;
            lang_sys_records.push((tag, offset));
        }
        Ok(Script { default_lang_sys, lang_sys_records, data })
    }
}

#[derive(Debug, Clone)]
pub struct ScriptList<'a> {
    records: Vec<(Tag, u16)>,
    data: FontData<'a>,
}

impl<'a> ScriptList<'a> {
    pub fn script_for(&self, script_tag: Tag) -> Result<Option<Script<'a>>, ReadError> {
        match self.records.iter().find(|(t, _)| *t == script_tag) {
            Some(&(_, offset)) => {
                let data = self.data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
                Ok(Some(Script::read(data)?))
            }
            None => Ok(None),
        }
    }
}

impl<'a> FontRead<'a> for ScriptList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(0)?;
        let mut records = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let base = 2 + i * 6;
            let tag = Tag::from_be_bytes(data.read_array::<u8>(base, 4)?.try_into().unwrap());
            let offset: u16 = data.read_at(base + 4)?;
            records.push((tag, offset));
        }
        Ok(ScriptList { records, data })
    }
}

#[derive(Debug, Clone)]
pub struct Feature {
    lookup_list_indices: Vec<u16>,
}

impl Feature {
    pub fn lookup_list_indices(&self) -> &[u16] {
        &self.lookup_list_indices
    }
}

impl<'a> FontRead<'a> for Feature {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(2)?;
        let lookup_list_indices = data.read_array::<u16>(4, count as usize)?;
        Ok(Feature { lookup_list_indices })
    }
}

#[derive(Debug, Clone)]
pub struct FeatureList<'a> {
    records: Vec<(Tag, u16)>,
    data: FontData<'a>,
}

impl<'a> FeatureList<'a> {
    pub fn tag_at(&self, index: u16) -> Option<Tag> {
        self.records.get(index as usize).map(|(t, _)| *t)
    }

    pub fn feature_at(&self, index: u16) -> Result<Option<Feature>, ReadError> {
        match self.records.get(index as usize) {
            Some(&(_, offset)) => {
                let data = self.data.split_off(offset as usize).ok_or(ReadError::OutOfBounds)?;
                Ok(Some(Feature::read(data)?))
            }
            None => Ok(None),
        }
    }
}

impl<'a> FontRead<'a> for FeatureList<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let count: u16 = data.read_at(0)?;
        let mut records = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let base = 2 + i * 6;
            let tag = Tag::from_be_bytes(data.read_array::<u8>(base, 4)?.try_into().unwrap());
            let offset: u16 = data.read_at(base + 4)?;
            records.push((tag, offset));
        }
        Ok(FeatureList { records, data })
    }
}

/// The common `ScriptList`/`FeatureList`/`LookupList` header shared by the
/// top of both the `GSUB` and `GPOS` tables.
#[derive(Debug, Clone)]
pub struct LayoutHeader<'a> {
    pub script_list: ScriptList<'a>,
    pub feature_list: FeatureList<'a>,
    pub lookup_list: super::layout::LookupList<'a>,
}

impl<'a> FontRead<'a> for LayoutHeader<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let _major: u16 = data.read_at(0)?;
        let _minor: u16 = data.read_at(2)?;
        let script_list_offset: u16 = data.read_at(4)?;
        let feature_list_offset: u16 = data.read_at(6)?;
        let lookup_list_offset: u16 = data.read_at(8)?;
        Ok(LayoutHeader {
            script_list: ScriptList::read(
                data.split_off(script_list_offset as usize).ok_or(ReadError::OutOfBounds)?,
            )?,
            feature_list: FeatureList::read(
                data.split_off(feature_list_offset as usize).ok_or(ReadError::OutOfBounds)?,
            )?,
            lookup_list: super::layout::LookupList::read(
                data.split_off(lookup_list_offset as usize).ok_or(ReadError::OutOfBounds)?,
            )?,
        })
    }
}
