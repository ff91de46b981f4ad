//! The Pattern: a compiled, immutable per-(font, script, language) plan —
//! an ordered list of feature units, each an ordered list of lookup
//! indices plus the mask bit that activates it.

use crate::data::ReadError;
use crate::direction::TextDirection;
use crate::script::{knowledge_for, ScriptKnowledge};
use crate::tables::script::LayoutHeader;
use crate::tag::{feature, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Substitution,
    Positioning,
}

fn feature_kind(tag: Tag) -> FeatureKind {
    if tag == feature::DIST
        || tag == feature::KERN
        || tag == feature::MARK
        || tag == feature::MKMK
        || tag == feature::CURS
    {
        FeatureKind::Positioning
    } else {
        FeatureKind::Substitution
    }
}

#[derive(Debug, Clone)]
pub struct FeatureUnit {
    pub mask: u16,
    pub lookup_indices: Vec<u16>,
    pub kind: FeatureKind,
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub feature_units: Vec<FeatureUnit>,
    pub script_tag: Tag,
    pub language_tag: Option<Tag>,
    pub default_direction: TextDirection,
}

impl Pattern {
    pub fn substitution_units(&self) -> impl Iterator<Item = &FeatureUnit> {
        self.feature_units.iter().filter(|u| u.kind == FeatureKind::Substitution)
    }

    pub fn positioning_units(&self) -> impl Iterator<Item = &FeatureUnit> {
        self.feature_units.iter().filter(|u| u.kind == FeatureKind::Positioning)
    }

    /// Walks `gsub`/`gpos`'s `ScriptList`/`FeatureList` for `script_tag` and
    /// `language_tag`, in the order `ScriptKnowledge` prescribes, building
    /// one `FeatureUnit` per enabled feature tag present in the font. A
    /// feature absent from the font (or from the selected LangSys) is
    /// silently skipped, not an error.
    pub fn compile(
        gsub: Option<&LayoutHeader<'_>>,
        gpos: Option<&LayoutHeader<'_>>,
        script_tag: Tag,
        language_tag: Option<Tag>,
    ) -> Result<Self, ReadError> {
        let knowledge: ScriptKnowledge = knowledge_for(script_tag);
        let mut feature_units = Vec::new();

        for (bit, &tag) in knowledge.features.iter().enumerate() {
            let kind = feature_kind(tag);
            let header = match kind {
                FeatureKind::Substitution => gsub,
                FeatureKind::Positioning => gpos,
            };
            let Some(header) = header else { continue };
            let Some(script) = header.script_list.script_for(script_tag)? else { continue };
            let Some(lang_sys) = script.lang_sys_for(language_tag)? else { continue };
            let available = lang_sys.feature_indices(script.table_data())?;

            let mut lookup_indices = Vec::new();
            for index in available {
                if header.feature_list.tag_at(index) != Some(tag) {
                    continue;
                }
                if let Some(feature) = header.feature_list.feature_at(index)? {
                    lookup_indices.extend_from_slice(feature.lookup_list_indices());
                }
            }
            if lookup_indices.is_empty() {
                continue;
            }
            feature_units.push(FeatureUnit {
                mask: 1u16 << (bit % 16),
                lookup_indices,
                kind,
            });
        }

        log::debug!(
            "compiled pattern for script={script_tag} language={:?}: {} feature unit(s)",
            language_tag,
            feature_units.len()
        );

        Ok(Pattern {
            feature_units,
            script_tag,
            language_tag,
            default_direction: knowledge.default_direction,
        })
    }

    /// The combined mask of every feature unit — useful for tagging newly
    /// discovered slots so they are visible to every lookup by default.
    pub fn full_mask(&self) -> u16 {
        self.feature_units.iter().fold(0, |acc, u| acc | u.mask)
    }
}
