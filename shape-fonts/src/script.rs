//! `ScriptKnowledge`: the default direction and ordered feature list for a
//! script tag. `Pattern::compile` walks this list, in order, to decide
//! which GSUB/GPOS features to enable and in what sequence.

use crate::direction::TextDirection;
use crate::tag::{feature, script, Tag};

#[derive(Debug, Clone, Copy)]
pub struct ScriptKnowledge {
    pub default_direction: TextDirection,
    pub features: &'static [Tag],
}

/// `SFStandardEngine`'s fixed feature order, covering simple left-to-right
/// scripts: Armenian, Cyrillic, Georgian, Greek, Latin, Ogham, Runic.
const STANDARD_FEATURES: &[Tag] = &[
    feature::CCMP,
    feature::LIGA,
    feature::CLIG,
    feature::DIST,
    feature::KERN,
    feature::MARK,
    feature::MKMK,
];

const STANDARD: ScriptKnowledge = ScriptKnowledge {
    default_direction: TextDirection::LeftToRight,
    features: STANDARD_FEATURES,
};

/// Arabic's feature order: the joining-form features first (so `init`/
/// `medi`/`fina`/`isol` masks set by the Arabic engine are consumed before
/// later features can further transform the result), then the general
/// substitution and positioning features.
const ARABIC_FEATURES: &[Tag] = &[
    feature::CCMP,
    feature::ISOL,
    feature::FINA,
    feature::MEDI,
    feature::INIT,
    feature::RLIG,
    feature::CALT,
    feature::LIGA,
    feature::CLIG,
    feature::CURS,
    feature::DIST,
    feature::KERN,
    feature::MARK,
    feature::MKMK,
];

const ARABIC: ScriptKnowledge = ScriptKnowledge {
    default_direction: TextDirection::RightToLeft,
    features: ARABIC_FEATURES,
};

impl ScriptKnowledge {
    /// The mask bit assigned to `tag` when this knowledge's feature list
    /// is compiled into a [`crate::pattern::Pattern`] — `Pattern::compile`
    /// assigns bits by position in `features`, so an engine that wants to
    /// set a specific feature's bit on a slot computes it the same way.
    pub fn feature_bit(&self, tag: Tag) -> Option<u16> {
        self.features.iter().position(|&t| t == tag).map(|i| 1u16 << (i % 16))
    }
}

/// Looks up the `ScriptKnowledge` for `script_tag`, falling back to
/// [`STANDARD`] when the tag names no recognized script — this fallback
/// is the `UnsupportedScript` case, and is deliberately not an error.
pub fn knowledge_for(script_tag: Tag) -> ScriptKnowledge {
    match script_tag {
        t if t == script::ARABIC => ARABIC,
        t if t == script::LATIN
            || t == script::CYRILLIC
            || t == script::GREEK
            || t == script::ARMENIAN
            || t == script::GEORGIAN
            || t == script::OGHAM
            || t == script::RUNIC =>
        {
            STANDARD
        }
        _ => STANDARD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_script_falls_back_to_standard() {
        let unknown = Tag::new(b"zzzz");
        let knowledge = knowledge_for(unknown);
        assert_eq!(knowledge.default_direction, TextDirection::LeftToRight);
        assert_eq!(knowledge.features, STANDARD_FEATURES);
    }

    #[test]
    fn arabic_is_right_to_left() {
        let knowledge = knowledge_for(script::ARABIC);
        assert_eq!(knowledge.default_direction, TextDirection::RightToLeft);
        assert!(knowledge.features.contains(&feature::ISOL));
    }
}
