//! Script-specific shaping engines: a pre-substitution pass that tags
//! Album slots with feature masks before the generic pipeline runs.
//!
//! Modeled as a tagged union of the two concrete engines rather than a
//! trait-object capability — a script maps to exactly one of these, the
//! set is closed, and there is no third engine to plan for.

mod arabic;
mod standard;

pub use arabic::ArabicEngine;
pub use standard::StandardEngine;

use crate::album::Album;
use crate::direction::TextDirection;
use crate::script::ScriptKnowledge;
use crate::tag::{script, Tag};

#[derive(Debug, Clone, Copy)]
pub enum ShapingEngine {
    Standard(StandardEngine),
    Arabic(ArabicEngine),
}

impl ShapingEngine {
    /// Selects the engine for `script_tag` via a single table lookup,
    /// mirroring the closed script→engine mapping a unified engine uses
    /// internally.
    pub fn select(script_tag: Tag) -> Self {
        if script_tag == script::ARABIC {
            ShapingEngine::Arabic(ArabicEngine)
        } else {
            ShapingEngine::Standard(StandardEngine)
        }
    }

    /// Tags every discovered slot's mask before any GSUB/GPOS lookup
    /// runs. `codepoints` is the full input sequence; slot `i` (before any
    /// substitution) corresponds to `codepoints[range.0 + i]`.
    pub fn preprocess(&self, album: &mut Album, codepoints: &[u32], knowledge: ScriptKnowledge) {
        match self {
            ShapingEngine::Standard(e) => e.preprocess(album, codepoints, knowledge),
            ShapingEngine::Arabic(e) => e.preprocess(album, codepoints, knowledge),
        }
    }

    /// A post-pipeline hook for engines that need a final pass over the
    /// Album once positioned (unused by either concrete engine today, but
    /// part of the shared capability both could implement).
    pub fn process_album(&self, album: &mut Album, direction: TextDirection) {
        match self {
            ShapingEngine::Standard(e) => e.process_album(album, direction),
            ShapingEngine::Arabic(e) => e.process_album(album, direction),
        }
    }
}
