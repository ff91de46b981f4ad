//! `StandardEngine`: the no-op pre-pass for simple left-to-right scripts.
//! Every discovered slot is left free to match every feature in the
//! Pattern; there is no script-specific masking to apply.

use crate::album::Album;
use crate::direction::TextDirection;
use crate::script::ScriptKnowledge;

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEngine;

impl StandardEngine {
    pub fn preprocess(&self, _album: &mut Album, _codepoints: &[u32], _knowledge: ScriptKnowledge) {}

    pub fn process_album(&self, _album: &mut Album, _direction: TextDirection) {}
}
