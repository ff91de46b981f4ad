//! `ArabicEngine`: a joining-type state machine that assigns each letter's
//! contextual form (Isolated/Initial/Medial/Final) before the generic
//! pipeline runs, by setting the corresponding `init`/`medi`/`fina`/`isol`
//! mask bit on its slot.

use crate::album::Album;
use crate::direction::TextDirection;
use crate::script::ScriptKnowledge;
use crate::tag::feature;

/// A simplified subset of the Unicode `ArabicShaping.txt` joining classes:
/// enough of the Arabic block's common letters to exercise the state
/// machine below. `C` (join-causing) is folded into `D` per the shared
/// dual-joining behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoiningType {
    R,
    L,
    D,
    U,
    T,
}

fn joining_type(codepoint: u32) -> JoiningType {
    match codepoint {
        0x0610..=0x061A | 0x064B..=0x065F | 0x0670 | 0x06D6..=0x06DC | 0x06DF..=0x06E4
        | 0x06E7..=0x06E8 | 0x06EA..=0x06ED => JoiningType::T,
        0x0622 | 0x0623 | 0x0624 | 0x0625 | 0x0627 | 0x0629 | 0x062F | 0x0630 | 0x0631
        | 0x0632 | 0x0648 | 0x0698 | 0x06C0 | 0x06D5 => JoiningType::R,
        0x0626 | 0x0628 | 0x062A..=0x062E | 0x0633..=0x063A | 0x0641..=0x0647 | 0x0649
        | 0x064A | 0x066E | 0x066F | 0x0678..=0x0687 | 0x069A..=0x06BF | 0x06C1..=0x06CE
        | 0x06D0..=0x06D3 => JoiningType::D,
        _ => JoiningType::U,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoiningForm {
    Isolated,
    Initial,
    Medial,
    Final,
}

/// Runs the two-pass joining scan over `codepoints`, returning each
/// position's assigned form (`None` for transparent or non-joining
/// codepoints).
fn compute_forms(codepoints: &[u32]) -> Vec<Option<JoiningForm>> {
    let mut forms: Vec<Option<JoiningForm>> = vec![None; codepoints.len()];
    let mut prev_type = JoiningType::U;
    let mut prev_index: Option<usize> = None;

    for (i, &cp) in codepoints.iter().enumerate() {
        let jt = joining_type(cp);
        if jt == JoiningType::T {
            continue;
        }
        let form = match (prev_type, jt) {
            (JoiningType::U, _) | (JoiningType::L, _) => JoiningForm::Isolated,
            (JoiningType::R | JoiningType::D, JoiningType::R | JoiningType::D) => {
                if let Some(pi) = prev_index {
                    let updated = match forms[pi] {
                        Some(JoiningForm::Initial) => JoiningForm::Medial,
                        _ => JoiningForm::Initial,
                    };
                    forms[pi] = Some(updated);
                }
                JoiningForm::Final
            }
            (JoiningType::R, JoiningType::L | JoiningType::U) => JoiningForm::Isolated,
            _ => JoiningForm::Isolated,
        };
        forms[i] = Some(form);
        prev_type = jt;
        prev_index = Some(i);
    }
    forms
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArabicEngine;

impl ArabicEngine {
    pub fn preprocess(&self, album: &mut Album, codepoints: &[u32], knowledge: ScriptKnowledge) {
        let (range_start, range_len) = album.range();
        if codepoints.len() < range_start + range_len {
            return;
        }
        let slice = &codepoints[range_start..range_start + range_len];
        let forms = compute_forms(slice);

        let isol_bit = knowledge.feature_bit(feature::ISOL).unwrap_or(0);
        let init_bit = knowledge.feature_bit(feature::INIT).unwrap_or(0);
        let medi_bit = knowledge.feature_bit(feature::MEDI).unwrap_or(0);
        let fina_bit = knowledge.feature_bit(feature::FINA).unwrap_or(0);
        let join_bits = isol_bit | init_bit | medi_bit | fina_bit;

        for (i, form) in forms.iter().enumerate() {
            if i >= album.len() {
                break;
            }
            let current_mask = album.slot(i).mask;
            let selected = match form {
                Some(JoiningForm::Isolated) => isol_bit,
                Some(JoiningForm::Initial) => init_bit,
                Some(JoiningForm::Medial) => medi_bit,
                Some(JoiningForm::Final) => fina_bit,
                None => 0,
            };
            album.set_mask(i, (current_mask & !join_bits) | selected);
        }
    }

    pub fn process_album(&self, _album: &mut Album, _direction: TextDirection) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beh_alef_joins_initial_then_final() {
        // beh (dual-joining) followed by alef (right-joining only).
        let codepoints = [0x0628u32, 0x0627];
        let forms = compute_forms(&codepoints);
        assert_eq!(forms[0], Some(JoiningForm::Initial));
        assert_eq!(forms[1], Some(JoiningForm::Final));
    }

    #[test]
    fn isolated_single_letter() {
        let codepoints = [0x0628u32];
        let forms = compute_forms(&codepoints);
        assert_eq!(forms[0], Some(JoiningForm::Isolated));
    }

    #[test]
    fn transparent_mark_does_not_break_the_chain() {
        // beh, fatha (transparent), alef — the mark must not reset `prev`.
        let codepoints = [0x0628u32, 0x064E, 0x0627];
        let forms = compute_forms(&codepoints);
        assert_eq!(forms[0], Some(JoiningForm::Initial));
        assert_eq!(forms[1], None);
        assert_eq!(forms[2], Some(JoiningForm::Final));
    }
}
