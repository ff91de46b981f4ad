//! The Locator: a cursor over an [`Album`] that only stops on slots a
//! lookup's flags consider "legitimate". Every GSUB/GPOS evaluator walks
//! the Album exclusively through a Locator — never through raw indices —
//! so filtering stays centralized in one place.

use crate::album::{Album, SlotTraits};
use crate::tables::gdef::{Gdef, MarkGlyphSets};
use crate::tables::layout::{ClassDef, LookupFlag};

/// GDEF views a Locator needs for filtering, snapshotted once at
/// construction rather than re-derived on every `move_next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocatorGdef<'a> {
    pub mark_attach_class_def: Option<&'a ClassDef<'a>>,
    pub mark_glyph_sets_def: Option<&'a MarkGlyphSets<'a>>,
}

impl<'a> LocatorGdef<'a> {
    pub fn from_gdef(gdef: &'a Gdef<'a>) -> Self {
        LocatorGdef {
            mark_attach_class_def: gdef.mark_attach_class_def.as_ref(),
            mark_glyph_sets_def: gdef.mark_glyph_sets_def.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    pub start_index: usize,
    pub limit_index: usize,
    index: Option<usize>,
    state_index: usize,
    version: u64,
    ignore_mask: SlotTraits,
    mark_attach_class: u16,
    mark_filtering_set: Option<u16>,
    feature_mask: u16,
    gdef: LocatorGdef<'a>,
}

impl<'a> Locator<'a> {
    /// Creates a cursor over `album`'s whole slot range, with no filtering
    /// flags set yet (call [`Locator::set_lookup_flag`] before iterating).
    pub fn new(album: &Album, gdef: LocatorGdef<'a>) -> Self {
        Locator {
            start_index: 0,
            limit_index: album.len(),
            index: None,
            state_index: 0,
            version: album.version(),
            ignore_mask: SlotTraits::empty(),
            mark_attach_class: 0,
            mark_filtering_set: None,
            feature_mask: 0,
            gdef,
        }
    }

    pub fn set_lookup_flag(&mut self, flag: LookupFlag) {
        let mut ignore = SlotTraits::empty();
        if flag.contains(LookupFlag::IGNORE_BASE_GLYPHS) {
            ignore.insert(SlotTraits::BASE);
        }
        if flag.contains(LookupFlag::IGNORE_LIGATURES) {
            ignore.insert(SlotTraits::LIGATURE);
        }
        if flag.contains(LookupFlag::IGNORE_MARKS) {
            ignore.insert(SlotTraits::MARK);
        }
        self.ignore_mask = ignore;
        self.mark_attach_class = flag.mark_attachment_class();
        self.mark_filtering_set = flag
            .contains(LookupFlag::USE_MARK_FILTERING_SET)
            .then_some(0);
    }

    pub fn set_mark_filtering_set(&mut self, set_index: u16) {
        if self.mark_filtering_set.is_some() {
            self.mark_filtering_set = Some(set_index);
        }
    }

    pub fn set_feature_mask(&mut self, mask: u16) {
        self.feature_mask = mask;
    }

    /// Re-derives cursor state if the Album has been mutated since the
    /// last position was recorded, per the invariant that a version
    /// mismatch must not leave the Locator pointing at stale indices.
    fn resync(&mut self, album: &Album) {
        if album.version() != self.version {
            self.version = album.version();
            self.index = None;
        }
    }

    fn is_legitimate(&self, album: &Album, index: usize) -> bool {
        let slot = album.slot(index);
        if slot.traits.intersects(SlotTraits::REMOVED | SlotTraits::PLACEHOLDER) {
            return false;
        }
        if slot.traits.intersects(self.ignore_mask) {
            return false;
        }
        if self.feature_mask != 0 && slot.mask & self.feature_mask == 0 {
            return false;
        }
        if slot.traits.contains(SlotTraits::MARK) {
            if self.mark_attach_class != 0 {
                let class = self
                    .gdef
                    .mark_attach_class_def
                    .map(|cd| cd.get(slot.glyph_id))
                    .unwrap_or(0);
                if class != self.mark_attach_class {
                    return false;
                }
            }
            if let Some(set_index) = self.mark_filtering_set {
                let covered = self
                    .gdef
                    .mark_glyph_sets_def
                    .map(|sets| sets.covers(set_index, slot.glyph_id))
                    .unwrap_or(true);
                if !covered {
                    return false;
                }
            }
        }
        true
    }

    /// Advances past the current slot and any non-legitimate slots until
    /// reaching a legitimate one or `limit_index`. Returns whether a slot
    /// was found.
    pub fn move_next(&mut self, album: &Album) -> bool {
        self.resync(album);
        let mut cursor = self.index.map(|i| i + 1).unwrap_or(self.start_index);
        while cursor < self.limit_index {
            if self.is_legitimate(album, cursor) {
                self.index = Some(cursor);
                self.state_index += 1;
                return true;
            }
            cursor += 1;
        }
        self.index = None;
        false
    }

    pub fn current(&self) -> Option<usize> {
        self.index
    }

    /// `n` successive `move_next` steps; returns `false` if exhausted
    /// before completing all of them.
    pub fn skip(&mut self, album: &Album, n: usize) -> bool {
        for _ in 0..n {
            if !self.move_next(album) {
                return false;
            }
        }
        true
    }

    /// Sets the cursor so the next `move_next` starts searching from
    /// `idx` (i.e. the slot immediately before `idx` is treated as the
    /// "current" position).
    pub fn jump_to(&mut self, idx: usize) {
        self.index = idx.checked_sub(1);
    }

    /// Peeks the nearest legitimate slot strictly after `idx`, without
    /// mutating the cursor.
    pub fn get_after(&self, album: &Album, idx: usize) -> Option<usize> {
        ((idx + 1)..self.limit_index).find(|&i| self.is_legitimate(album, i))
    }

    /// Peeks the nearest legitimate slot strictly before `idx`, without
    /// mutating the cursor.
    pub fn get_before(&self, album: &Album, idx: usize) -> Option<usize> {
        (self.start_index..idx).rev().find(|&i| self.is_legitimate(album, i))
    }

    /// Adopts `sibling`'s position — used when a nested lookup executes
    /// within the outer cursor's window. `sibling`'s range must be a
    /// subrange of this Locator's.
    pub fn take_state(&mut self, sibling: &Locator<'a>) {
        self.index = sibling.index;
        self.state_index = sibling.state_index;
        self.version = sibling.version;
    }

    /// A Locator restricted to `[start, limit)`, inheriting this
    /// Locator's filtering configuration. Used to run a nested lookup
    /// over a bounded window of the same Album.
    pub fn sublocator(&self, start: usize, limit: usize) -> Locator<'a> {
        Locator {
            start_index: start,
            limit_index: limit,
            index: None,
            state_index: 0,
            version: self.version,
            ignore_mask: self.ignore_mask,
            mark_attach_class: self.mark_attach_class,
            mark_filtering_set: self.mark_filtering_set,
            feature_mask: self.feature_mask,
            gdef: self.gdef,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::GlyphId16;

    fn album_with_traits(traits: &[SlotTraits]) -> Album {
        let mut album = Album::new();
        album.reset(0, traits.len());
        for (i, &t) in traits.iter().enumerate() {
            album.add(GlyphId16::new(i as u16 + 1), t, i);
        }
        album
    }

    #[test]
    fn ignore_marks_flag_skips_mark_slots() {
        let album = album_with_traits(&[SlotTraits::BASE, SlotTraits::MARK, SlotTraits::BASE]);
        let mut loc = Locator::new(&album, LocatorGdef::default());
        loc.set_lookup_flag(LookupFlag::IGNORE_MARKS);
        assert!(loc.move_next(&album));
        assert_eq!(loc.current(), Some(0));
        assert!(loc.move_next(&album));
        assert_eq!(loc.current(), Some(2));
        assert!(!loc.move_next(&album));
    }

    #[test]
    fn feature_mask_filters_slots_not_tagged_for_this_feature() {
        let mut album = album_with_traits(&[SlotTraits::BASE, SlotTraits::BASE]);
        album.set_mask(0, 0x0001);
        album.set_mask(1, 0x0002);
        let mut loc = Locator::new(&album, LocatorGdef::default());
        loc.set_feature_mask(0x0001);
        assert!(loc.move_next(&album));
        assert_eq!(loc.current(), Some(0));
        assert!(!loc.move_next(&album));
    }

    #[test]
    fn removed_slots_are_never_legitimate() {
        let mut album = album_with_traits(&[SlotTraits::BASE, SlotTraits::BASE]);
        album.remove_at(0);
        let mut loc = Locator::new(&album, LocatorGdef::default());
        assert!(loc.move_next(&album));
        assert_eq!(loc.current(), Some(1));
    }

    #[test]
    fn get_after_and_get_before_peek_without_moving_the_cursor() {
        let album = album_with_traits(&[SlotTraits::BASE, SlotTraits::BASE, SlotTraits::BASE]);
        let loc = Locator::new(&album, LocatorGdef::default());
        assert_eq!(loc.get_after(&album, 0), Some(1));
        assert_eq!(loc.get_before(&album, 2), Some(1));
        assert_eq!(loc.current(), None);
    }

    #[test]
    fn resync_resets_after_the_album_is_mutated() {
        let mut album = album_with_traits(&[SlotTraits::BASE, SlotTraits::BASE]);
        let mut loc = Locator::new(&album, LocatorGdef::default());
        assert!(loc.move_next(&album));
        album.remove_at(0);
        assert!(loc.move_next(&album));
        assert_eq!(loc.current(), Some(1));
    }
}
