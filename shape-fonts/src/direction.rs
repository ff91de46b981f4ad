//! Text direction and output-ordering controls.

/// The writing direction a run is shaped in.
///
/// Any value other than `LeftToRight`/`RightToLeft` at the configuration
/// boundary collapses to `LeftToRight` — there is no vertical mode here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    LeftToRight,
    RightToLeft,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        matches!(self, TextDirection::RightToLeft)
    }
}

/// Whether the caller's codepoint sequence is already in visual (reversed)
/// order. `Backward` applies a second reversal at wrap-up, which cancels
/// out against an RTL script's own reversal when both apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    #[default]
    Forward,
    Backward,
}
