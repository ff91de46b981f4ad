//! Error types at the shaping boundary.
//!
//! [`crate::data::ReadError`] is the failure type for the table-parsing
//! layer; [`ShapingError`] is what callers of [`crate::shape`] see. A
//! lookup-level failure (bad subtable, recursion limit) never reaches
//! here — it is logged and the offending lookup is skipped. Only a
//! structural font failure aborts the whole call.

pub use crate::data::ReadError;

#[derive(Debug, thiserror::Error)]
pub enum ShapingError {
    #[error("font data is invalid or missing a required table: {0}")]
    InvalidFontData(#[from] ReadError),
}
