//! Parsers for the OpenType tables this engine consults directly: `cmap`,
//! `GDEF`, `GSUB`, `GPOS`, `hmtx`, and their shared layout substructures.

pub mod cmap;
pub mod context;
pub mod gdef;
pub mod gpos;
pub mod gsub;
pub mod hmtx;
pub mod layout;
pub mod script;
