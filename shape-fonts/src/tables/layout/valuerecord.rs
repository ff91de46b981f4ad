//! GPOS `ValueRecord`: the positioning delta applied to a single glyph.
//!
//! Unlike most OpenType structures a `ValueRecord` is not self-describing —
//! its shape depends on an externally supplied `ValueFormat` bitmask, so it
//! cannot implement `FontRead` on its own; see [`ValueRecord::read`].

use crate::bitset::bitflags_u16;
use crate::data::{FontData, ReadError};

bitflags_u16! {
    /// Which fields are present in the record that follows.
    pub struct ValueFormat: u16 {
        const X_PLACEMENT = 0x0001;
        const Y_PLACEMENT = 0x0002;
        const X_ADVANCE = 0x0004;
        const Y_ADVANCE = 0x0008;
        const X_PLACEMENT_DEVICE = 0x0010;
        const Y_PLACEMENT_DEVICE = 0x0020;
        const X_ADVANCE_DEVICE = 0x0040;
        const Y_ADVANCE_DEVICE = 0x0080;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueRecord {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
}

impl ValueRecord {
    /// Reads a `ValueRecord` whose field layout is described by `format`,
    /// starting at `pos` in `data`. Returns the record and the number of
    /// bytes consumed. Device-table offsets are skipped over (parsed but
    /// ignored: no ppem/DPI is available at this layer).
    pub fn read(data: FontData<'_>, pos: usize, format: ValueFormat) -> Result<(Self, usize), ReadError> {
        let mut record = ValueRecord::default();
        let mut cursor = pos;
        let mut read_field = |present: bool, data: &FontData<'_>, cursor: &mut usize| -> Result<i16, ReadError> {
            if present {
                let v: i16 = data.read_at(*cursor)?;
                *cursor += 2;
                Ok(v)
            } else {
                Ok(0)
            }
        };
        record.x_placement = read_field(format.contains(ValueFormat::X_PLACEMENT), &data, &mut cursor)?;
        record.y_placement = read_field(format.contains(ValueFormat::Y_PLACEMENT), &data, &mut cursor)?;
        record.x_advance = read_field(format.contains(ValueFormat::X_ADVANCE), &data, &mut cursor)?;
        record.y_advance = read_field(format.contains(ValueFormat::Y_ADVANCE), &data, &mut cursor)?;
        // device table offsets: skip, we don't resolve them (no ppem at this layer).
        for flag in [
            ValueFormat::X_PLACEMENT_DEVICE,
            ValueFormat::Y_PLACEMENT_DEVICE,
            ValueFormat::X_ADVANCE_DEVICE,
            ValueFormat::Y_ADVANCE_DEVICE,
        ] {
            if format.contains(flag) {
                cursor += 2;
            }
        }
        Ok((record, cursor - pos))
    }

    pub fn is_null(&self) -> bool {
        *self == ValueRecord::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_only_the_fields_the_format_declares() {
        let mut bytes = vec![];
        bytes.extend((-80i16).to_be_bytes()); // xAdvance
        let format = ValueFormat::X_ADVANCE;
        let (record, consumed) = ValueRecord::read(FontData::new(&bytes), 0, format).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(record.x_advance, -80);
        assert_eq!(record.x_placement, 0);
        assert!(!record.is_null());
    }

    #[test]
    fn empty_format_yields_a_null_record_and_consumes_nothing() {
        let (record, consumed) = ValueRecord::read(FontData::new(&[]), 0, ValueFormat::empty()).unwrap();
        assert_eq!(consumed, 0);
        assert!(record.is_null());
    }

    #[test]
    fn device_table_offsets_are_skipped_but_not_read() {
        let mut bytes = vec![];
        bytes.extend(5i16.to_be_bytes()); // xPlacement
        bytes.extend(0u16.to_be_bytes()); // device offset, skipped
        let format = ValueFormat::X_PLACEMENT | ValueFormat::X_PLACEMENT_DEVICE;
        let (record, consumed) = ValueRecord::read(FontData::new(&bytes), 0, format).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(record.x_placement, 5);
    }
}
