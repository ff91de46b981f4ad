//! A tiny hand-rolled bit-flags helper.
//!
//! `LookupFlag` is kind-of-but-not-quite-exactly a bit enumeration (the
//! top byte is a mark-attachment class, not independent bits), so it is
//! implemented by hand rather than through the `bitflags` crate. This
//! macro factors the repeated pattern out for `LookupFlag`, `ValueFormat`,
//! and the glyph buffer's slot traits/mask.

macro_rules! bitflags_u16 {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: u16 {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name(u16);

        impl $name {
            $(pub const $variant: $name = $name($value);)*

            pub const fn empty() -> Self {
                $name(0)
            }

            pub const fn from_bits_truncate(bits: u16) -> Self {
                $name(bits)
            }

            pub const fn bits(self) -> u16 {
                self.0
            }

            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                $name(self.0 & rhs.0)
            }
        }
    };
}

pub(crate) use bitflags_u16;
