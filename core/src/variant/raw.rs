use core::fmt;
use core::mem::{align_of, size_of};

use static_assertions::assert_eq_size;

/// The inline payload buffer of a [`Variant`](super::Variant).
///
/// Which field is meaningful depends on the cell's slot: an encoded cell
/// carries a packed value, a wrapped cell carries its encoding id in
/// `words[0]`, and null or boxed cells carry zeros.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawBits {
    pub int_value: i64,
    pub uint_value: u64,
    pub float_value: f64,
    pub words: [u64; 2],
}

assert_eq_size!(RawBits, [u64; 2]);

impl RawBits {
    /// Width in bytes of the widest inline payload.
    pub const WIDTH: usize = size_of::<RawBits>();

    pub const ZERO: RawBits = RawBits { words: [0, 0] };

    /// Whether values of `T` can be stored inline.
    pub const fn fits<T>() -> bool {
        size_of::<T>() <= Self::WIDTH && align_of::<T>() <= align_of::<RawBits>()
    }

    pub(crate) const fn from_uint(value: u64) -> Self {
        RawBits { words: [value, 0] }
    }

    /// Copies `value` into a fresh zeroed buffer.
    pub(crate) fn pack<T: Copy>(value: T) -> Self {
        assert!(Self::fits::<T>(), "value does not fit inline");
        let mut raw = RawBits::ZERO;
        // SAFETY: `T` fits in the buffer (checked above) and `RawBits` is at
        // least as aligned as `T`.
        unsafe { core::ptr::write(&mut raw as *mut RawBits as *mut T, value) };
        raw
    }

    /// Reads back a value stored by [`RawBits::pack`].
    ///
    /// # Safety
    ///
    /// The buffer must have been produced by `pack::<T>` for the same `T`.
    pub(crate) unsafe fn unpack<T: Copy>(&self) -> T {
        unsafe { core::ptr::read(self as *const RawBits as *const T) }
    }

    /// The integer stored by [`RawBits::from_uint`].
    ///
    /// Only meaningful for buffers built with `from_uint`.
    pub(crate) fn uint(&self) -> u64 {
        // SAFETY: every buffer built by `from_uint` or `ZERO` has both words
        // initialized.
        unsafe { self.words[0] }
    }
}

impl fmt::Debug for RawBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Packed payloads may contain padding, so the bytes are not printed.
        f.write_str("RawBits { .. }")
    }
}
