//! `Decimal64`: a 64-bit fixed-point decimal.
//!
//! The compact form exists so that the common decimal values (prices,
//! quantities, percentages) fit in a [`Variant`](crate::Variant) without
//! boxing the full 128-bit [`Decimal`]. Arithmetic is deliberately absent;
//! widen to [`Decimal`] to compute.
//!
//! # Layout
//!
//! ```text
//! 63                                                   5 4     0
//! ┌──────────────────────────────────────────────────────┬───────┐
//! │            mantissa (two's complement, 59 bits)      │ scale │
//! └──────────────────────────────────────────────────────┴───────┘
//! ```
//!
//! The value is `mantissa * 10^-scale`. Mantissa and scale are kept exactly as
//! given, so `1.50` and `1.5` are distinct representations of equal values.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use static_assertions::assert_eq_size;

use crate::errors::Error;

const SCALE_BITS: u32 = 5;
const SCALE_MASK: u64 = (1 << SCALE_BITS) - 1;

#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Decimal64(u64);

assert_eq_size!(Decimal64, u64);

impl Decimal64 {
    /// Largest representable mantissa.
    pub const MAX_MANTISSA: i64 = (1 << 58) - 1;
    /// Smallest representable mantissa.
    pub const MIN_MANTISSA: i64 = -Self::MAX_MANTISSA;
    /// Largest scale, matching [`Decimal`].
    pub const MAX_SCALE: u32 = 28;

    pub const ZERO: Decimal64 = Decimal64(0);

    /// Builds `mantissa * 10^-scale`, or `None` when either part is out of range.
    pub const fn try_new(mantissa: i64, scale: u32) -> Option<Self> {
        if mantissa < Self::MIN_MANTISSA || mantissa > Self::MAX_MANTISSA || scale > Self::MAX_SCALE
        {
            return None;
        }
        Some(Decimal64(((mantissa as u64) << SCALE_BITS) | scale as u64))
    }

    /// Builds `mantissa * 10^-scale`.
    ///
    /// # Panics
    ///
    /// Panics if the mantissa is outside `MIN_MANTISSA..=MAX_MANTISSA` or the
    /// scale exceeds `MAX_SCALE`. Use [`Decimal64::try_new`] for untrusted input.
    pub fn new(mantissa: i64, scale: u32) -> Self {
        match Self::try_new(mantissa, scale) {
            Some(value) => value,
            None => panic!(
                "Decimal64 out of range: mantissa {} scale {} (limits ±{}, scale ≤ {})",
                mantissa,
                scale,
                Self::MAX_MANTISSA,
                Self::MAX_SCALE
            ),
        }
    }

    pub const fn from_i64(value: i64) -> Option<Self> {
        Self::try_new(value, 0)
    }

    /// Compacts a [`Decimal`] without changing its mantissa or scale.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let mantissa = i64::try_from(value.mantissa()).ok()?;
        Self::try_new(mantissa, value.scale())
    }

    /// Reinterprets raw bits produced by [`Decimal64::to_bits`].
    pub const fn from_bits(bits: u64) -> Option<Self> {
        if bits & SCALE_MASK > Self::MAX_SCALE as u64 {
            return None;
        }
        Some(Decimal64(bits))
    }

    pub const fn to_bits(self) -> u64 {
        self.0
    }

    pub const fn mantissa(self) -> i64 {
        (self.0 as i64) >> SCALE_BITS
    }

    pub const fn scale(self) -> u32 {
        (self.0 & SCALE_MASK) as u32
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.mantissa(), self.scale())
    }

    pub fn to_f64(self) -> Option<f64> {
        self.to_decimal().to_f64()
    }
}

impl Default for Decimal64 {
    fn default() -> Self {
        Decimal64::ZERO
    }
}

impl From<Decimal64> for Decimal {
    fn from(value: Decimal64) -> Self {
        value.to_decimal()
    }
}

impl TryFrom<Decimal> for Decimal64 {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Decimal64::from_decimal(value).ok_or(Error::Overflow {
            mantissa: value.mantissa(),
            scale: value.scale(),
        })
    }
}

impl TryFrom<i64> for Decimal64 {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Decimal64::from_i64(value).ok_or(Error::Overflow {
            mantissa: value as i128,
            scale: 0,
        })
    }
}

impl PartialEq for Decimal64 {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 || self.to_decimal() == other.to_decimal()
    }
}

impl Eq for Decimal64 {}

impl PartialOrd for Decimal64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_decimal().cmp(&other.to_decimal())
    }
}

impl Hash for Decimal64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Decimal hashes its normalized form, which keeps 1.5 and 1.50 together.
        self.to_decimal().hash(state);
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_decimal(), f)
    }
}

impl fmt::Debug for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal64({})", self.to_decimal())
    }
}

impl FromStr for Decimal64 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value =
            Decimal::from_str(s.trim()).map_err(|_| Error::invalid_cast::<Decimal64>("str"))?;
        Decimal64::try_from(value)
    }
}
