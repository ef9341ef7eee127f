//! Signed 256-bit integer

use std::fmt;

use primitive_types::U256;

/// Signed 256-bit integer stored as sign and magnitude.
///
/// Zero is always non-negative, so two values compare equal exactly when
/// they denote the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct I256 {
    abs: U256,
    negative: bool,
}

impl I256 {
    /// Zero
    pub const ZERO: I256 = I256 {
        abs: U256::zero(),
        negative: false,
    };

    /// Create from magnitude and sign
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Absolute value
    pub fn abs(&self) -> U256 {
        self.abs
    }

    /// Check if negative
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Interpret a 256-bit word as a two's-complement signed value
    pub fn from_twos_complement(word: U256) -> Self {
        if word.bit(255) {
            let (abs, _) = (!word).overflowing_add(U256::one());
            Self::new(abs, true)
        } else {
            Self::new(word, false)
        }
    }

    /// Two's-complement representation sign-extended to 256 bits.
    ///
    /// Only meaningful when the value fits in 256 bits; see [`I256::fits_bits`].
    pub fn to_twos_complement(&self) -> U256 {
        if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        }
    }

    /// Check that the value lies in `[-2^(bits-1), 2^(bits-1))`
    pub fn fits_bits(&self, bits: usize) -> bool {
        if bits == 0 || bits > 256 {
            return false;
        }
        let bound = U256::one() << (bits - 1);
        if self.negative {
            self.abs <= bound
        } else {
            self.abs < bound
        }
    }

    /// Convert to i128 if the value fits
    pub fn to_i128(&self) -> Option<i128> {
        if self.abs.bits() > 128 {
            return None;
        }
        let abs = self.abs.low_u128();
        if self.negative {
            0i128.checked_sub_unsigned(abs)
        } else {
            i128::try_from(abs).ok()
        }
    }
}

impl From<i128> for I256 {
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl From<i64> for I256 {
    fn from(value: i64) -> Self {
        Self::from_i128(value.into())
    }
}

impl From<U256> for I256 {
    fn from(abs: U256) -> Self {
        Self::new(abs, false)
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}
