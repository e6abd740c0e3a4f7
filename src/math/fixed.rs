use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

pub const FRACBITS: i32 = 16;
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// 16.16 fixed-point scalar, bit-compatible with classic map content.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed(pub i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(FRACUNIT);
    pub const MAX: Fixed = Fixed(i32::MAX);
    pub const MIN: Fixed = Fixed(i32::MIN);

    #[inline(always)]
    pub const fn from_int(v: i32) -> Self {
        Fixed(v << FRACBITS)
    }

    /// Truncates toward zero, like the legacy `FLOAT_TO_FIXED`.
    #[inline]
    pub fn from_f32(v: f32) -> Self {
        Fixed((v * FRACUNIT as f32) as i32)
    }

    #[inline(always)]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / FRACUNIT as f32
    }

    /// Integer part (floor).
    #[inline(always)]
    pub const fn to_int(self) -> i32 {
        self.0 >> FRACBITS
    }

    #[inline(always)]
    pub const fn abs(self) -> Self {
        Fixed(self.0.wrapping_abs())
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({})", self.to_f32())
    }
}

impl From<i32> for Fixed {
    fn from(v: i32) -> Self {
        Fixed::from_int(v)
    }
}

impl Add for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn add(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Fixed) {
        self.0 = self.0.wrapping_add(rhs.0);
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn sub(self, rhs: Fixed) -> Fixed {
        Fixed(self.0.wrapping_sub(rhs.0))
    }
}

impl SubAssign for Fixed {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Fixed) {
        self.0 = self.0.wrapping_sub(rhs.0);
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn neg(self) -> Fixed {
        Fixed(self.0.wrapping_neg())
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed(((self.0 as i64 * rhs.0 as i64) >> FRACBITS) as i32)
    }
}

impl Div for Fixed {
    type Output = Fixed;

    /// Saturates on overflow and on division by zero (legacy `FixedDiv`).
    fn div(self, rhs: Fixed) -> Fixed {
        if (self.0.unsigned_abs() >> 14) >= rhs.0.unsigned_abs() {
            return if (self.0 ^ rhs.0) < 0 { Fixed::MIN } else { Fixed::MAX };
        }
        Fixed((((self.0 as i64) << FRACBITS) / rhs.0 as i64) as i32)
    }
}
