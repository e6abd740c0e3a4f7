use std::ops::{Add, Neg, Sub};

/// Binary angle measure: the full turn maps onto the whole `u32` range, so
/// every add/sub wraps for free. 0 = east, counter-clockwise positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bam(pub u32);

pub const ANG45: Bam = Bam(0x2000_0000);
pub const ANG90: Bam = Bam(0x4000_0000);
pub const ANG180: Bam = Bam(0x8000_0000);
pub const ANG270: Bam = Bam(0xC000_0000);

const BAM_PER_RADIAN: f64 = 4_294_967_296.0 / std::f64::consts::TAU;

impl Bam {
    pub fn from_radians(rad: f32) -> Self {
        let turns = (rad as f64).rem_euclid(std::f64::consts::TAU);
        Bam((turns * BAM_PER_RADIAN) as u64 as u32)
    }

    #[inline]
    pub fn from_degrees(deg: f32) -> Self {
        Self::from_radians(deg.to_radians())
    }

    /// Radians in `[0, 2π)`.
    #[inline]
    pub fn to_radians(self) -> f32 {
        (self.0 as f64 / BAM_PER_RADIAN) as f32
    }

    /// Radians in `(-π, π]`, for angles relative to a view direction.
    #[inline]
    pub fn to_signed_radians(self) -> f32 {
        (self.0 as i32 as f64 / BAM_PER_RADIAN) as f32
    }

    /// Angle of the vector `(dx, dy)`; the zero vector yields 0.
    pub fn of_vector(dx: f32, dy: f32) -> Self {
        if dx == 0.0 && dy == 0.0 {
            return Bam(0);
        }
        Self::from_radians(dy.atan2(dx))
    }

    pub fn sin_cos(self) -> (f32, f32) {
        self.to_radians().sin_cos()
    }

    /// Which of `repeats` equal arcs around the circle `self` lies in,
    /// scaled onto `width` texture columns.
    #[inline]
    pub fn wrap_to_columns(self, repeats: u32, width: u32) -> u32 {
        if width == 0 {
            return 0;
        }
        let col = (self.0 as u64 * repeats as u64 * width as u64) >> 32;
        (col % width as u64) as u32
    }
}

impl Add for Bam {
    type Output = Bam;
    #[inline(always)]
    fn add(self, rhs: Bam) -> Bam {
        Bam(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Bam {
    type Output = Bam;
    #[inline(always)]
    fn sub(self, rhs: Bam) -> Bam {
        Bam(self.0.wrapping_sub(rhs.0))
    }
}

impl Neg for Bam {
    type Output = Bam;
    #[inline(always)]
    fn neg(self) -> Bam {
        Bam(self.0.wrapping_neg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    /// f32 radians carry ~1e-7 error, a few hundred BAM units.
    fn close(a: Bam, b: Bam) -> bool {
        (a - b).0.min((b - a).0) < 512
    }

    #[test]
    fn quarter_turns() {
        assert!(close(Bam::from_radians(FRAC_PI_2), ANG90));
        assert!(close(Bam::from_degrees(180.0), ANG180));
        assert!((ANG270.to_radians() - 1.5 * PI).abs() < 1e-5);
    }

    #[test]
    fn wraps_around() {
        assert_eq!(ANG270 + ANG180, ANG90);
        assert_eq!(Bam(0) - ANG90, ANG270);
        assert!((ANG270.to_signed_radians() + FRAC_PI_2).abs() < 1e-5);
        assert!((Bam::from_radians(-FRAC_PI_2).to_radians() - 1.5 * PI).abs() < 1e-5);
        assert!((Bam::from_radians(TAU + 0.25).to_radians() - 0.25).abs() < 1e-5);
    }

    #[test]
    fn vector_angles() {
        assert_eq!(Bam::of_vector(1.0, 0.0), Bam(0));
        assert!(close(Bam::of_vector(0.0, 3.0), ANG90));
        assert!(close(Bam::of_vector(-2.0, 0.0), ANG180));
    }

    #[test]
    fn sky_columns_repeat_four_times() {
        // 256-wide sky repeated 4x matches `(angle >> 22) & 0xFF`
        for a in [0u32, 0x0040_0000, 0x1234_5678, 0x8000_0000, 0xFFFF_FFFF] {
            assert_eq!(Bam(a).wrap_to_columns(4, 256), (a >> 22) & 0xFF);
        }
        assert_eq!(ANG90.wrap_to_columns(4, 256), 0);
    }
}
