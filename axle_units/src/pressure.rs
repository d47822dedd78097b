use std::ops::{Add, Sub};

/// Absolute (or gauge, after subtraction) pressure in pounds per square inch.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Psi(pub f64);

impl Psi {
    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Sub for Psi {
    type Output = Psi;

    /// Bag minus ambient yields gauge pressure.
    #[inline]
    fn sub(self, rhs: Psi) -> Psi {
        Psi(self.0 - rhs.0)
    }
}

impl Add for Psi {
    type Output = Psi;

    #[inline]
    fn add(self, rhs: Psi) -> Psi {
        Psi(self.0 + rhs.0)
    }
}

/// Weight in pounds.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Pounds(pub f64);

impl Pounds {
    #[inline]
    pub const fn get(self) -> f64 {
        self.0
    }

    /// Clamp negative weights to zero. NaN also maps to zero.
    #[inline]
    pub fn non_negative(self) -> Pounds {
        if self.0 > 0.0 { self } else { Pounds(0.0) }
    }
}

impl Add for Pounds {
    type Output = Pounds;

    #[inline]
    fn add(self, rhs: Pounds) -> Pounds {
        Pounds(self.0 + rhs.0)
    }
}

impl std::iter::Sum for Pounds {
    fn sum<I: Iterator<Item = Pounds>>(iter: I) -> Self {
        Pounds(iter.map(|p| p.0).sum())
    }
}
