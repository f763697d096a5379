//! Fixed-dimension vectors used for positions and forces
//!
//! The dimensionality is a const parameter, so a 2D simulation works on
//! `Vector<2>` and has no z component to read or write.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Axis names used in diagnostics
pub const AXES: [char; 3] = ['x', 'y', 'z'];

/// A point or displacement in `D`-dimensional space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const D: usize>(pub [f64; D]);

impl<const D: usize> Vector<D> {
    pub const ZERO: Self = Self([0.0; D]);

    /// Unit vector along `axis` (taken modulo `D`)
    pub fn axis(axis: usize) -> Self {
        let mut v = [0.0; D];
        v[axis % D] = 1.0;
        Self(v)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum()
    }

    pub fn norm_squared(&self) -> f64 {
        self.dot(self)
    }

    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// First non-finite component, if any, as `(axis index, value)`
    pub fn non_finite(&self) -> Option<(usize, f64)> {
        self.0
            .iter()
            .copied()
            .enumerate()
            .find(|(_, c)| !c.is_finite())
    }

    pub fn is_finite(&self) -> bool {
        self.non_finite().is_none()
    }

    /// Shrink the vector so its length does not exceed `max_len`
    pub fn clamp_length(self, max_len: f64) -> Self {
        let len = self.norm();
        if len > max_len && len > 0.0 {
            self * (max_len / len)
        } else {
            self
        }
    }

    pub fn component_min(&self, other: &Self) -> Self {
        let mut out = self.0;
        for (o, b) in out.iter_mut().zip(other.0.iter()) {
            *o = o.min(*b);
        }
        Self(out)
    }

    pub fn component_max(&self, other: &Self) -> Self {
        let mut out = self.0;
        for (o, b) in out.iter_mut().zip(other.0.iter()) {
            *o = o.max(*b);
        }
        Self(out)
    }
}

impl<const D: usize> Default for Vector<D> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const D: usize> Add for Vector<D> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<const D: usize> AddAssign for Vector<D> {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

impl<const D: usize> Sub for Vector<D> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<const D: usize> SubAssign for Vector<D> {
    fn sub_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
    }
}

impl<const D: usize> Mul<f64> for Vector<D> {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        for a in self.0.iter_mut() {
            *a *= rhs;
        }
        self
    }
}

impl<const D: usize> Neg for Vector<D> {
    type Output = Self;

    fn neg(self) -> Self {
        self * -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_componentwise() {
        let a = Vector([1.0, 2.0, 3.0]);
        let b = Vector([0.5, -1.0, 2.0]);
        assert_eq!(a + b, Vector([1.5, 1.0, 5.0]));
        assert_eq!(a - b, Vector([0.5, 3.0, 1.0]));
        assert_eq!(a * 2.0, Vector([2.0, 4.0, 6.0]));
        assert_eq!(-b, Vector([-0.5, 1.0, -2.0]));
    }

    #[test]
    fn norm_of_pythagorean_triple() {
        assert_eq!(Vector([3.0, 4.0]).norm(), 5.0);
    }

    #[test]
    fn clamp_length_keeps_direction() {
        let v = Vector([3.0, 4.0]).clamp_length(1.0);
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!((v.0[0] - 0.6).abs() < 1e-12);

        let short = Vector([0.1, 0.0]);
        assert_eq!(short.clamp_length(1.0), short);
    }

    #[test]
    fn axis_wraps_around_dimension() {
        assert_eq!(Vector::<2>::axis(0), Vector([1.0, 0.0]));
        assert_eq!(Vector::<2>::axis(3), Vector([0.0, 1.0]));
    }

    #[test]
    fn non_finite_reports_first_bad_axis() {
        assert_eq!(Vector([1.0, 2.0]).non_finite(), None);
        let bad = Vector([1.0, f64::INFINITY, f64::NAN]).non_finite();
        assert_eq!(bad, Some((1, f64::INFINITY)));
    }
}
