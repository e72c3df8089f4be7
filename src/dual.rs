//! Scalars the field expression can be evaluated over.
//!
//! The energy field is written once, generically over [`Real`]. Evaluating it
//! with `f64` gives the plain field values; evaluating it with [`Dual`] seeded
//! on the query point gives the value together with its spatial gradient
//! (forward-mode automatic differentiation).

use lenia_common::Vec2;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Arithmetic needed by the field expression.
pub trait Real:
    Copy
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Lifts a constant (zero derivative).
    fn constant(value: f64) -> Self;
    fn value(&self) -> f64;
    fn exp(self) -> Self;
    fn sqrt(self) -> Self;
    /// `max(self, floor)`. At or below the floor the result is the constant
    /// `floor`, so no derivative flows through the clipped branch. NaN passes
    /// through unchanged.
    fn max_const(self, floor: f64) -> Self;

    fn square(self) -> Self {
        self * self
    }
}

impl Real for f64 {
    #[inline(always)]
    fn constant(value: f64) -> Self {
        value
    }
    #[inline(always)]
    fn value(&self) -> f64 {
        *self
    }
    #[inline(always)]
    fn exp(self) -> Self {
        f64::exp(self)
    }
    #[inline(always)]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
    #[inline(always)]
    fn max_const(self, floor: f64) -> Self {
        if self <= floor { floor } else { self }
    }
}

/// A value paired with its gradient with respect to a 2D point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Dual {
    pub value: f64,
    pub grad: Vec2,
}

impl Dual {
    pub fn new(value: f64, grad: Vec2) -> Self {
        Dual { value, grad }
    }

    /// Seeds the two coordinates of `point` as independent variables.
    pub fn variables(point: Vec2) -> (Dual, Dual) {
        (
            Dual::new(point.x, Vec2::new(1.0, 0.0)),
            Dual::new(point.y, Vec2::new(0.0, 1.0)),
        )
    }
}

impl Add for Dual {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Dual::new(self.value + rhs.value, self.grad + rhs.grad)
    }
}

impl Sub for Dual {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Dual::new(self.value - rhs.value, self.grad - rhs.grad)
    }
}

impl Mul for Dual {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Dual::new(
            self.value * rhs.value,
            self.grad * rhs.value + rhs.grad * self.value,
        )
    }
}

impl Div for Dual {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / rhs.value;
        Dual::new(
            self.value * inv,
            (self.grad * rhs.value - rhs.grad * self.value) * (inv * inv),
        )
    }
}

impl Neg for Dual {
    type Output = Self;
    fn neg(self) -> Self {
        Dual::new(-self.value, -self.grad)
    }
}

impl Real for Dual {
    fn constant(value: f64) -> Self {
        Dual::new(value, Vec2::zero())
    }

    fn value(&self) -> f64 {
        self.value
    }

    fn exp(self) -> Self {
        let e = self.value.exp();
        Dual::new(e, self.grad * e)
    }

    fn sqrt(self) -> Self {
        let s = self.value.sqrt();
        Dual::new(s, self.grad * (0.5 / s))
    }

    fn max_const(self, floor: f64) -> Self {
        if self.value <= floor { Dual::constant(floor) } else { self }
    }
}
