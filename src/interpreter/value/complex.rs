use std::{fmt::Display, ops};

use num_traits::Float;

/// A complex number with real and imaginary parts of float type `T`.
///
/// The runtime uses two instantiations: `ComplexNumber<f32>` for `CFloat`
/// elements and `ComplexNumber<f64>` for `CDouble` elements.
///
/// Equality follows IEEE semantics on each part, so a value with a `NaN`
/// part is not equal to itself.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ComplexNumber<T> {
    /// The real part of the number.
    pub real:      T,
    /// The imaginary part of the number.
    pub imaginary: T,
}

impl<T: Float> ComplexNumber<T> {
    /// Constructs a new complex number from real and imaginary components.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::value::complex::ComplexNumber;
    ///
    /// let c = ComplexNumber::new(5.0, -1.0);
    /// assert_eq!(c.real, 5.0);
    /// assert_eq!(c.imaginary, -1.0);
    /// ```
    #[must_use]
    pub const fn new(real: T, imaginary: T) -> Self {
        Self { real, imaginary }
    }

    /// Constructs a complex number with a zero imaginary part.
    #[must_use]
    pub fn from_real(real: T) -> Self {
        Self { real,
               imaginary: T::zero() }
    }

    /// Constructs a complex number from its modulus and argument.
    #[must_use]
    pub fn from_polar(modulus: T, argument: T) -> Self {
        Self { real:      modulus * argument.cos(),
               imaginary: modulus * argument.sin(), }
    }

    /// Returns `true` if both parts are zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.real == T::zero() && self.imaginary == T::zero()
    }

    /// Returns the squared magnitude `re² + im²`.
    ///
    /// This is the key by which `max`, `min` and the ordering comparisons
    /// rank complex values.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::value::complex::ComplexNumber;
    ///
    /// assert_eq!(ComplexNumber::new(3.0, 4.0).norm_sqr(), 25.0);
    /// ```
    #[must_use]
    pub fn norm_sqr(&self) -> T {
        self.real.mul_add(self.real, self.imaginary * self.imaginary)
    }

    /// Returns the absolute value (magnitude) of the complex number.
    #[must_use]
    pub fn abs(&self) -> T {
        self.real.hypot(self.imaginary)
    }

    /// Returns the argument (phase angle) in radians.
    #[must_use]
    pub fn arg(&self) -> T {
        self.imaginary.atan2(self.real)
    }

    /// Returns the complex conjugate of the number.
    #[must_use]
    pub fn conj(&self) -> Self {
        Self { real:      self.real,
               imaginary: -self.imaginary, }
    }

    /// Returns the exponential of the complex number.
    #[must_use]
    pub fn exp(self) -> Self {
        Self::from_polar(self.real.exp(), self.imaginary)
    }

    /// Returns the principal natural logarithm of the complex number.
    #[must_use]
    pub fn ln(self) -> Self {
        Self { real:      self.abs().ln(),
               imaginary: self.arg(), }
    }

    /// Returns the principal square root.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::value::complex::ComplexNumber;
    ///
    /// let r = ComplexNumber::new(-4.0_f64, 0.0).sqrt();
    /// assert!(r.real.abs() < 1e-12);
    /// assert!((r.imaginary - 2.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn sqrt(self) -> Self {
        let two = T::one() + T::one();
        Self::from_polar(self.abs().sqrt(), self.arg() / two)
    }

    /// Returns the sine.
    #[must_use]
    pub fn sin(self) -> Self {
        Self { real:      self.real.sin() * self.imaginary.cosh(),
               imaginary: self.real.cos() * self.imaginary.sinh(), }
    }

    /// Returns the cosine.
    #[must_use]
    pub fn cos(self) -> Self {
        Self { real:      self.real.cos() * self.imaginary.cosh(),
               imaginary: -(self.real.sin() * self.imaginary.sinh()), }
    }

    /// Raises the number to a complex power, `exp(w · ln z)`.
    ///
    /// Zero raised to a power with a positive real part is zero, and
    /// anything raised to the zero power is one.
    ///
    /// # Example
    /// ```
    /// use luxcore::interpreter::value::complex::ComplexNumber;
    ///
    /// let i = ComplexNumber::new(0.0_f64, 1.0);
    /// let r = i.powc(ComplexNumber::from_real(2.0));
    /// assert!((r.real + 1.0).abs() < 1e-12);
    /// assert!(r.imaginary.abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn powc(self, exponent: Self) -> Self {
        if exponent.is_zero() {
            return Self::from_real(T::one());
        }
        if self.is_zero() {
            return if exponent.real > T::zero() {
                Self::default_zero()
            } else {
                Self::new(T::infinity(), T::zero())
            };
        }
        (exponent * self.ln()).exp()
    }

    /// Rounds both parts toward negative infinity.
    #[must_use]
    pub fn floor(self) -> Self {
        Self { real:      self.real.floor(),
               imaginary: self.imaginary.floor(), }
    }

    /// Returns the Gaussian integer nearest to this number.
    #[must_use]
    pub fn round(self) -> Self {
        Self { real:      self.real.round(),
               imaginary: self.imaginary.round(), }
    }

    fn default_zero() -> Self {
        Self { real:      T::zero(),
               imaginary: T::zero(), }
    }
}

impl<T: Float + Display> Display for ComplexNumber<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let zero = T::zero();
        if self.imaginary == zero {
            write!(f, "{}", self.real)
        } else if self.real == zero {
            write!(f, "{}i", self.imaginary)
        } else if self.imaginary > zero {
            write!(f, "{} + {}i", self.real, self.imaginary)
        } else {
            write!(f, "{} - {}i", self.real, -self.imaginary)
        }
    }
}

impl<T: Float> ops::Neg for ComplexNumber<T> {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self { real:      -self.real,
               imaginary: -self.imaginary, }
    }
}

impl<T: Float> ops::Add for ComplexNumber<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self { real:      self.real + rhs.real,
               imaginary: self.imaginary + rhs.imaginary, }
    }
}

impl<T: Float> ops::AddAssign for ComplexNumber<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Float> ops::Sub for ComplexNumber<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self { real:      self.real - rhs.real,
               imaginary: self.imaginary - rhs.imaginary, }
    }
}

impl<T: Float> ops::Mul for ComplexNumber<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self { real:      self.real
                              .mul_add(rhs.real, -(self.imaginary * rhs.imaginary)),
               imaginary: self.real.mul_add(rhs.imaginary, self.imaginary * rhs.real), }
    }
}

impl<T: Float> ops::Div for ComplexNumber<T> {
    type Output = Self;

    /// Complex division. Dividing by zero is not checked and yields
    /// non-finite parts.
    fn div(self, rhs: Self) -> Self::Output {
        let denom = rhs.norm_sqr();
        Self { real:      self.real.mul_add(rhs.real, self.imaginary * rhs.imaginary) / denom,
               imaginary: self.imaginary
                              .mul_add(rhs.real, -(self.real * rhs.imaginary))
                          / denom, }
    }
}

impl From<ComplexNumber<f32>> for ComplexNumber<f64> {
    fn from(value: ComplexNumber<f32>) -> Self {
        Self { real:      f64::from(value.real),
               imaginary: f64::from(value.imaginary), }
    }
}
