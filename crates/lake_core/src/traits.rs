use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types the model functions can be evaluated in.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {
    /// Converts a model constant into this scalar type.
    /// Values that cannot be represented become NaN rather than panicking.
    fn constant(value: f64) -> Self {
        Self::from_f64(value).unwrap_or_else(Self::nan)
    }
}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// A one-dimensional autonomous flow `dx/dt = rate(x)`.
///
/// The root scanner only needs pointwise evaluation of the rate and its
/// derivative, so any scalar rate law can be analyzed through this seam.
pub trait RateFunction {
    /// Evaluates the rate of change at `state`.
    fn rate(&self, state: f64) -> f64;

    /// Evaluates d(rate)/d(state) at `state`.
    fn rate_derivative(&self, state: f64) -> f64;
}

impl<F: RateFunction + ?Sized> RateFunction for &F {
    fn rate(&self, state: f64) -> f64 {
        (**self).rate(state)
    }

    fn rate_derivative(&self, state: f64) -> f64 {
        (**self).rate_derivative(state)
    }
}
