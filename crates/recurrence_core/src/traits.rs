use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// A trait for types that can be used as sequence values.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Represents a discrete dynamical system `x_{n+1} = f(x_n)`.
pub trait DynamicalSystem<T: Scalar> {
    /// Returns the dimension of the state space.
    fn dimension(&self) -> usize;

    /// Evaluates the map.
    /// x: current state
    /// out: buffer to write x_{n+1}
    fn apply(&self, x: &[T], out: &mut [T]);
}

/// A trait for steppers that advance a system by one iteration.
pub trait Steppable<T: Scalar> {
    /// Performs one iteration, updating `state` in place and bumping `step`.
    fn step(&mut self, system: &impl DynamicalSystem<T>, step: &mut usize, state: &mut [T]);
}
