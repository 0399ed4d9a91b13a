use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Discrete Map Stepper
/// Just evaluates x_{n+1} = f(x_n) and counts iterations.
pub struct DiscreteMap<T: Scalar> {
    tmp: Vec<T>,
}

impl<T: Scalar> DiscreteMap<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for DiscreteMap<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, step: &mut usize, state: &mut [T]) {
        system.apply(state, &mut self.tmp);
        state.copy_from_slice(&self.tmp);
        *step += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::DiscreteMap;
    use crate::traits::{DynamicalSystem, Steppable};

    struct Doubling;

    impl DynamicalSystem<f64> for Doubling {
        fn dimension(&self) -> usize {
            1
        }

        fn apply(&self, x: &[f64], out: &mut [f64]) {
            out[0] = 2.0 * x[0];
        }
    }

    #[test]
    fn discrete_map_iterates_and_counts_steps() {
        let mut stepper = DiscreteMap::new(1);
        let mut state = vec![1.0];
        let mut step = 0usize;
        for _ in 0..5 {
            stepper.step(&Doubling, &mut step, &mut state);
        }
        assert_eq!(step, 5);
        assert_eq!(state[0], 32.0);
    }
}
