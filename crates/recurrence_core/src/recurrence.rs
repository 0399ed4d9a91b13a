//! Recurrence definition and the iterative accumulator.
//!
//! A recurrence of order k is `a_n = c_1 a_{n-1} + ... + c_k a_{n-k}` with the
//! first k terms given. The accumulator treats it as a discrete map acting on
//! the window of the last k terms and iterates it with [`DiscreteMap`].

use serde::Serialize;
use thiserror::Error;

use crate::solvers::DiscreteMap;
use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Failures reported by the recurrence evaluators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecurrenceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("singular system: {0}")]
    SingularSystem(String),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;

/// A constant-coefficient linear recurrence with its initial terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurrenceSpec<T: Scalar> {
    coefficients: Vec<T>,
    initial_terms: Vec<T>,
}

impl<T: Scalar> RecurrenceSpec<T> {
    /// `coefficients[j]` multiplies `a_{n-1-j}`; `initial_terms` holds `a_0..a_{k-1}`.
    pub fn new(coefficients: Vec<T>, initial_terms: Vec<T>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(RecurrenceError::InvalidInput(
                "recurrence order must be at least 1 (no coefficients given).".to_string(),
            ));
        }
        if coefficients.len() != initial_terms.len() {
            return Err(RecurrenceError::InvalidInput(format!(
                "coefficient/initial term length mismatch: {} coefficients, {} initial terms.",
                coefficients.len(),
                initial_terms.len()
            )));
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(RecurrenceError::InvalidInput(
                "coefficients contain NaN or Inf values.".to_string(),
            ));
        }
        if initial_terms.iter().any(|a| !a.is_finite()) {
            return Err(RecurrenceError::InvalidInput(
                "initial terms contain NaN or Inf values.".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            initial_terms,
        })
    }

    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    pub fn coefficients(&self) -> &[T] {
        &self.coefficients
    }

    pub fn initial_terms(&self) -> &[T] {
        &self.initial_terms
    }

    /// Builds `a_0..=a_n` by direct application of the recurrence.
    ///
    /// For `n < k - 1` the initial terms are truncated to `n + 1` entries.
    pub fn iterative_terms(&self, n: usize) -> Result<Vec<T>> {
        let k = self.order();
        let len = n.checked_add(1).ok_or_else(|| {
            RecurrenceError::InvalidInput(format!("index {} exceeds the supported range.", n))
        })?;
        if len <= k {
            return Ok(self.initial_terms[..len].to_vec());
        }

        let mut terms = Vec::with_capacity(len);
        terms.extend_from_slice(&self.initial_terms);

        let mut window = self.initial_terms.clone();
        let mut stepper = DiscreteMap::new(k);
        let mut step = k - 1;
        while step < n {
            stepper.step(self, &mut step, &mut window);
            terms.push(window[k - 1]);
        }
        Ok(terms)
    }
}

/// The window map: state is `[a_{i-k}, ..., a_{i-1}]`, oldest first.
impl<T: Scalar> DynamicalSystem<T> for RecurrenceSpec<T> {
    fn dimension(&self) -> usize {
        self.order()
    }

    fn apply(&self, x: &[T], out: &mut [T]) {
        let k = self.order();
        let mut next = T::zero();
        for (j, &c) in self.coefficients.iter().enumerate() {
            next = next + c * x[k - 1 - j];
        }
        out[..k - 1].copy_from_slice(&x[1..]);
        out[k - 1] = next;
    }
}

/// Returns `a_0..=a_n` computed term by term.
pub fn iterative_terms<T: Scalar>(
    coefficients: &[T],
    initial_terms: &[T],
    n: usize,
) -> Result<Vec<T>> {
    let spec = RecurrenceSpec::new(coefficients.to_vec(), initial_terms.to_vec())?;
    spec.iterative_terms(n)
}
