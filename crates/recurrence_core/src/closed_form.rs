//! Characteristic-root evaluator.
//!
//! Factors `x^k - c_1 x^{k-1} - ... - c_k`, fits modal coefficients to the
//! initial terms through a Vandermonde solve and evaluates
//! `a_m = sum_i alpha_i * r_i^m`. Repeated roots are reported as
//! [`RecurrenceError::SingularSystem`]; no polynomial-in-n basis is built.

use nalgebra::linalg::SVD;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::recurrence::{RecurrenceError, RecurrenceSpec, Result};

const POLISH_STEPS: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClosedFormSettings {
    /// Values with `|im|` below this are reported as real.
    pub imaginary_tolerance: f64,
    /// A pair of nearest-neighbour roots counts as one repeated root when
    /// `|p(c)|` at their midpoint `c` is within `multiplicity_tolerance`
    /// rounding units of `sum_l max(|a_l|, 1) |c|^l`.
    pub multiplicity_tolerance: f64,
    /// Smallest accepted `sigma_min / sigma_max` of the Vandermonde matrix.
    pub min_reciprocal_condition: f64,
}

impl Default for ClosedFormSettings {
    fn default() -> Self {
        Self {
            imaginary_tolerance: 1e-9,
            multiplicity_tolerance: 100.0,
            min_reciprocal_condition: 1e-12,
        }
    }
}

impl ClosedFormSettings {
    fn validate(&self) -> Result<()> {
        if !(self.imaginary_tolerance.is_finite() && self.imaginary_tolerance > 0.0) {
            return Err(RecurrenceError::InvalidInput(
                "imaginary_tolerance must be positive.".to_string(),
            ));
        }
        if !(self.multiplicity_tolerance.is_finite() && self.multiplicity_tolerance >= 0.0) {
            return Err(RecurrenceError::InvalidInput(
                "multiplicity_tolerance must be non-negative.".to_string(),
            ));
        }
        if !(self.min_reciprocal_condition.is_finite() && self.min_reciprocal_condition >= 0.0) {
            return Err(RecurrenceError::InvalidInput(
                "min_reciprocal_condition must be non-negative.".to_string(),
            ));
        }
        Ok(())
    }
}

/// A closed-form sequence value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Term {
    Real(f64),
    Complex(Complex<f64>),
}

impl Term {
    /// Drops the imaginary part when it is below `tolerance`.
    pub fn classify(value: Complex<f64>, tolerance: f64) -> Self {
        if value.im.abs() < tolerance {
            Term::Real(value.re)
        } else {
            Term::Complex(value)
        }
    }

    pub fn re(&self) -> f64 {
        match self {
            Term::Real(v) => *v,
            Term::Complex(z) => z.re,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            Term::Real(v) => Some(*v),
            Term::Complex(_) => None,
        }
    }

    pub fn to_complex(&self) -> Complex<f64> {
        match self {
            Term::Real(v) => Complex::new(*v, 0.0),
            Term::Complex(z) => *z,
        }
    }
}

/// Characteristic polynomial coefficients, highest degree first: `[1, -c_1, ..., -c_k]`.
pub fn characteristic_polynomial(coefficients: &[f64]) -> Vec<f64> {
    let mut poly = Vec::with_capacity(coefficients.len() + 1);
    poly.push(1.0);
    poly.extend(coefficients.iter().map(|c| -c));
    poly
}

/// Roots of the characteristic polynomial, in solver order.
///
/// Computed as the eigenvalues of the companion matrix, then polished with
/// Newton steps that are kept only while they shrink `|p(r)|`.
pub fn characteristic_roots(coefficients: &[f64]) -> Result<Vec<Complex<f64>>> {
    let k = coefficients.len();
    if k == 0 {
        return Err(RecurrenceError::InvalidInput(
            "recurrence order must be at least 1 (no coefficients given).".to_string(),
        ));
    }
    if k == 1 {
        return Ok(vec![Complex::new(coefficients[0], 0.0)]);
    }

    let mut companion = DMatrix::<f64>::zeros(k, k);
    for (j, &c) in coefficients.iter().enumerate() {
        companion[(0, j)] = c;
    }
    for i in 1..k {
        companion[(i, i - 1)] = 1.0;
    }

    let poly = characteristic_polynomial(coefficients);
    let roots = companion
        .complex_eigenvalues()
        .iter()
        .map(|&r| polish_root(&poly, r))
        .collect::<Vec<_>>();

    if roots.iter().any(|r| !r.re.is_finite() || !r.im.is_finite()) {
        return Err(RecurrenceError::SingularSystem(
            "root finding produced non-finite roots.".to_string(),
        ));
    }
    Ok(roots)
}

fn polish_root(poly: &[f64], root: Complex<f64>) -> Complex<f64> {
    let mut current = root;
    let (mut value, mut deriv) = eval_with_derivative(poly, current);
    for _ in 0..POLISH_STEPS {
        if value.norm() == 0.0 || deriv.norm() <= f64::EPSILON {
            break;
        }
        let candidate = current - value / deriv;
        let (next_value, next_deriv) = eval_with_derivative(poly, candidate);
        if !(next_value.norm() < value.norm()) {
            break;
        }
        current = candidate;
        value = next_value;
        deriv = next_deriv;
    }
    current
}

/// Horner evaluation of `p(z)` and `p'(z)`.
fn eval_with_derivative(poly: &[f64], z: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
    let mut value = Complex::new(poly[0], 0.0);
    let mut deriv = Complex::new(0.0, 0.0);
    for &a in &poly[1..] {
        deriv = deriv * z + value;
        value = value * z + a;
    }
    (value, deriv)
}

/// `sum_l max(|a_l|, 1) |z|^l`: the size of `p(z)` that an eigen-solver
/// backward error of one rounding unit in the companion matrix can produce.
fn perturbation_scale(poly: &[f64], z: Complex<f64>) -> f64 {
    let r = z.norm();
    poly.iter().fold(0.0, |acc, a| acc * r + a.abs().max(1.0))
}

/// Rejects roots that are a split copy of one repeated root.
///
/// An m-fold root comes back from the eigen-solver as a cluster of radius
/// about `eps^(1/m)`, and the midpoint of its closest pair is a root of `p`
/// up to the solver's backward error. Distinct close roots leave
/// `|p(c)| ~ (gap / 2)^2 |q(c)|` at that midpoint. Only nearest neighbours are
/// paired, so no third root can sit on the midpoint.
fn check_repeated_roots(poly: &[f64], roots: &[Complex<f64>], tolerance: f64) -> Result<()> {
    for (i, &root) in roots.iter().enumerate() {
        let nearest = roots
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .min_by(|a, b| {
                (a.1 - root)
                    .norm()
                    .partial_cmp(&(b.1 - root).norm())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        let Some((_, &other)) = nearest else {
            continue;
        };

        let centre = (root + other) * 0.5;
        let (value, _) = eval_with_derivative(poly, centre);
        let scale = perturbation_scale(poly, centre);
        if value.norm() <= tolerance * f64::EPSILON * scale {
            return Err(RecurrenceError::SingularSystem(format!(
                "characteristic roots {} and {} are one repeated root (|r_i - r_j| = {:.3e}); \
                 repeated roots are not supported by the closed form.",
                root,
                other,
                (root - other).norm()
            )));
        }
    }
    Ok(())
}

/// `V[m][i] = roots[i]^m` for `m = 0..k`.
pub fn vandermonde(roots: &[Complex<f64>]) -> DMatrix<Complex<f64>> {
    let k = roots.len();
    DMatrix::from_fn(k, k, |m, i| roots[i].powu(m as u32))
}

fn reciprocal_condition(matrix: &DMatrix<Complex<f64>>) -> f64 {
    let svd = SVD::new(matrix.clone(), false, false);
    let max = svd.singular_values.max();
    let min = svd.singular_values.min();
    if max > 0.0 {
        min / max
    } else {
        0.0
    }
}

fn index_exponent(m: usize) -> Result<u32> {
    u32::try_from(m).map_err(|_| {
        RecurrenceError::InvalidInput(format!("index {} exceeds the supported range.", m))
    })
}

/// Roots and modal coefficients of one recurrence.
#[derive(Debug, Clone, Serialize)]
pub struct ClosedForm {
    pub roots: Vec<Complex<f64>>,
    pub modal_coefficients: Vec<Complex<f64>>,
    imaginary_tolerance: f64,
}

impl ClosedForm {
    pub fn new(spec: &RecurrenceSpec<f64>, settings: ClosedFormSettings) -> Result<Self> {
        settings.validate()?;

        let roots = characteristic_roots(spec.coefficients())?;
        let poly = characteristic_polynomial(spec.coefficients());
        check_repeated_roots(&poly, &roots, settings.multiplicity_tolerance)?;

        let v = vandermonde(&roots);
        let rcond = reciprocal_condition(&v);
        if rcond < settings.min_reciprocal_condition {
            return Err(RecurrenceError::SingularSystem(format!(
                "Vandermonde matrix is numerically singular (reciprocal condition {:.3e}).",
                rcond
            )));
        }

        let rhs = DVector::from_iterator(
            spec.order(),
            spec.initial_terms().iter().map(|&a| Complex::new(a, 0.0)),
        );
        let alpha = v.lu().solve(&rhs).ok_or_else(|| {
            RecurrenceError::SingularSystem("Vandermonde matrix is singular.".to_string())
        })?;

        Ok(Self {
            roots,
            modal_coefficients: alpha.iter().copied().collect(),
            imaginary_tolerance: settings.imaginary_tolerance,
        })
    }

    /// The unclassified complex value `sum_i alpha_i * r_i^m`.
    pub fn value(&self, m: usize) -> Result<Complex<f64>> {
        let exp = index_exponent(m)?;
        Ok(self.value_at(exp))
    }

    fn value_at(&self, exp: u32) -> Complex<f64> {
        self.modal_coefficients
            .iter()
            .zip(&self.roots)
            .fold(Complex::new(0.0, 0.0), |acc, (alpha, root)| {
                acc + alpha * root.powu(exp)
            })
    }

    pub fn term(&self, m: usize) -> Result<Term> {
        Ok(Term::classify(self.value(m)?, self.imaginary_tolerance))
    }

    /// Terms `0..=n`.
    pub fn terms(&self, n: usize) -> Result<Vec<Term>> {
        let last = index_exponent(n)?;
        Ok((0..=last)
            .map(|m| Term::classify(self.value_at(m), self.imaginary_tolerance))
            .collect())
    }
}

/// Returns `a_0..=a_n` from the closed form with default settings.
pub fn closed_form_terms(
    coefficients: &[f64],
    initial_terms: &[f64],
    n: usize,
) -> Result<Vec<Term>> {
    closed_form_terms_with(coefficients, initial_terms, n, ClosedFormSettings::default())
}

pub fn closed_form_terms_with(
    coefficients: &[f64],
    initial_terms: &[f64],
    n: usize,
    settings: ClosedFormSettings,
) -> Result<Vec<Term>> {
    let spec = RecurrenceSpec::new(coefficients.to_vec(), initial_terms.to_vec())?;
    ClosedForm::new(&spec, settings)?.terms(n)
}
