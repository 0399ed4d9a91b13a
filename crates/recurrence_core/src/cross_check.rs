//! Term-by-term comparison of the two evaluation methods.

use num_complex::Complex;
use serde::Serialize;

use crate::closed_form::{ClosedForm, ClosedFormSettings, Term};
use crate::recurrence::{RecurrenceError, RecurrenceSpec, Result};

/// Relative tolerance expected for well-separated roots.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize)]
pub struct CrossCheck {
    /// Number of indices compared (the shorter of the two inputs).
    pub compared: usize,
    pub max_abs_error: f64,
    /// Error scaled by `max(1, |iterative|)`.
    pub max_rel_error: f64,
    pub worst_index: Option<usize>,
    pub relative_tolerance: f64,
    pub agrees: bool,
}

/// Compares iterative values against closed-form terms over their common prefix.
/// A non-finite value on either side counts as an infinite error.
pub fn cross_check(
    iterative: &[f64],
    closed_form: &[Term],
    relative_tolerance: f64,
) -> CrossCheck {
    let mut max_abs_error = 0.0_f64;
    let mut max_rel_error = 0.0_f64;
    let mut worst_index = None;

    for (idx, (&exact, term)) in iterative.iter().zip(closed_form).enumerate() {
        let closed = term.to_complex();
        let finite = exact.is_finite() && closed.re.is_finite() && closed.im.is_finite();
        let (error, rel) = if finite {
            let error = (closed - Complex::new(exact, 0.0)).norm();
            (error, error / exact.abs().max(1.0))
        } else {
            (f64::INFINITY, f64::INFINITY)
        };
        max_abs_error = max_abs_error.max(error);
        if worst_index.is_none() || rel > max_rel_error {
            max_rel_error = rel;
            worst_index = Some(idx);
        }
    }

    let compared = iterative.len().min(closed_form.len());
    CrossCheck {
        compared,
        max_abs_error,
        max_rel_error,
        worst_index,
        relative_tolerance,
        agrees: max_abs_error.is_finite() && max_rel_error <= relative_tolerance,
    }
}

/// Both sequences plus the closed-form decomposition and their comparison.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub iterative: Vec<f64>,
    pub closed_form: Vec<Term>,
    pub roots: Vec<Complex<f64>>,
    pub modal_coefficients: Vec<Complex<f64>>,
    pub check: CrossCheck,
}

/// Runs both methods up to `n` and compares them.
pub fn evaluate(
    spec: &RecurrenceSpec<f64>,
    n: usize,
    settings: ClosedFormSettings,
    relative_tolerance: f64,
) -> Result<Evaluation> {
    if !(relative_tolerance.is_finite() && relative_tolerance > 0.0) {
        return Err(RecurrenceError::InvalidInput(
            "relative_tolerance must be positive.".to_string(),
        ));
    }
    let iterative = spec.iterative_terms(n)?;
    let closed = ClosedForm::new(spec, settings)?;
    let closed_form = closed.terms(n)?;
    let check = cross_check(&iterative, &closed_form, relative_tolerance);
    Ok(Evaluation {
        iterative,
        closed_form,
        roots: closed.roots,
        modal_coefficients: closed.modal_coefficients,
        check,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_sequences_agree() {
        let check = cross_check(&[1.0, 2.0], &[Term::Real(1.0), Term::Real(2.0)], 1e-6);
        assert_eq!(check.compared, 2);
        assert_eq!(check.max_abs_error, 0.0);
        assert!(check.agrees);
    }

    #[test]
    fn reports_worst_index() {
        let check = cross_check(
            &[1.0, 1000.0, 3.0],
            &[Term::Real(1.0), Term::Real(1000.5), Term::Real(3.1)],
            1e-6,
        );
        assert_eq!(check.worst_index, Some(2));
        assert!((check.max_abs_error - 0.5).abs() < 1e-12);
        assert!((check.max_rel_error - 0.1 / 3.0).abs() < 1e-12);
        assert!(!check.agrees);
    }

    #[test]
    fn complex_terms_count_their_imaginary_part() {
        let check = cross_check(&[2.0], &[Term::Complex(Complex::new(2.0, 0.5))], 1e-6);
        assert!((check.max_abs_error - 0.5).abs() < 1e-12);
        assert!(!check.agrees);
    }

    #[test]
    fn nan_terms_never_agree() {
        let check = cross_check(&[2.0, 3.0], &[Term::Real(f64::NAN), Term::Real(3.0)], 1e-6);
        assert!(!check.agrees);
        assert_eq!(check.worst_index, Some(0));
    }

    #[test]
    fn overflowed_iterative_terms_never_agree() {
        let check = cross_check(
            &[1.0, f64::INFINITY],
            &[Term::Real(1.0), Term::Real(f64::NAN)],
            1e-6,
        );
        assert!(!check.agrees);
        assert_eq!(check.worst_index, Some(1));
        assert_eq!(check.max_rel_error, f64::INFINITY);
    }

    #[test]
    fn matching_infinities_never_agree() {
        let check = cross_check(&[f64::INFINITY], &[Term::Real(f64::INFINITY)], 1e-6);
        assert!(!check.agrees);
        assert_eq!(check.max_abs_error, f64::INFINITY);
    }

    #[test]
    fn compares_common_prefix() {
        let check = cross_check(&[1.0, 2.0, 3.0], &[Term::Real(1.0)], 1e-6);
        assert_eq!(check.compared, 1);
        assert!(check.agrees);
    }

    #[test]
    fn evaluate_bundles_both_methods() {
        let spec = RecurrenceSpec::new(vec![1.0, 1.0], vec![0.0, 1.0]).unwrap();
        let eval = evaluate(
            &spec,
            20,
            ClosedFormSettings::default(),
            DEFAULT_RELATIVE_TOLERANCE,
        )
        .unwrap();
        assert_eq!(eval.iterative.len(), 21);
        assert_eq!(eval.closed_form.len(), 21);
        assert_eq!(eval.roots.len(), 2);
        assert!(eval.check.agrees, "{:?}", eval.check);
    }

    #[test]
    fn evaluate_rejects_bad_tolerance() {
        let spec = RecurrenceSpec::new(vec![2.0], vec![1.0]).unwrap();
        let err = evaluate(&spec, 3, ClosedFormSettings::default(), 0.0).unwrap_err();
        assert!(matches!(err, RecurrenceError::InvalidInput(_)));
    }
}
