pub mod closed_form;
pub mod cross_check;
pub mod recurrence;
pub mod solvers;
/// The `recurrence_core` crate evaluates constant-coefficient linear recurrences
/// two independent ways so the results can be checked against each other.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `DynamicalSystem` (discrete maps), `Steppable` (iterators).
/// - **Recurrence**: `RecurrenceSpec` and the term-by-term accumulator.
/// - **Closed form**: companion-matrix roots, Vandermonde fit of modal coefficients.
/// - **Cross check**: term-by-term agreement of the two sequences.
pub mod traits;

pub use closed_form::{
    characteristic_polynomial, characteristic_roots, closed_form_terms, closed_form_terms_with,
    ClosedForm, ClosedFormSettings, Term,
};
pub use cross_check::{cross_check, evaluate, CrossCheck, Evaluation, DEFAULT_RELATIVE_TOLERANCE};
pub use recurrence::{iterative_terms, RecurrenceError, RecurrenceSpec};
