//! JavaScript bindings for `recurrence_core`.

use recurrence_core::{
    closed_form_terms_with, evaluate, iterative_terms as core_iterative_terms, ClosedFormSettings,
    RecurrenceSpec, DEFAULT_RELATIVE_TOLERANCE,
};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

fn term_count(n: i32) -> anyhow::Result<usize> {
    if n < 0 {
        anyhow::bail!("invalid input: n must be non-negative, got {}.", n);
    }
    Ok(n as usize)
}

fn parse_settings(settings: JsValue) -> Result<ClosedFormSettings, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(ClosedFormSettings::default());
    }
    from_value(settings).map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))
}

/// Terms `a_0..=a_n` computed by direct iteration.
#[wasm_bindgen]
pub fn iterative_terms(
    coefficients: Vec<f64>,
    initial_terms: Vec<f64>,
    n: i32,
) -> Result<Vec<f64>, JsValue> {
    console_error_panic_hook::set_once();

    let n = term_count(n).map_err(|e| JsValue::from_str(&e.to_string()))?;
    core_iterative_terms(&coefficients, &initial_terms, n)
        .map_err(|e| JsValue::from_str(&format!("Iterative evaluation failed: {}", e)))
}

/// Terms `a_0..=a_n` from the closed form, serialized as `{ kind, value }` objects.
/// `settings` may be `undefined` to use the defaults.
#[wasm_bindgen]
pub fn closed_form_terms(
    coefficients: Vec<f64>,
    initial_terms: Vec<f64>,
    n: i32,
    settings: JsValue,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let n = term_count(n).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let settings = parse_settings(settings)?;
    let terms = closed_form_terms_with(&coefficients, &initial_terms, n, settings)
        .map_err(|e| JsValue::from_str(&format!("Closed-form evaluation failed: {}", e)))?;

    to_value(&terms).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

/// Both sequences, the roots, modal coefficients and their cross-check.
/// A non-positive `relative_tolerance` selects the default.
#[wasm_bindgen]
pub fn evaluate_recurrence(
    coefficients: Vec<f64>,
    initial_terms: Vec<f64>,
    n: i32,
    settings: JsValue,
    relative_tolerance: f64,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let n = term_count(n).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let settings = parse_settings(settings)?;
    let relative_tolerance = if relative_tolerance > 0.0 {
        relative_tolerance
    } else {
        DEFAULT_RELATIVE_TOLERANCE
    };

    let spec = RecurrenceSpec::new(coefficients, initial_terms)
        .map_err(|e| JsValue::from_str(&format!("Evaluation failed: {}", e)))?;
    let result = evaluate(&spec, n, settings, relative_tolerance)
        .map_err(|e| JsValue::from_str(&format!("Evaluation failed: {}", e)))?;

    to_value(&result).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
