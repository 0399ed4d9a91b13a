//! Prints both sequences for a recurrence and compares one term.
//!
//! Usage: `recurrence_demo [coefficients] [initial_terms] [n] [index]`, with
//! comma-separated lists. Defaults to `a_n = 3a_{n-1} - 2a_{n-2}`, `a_0 = 2`,
//! `a_1 = 3`, terms up to `a_15`, comparing `a_10`.

use anyhow::{bail, Context, Result};
use recurrence_core::{
    evaluate, ClosedFormSettings, RecurrenceSpec, Term, DEFAULT_RELATIVE_TOLERANCE,
};

fn parse_list(raw: &str, what: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("Invalid {what} entry \"{s}\"."))
        })
        .collect()
}

fn format_term(term: &Term) -> String {
    match term {
        Term::Real(v) => format!("{v}"),
        Term::Complex(z) => format!("{z}"),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() == 1 || args.len() > 4 {
        bail!("Usage: recurrence_demo [coefficients initial_terms [n [index]]]");
    }

    let (coefficients, initial_terms) = if args.is_empty() {
        (vec![3.0, -2.0], vec![2.0, 3.0])
    } else {
        (
            parse_list(&args[0], "coefficient")?,
            parse_list(&args[1], "initial term")?,
        )
    };
    let n = match args.get(2) {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("n must be a non-negative integer, got \"{raw}\"."))?,
        None => 15,
    };
    let index = match args.get(3) {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("index must be a non-negative integer, got \"{raw}\"."))?,
        None => 10.min(n),
    };
    if index > n {
        bail!("index {index} is beyond the last computed term {n}.");
    }

    let spec = RecurrenceSpec::new(coefficients, initial_terms)?;
    let eval = evaluate(
        &spec,
        n,
        ClosedFormSettings::default(),
        DEFAULT_RELATIVE_TOLERANCE,
    )
    .context("Closed-form evaluation failed.")?;

    let closed: Vec<String> = eval.closed_form.iter().map(format_term).collect();
    println!("Iterative first {} terms: {:?}", n + 1, eval.iterative);
    println!("Closed-form first {} terms: [{}]", n + 1, closed.join(", "));
    println!("Iterative a{index} = {}", eval.iterative[index]);
    println!("Closed-form a{index} = {}", closed[index]);
    println!(
        "Max relative error {:.3e} (agrees: {})",
        eval.check.max_rel_error, eval.check.agrees
    );
    Ok(())
}
