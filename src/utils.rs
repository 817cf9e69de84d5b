//! Small numeric helpers shared by the coalition evaluator and aggregator.

/// Factorials up to this are looked up in a table; above it we fall back to
/// Stirling's approximation rather than overflow a fixed-width integer.
const FACTORIAL_LIMIT: usize = 21;
const FACTORIALS: [u64; FACTORIAL_LIMIT] = {
    let mut facts = [1u64; FACTORIAL_LIMIT];
    let mut i = 1;
    while i < FACTORIAL_LIMIT {
        facts[i] = facts[i - 1] * (i as u64);
        i += 1;
    }
    facts
};

/// n! as f64. Operator counts are capped well below `FACTORIAL_LIMIT`, but
/// the Stirling fallback keeps this total outside that cap.
pub(crate) fn factorial(n: usize) -> f64 {
    if n < FACTORIAL_LIMIT {
        FACTORIALS[n] as f64
    } else {
        let n_f64 = n as f64;
        (2.0 * std::f64::consts::PI * n_f64).sqrt() * (n_f64 / std::f64::consts::E).powf(n_f64)
    }
}
