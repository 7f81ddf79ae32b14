//! Fidelity metrics between simulated traces.
use itertools::Itertools;

use crate::error::SynError;

/// Returns the normalized root-mean-square error of a test series with respect to a reference series.
///
/// Both series are divided by the peak magnitude of the reference, then the squared error is
/// accumulated relative to the energy of the normalized reference:
/// `sqrt(sum((ref_n - test_n)^2) / sum(ref_n^2))`.
/// The score is zero for identical series and unbounded above.
///
/// Sums of squares are accumulated relative to the largest term, so finite inputs give a finite
/// score unless the score itself exceeds `f64::MAX`, in which case it is infinite.
///
/// # Errors
///
/// Fails if either series is empty or contains non-finite values, if the lengths differ, or if
/// the reference is zero everywhere.
///
/// # Examples
///
/// ```rust
/// use approx::assert_relative_eq;
/// use rusty_syn::core::metrics::nrmse;
///
/// let reference = [0.0, 2.0, 4.0, 2.0, 0.0];
///
/// assert_relative_eq!(nrmse(&reference, &reference).unwrap(), 0.0);
/// assert_relative_eq!(nrmse(&reference, &[0.0, 1.0, 2.0, 1.0, 0.0]).unwrap(), 0.5);
/// ```
pub fn nrmse(reference: &[f64], test: &[f64]) -> Result<f64, SynError> {
    if reference.is_empty() || test.is_empty() {
        return Err(SynError::EmptyInput(
            "both series must contain at least one sample".to_string(),
        ));
    }

    if reference.len() != test.len() {
        return Err(SynError::IncompatibleTraces(format!(
            "the reference has {} samples but the test has {}",
            reference.len(),
            test.len()
        )));
    }

    if reference.iter().chain(test.iter()).any(|x| !x.is_finite()) {
        return Err(SynError::InvalidParameter(
            "the series must only contain finite values".to_string(),
        ));
    }

    let (peak, sq_reference) = scaled_sum_of_squares(reference.iter().copied());
    if peak == 0.0 {
        return Err(SynError::DegenerateReference(
            "the reference is zero everywhere".to_string(),
        ));
    }

    // Halved differences cannot overflow
    let (half_peak_error, sq_error) = scaled_sum_of_squares(
        reference
            .iter()
            .zip_eq(test.iter())
            .map(|(x_ref, x_test)| 0.5 * x_ref - 0.5 * x_test),
    );

    Ok(2.0 * (half_peak_error / peak) * (sq_error / sq_reference).sqrt())
}

/// Returns the largest magnitude `m` of the values and the sum of `(x / m)^2`.
/// Both are zero if all values are.
fn scaled_sum_of_squares<I>(values: I) -> (f64, f64)
where
    I: Iterator<Item = f64> + Clone,
{
    let scale = values.clone().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if scale == 0.0 {
        return (0.0, 0.0);
    }
    (scale, values.map(|x| (x / scale).powi(2)).sum())
}
