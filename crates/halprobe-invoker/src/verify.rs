//! Comparison of actual results against expectations.

use halprobe_types::VariableValue;

use crate::error::VerifyError;
use crate::marshal::NativeEnum;

/// Checks that `actual` holds exactly as many results as `expected`.
///
/// # Errors
///
/// Returns [`VerifyError::CountMismatch`] when the counts differ.
pub const fn check_count(
    expected: &[VariableValue],
    actual: &[VariableValue],
) -> Result<(), VerifyError> {
    if expected.len() == actual.len() {
        Ok(())
    } else {
        Err(VerifyError::CountMismatch {
            expected: expected.len(),
            actual: actual.len(),
        })
    }
}

/// Compares results pairwise by tag and value.
///
/// Enums match when both type name and underlying value are equal; vectors
/// match element by element in order. A count mismatch fails before any
/// value is inspected.
///
/// # Errors
///
/// Returns [`VerifyError::CountMismatch`] or the first
/// [`VerifyError::ValueMismatch`].
pub fn compare_results(
    expected: &[VariableValue],
    actual: &[VariableValue],
) -> Result<(), VerifyError> {
    check_count(expected, actual)?;
    match expected
        .iter()
        .zip(actual)
        .position(|(want, got)| want != got)
    {
        Some(index) => Err(VerifyError::ValueMismatch { index }),
        None => Ok(()),
    }
}

/// Compares results that are all members of the native enum `E`.
///
/// Both sides are decoded first, so the comparison uses the native type's
/// equality.
///
/// # Errors
///
/// Returns [`VerifyError::CountMismatch`], [`VerifyError::Undecodable`]
/// when either side names no member of `E`, or
/// [`VerifyError::ValueMismatch`].
pub fn compare_enums<E: NativeEnum>(
    expected: &[VariableValue],
    actual: &[VariableValue],
) -> Result<(), VerifyError> {
    check_count(expected, actual)?;
    for (index, (want, got)) in expected.iter().zip(actual).enumerate() {
        let decode = |value: &VariableValue| {
            E::from_value(index, value).map_err(|source| VerifyError::Undecodable { index, source })
        };
        if decode(want)? != decode(got)? {
            return Err(VerifyError::ValueMismatch { index });
        }
    }
    Ok(())
}
