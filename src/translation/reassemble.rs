/*!
 * Result reassembly.
 *
 * Flattens per-batch results, already in batch creation order, back into one
 * sequence aligned with the original input.
 */

use crate::errors::TranslationError;

use super::retry::{BatchResult, BatchStatus};

/// Check that `results` are exactly batches `0..n` in order
fn check_order(results: &[BatchResult]) -> Result<(), TranslationError> {
    for (position, result) in results.iter().enumerate() {
        if result.batch_index != position {
            return Err(TranslationError::OutOfOrder {
                position,
                batch_index: result.batch_index,
            });
        }
    }
    Ok(())
}

/// Concatenate batch results into the final output
///
/// `expected_len` is the number of input records; any other output length is
/// a structural failure rather than something to pad or truncate.
pub fn flatten(results: Vec<BatchResult>, expected_len: usize) -> Result<Vec<String>, TranslationError> {
    check_order(&results)?;

    let output: Vec<String> = results.into_iter().flat_map(|r| r.texts).collect();

    if output.len() != expected_len {
        return Err(TranslationError::LengthMismatch {
            expected: expected_len,
            actual: output.len(),
        });
    }

    Ok(output)
}

/// Expand per-batch statuses to one status per record
pub fn flatten_statuses(results: &[BatchResult]) -> Vec<BatchStatus> {
    results
        .iter()
        .flat_map(|r| std::iter::repeat_n(r.status, r.texts.len()))
        .collect()
}
