#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use rand::Rng;

use crate::error::InternalError;

/// Shuffles `items` in place with the Fisher–Yates algorithm.
///
/// * `items`: the slice to permute
/// * `rng`: source of randomness, pass a seeded rng for reproducible output
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Splits `items` into consecutive chunks of `size`. The last chunk holds
/// whatever is left over.
///
/// * `size`: number of items per chunk, must be at least 1
/// * `items`: the items to split, order is preserved
pub fn partition<T: Clone>(size: usize, items: &[T]) -> Result<Vec<Vec<T>>, InternalError> {
    if size < 1 {
        return Err(InternalError::InvalidArgument(format!(
            "Chunk size must be at least 1, got {size}."
        )));
    }

    Ok(items.chunks(size).map(<[T]>::to_vec).collect())
}

/// Formats a fractional score as a whole percentage, eg. `0.734` -> `73%`.
pub fn format_score(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}
