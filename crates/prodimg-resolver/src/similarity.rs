//! Token-set overlap scoring.

use std::collections::HashSet;

/// `|A ∩ B| / sqrt(|A| * |B|)`, with the denominator floored at 1.
///
/// Symmetric and bounded to `[0, 1]`. Identical non-empty sets score `1.0`;
/// a small set fully contained in a larger one scores `sqrt(|small| / |large|)`.
#[must_use]
#[allow(clippy::cast_precision_loss)] // token counts are tiny
pub fn overlap_score(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let shared = a.intersection(b).count() as f64;
    let denom = ((a.len() * b.len()) as f64).sqrt().max(1.0);
    (shared / denom).clamp(0.0, 1.0)
}
