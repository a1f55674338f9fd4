/// Calculate cosine similarity between two vectors.
///
/// Accumulates in f64 and clamps the result into `[-1.0, 1.0]`; an
/// identical pair compares as exactly 1.0 rather than one ulp under it.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| *x as f64 * *y as f64)
        .sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // The norms cancel exactly for an equal pair; the division would
    // only reintroduce rounding.
    if a == b {
        return 1.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_exactly_one() {
        // Values whose f32 norms don't divide out cleanly; the result
        // must still be 1.0 exactly, not 0.999...
        let v = [0.1, 0.2, 0.3, -0.456, 0.789];
        assert_eq!(cosine_similarity(&v, &v), 1.0);
    }

    #[test]
    fn test_result_never_exceeds_one() {
        // Parallel but non-identical vectors can overshoot 1.0 through
        // rounding without the clamp.
        let a = [0.1, 0.2, 0.3];
        let b = [0.2, 0.4, 0.6];
        assert!(cosine_similarity(&a, &b) <= 1.0);
        assert!(cosine_similarity(&a, &b) > 0.999);
    }

    #[test]
    fn test_opposite_vectors() {
        let a = [0.5, -0.25];
        let b = [-0.5, 0.25];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_vectors() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
