/// Euclidean norm of a vector.
#[must_use]
pub fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Cosine distance `1 - cos(a, b)`, clamped to `[0, 2]`.
///
/// A zero vector has similarity 0 with everything, so its distance is 1.
#[must_use]
pub fn cosine_distance(a: &[f64], b: &[f64]) -> f64 {
    distance_with_norms(a, norm(a), b, norm(b))
}

/// Cosine distance with precomputed norms.
pub(crate) fn distance_with_norms(a: &[f64], norm_a: f64, b: &[f64], norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (1.0 - dot / (norm_a * norm_b)).clamp(0.0, 2.0)
}
