//! Similarity Index: cosine-similarity search over stored resume embeddings.
//!
//! Pure functions, no I/O. Candidates are supplied by the caller (a store
//! snapshot), so a search never observes a half-applied store update.

use serde::Serialize;

use crate::models::resume::ResumeId;

/// A single search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityHit {
    pub id: ResumeId,
    pub score: f64,
}

/// Cosine similarity in [-1, 1]. Returns 0.0 when either vector has zero norm,
/// when the vectors differ in length, or when either is empty.
///
/// Computed in f64 as `dot / sqrt(|a|² · |b|²)`, which is exactly symmetric and
/// gives exactly 1.0 for `sim(a, a)`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}

/// Ranks `candidates` against `query`.
///
/// - candidates with an empty vector or a different dimension are skipped
/// - scores below `min_similarity` are dropped (`score == min_similarity` is kept)
/// - sorted by score descending, ties by id ascending
/// - at most `top_n` hits
///
/// An empty query matches nothing.
pub fn search<'a, I>(query: &[f32], candidates: I, top_n: usize, min_similarity: f64) -> Vec<SimilarityHit>
where
    I: IntoIterator<Item = (ResumeId, &'a [f32])>,
{
    if query.is_empty() || top_n == 0 {
        return Vec::new();
    }

    let mut hits: Vec<SimilarityHit> = candidates
        .into_iter()
        .filter(|(_, vector)| !vector.is_empty() && vector.len() == query.len())
        .map(|(id, vector)| SimilarityHit {
            id,
            score: cosine_similarity(query, vector),
        })
        .filter(|hit| hit.score.is_finite() && hit.score >= min_similarity)
        .collect();

    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    hits.truncate(top_n);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ids(n: usize) -> Vec<ResumeId> {
        let mut ids: Vec<ResumeId> = (0..n).map(|_| Uuid::new_v4()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_cosine_is_symmetric() {
        let pairs: [(&[f32], &[f32]); 3] = [
            (&[1.0, 2.0, 3.0], &[-0.5, 4.0, 0.25]),
            (&[0.1, 0.0, -7.0], &[3.3, 2.2, 1.1]),
            (&[1e-3, 5e3, 2.0], &[7.0, -1e-2, 9.5]),
        ];
        for (a, b) in pairs {
            assert_eq!(cosine_similarity(a, b), cosine_similarity(b, a));
        }
    }

    #[test]
    fn test_cosine_self_similarity_is_one() {
        for v in [
            vec![1.0_f32, 2.0, 3.0],
            vec![0.3, -0.7, 0.01, 12.5],
            vec![-4.0],
        ] {
            assert_eq!(cosine_similarity(&v, &v), 1.0);
        }
    }

    #[test]
    fn test_cosine_zero_norm_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let s = cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]);
        assert_eq!(s, -1.0);
    }

    #[test]
    fn test_search_sorted_thresholded_truncated() {
        let ids = ids(4);
        let vectors: Vec<Vec<f32>> = vec![
            vec![1.0, 0.0],
            vec![0.8, 0.6],
            vec![0.0, 1.0],
            vec![-1.0, 0.0],
        ];
        let candidates = ids.iter().copied().zip(vectors.iter().map(|v| v.as_slice()));

        let hits = search(&[1.0, 0.0], candidates, 2, 0.0);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, ids[0]);
        assert_eq!(hits[1].id, ids[1]);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(hits.iter().all(|h| h.score >= 0.0));
    }

    #[test]
    fn test_search_threshold_is_inclusive() {
        let id = Uuid::new_v4();
        let v = vec![0.6_f32, 0.8];
        let score = cosine_similarity(&[1.0, 0.0], &v);
        let hits = search(&[1.0, 0.0], [(id, v.as_slice())], 10, score);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, score);
    }

    #[test]
    fn test_search_impossible_threshold_is_empty() {
        let ids = ids(3);
        let vectors = [vec![1.0_f32, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]];
        let candidates = ids.iter().copied().zip(vectors.iter().map(|v| v.as_slice()));
        assert!(search(&[1.0, 0.0], candidates, 10, 1.1).is_empty());
    }

    #[test]
    fn test_search_empty_query_matches_nothing() {
        let v = vec![1.0_f32];
        assert!(search(&[], [(Uuid::new_v4(), v.as_slice())], 10, -1.0).is_empty());
    }

    #[test]
    fn test_search_skips_empty_and_mismatched_vectors() {
        let ids = ids(3);
        let vectors = [vec![], vec![1.0_f32, 0.0, 0.0], vec![1.0, 0.0]];
        let candidates = ids.iter().copied().zip(vectors.iter().map(|v| v.as_slice()));
        let hits = search(&[1.0, 0.0], candidates, 10, -1.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ids[2]);
    }

    #[test]
    fn test_search_ties_break_by_id() {
        let ids = ids(3);
        let v = vec![1.0_f32, 1.0];
        let candidates = vec![
            (ids[2], v.as_slice()),
            (ids[0], v.as_slice()),
            (ids[1], v.as_slice()),
        ];
        let hits = search(&[1.0, 1.0], candidates, 10, 0.0);
        let order: Vec<_> = hits.iter().map(|h| h.id).collect();
        assert_eq!(order, ids);
    }
}
