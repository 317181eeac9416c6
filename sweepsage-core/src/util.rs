//! Small helpers shared across crates
use crate::{Segment, StoredRecord};

/// Safely truncates a string to a maximum number of characters.
///
/// Respects utf8 character boundaries.
pub fn safe_truncate_utf8(s: impl AsRef<str>, max_chars: usize) -> String {
    s.as_ref().chars().take(max_chars).collect()
}

/// Debug print a long string by truncating to n characters
///
/// # Example
///
/// ```
/// # use sweepsage_core::util::debug_long_utf8;
/// let s = debug_long_utf8("扫地机器人".repeat(10), 3);
///
/// assert_eq!(s, "扫地机 (50)");
/// ```
pub fn debug_long_utf8(s: impl AsRef<str>, max_chars: usize) -> String {
    let trunc = safe_truncate_utf8(&s, max_chars);

    format!("{} ({})", trunc, s.as_ref().chars().count())
}

/// Cosine similarity between two vectors, in `[-1.0, 1.0]`.
///
/// Returns `0.0` when the lengths differ or either vector has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}

/// The `k` records most similar to `query`, most similar first.
///
/// Ties keep the order in which the records were given.
pub fn top_k_by_similarity(
    records: impl IntoIterator<Item = StoredRecord>,
    query: &[f32],
    k: usize,
) -> Vec<Segment> {
    let mut scored = records
        .into_iter()
        .map(|record| (cosine_similarity(query, &record.vector), record.segment))
        .collect::<Vec<_>>();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored.truncate(k);
    scored.into_iter().map(|(_, segment)| segment).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_top_k_orders_by_similarity() {
        let records = vec![
            StoredRecord::new(Segment::new("far", crate::Metadata::default()), vec![0.0, 1.0], 0),
            StoredRecord::new(Segment::new("near", crate::Metadata::default()), vec![1.0, 0.1], 1),
            StoredRecord::new(Segment::new("exact", crate::Metadata::default()), vec![1.0, 0.0], 2),
        ];

        let texts = top_k_by_similarity(records.clone(), &[1.0, 0.0], 2)
            .into_iter()
            .map(|segment| segment.text)
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["exact", "near"]);

        assert_eq!(top_k_by_similarity(records, &[1.0, 0.0], 10).len(), 3);
        assert!(top_k_by_similarity(Vec::new(), &[1.0, 0.0], 3).is_empty());
    }

    #[test]
    fn test_safe_truncate_str_with_utf8_char_boundary() {
        let s = "扫".repeat(101);
        assert_eq!(safe_truncate_utf8(&s, 100).chars().count(), 100);

        let s = "Jürgen".repeat(100);
        assert_eq!(safe_truncate_utf8(&s, 100).chars().count(), 100);
    }

    #[test_case(&[1.0, 0.0], &[1.0, 0.0], 1.0; "identical")]
    #[test_case(&[1.0, 0.0], &[0.0, 1.0], 0.0; "orthogonal")]
    #[test_case(&[1.0, 0.0], &[-1.0, 0.0], -1.0; "opposite")]
    #[test_case(&[1.0, 0.0], &[1.0], 0.0; "length mismatch")]
    #[test_case(&[0.0, 0.0], &[1.0, 0.0], 0.0; "zero vector")]
    fn test_cosine_similarity(a: &[f32], b: &[f32], expected: f32) {
        assert!((cosine_similarity(a, b) - expected).abs() < 1e-6);
    }
}
