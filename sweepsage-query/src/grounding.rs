use std::fmt::Write as _;

use sweepsage_core::Segment;

/// Renders retrieved segments as numbered reference blocks, in retrieval order.
///
/// Every segment becomes
///
/// ```text
/// Reference 1:
/// <text>
/// Reference 1 source: <metadata as json>
/// ```
///
/// No segments render as an empty string.
pub fn grounding_context(segments: &[Segment]) -> String {
    let mut context = String::new();
    for (index, segment) in segments.iter().enumerate() {
        let n = index + 1;
        // Writing to a String cannot fail
        let _ = writeln!(
            context,
            "Reference {n}:\n{text}\nReference {n} source: {metadata}",
            text = segment.text,
            metadata = segment.metadata,
        );
    }
    context
}
