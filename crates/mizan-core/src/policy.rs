//! Retrieval and harvesting policy constants. These are fixed policy, not
//! tunable at call time.

/// Minimum cosine similarity for a retrieval candidate to be considered.
pub const SIMILARITY_THRESHOLD: f32 = 0.78;

/// Maximum number of entries returned by a context lookup.
pub const TOP_K: u64 = 3;

/// Minimum length (in characters) of an extracted snippet worth caching.
pub const MIN_SNIPPET_CHARS: usize = 50;

/// "Article" citation marker (Arabic: "مادة"). An answer containing neither
/// marker is skipped by the harvester without any oracle call.
pub const ARTICLE_MARKER: &str = "مادة";

/// Numbered-law citation marker (Arabic: "قانون رقم").
pub const DECREE_MARKER: &str = "قانون رقم";

/// Returns true when the text carries at least one legal citation marker.
pub fn has_legal_markers(text: &str) -> bool {
    text.contains(ARTICLE_MARKER) || text.contains(DECREE_MARKER)
}
