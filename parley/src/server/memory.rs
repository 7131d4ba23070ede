//! In-process conversation memory for the reply server.
//!
//! Remembered replies are matched against new questions by cosine similarity
//! of their embeddings. Everything lives in process memory; nothing survives
//! a restart.

use serde::Serialize;

/// Minimum similarity for a remembered reply to count as relevant context.
pub const SIMILARITY_THRESHOLD: f32 = 0.8;

/// Replies shorter than this are not worth remembering.
const MIN_REMEMBER_LEN: usize = 20;

/// Remembered text is capped to keep prompts small.
const MEMORY_TEXT_CAP: usize = 400;

/// Rolling history keeps only the most recent turns.
const HISTORY_CAP: usize = 50;

/// One remembered reply with its embedding.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryItem {
    /// Position in the store at the time of insertion.
    pub id: usize,
    /// Remembered text, capped at [`MEMORY_TEXT_CAP`] characters.
    pub text: String,
    #[serde(skip)]
    embedding: Vec<f32>,
}

/// One turn of the rolling conversation history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// "user" or "assistant".
    pub role: &'static str,
    /// The turn's text.
    pub content: String,
}

/// Store of remembered replies plus the rolling turn history.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Vec<MemoryItem>,
    history: Vec<HistoryEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of remembered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The `n` most recently remembered items, oldest first.
    pub fn recent(&self, n: usize) -> &[MemoryItem] {
        let start = self.items.len().saturating_sub(n);
        &self.items[start..]
    }

    /// Remember a reply if it is long enough to be useful.
    pub fn remember(&mut self, text: &str, embedding: Vec<f32>) {
        if !worth_remembering(text) {
            return;
        }
        let capped: String = text.chars().take(MEMORY_TEXT_CAP).collect();
        self.items.push(MemoryItem {
            id: self.items.len(),
            text: capped,
            embedding,
        });
    }

    /// Most similar remembered text above the threshold, if any.
    pub fn best_match(&self, query_embedding: &[f32]) -> Option<&str> {
        if self.is_empty() {
            return None;
        }
        let mut best: Option<(&str, f32)> = None;
        for item in &self.items {
            let sim = cosine_similarity(query_embedding, &item.embedding);
            if sim > SIMILARITY_THRESHOLD && best.is_none_or(|(_, score)| sim > score) {
                best = Some((&item.text, sim));
            }
        }
        if let Some((text, score)) = best {
            tracing::debug!(score, "found relevant context");
            return Some(text);
        }
        None
    }

    /// Append a turn to the rolling history, dropping the oldest beyond the
    /// cap.
    pub fn record_turn(&mut self, role: &'static str, content: String) {
        self.history.push(HistoryEntry { role, content });
        if self.history.len() > HISTORY_CAP {
            let excess = self.history.len() - HISTORY_CAP;
            self.history.drain(..excess);
        }
    }

    /// Number of recorded turns.
    #[cfg(test)]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget everything: remembered items and history.
    pub fn clear(&mut self) {
        self.items.clear();
        self.history.clear();
    }
}

/// Whether a reply is long enough to be worth remembering (and worth the
/// embedding call). Counts characters, like the cap applied when storing.
pub fn worth_remembering(text: &str) -> bool {
    text.chars().count() > MIN_REMEMBER_LEN
}

/// Cosine similarity of two vectors. Zero-norm or empty vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_handles_zero_and_mismatched_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn best_match_requires_threshold() {
        let mut store = MemoryStore::new();
        store.remember(
            "the capital of France is Paris, obviously",
            vec![1.0, 0.0],
        );
        // Similar direction: well above threshold.
        assert!(store.best_match(&[0.9, 0.1]).is_some());
        // Orthogonal: below threshold.
        assert!(store.best_match(&[0.0, 1.0]).is_none());
    }

    #[test]
    fn best_match_prefers_highest_score() {
        let mut store = MemoryStore::new();
        store.remember("first remembered reply, close enough", vec![0.9, 0.1]);
        store.remember("second remembered reply, dead on", vec![1.0, 0.0]);
        let found = store.best_match(&[1.0, 0.0]).unwrap();
        assert!(found.starts_with("second"));
    }

    #[test]
    fn short_replies_are_not_remembered() {
        let mut store = MemoryStore::new();
        store.remember("too short", vec![1.0]);
        assert!(store.is_empty());
    }

    #[test]
    fn length_check_counts_chars_not_bytes() {
        // 19 two-byte characters: 38 bytes but still too short to remember.
        let short = "é".repeat(19);
        assert!(!worth_remembering(&short));
        let mut store = MemoryStore::new();
        store.remember(&short, vec![1.0]);
        assert!(store.is_empty());

        assert!(worth_remembering(&"é".repeat(21)));
    }

    #[test]
    fn remembered_text_is_capped() {
        let mut store = MemoryStore::new();
        let long = "x".repeat(1000);
        store.remember(&long, vec![1.0]);
        assert_eq!(store.recent(1)[0].text.len(), 400);
    }

    #[test]
    fn history_is_capped_at_fifty_turns() {
        let mut store = MemoryStore::new();
        for i in 0..120 {
            store.record_turn("user", format!("turn {i}"));
        }
        assert_eq!(store.history_len(), 50);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut store = MemoryStore::new();
        store.remember("something long enough to remember", vec![1.0]);
        store.record_turn("user", "hello".to_string());
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.history_len(), 0);
    }
}
