use serde::{Deserialize, Serialize};

pub type TermId = u32;

/// Sparse term-weight vector. Entries are kept sorted by term id with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(TermId, f32)>,
}

impl SparseVector {
    pub fn new() -> Self { Self::default() }

    /// Build from arbitrary (term, weight) pairs. Later duplicates overwrite earlier ones.
    pub fn from_pairs(mut pairs: Vec<(TermId, f32)>) -> Self {
        pairs.sort_by_key(|&(t, _)| t);
        let mut entries: Vec<(TermId, f32)> = Vec::with_capacity(pairs.len());
        for (t, w) in pairs {
            match entries.last_mut() {
                Some(last) if last.0 == t => last.1 = w,
                _ => entries.push((t, w)),
            }
        }
        Self { entries }
    }

    pub fn get(&self, term: TermId) -> Option<f32> {
        self.entries
            .binary_search_by_key(&term, |&(t, _)| t)
            .ok()
            .map(|i| self.entries[i].1)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, f32)> + '_ { self.entries.iter().copied() }

    /// Euclidean norm, `sqrt(Σ w²)`.
    pub fn magnitude(&self) -> f32 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f32>().sqrt()
    }

    /// Dot product over the terms both vectors share (merge join on sorted ids).
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut acc = 0.0f32;
        while i < self.entries.len() && j < other.entries.len() {
            let (ta, wa) = self.entries[i];
            let (tb, wb) = other.entries[j];
            match ta.cmp(&tb) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }
}

/// Cosine similarity with the zero-magnitude guard: a zero norm is replaced by 1,
/// which makes the score 0 rather than NaN. Clamped to `[0, 1]`.
pub fn cosine(dot: f32, a_magnitude: f32, b_magnitude: f32) -> f32 {
    let a = if a_magnitude == 0.0 { 1.0 } else { a_magnitude };
    let b = if b_magnitude == 0.0 { 1.0 } else { b_magnitude };
    (dot / (a * b)).clamp(0.0, 1.0)
}
