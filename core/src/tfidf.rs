use crate::corpus::load_corpus;
use crate::document::{documents_from, DocId, Document, Problem};
use crate::tokenizer::tokenize;
use crate::vector::{cosine, SparseVector, TermId};
use crate::SearchError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::time::Instant;

pub const DEFAULT_TOP_K: usize = 10;
pub const DEFAULT_TITLE_BOOST: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// How many times the title is repeated in the indexing text.
    pub title_boost: usize,
}

impl Default for IndexConfig {
    fn default() -> Self { Self { title_boost: DEFAULT_TITLE_BOOST } }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub num_docs: u32,
    pub num_terms: u32,
    pub built_at: String,
}

/// In-memory TF-IDF index over a fixed corpus.
///
/// `weight(t, d) = count(t, d) / |d| * ln(N / df(t))`. Vectors and their norms are
/// computed once at build time; queries only read.
pub struct TfIdfIndex {
    docs: Vec<Document>,
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
    df: Vec<u32>,
    vectors: Vec<SparseVector>,
    magnitudes: Vec<f32>,
    built_at: String,
}

fn idf(num_docs: u32, df: u32) -> f32 {
    if df == 0 { return 0.0; }
    (num_docs as f32 / df as f32).ln()
}

impl TfIdfIndex {
    pub fn build(problems: Vec<Problem>, config: &IndexConfig) -> Self {
        let start = Instant::now();
        let docs = documents_from(problems);

        let mut dictionary: HashMap<String, TermId> = HashMap::new();
        let mut terms: Vec<String> = Vec::new();
        let mut df: Vec<u32> = Vec::new();
        // Per document: raw counts sorted by term id, plus the token total.
        let mut raw: Vec<(Vec<(TermId, u32)>, u32)> = Vec::with_capacity(docs.len());

        for doc in &docs {
            let tokens = tokenize(&doc.indexing_text(config.title_boost));
            let total = tokens.len() as u32;
            let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
            for term in tokens {
                let tid = match dictionary.get(&term) {
                    Some(&tid) => tid,
                    None => {
                        let tid = terms.len() as TermId;
                        dictionary.insert(term.clone(), tid);
                        terms.push(term);
                        df.push(0);
                        tid
                    }
                };
                *counts.entry(tid).or_insert(0) += 1;
            }
            for &tid in counts.keys() {
                df[tid as usize] += 1;
            }
            raw.push((counts.into_iter().collect(), total));
            if (doc.id + 1) % 2000 == 0 {
                tracing::debug!(docs = doc.id + 1, "tokenized documents");
            }
        }

        let num_docs = docs.len() as u32;
        let idf_table: Vec<f32> = df.iter().map(|&d| idf(num_docs, d)).collect();

        let mut vectors = Vec::with_capacity(raw.len());
        let mut magnitudes = Vec::with_capacity(raw.len());
        for (counts, total) in raw {
            let pairs = counts
                .into_iter()
                .map(|(tid, count)| (tid, count as f32 / total as f32 * idf_table[tid as usize]))
                .collect();
            let vector = SparseVector::from_pairs(pairs);
            magnitudes.push(vector.magnitude());
            vectors.push(vector);
        }

        let built_at = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        tracing::info!(
            num_docs,
            num_terms = terms.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index build complete"
        );
        Self { docs, dictionary, terms, df, vectors, magnitudes, built_at }
    }

    /// Load the corpus at `path` and build over it. Only the load can fail.
    pub fn from_path<P: AsRef<Path>>(path: P, config: &IndexConfig) -> Result<Self> {
        let problems = load_corpus(path)?;
        Ok(Self::build(problems, config))
    }

    /// Rank documents against free text. Scores are cosine similarities in `(0, 1]`,
    /// ordered by score then by ascending id.
    pub fn search(&self, text: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(SearchError::InvalidQuery);
        }
        let query = self.query_vector(&tokens);
        let q_mag = query.magnitude();

        let mut hits: Vec<SearchHit> = self
            .vectors
            .iter()
            .zip(&self.magnitudes)
            .enumerate()
            .filter_map(|(i, (vector, &d_mag))| {
                let score = cosine(query.dot(vector), q_mag, d_mag);
                (score > 0.0).then_some(SearchHit { doc_id: i as DocId, score })
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
        hits.truncate(top_k);
        tracing::debug!(query = text, hits = hits.len(), "scored query");
        Ok(hits)
    }

    /// Query weights: `count / |tokens| * idf`. Terms absent from the corpus are left out.
    pub fn query_vector(&self, tokens: &[String]) -> SparseVector {
        let total = tokens.len() as f32;
        let mut counts: BTreeMap<TermId, u32> = BTreeMap::new();
        for term in tokens {
            if let Some(&tid) = self.dictionary.get(term) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        let pairs = counts
            .into_iter()
            .map(|(tid, count)| (tid, count as f32 / total * self.idf_of(tid)))
            .collect();
        SparseVector::from_pairs(pairs)
    }

    fn idf_of(&self, tid: TermId) -> f32 { idf(self.num_docs(), self.df[tid as usize]) }

    /// IDF of an already-normalized term; 0 for terms the corpus never contains.
    pub fn idf(&self, term: &str) -> f32 {
        self.dictionary.get(term).map_or(0.0, |&tid| self.idf_of(tid))
    }

    pub fn doc_frequency(&self, term: &str) -> u32 {
        self.dictionary.get(term).map_or(0, |&tid| self.df[tid as usize])
    }

    /// The `n` heaviest terms of a document, heaviest first, ties by term text.
    pub fn top_terms(&self, doc_id: DocId, n: usize) -> Vec<(&str, f32)> {
        let Some(vector) = self.vectors.get(doc_id as usize) else { return Vec::new() };
        let mut terms: Vec<(&str, f32)> = vector
            .iter()
            .map(|(tid, w)| (self.terms[tid as usize].as_str(), w))
            .collect();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(b.0)));
        terms.truncate(n);
        terms
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> { self.docs.get(doc_id as usize) }
    pub fn documents(&self) -> &[Document] { &self.docs }
    pub fn vector(&self, doc_id: DocId) -> Option<&SparseVector> { self.vectors.get(doc_id as usize) }
    pub fn magnitude(&self, doc_id: DocId) -> Option<f32> { self.magnitudes.get(doc_id as usize).copied() }
    pub fn doc_frequencies(&self) -> &[u32] { &self.df }
    pub fn terms(&self) -> &[String] { &self.terms }
    pub fn num_docs(&self) -> u32 { self.docs.len() as u32 }
    pub fn num_terms(&self) -> u32 { self.terms.len() as u32 }

    pub fn stats(&self) -> IndexStats {
        IndexStats { num_docs: self.num_docs(), num_terms: self.num_terms(), built_at: self.built_at.clone() }
    }
}

impl std::fmt::Debug for TfIdfIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfIndex")
            .field("num_docs", &self.num_docs())
            .field("num_terms", &self.num_terms())
            .finish()
    }
}
