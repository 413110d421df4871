//! TF-IDF search over competitive-programming problem statements.
//!
//! - [`tokenizer`]: text normalization shared by indexing and querying.
//! - [`tfidf`]: index build and cosine-similarity ranking.
//! - [`handle`]: one-shot publication of the built index and its readiness.
//! - [`corpus`]: reading and writing problem records.

pub mod corpus;
pub mod document;
pub mod error;
pub mod handle;
pub mod tfidf;
pub mod tokenizer;
pub mod vector;

pub use document::{documents_from, DocId, Document, Platform, Problem};
pub use error::SearchError;
pub use handle::{IndexHandle, IndexState};
pub use tfidf::{IndexConfig, IndexStats, SearchHit, TfIdfIndex, DEFAULT_TITLE_BOOST, DEFAULT_TOP_K};
pub use vector::{SparseVector, TermId};
