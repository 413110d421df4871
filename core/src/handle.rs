use crate::tfidf::{IndexConfig, SearchHit, TfIdfIndex};
use crate::SearchError;
use std::path::Path;
use std::sync::OnceLock;

/// Where the one-shot build stands, as seen by a reader.
#[derive(Debug, Clone, Copy)]
pub enum IndexState<'a> {
    Building,
    Ready(&'a TfIdfIndex),
    Failed(&'a str),
}

/// Owner of the process's search index and its readiness.
///
/// The index is published exactly once. Readers observe either nothing or the
/// complete index; a failed build is terminal.
#[derive(Default)]
pub struct IndexHandle {
    slot: OnceLock<Result<TfIdfIndex, String>>,
}

impl IndexHandle {
    pub fn new() -> Self { Self::default() }

    /// Handle that is ready from the start.
    pub fn ready(index: TfIdfIndex) -> Self {
        let handle = Self::new();
        handle.publish(index);
        handle
    }

    /// Publish a built index. Returns false if the build outcome was already set.
    pub fn publish(&self, index: TfIdfIndex) -> bool { self.slot.set(Ok(index)).is_ok() }

    /// Record a failed build. Returns false if the build outcome was already set.
    pub fn fail(&self, reason: impl Into<String>) -> bool { self.slot.set(Err(reason.into())).is_ok() }

    pub fn is_ready(&self) -> bool { matches!(self.slot.get(), Some(Ok(_))) }

    pub fn state(&self) -> IndexState<'_> {
        match self.slot.get() {
            None => IndexState::Building,
            Some(Ok(index)) => IndexState::Ready(index),
            Some(Err(reason)) => IndexState::Failed(reason),
        }
    }

    pub fn index(&self) -> Result<&TfIdfIndex, SearchError> {
        match self.state() {
            IndexState::Ready(index) => Ok(index),
            IndexState::Building => Err(SearchError::NotReady),
            IndexState::Failed(reason) => Err(SearchError::Unavailable(reason.to_string())),
        }
    }

    /// Readiness is checked before the query text is looked at.
    pub fn search(&self, text: &str, top_k: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.index()?.search(text, top_k)
    }

    /// Load the corpus, build, and publish; on error record the failure instead.
    /// Blocks for the whole build. Returns whether the index became ready.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P, config: &IndexConfig) -> bool {
        let path = path.as_ref();
        tracing::info!(corpus = %path.display(), "building search index");
        match TfIdfIndex::from_path(path, config) {
            Ok(index) => {
                let published = self.publish(index);
                if published {
                    tracing::info!("index is ready, search available");
                } else {
                    tracing::warn!("index outcome already set, discarding rebuilt index");
                }
                published
            }
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "index build failed");
                self.fail(format!("{e:#}"));
                false
            }
        }
    }
}
