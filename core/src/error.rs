/// Why a query produced no ranked list.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The index is still being built. Retry later.
    #[error("index building in progress, try again shortly")]
    NotReady,
    /// The index build failed; search stays unavailable for the life of the process.
    #[error("search index unavailable: {0}")]
    Unavailable(String),
    /// Nothing searchable was left after normalization (empty, punctuation or stop words only).
    #[error("query has no searchable terms")]
    InvalidQuery,
}

impl SearchError {
    /// Retrying the same request later can succeed.
    pub fn is_retryable(&self) -> bool { matches!(self, SearchError::NotReady) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_ready_is_retryable() {
        assert!(SearchError::NotReady.is_retryable());
        assert!(!SearchError::Unavailable("boom".into()).is_retryable());
        assert!(!SearchError::InvalidQuery.is_retryable());
    }
}
