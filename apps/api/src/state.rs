use std::sync::Arc;

use crate::analysis::sentences::SentenceSegmenter;
use crate::analysis::similarity::Embedder;
use crate::config::Config;
use crate::taxonomy::Taxonomy;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// The taxonomy is the only read-mostly shared cache in the process; both
/// collaborator traits are pluggable backends chosen at startup.
#[derive(Clone)]
pub struct AppState {
    pub taxonomy: Arc<Taxonomy>,
    /// Pluggable embedding backend. Default: deterministic `HashEmbedder`;
    /// swap via `EMBEDDING_ENDPOINT`.
    pub embedder: Arc<dyn Embedder>,
    pub segmenter: Arc<dyn SentenceSegmenter>,
    pub config: Config,
}
