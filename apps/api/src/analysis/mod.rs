// Scoring engine: signal extraction, the five-metric composite model, and
// the legacy compatibility path. All heavy collaborators (embedding,
// sentence segmentation, taxonomy) are injected — nothing here owns state.

pub mod composite;
pub mod handlers;
pub mod legacy;
pub mod metrics;
pub mod sentences;
pub mod signals;
pub mod similarity;
