//! Domain logic for IP geolocation enrichment
//!
//! - `enrich` - The enrichment stage: resolver, reconciler, record mutation
//! - `pipeline` - NDJSON host loop driving the stage over a stream of events

pub mod enrich;
pub mod pipeline;

pub use enrich::{EnrichmentStage, Outcome};
pub use pipeline::{EventPipeline, PipelineSummary};
