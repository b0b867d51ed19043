//! IP geolocation enrichment
//!
//! Per event: read the address under the input key, resolve it through the
//! cached lookup, keep only the wishlisted attributes and write them under
//! the output key.
//!
//! ```text
//! Event ──► EnrichmentStage ──► GeoResolver ──► AttributeCache
//!                │                    │  (miss)
//!                │                    └──► GeoLookup (ipinfo.io)
//!                └──► reconcile ──► Event[output_key]
//! ```

mod diagnostics;
mod error;
mod normalize;
mod reconcile;
mod resolver;
mod settings;
mod stage;

#[cfg(test)]
pub(crate) mod testing;

pub use diagnostics::{
    Diagnostic, DiagnosticLevel, Diagnostics, RecordingDiagnostics, TracingDiagnostics,
};
pub use error::{ConfigError, LookupError};
pub use normalize::normalize_attributes;
pub use reconcile::{Reconciled, reconcile};
pub use resolver::{GeoLookup, GeoResolver};
pub use settings::{AccessToken, Settings, StageConfig, Wishlist};
pub use stage::{EnrichmentStage, Outcome};
