//! Data layer
//!
//! - `cache` - Bounded TTL cache of resolved attribute sets
//! - `types` - Event and attribute set types shared across the crate

pub mod cache;
pub mod types;

pub use types::{AttributeSet, Event};
