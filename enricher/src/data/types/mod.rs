//! Record types shared by the cache, the resolver and the stage

use serde_json::{Map, Value};

/// A structured pipeline event: ordered field name → JSON value.
///
/// Owned by the host pipeline; the enrichment stage mutates it in place.
pub type Event = Map<String, Value>;

/// Full set of geolocation attributes resolved for one IP address.
///
/// Keys are always text; nested mappings keep their own text keys.
pub type AttributeSet = Map<String, Value>;
