//! Field reconciliation
//!
//! Intersects the user's wishlist with the attributes the lookup service
//! actually returned. The available set varies per IP and per plan (bogon
//! addresses, anonymous mode), so a miss is expected and only reported.

use serde_json::{Map, Value};

use crate::data::types::AttributeSet;

/// Result of reconciling a wishlist against resolved attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    /// Wishlist fields present in the attributes, in wishlist order
    pub subset: Map<String, Value>,
    /// Wishlist fields absent from the attributes, in wishlist order
    pub missing: Vec<String>,
}

/// Compute the wishlist ∩ attributes subset and the fields that were unavailable.
///
/// Pure: never invents fields and never reorders the wishlist.
pub fn reconcile<S: AsRef<str>>(attributes: &AttributeSet, wishlist: &[S]) -> Reconciled {
    let mut result = Reconciled::default();

    for field in wishlist {
        let field = field.as_ref();
        match attributes.get(field) {
            Some(value) => {
                result.subset.insert(field.to_string(), value.clone());
            }
            None => result.missing.push(field.to_string()),
        }
    }

    result
}
