//! URL handling module for tidecrawl
//!
//! Normalization and host/origin extraction for normalized URL keys used by
//! the frontier, the filter pipeline, and the statistics store.

mod domain;
mod normalize;

pub use domain::{host_of, origin_key};
pub use normalize::{normalize, strip_fragment, strip_query, strip_trailing_slash};
