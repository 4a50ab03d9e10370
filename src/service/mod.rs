//! Service Module
//!
//! The fetch-through caller that sits in front of the cache: look up the
//! caller's cell, fall back to the upstream API on a miss, and remember what
//! came back.

mod nearby;
mod source;

pub use nearby::{LookupSource, NearbyLookup, NearbyRequests};
pub use source::{HttpRequestSource, RequestSource};
