//! Short-lived caches for shareable artifacts

mod share_cache;

pub use share_cache::{Clock, ShareCache, SystemClock};
