//! Gateway to the remote card database: typed endpoints, a persisted
//! URL-keyed response cache and an on-disk image cache.

pub mod cache;
pub mod client;
pub mod raw;

pub use cache::*;
pub use client::*;
pub use raw::*;
