//! Session-lifetime resource cache.
//!
//! A single [`CacheStore`] is created by the app and cloned into every view;
//! the sync engine ([`crate::sync::ResourceSync`]) is the only writer, any
//! number of views read. See `store.rs` for the entry semantics.

mod store;

pub use store::{CacheStore, CachedList};
