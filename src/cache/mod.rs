//! Cache Module
//!
//! Cache operations over the store: single and batch reads and writes with
//! key namespacing.

mod adapter;


pub use adapter::{CacheAdapter, MsetReport};
