//! Durable key-value store for cached content and reader state
//!
//! This module provides a store manager that persists string values to the
//! filesystem, one JSON file per key. Entries never expire; the content
//! loader overwrites them on every successful refresh, and reader state
//! (favorites) lives under its own reserved keys.

mod manager;

pub use manager::{StoreError, StoreManager};
