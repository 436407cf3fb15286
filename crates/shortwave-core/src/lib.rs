//! Core types and traits for the Shortwave URL shortener.
//!
//! This crate provides the link record model, the short-id encoder and
//! the storage contract shared by every backend.

pub mod encode;
pub mod error;
pub mod link;
pub mod store;

pub use encode::encode;
pub use error::{Result, StoreError};
pub use link::{short_url, BatchCreated, BatchItem, LinkRecord};
pub use store::{LinkStore, Resolved};
