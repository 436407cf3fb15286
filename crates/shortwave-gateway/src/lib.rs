//! HTTP gateway for the Shortwave URL shortener.
//!
//! Thin request/response mapping over the [`shortwave_core::LinkStore`]
//! contract; all storage semantics live in `shortwave-storage`.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod serve;
pub mod session;
pub mod state;
