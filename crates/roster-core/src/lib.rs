//! Core types and trait definitions for the Roster contact layer.
//!
//! This crate is deliberately free of database dependencies. It describes the
//! contact model, the structured provider interface that stands in for the
//! device's shared address book, and the private local store contract.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod local;
pub mod provider;
pub mod sorting;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
