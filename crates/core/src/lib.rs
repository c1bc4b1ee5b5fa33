//! Emporium Core - Shared catalog types.
//!
//! This crate provides the types shared by the catalog API server and the
//! listing client in `emporium-storefront`.
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! HTTP clients, no caches. This keeps it lightweight and allows both the
//! server and the client side of the catalog API to agree on one wire shape.
//!
//! # Modules
//!
//! - [`types`] - Product records, price math, listing queries and pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
