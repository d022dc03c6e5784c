//! HTTP wiring of the `datalayer` engine
//!
//! This crate shows how a storefront exposes the engine over HTTP with axum:
//! the two item fetch endpoints used by storefront scripts, the page head
//! render, and the tracking calls that stage views and authentications for
//! the next render.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
// These are examples, so we don't need to be as pedantic
#![allow(clippy::missing_const_for_fn)]

/// Router, shared state and handlers
pub mod app;

/// Seed data for the demo storefront
pub mod demo;
