//! Integration test suite for mailbars
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **engine**: Rendering through the public engine API (tokens, helpers, locales)
//! - **isolation**: Per-call partials and locales under concurrent renders
//! - **store**: Directory store layout and persistence
//! - **service**: Render-and-deliver through the template service
//! - **cli**: The `mailbars` binary end to end

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod engine;
mod isolation;
mod service;
mod store;
