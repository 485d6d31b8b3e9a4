//! Configuration for mailbars.
//!
//! mailbars has a single, user-wide configuration file; see [`GlobalConfig`]
//! for its location and format. Templates themselves live in the template
//! store ([`crate::store`]), not in configuration.

mod global;

pub use global::{GlobalConfig, SenderConfig};
