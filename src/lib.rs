//! Browser end-to-end suite for the marketplace web app.
//!
//! Scenarios drive a real browser over WebDriver through the [`scenario`]
//! scripts; [`interact`] holds the resolve/act/wait primitives they share.

pub mod browser;
pub mod cli;
pub mod error;
pub mod interact;
pub mod logging;
pub mod report;
pub mod scenario;
pub mod trace;
