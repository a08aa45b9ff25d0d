#![forbid(unsafe_code)]

//! Library side of LockedTube, a gated video browser.
//!
//! Visitors "sign in" with a numeric id, search the public video catalog, and
//! watch results through a custom-chrome player. The binaries share the
//! configuration, identity cookie, catalog client and page rendering defined
//! here; [`player`] holds the control surface for the embedded widget.

pub mod catalog;
pub mod config;
pub mod display;
pub mod identity;
pub mod logging;
pub mod pages;
pub mod player;
