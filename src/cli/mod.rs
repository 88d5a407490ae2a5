//! # CLI Module
//!
//! Command implementations behind the `likedsongs` binary. Argument parsing
//! lives in `main.rs`; this module turns parsed options into a running
//! server and reports progress on the console.
//!
//! ## Commands
//!
//! - [`serve`] - Loads the configuration, binds the listener and serves the
//!   web application until the process is stopped.

mod serve;

pub use serve::serve;
